//! Leveled logging capability injected into a client.
//!
//! The client never logs through a global: it holds an `Arc<dyn Logger>`.
//! [`NoopLogger`] is the default; [`TracingLogger`] forwards every message to
//! the `tracing` macros so the usual subscribers pick them up.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Structured key/value pairs attached to a logger.
pub type Fields = BTreeMap<String, Value>;

/// A leveled logger.
///
/// # Examples
///
/// ```
/// use blackbeard::logger::{Fields, Logger};
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Default)]
/// struct Collect(Mutex<Vec<String>>);
///
/// impl Logger for Collect {
///     fn debug(&self, message: &str) { self.0.lock().unwrap().push(message.to_string()) }
///     fn info(&self, message: &str) { self.debug(message) }
///     fn warn(&self, message: &str) { self.debug(message) }
///     fn error(&self, message: &str) { self.debug(message) }
///     fn fatal(&self, message: &str) { self.debug(message) }
///     fn panic(&self, message: &str) { panic!("{}", message) }
///     fn with_fields(self: Arc<Self>, _fields: Fields) -> Arc<dyn Logger> { self }
/// }
/// ```
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);

    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);

    /// Logs an unrecoverable condition. Implementations decide whether to
    /// terminate; the client itself never calls this.
    fn fatal(&self, message: &str);

    /// Logs the message and panics. [`NoopLogger`] stays silent here too.
    fn panic(&self, message: &str);

    /// Returns a logger that attaches `fields` to every message.
    fn with_fields(self: Arc<Self>, fields: Fields) -> Arc<dyn Logger>;
}

/// Logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _message: &str) {}

    fn info(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}

    fn error(&self, _message: &str) {}

    fn fatal(&self, _message: &str) {}

    fn panic(&self, _message: &str) {}

    fn with_fields(self: Arc<Self>, _fields: Fields) -> Arc<dyn Logger> {
        self
    }
}

/// Logger backed by `tracing`.
///
/// Attached fields are rendered as one `fields` value on every event.
/// `fatal` is emitted at error level with `fatal = true`.
///
/// # Examples
///
/// ```
/// use blackbeard::logger::{Fields, Logger, TracingLogger};
/// use std::sync::Arc;
///
/// let logger = Arc::new(TracingLogger::new())
///     .with_fields(Fields::from([("service".to_string(), "billing".into())]));
/// logger.info("ready");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    fields: Fields,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    fn merged(&self, fields: Fields) -> TracingLogger {
        let mut merged = self.fields.clone();
        merged.extend(fields);
        TracingLogger { fields: merged }
    }

    fn rendered_fields(&self) -> String {
        if self.fields.is_empty() {
            return String::new();
        }
        serde_json::to_string(&self.fields).unwrap_or_default()
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(fields = %self.rendered_fields(), "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(fields = %self.rendered_fields(), "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(fields = %self.rendered_fields(), "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(fields = %self.rendered_fields(), "{}", message);
    }

    fn fatal(&self, message: &str) {
        tracing::error!(fields = %self.rendered_fields(), fatal = true, "{}", message);
    }

    fn panic(&self, message: &str) {
        tracing::error!(fields = %self.rendered_fields(), "{}", message);
        panic!("{}", message)
    }

    fn with_fields(self: Arc<Self>, fields: Fields) -> Arc<dyn Logger> {
        Arc::new(self.merged(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_logger_merges_fields() {
        let base = TracingLogger::new().merged(Fields::from([
            ("a".to_string(), Value::from(1)),
            ("b".to_string(), Value::from(1)),
        ]));
        let merged = base.merged(Fields::from([("b".to_string(), Value::from(2))]));

        assert_eq!(merged.rendered_fields(), r#"{"a":1,"b":2}"#);
        assert_eq!(base.rendered_fields(), r#"{"a":1,"b":1}"#);
        assert_eq!(TracingLogger::new().rendered_fields(), "");
    }

    #[test]
    fn test_with_fields_returns_usable_logger() {
        let logger = Arc::new(TracingLogger::new()).with_fields(Fields::from([("k".to_string(), Value::from("v"))]));
        logger.info("with fields");
        logger.with_fields(Fields::new()).debug("nested");
    }

    #[test]
    fn test_noop_logger_is_silent() {
        let logger: Arc<dyn Logger> = Arc::new(NoopLogger);
        logger.debug("nothing");
        logger.fatal("still nothing");
        logger.panic("not even this");
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn test_panic_panics() {
        TracingLogger::new().panic("boom");
    }
}
