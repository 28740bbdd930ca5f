//! Endpoint composition.

pub(crate) const URI_SEPARATOR: char = '/';

/// Strips every trailing `/` from a base path.
pub(crate) fn normalize_base_path(path: &str) -> String {
    path.trim_end_matches(URI_SEPARATOR).to_string()
}

/// Builds the endpoint prefix shared by every call.
///
/// The result is `base[:port]/[version/][service/]` and always ends in
/// exactly one separator. A zero port and empty segments are omitted.
pub(crate) fn compose_prefix(
    base_path: &str,
    port: u16,
    version: Option<&str>,
    service: Option<&str>,
) -> String {
    let mut uri = base_path.trim_end_matches(URI_SEPARATOR).to_string();

    if port != 0 {
        uri.push(':');
        uri.push_str(&port.to_string());
    }

    uri.push(URI_SEPARATOR);

    for segment in [version, service].into_iter().flatten() {
        if !segment.is_empty() {
            uri.push_str(segment);
            uri.push(URI_SEPARATOR);
        }
    }

    uri
}

/// Appends a call path to a composed prefix.
pub(crate) fn join(prefix: &str, path: &str) -> String {
    format!("{}{}", prefix, path.trim_start_matches(URI_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_separators_are_trimmed() {
        let prefix = compose_prefix("http://localhost///", 0, None, None);
        assert_eq!(join(&prefix, "/x"), "http://localhost/x");
    }

    #[test]
    fn test_port_is_inserted_before_first_separator() {
        let prefix = compose_prefix("http://localhost", 3000, None, None);
        assert_eq!(join(&prefix, "x"), "http://localhost:3000/x");
    }

    #[test]
    fn test_version_precedes_service() {
        let prefix = compose_prefix("http://localhost/", 3000, Some("v1"), Some("svc"));
        assert_eq!(join(&prefix, "/x"), "http://localhost:3000/v1/svc/x");
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let prefix = compose_prefix("http://localhost", 0, Some(""), Some("svc"));
        assert_eq!(prefix, "http://localhost/svc/");
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("https://api.example.com//"), "https://api.example.com");
        assert_eq!(normalize_base_path("https://api.example.com"), "https://api.example.com");
    }
}
