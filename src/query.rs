//! Query parameters.

use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

/// Name of the query parameter carrying the client's API key.
pub const API_KEY_PARAM: &str = "key";

/// Query parameters for one call: each name maps to one or more values.
///
/// Names are kept sorted so the same parameters always serialize the same
/// way, which keeps cache fingerprints stable.
///
/// # Examples
///
/// ```
/// use blackbeard::Query;
///
/// let query = Query::new()
///     .with("tag", "rust")
///     .with("tag", "http")
///     .with("limit", "10");
///
/// assert_eq!(query.get("tag"), Some(&["rust".to_string(), "http".to_string()][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Query {
    params: BTreeMap<String, Vec<String>>,
}

impl Query {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value under `name`, keeping any values already present.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    /// Adds a value under `name`, keeping any values already present.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.entry(name.into()).or_default().push(value.into());
    }

    /// Returns every value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.params.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterates over `(name, value)` pairs, one per value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |value| (name.as_str(), value.as_str())))
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (name, value) in iter {
            query.add(name, value);
        }
        query
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Query
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Appends `query` and the API key to the endpoint.
///
/// Pairs already present on `endpoint` are preserved. The API key goes last.
pub(crate) fn apply(endpoint: &mut Url, query: Option<&Query>, api_key: Option<&str>) {
    let extra = query.map(|q| !q.is_empty()).unwrap_or(false);
    if !extra && api_key.is_none() {
        return;
    }

    let mut pairs = endpoint.query_pairs_mut();
    if let Some(query) = query {
        for (name, value) in query.pairs() {
            pairs.append_pair(name, value);
        }
    }
    if let Some(key) = api_key {
        pairs.append_pair(API_KEY_PARAM, key);
    }
}
