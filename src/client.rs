//! The configurable REST client.
//!
//! The [`Client`] type is the main entry point for making calls. Use
//! [`ClientBuilder`] to configure and create clients.

use crate::{
    body::{EncodedBody, MultipartBody},
    cache::{fingerprint, CacheConfig, ResponseCache},
    headers::{self, HeaderSource, JSON_CONTENT, TRACE_ID_HEADER},
    logger::{Logger, NoopLogger},
    metadata::RequestMetadata,
    query::{self, Query},
    uri, Error, Response, Result,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Environment variable read by [`ClientBuilder::base_path_from_env`].
pub const BASE_PATH_ENV: &str = "BASE_PATH";

/// Configuration shared by every call of a [`Client`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    base_path: String,
    port: u16,
    version: Option<String>,
    service: Option<String>,
    headers: HeaderMap,
    timeout: Option<Duration>,
    api_key: Option<String>,
}

impl ClientConfig {
    /// The base path, without trailing separators.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// The port, or zero when none is set.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The transport timeout. `None` means calls never time out.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// The prefix every call path is appended to:
    /// `base[:port]/[version/][service/]`.
    pub fn full_path(&self) -> String {
        uri::compose_prefix(
            &self.base_path,
            self.port,
            self.version.as_deref(),
            self.service.as_deref(),
        )
    }
}

/// A client for one REST service.
///
/// The client is immutable once built and cheap to clone. Clones and derived
/// clients share the connection pool and the response cache, so one client
/// can serve many concurrent tasks.
///
/// # Examples
///
/// ```no_run
/// use blackbeard::{extract_paginated, Client, Query};
/// use serde::{Deserialize, Serialize};
/// use std::time::Duration;
///
/// #[derive(Serialize)]
/// struct NewPost { title: String }
///
/// #[derive(Deserialize)]
/// struct Post { id: u64, title: String }
///
/// # async fn example() -> Result<(), blackbeard::Error> {
/// let client = Client::builder()
///     .base_path("https://api.example.com")
///     .version("v1")
///     .service("blog")
///     .auth_header("Bearer my-token")?
///     .timeout(Duration::from_secs(30))
///     .cache()
///     .build()?;
///
/// // GET https://api.example.com/v1/blog/posts?limit=10
/// let response = client.get("/posts", Some(&Query::from([("limit", "10")]))).await?;
/// let posts: Vec<Post> = extract_paginated(&response)?;
///
/// let created = client.post("/posts", &NewPost { title: "Hello".to_string() }).await?;
/// let post: Post = created.json()?;
/// println!("Created post {} ({})", post.id, post.title);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    config: ClientConfig,
    cache: Option<Arc<ResponseCache>>,
    logger: Arc<dyn Logger>,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Returns a builder pre-filled with this client's configuration.
    ///
    /// A client built from it shares this client's transport and cache.
    pub fn to_builder(&self) -> ClientBuilder {
        ClientBuilder {
            config: self.inner.config.clone(),
            cache: self.inner.cache.clone(),
            logger: self.inner.logger.clone(),
            transport: Some(self.inner.http_client.clone()),
        }
    }

    /// Derives a client carrying the authorization header of `source`.
    ///
    /// Typical use is inside a server handler: the inbound request's
    /// credentials are forwarded to downstream services. A source without
    /// headers yields an identical client.
    ///
    /// # Errors
    ///
    /// Returns an error if the inherited value is not a valid header value.
    pub fn inheriting(&self, source: &impl HeaderSource) -> Result<Client> {
        self.to_builder().inherit_from(source)?.build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The prefix every call path is appended to.
    pub fn full_path(&self) -> String {
        self.inner.config.full_path()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.config.headers()
    }

    /// The response cache, when caching is enabled.
    pub fn cache(&self) -> Option<&ResponseCache> {
        self.inner.cache.as_deref()
    }

    /// Executes one call.
    ///
    /// The cache is consulted first; on a miss the body is encoded, the
    /// endpoint composed, query and headers attached, and the request sent
    /// once. Any received status is returned as `Ok`. Transport failures are
    /// returned as [`Error::Network`] or [`Error::Timeout`] and are never
    /// cached.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use blackbeard::{metadata::RequestMetadata, Client};
    /// use http::Method;
    ///
    /// # async fn example() -> Result<(), blackbeard::Error> {
    /// let client = Client::builder().base_path("https://api.example.com").build()?;
    ///
    /// let metadata = RequestMetadata::new(Method::POST, "/search")
    ///     .with_query_param("page", "2")
    ///     .with_json(&serde_json::json!({"q": "rust"}))?;
    ///
    /// let response = client.call(metadata).await?;
    /// println!("{}", response.text());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call(&self, metadata: RequestMetadata) -> Result<Response> {
        let inner = &self.inner;
        let params = metadata.query();

        let key = inner
            .cache
            .as_ref()
            .map(|_| fingerprint(&metadata.method, &metadata.path, &metadata.payload.identity(), params));

        if let (Some(cache), Some(key)) = (&inner.cache, &key) {
            if let Some(response) = cache.lookup(key) {
                inner
                    .logger
                    .debug(&format!("Cached response for [{}] {}", metadata.method, metadata.path));
                return Ok(response);
            }
        }

        let body = metadata.payload.encode().await?;
        let content_type = body.as_ref().and_then(EncodedBody::content_type);

        let mut endpoint = Url::parse(&uri::join(&inner.config.full_path(), &metadata.path))?;
        query::apply(&mut endpoint, params, inner.config.api_key());

        let headers = headers::resolve(&inner.config.headers, body.is_some(), content_type.as_deref())?;

        inner
            .logger
            .debug(&format!("Executing [{}] {}", metadata.method, endpoint.path()));

        let mut request = inner.http_client.request(metadata.method.clone(), endpoint);

        request = match body {
            Some(EncodedBody::Bytes(bytes)) => request.body(bytes),
            Some(EncodedBody::Form(form)) => request.multipart(form),
            None => request,
        };

        // Replaces the content type the form attached with the resolved one.
        request = request.headers(headers);

        if let Some(timeout) = inner.config.timeout {
            request = request.timeout(timeout);
        }

        let start_time = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.transport_failure(&metadata, e)),
        };

        let status = response.status();
        let response_headers = response.headers().clone();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return Err(self.transport_failure(&metadata, e)),
        };

        let response = Response::new(status, response_headers, body, start_time.elapsed());

        inner.logger.info(&format!(
            "Received {} for [{}] {} in {}ms",
            status.as_u16(),
            metadata.method,
            metadata.path,
            response.latency().as_millis()
        ));

        if let (Some(cache), Some(key)) = (&inner.cache, key) {
            if cache.store(key, &response) {
                inner
                    .logger
                    .debug(&format!("Cached [{}] {}", metadata.method, metadata.path));
            }
        }

        Ok(response)
    }

    fn transport_failure(&self, metadata: &RequestMetadata, error: reqwest::Error) -> Error {
        let error = Error::from_transport(error);
        self.inner.logger.warn(&format!(
            "Request failed for [{}] {}: {}",
            metadata.method, metadata.path, error
        ));
        error
    }

    /// Makes a GET request.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use blackbeard::{Client, Query};
    ///
    /// # async fn example() -> Result<(), blackbeard::Error> {
    /// let client = Client::builder().base_path("https://api.example.com").build()?;
    ///
    /// let all = client.get("/posts", None).await?;
    /// let page = client.get("/posts", Some(&Query::from([("skip", "10")]))).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get(&self, path: impl Into<String>, query: Option<&Query>) -> Result<Response> {
        let mut metadata = RequestMetadata::new(Method::GET, path);
        if let Some(query) = query {
            metadata = metadata.with_query(query);
        }
        self.call(metadata).await
    }

    /// Makes a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] without touching the network
    /// if `body` cannot be serialized.
    pub async fn post<B>(&self, path: impl Into<String>, body: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        self.call(RequestMetadata::new(Method::POST, path).with_json(body)?).await
    }

    /// Makes a PUT request with a JSON body.
    pub async fn put<B>(&self, path: impl Into<String>, body: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        self.call(RequestMetadata::new(Method::PUT, path).with_json(body)?).await
    }

    /// Makes a DELETE request.
    ///
    /// Pass `&()` to send no body.
    pub async fn delete<B>(&self, path: impl Into<String>, body: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        self.call(RequestMetadata::new(Method::DELETE, path).with_json(body)?).await
    }

    /// Makes a multipart/form-data POST request.
    ///
    /// The boundary content type applies to this request only; the client's
    /// configured headers are left as they are.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use blackbeard::{Client, MultipartBody};
    ///
    /// # async fn example() -> Result<(), blackbeard::Error> {
    /// let client = Client::builder().base_path("https://api.example.com").build()?;
    ///
    /// let body = MultipartBody::new()
    ///     .param("album", "holidays")
    ///     .file("photo", "/tmp/beach.jpg");
    ///
    /// let response = client.multipart("/uploads", &body, None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn multipart(
        &self,
        path: impl Into<String>,
        body: &MultipartBody,
        query: Option<&Query>,
    ) -> Result<Response> {
        let mut metadata = RequestMetadata::new(Method::POST, path).with_payload(body.clone());
        if let Some(query) = query {
            metadata = metadata.with_query(query);
        }
        self.call(metadata).await
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// Every setter overrides the previous value for the same setting.
///
/// # Examples
///
/// ```no_run
/// use blackbeard::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), blackbeard::Error> {
/// let client = ClientBuilder::new()
///     .base_path("http://localhost")
///     .port(3000)
///     .service("billing")
///     .api_key("my-key")
///     .header("User-Agent", "my-app/1.0")?
///     .timeout(Duration::from_secs(5))
///     .build()?;
///
/// assert_eq!(client.full_path(), "http://localhost:3000/billing/");
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    config: ClientConfig,
    cache: Option<Arc<ResponseCache>>,
    logger: Arc<dyn Logger>,
    transport: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            cache: None,
            logger: Arc::new(NoopLogger),
            transport: None,
        }
    }

    /// Sets the base path. Trailing separators are dropped.
    ///
    /// The value is not validated here; a malformed base path surfaces as
    /// [`Error::InvalidUrl`] when a call is made.
    pub fn base_path(mut self, path: impl AsRef<str>) -> Self {
        self.config.base_path = uri::normalize_base_path(path.as_ref());
        self
    }

    /// Sets the base path from the `BASE_PATH` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or not valid unicode.
    pub fn base_path_from_env(self) -> Result<Self> {
        self.base_path_from_env_var(BASE_PATH_ENV)
    }

    /// Sets the base path from the named environment variable.
    pub fn base_path_from_env_var(self, name: &str) -> Result<Self> {
        let path = std::env::var(name)
            .map_err(|e| Error::ConfigurationError(format!("Cannot read {}: {}", name, e)))?;
        Ok(self.base_path(path))
    }

    /// Sets the port. Zero omits the port from the URL.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the API version segment. An empty string clears it.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = Some(version.into()).filter(|v| !v.is_empty());
        self
    }

    /// Sets the target service segment. An empty string clears it.
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.config.service = Some(service.into()).filter(|s| !s.is_empty());
        self
    }

    /// Replaces the whole header set.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.config.headers = headers;
        self
    }

    /// Sets a header, replacing every value it had.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let (name, value) = headers::parse_header(name.as_ref(), value.as_ref())?;
        self.config.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a value to a header, keeping the values it already had.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn add_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let (name, value) = headers::parse_header(name.as_ref(), value.as_ref())?;
        self.config.headers.append(name, value);
        Ok(self)
    }

    /// Sets the authorization header to exactly `token`.
    ///
    /// Include the scheme yourself, e.g. `"Bearer abc"`.
    pub fn auth_header(mut self, token: impl AsRef<str>) -> Result<Self> {
        self.config
            .headers
            .insert(AUTHORIZATION, headers::parse_value(token.as_ref())?);
        Ok(self)
    }

    /// Copies the authorization header of `source`, if it has any headers.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackbeard::Client;
    /// use http::HeaderMap;
    ///
    /// # fn example() -> Result<(), blackbeard::Error> {
    /// let mut inbound = HeaderMap::new();
    /// inbound.insert("authorization", "Bearer T".parse().unwrap());
    ///
    /// let client = Client::builder()
    ///     .base_path("http://localhost")
    ///     .inherit_from(&inbound)?
    ///     .build()?;
    ///
    /// assert_eq!(client.headers()["authorization"], "Bearer T");
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    pub fn inherit_from(mut self, source: &impl HeaderSource) -> Result<Self> {
        headers::inherit_authorization(&mut self.config.headers, source)?;
        Ok(self)
    }

    /// Sets the content type sent with every body.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Result<Self> {
        self.config
            .headers
            .insert(CONTENT_TYPE, headers::parse_value(content_type.as_ref())?);
        Ok(self)
    }

    /// Sets the content type to `application/json`.
    pub fn json_content(mut self) -> Self {
        self.config
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT));
        self
    }

    /// Sets the `x-trace-id` header.
    pub fn trace_id(mut self, id: impl AsRef<str>) -> Result<Self> {
        self.config
            .headers
            .insert(TRACE_ID_HEADER, headers::parse_value(id.as_ref())?);
        Ok(self)
    }

    /// Sets the request timeout. A zero duration disables the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout).filter(|t| !t.is_zero());
        self
    }

    /// Sets an API key sent as the `key` query parameter on every call.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into()).filter(|k| !k.is_empty());
        self
    }

    /// Enables response caching with the default [`CacheConfig`].
    pub fn cache(self) -> Self {
        self.cache_config(CacheConfig::default())
    }

    /// Enables response caching with the given configuration.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use blackbeard::{cache::CacheConfig, Client};
    /// use std::time::Duration;
    ///
    /// # fn example() -> Result<(), blackbeard::Error> {
    /// let client = Client::builder()
    ///     .base_path("https://api.example.com")
    ///     .cache_config(CacheConfig::builder()
    ///         .capacity(500)
    ///         .ttl(Duration::from_secs(300))
    ///         .build())
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache = Some(Arc::new(ResponseCache::new(config)));
        self
    }

    /// Attaches a logger. Defaults to [`NoopLogger`].
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be initialized.
    pub fn build(self) -> Result<Client> {
        let http_client = match self.transport {
            Some(client) => client,
            None => reqwest::Client::builder().build().map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?,
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                config: self.config,
                cache: self.cache,
                logger: self.logger,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
