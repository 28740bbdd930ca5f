//! # Blackbeard - a configurable JSON REST client
//!
//! Blackbeard builds one reusable client per target service: base path,
//! port, API version, service segment, headers, timeout and API key are set
//! once, and every call only names its own path. Responses are buffered and
//! returned as-is; decoding is a separate step with helpers for paginated
//! lists and structured service errors.
//!
//! ## Quick Start
//!
//! ```no_run
//! use blackbeard::{extract_first_paginated, extract_paginated, Client};
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Serialize)]
//! struct CreateUser {
//!     name: String,
//!     email: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), blackbeard::Error> {
//!     let client = Client::builder()
//!         .base_path("https://api.example.com")
//!         .version("v2")
//!         .service("accounts")
//!         .auth_header("Bearer my-token")?
//!         .timeout(Duration::from_secs(30))
//!         .build()?;
//!
//!     // GET https://api.example.com/v2/accounts/users
//!     let response = client.get("/users", None).await?;
//!     let users: Vec<User> = extract_paginated(&response)?;
//!     println!("{} users", users.len());
//!
//!     let new_user = CreateUser {
//!         name: "Alice".to_string(),
//!         email: "alice@example.com".to_string(),
//!     };
//!     let created = client.post("/users", &new_user).await?;
//!     let user: User = created.json()?;
//!     println!("Created user {} with ID {}", user.name, user.id);
//!
//!     let first: User = extract_first_paginated(&client.get("/users", None).await?)?;
//!     println!("First user: {}", first.name);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Endpoint composition** - `base[:port]/[version/][service/]path`
//! - **Header inheritance** - forward the authorization of an inbound request
//!   to downstream services with [`Client::inheriting`]
//! - **JSON and multipart bodies** - any `Serialize` value, raw bytes, or
//!   files and form fields through [`MultipartBody`]
//! - **Optional response cache** - bounded, lock-guarded, keyed by a request
//!   fingerprint
//! - **Decoding helpers** - paginated lists and structured [`ErrorResponse`]s
//! - **Pluggable logging** - inject any [`logger::Logger`]; silent by default
//!
//! ## Error Handling
//!
//! A received response is never an error by itself. The extraction helpers
//! validate the status and surface the service's error body:
//!
//! ```no_run
//! use blackbeard::{extract_paginated, Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().base_path("https://api.example.com").build()?;
//! let response = client.get("/endpoint", None).await?;
//! match extract_paginated::<serde_json::Value>(&response) {
//!     Ok(records) => println!("Got {} records", records.len()),
//!     Err(Error::Api(remote)) => eprintln!("Service error {}: {}", remote.code, remote.message),
//!     Err(Error::InvalidTarget(reason)) => eprintln!("Unexpected shape: {}", reason),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod body;
pub mod cache;
mod client;
mod decode;
mod error;
pub mod headers;
pub mod logger;
pub mod metadata;
mod query;
mod response;
mod uri;

pub use body::{MultipartBody, Payload};
pub use client::{Client, ClientBuilder, ClientConfig, BASE_PATH_ENV};
pub use decode::{
    body_to_value, decode_into, extract_first_paginated, extract_page, extract_paginated, parse_error,
    ErrorResponse, PaginatedResponse,
};
pub use error::{Error, Result};
pub use query::{Query, API_KEY_PARAM};
pub use response::Response;
