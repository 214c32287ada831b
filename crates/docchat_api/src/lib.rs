//! Transport-only client primitives for the document chat REST API.
//!
//! This crate owns request building, header construction, and response/error
//! parsing for the chat, document, and auth endpoints. It holds no session
//! state and no token persistence; callers pass the bearer token in
//! [`ApiConfig`].

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod headers;
pub mod payload;
pub mod url;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use endpoint::Endpoint;
pub use error::ApiError;
pub use crate::url::{endpoint_url, normalize_base_url, DEFAULT_BASE_URL};
