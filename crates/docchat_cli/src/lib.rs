//! Line-oriented terminal client for the document chat assistant.
//!
//! ## Backend selection
//!
//! `DOCCHAT_SERVICE=http` (default) talks to the REST API at
//! `DOCCHAT_API_URL`; `DOCCHAT_SERVICE=mock` runs against an in-memory
//! backend for local tries and tests.
//!
//! The bearer token persists at `DOCCHAT_TOKEN_PATH`, or under the platform
//! config directory when unset. Logs go to stderr unless `DOCCHAT_LOG_FILE`
//! is set; `DOCCHAT_LOG` takes an env-filter directive.

pub mod app;
pub mod commands;
pub mod services;
pub mod terminal;
