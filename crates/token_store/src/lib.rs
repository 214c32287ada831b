//! Persistence for the single bearer token the client keeps between runs.

mod claims;
mod error;
mod paths;
mod store;

pub use claims::{decode_claims, TokenClaims};
pub use error::TokenStoreError;
pub use paths::{default_token_path, TOKEN_DIR, TOKEN_FILE};
pub use store::{StoredToken, TokenStore};
