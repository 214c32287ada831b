use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::claims::{decode_claims, TokenClaims};
use crate::error::TokenStoreError;
use crate::paths::{default_token_path, temp_path_for};

/// On-disk record of the persisted token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// RFC3339 UTC time the token was written.
    #[serde(default)]
    pub saved_at: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

impl StoredToken {
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            saved_at: None,
        }
    }

    #[must_use]
    pub fn claims(&self) -> Option<TokenClaims> {
        decode_claims(&self.access_token)
    }

    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.claims()
            .is_some_and(|claims| claims.is_expired_at(now))
    }
}

/// Single-slot token file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default_location() -> Result<Self, TokenStoreError> {
        default_token_path().map(Self::new)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when no token has been saved.
    pub fn load(&self) -> Result<Option<StoredToken>, TokenStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(TokenStoreError::io("reading token file", &self.path, source))
            }
        };

        let token = serde_json::from_str::<StoredToken>(&raw)
            .map_err(|source| TokenStoreError::json_parse(&self.path, source))?;
        if token.access_token.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(token))
    }

    /// Replace the stored token. The file is written to a sibling temp file
    /// and renamed into place, so readers never see a partial write.
    pub fn save(&self, access_token: &str, token_type: &str) -> Result<StoredToken, TokenStoreError> {
        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(TokenStoreError::BlankToken);
        }

        let saved_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(TokenStoreError::ClockFormat)?;
        let token_type = token_type.trim();
        let record = StoredToken {
            access_token: access_token.to_owned(),
            token_type: if token_type.is_empty() {
                default_token_type()
            } else {
                token_type.to_owned()
            },
            saved_at: Some(saved_at),
        };

        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .ok_or_else(|| TokenStoreError::NoParentDir {
                path: self.path.clone(),
            })?;
        fs::create_dir_all(parent)
            .map_err(|source| TokenStoreError::io("creating token directory", parent, source))?;

        let body = serde_json::to_vec_pretty(&record)
            .map_err(|source| TokenStoreError::json_serialize(&self.path, source))?;

        let temp_path = temp_path_for(&self.path);
        let written = write_private_file(&temp_path, &body).and_then(|()| {
            fs::rename(&temp_path, &self.path).map_err(|source| {
                TokenStoreError::io("renaming token file into place", &self.path, source)
            })
        });
        if written.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        written?;

        Ok(record)
    }

    /// Remove the stored token. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool, TokenStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(TokenStoreError::io("removing token file", &self.path, source)),
        }
    }
}

fn write_private_file(path: &Path, body: &[u8]) -> Result<(), TokenStoreError> {
    let mut file = open_private(path)
        .map_err(|source| TokenStoreError::io("creating token temp file", path, source))?;
    file.write_all(body)
        .and_then(|()| file.sync_all())
        .map_err(|source| TokenStoreError::io("writing token temp file", path, source))
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}
