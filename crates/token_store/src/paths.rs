use std::path::{Path, PathBuf};

use crate::error::TokenStoreError;

pub const TOKEN_DIR: &str = "docchat";
pub const TOKEN_FILE: &str = "token.json";

/// `<config_dir>/docchat/token.json` for the current platform.
pub fn default_token_path() -> Result<PathBuf, TokenStoreError> {
    dirs::config_dir()
        .map(|dir| token_path_under(&dir))
        .ok_or(TokenStoreError::NoConfigDir)
}

#[must_use]
pub(crate) fn token_path_under(config_dir: &Path) -> PathBuf {
    config_dir.join(TOKEN_DIR).join(TOKEN_FILE)
}

/// Sibling temp file used for the atomic write of `path`.
#[must_use]
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| TOKEN_FILE.to_owned());
    path.with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{temp_path_for, token_path_under};

    #[test]
    fn token_path_nests_under_app_dir() {
        assert_eq!(
            token_path_under(Path::new("/home/ada/.config")),
            Path::new("/home/ada/.config/docchat/token.json")
        );
    }

    #[test]
    fn temp_path_is_hidden_sibling() {
        let temp = temp_path_for(Path::new("/tmp/x/token.json"));
        assert_eq!(temp.parent(), Some(Path::new("/tmp/x")));
        let name = temp
            .file_name()
            .and_then(|name| name.to_str())
            .expect("utf-8 name");
        assert!(name.starts_with(".token.json."));
        assert!(name.ends_with(".tmp"));
    }
}
