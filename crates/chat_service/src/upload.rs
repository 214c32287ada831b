use std::path::Path;

use crate::error::ServiceError;

/// Extensions the document service indexes.
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["pdf", "docx"];

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// File contents staged for the multipart upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    /// Validates the extension before building the upload.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ServiceError> {
        let file_name = file_name.into();
        let extension = extension_of(&file_name).ok_or_else(|| {
            ServiceError::invalid_input(format!(
                "'{file_name}' has no extension; expected one of: .pdf, .docx"
            ))
        })?;
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ServiceError::invalid_input(format!(
                "unsupported file type '.{extension}'; expected one of: .pdf, .docx"
            )));
        }

        Ok(Self {
            content_type: content_type_for(&extension).to_string(),
            file_name,
            bytes,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, ServiceError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ServiceError::invalid_input(format!("'{}' is not a file path", path.display()))
            })?
            .to_string();
        // Reject the extension before touching the filesystem.
        Self::new(file_name.clone(), Vec::new())?;

        let bytes = std::fs::read(path).map_err(|error| {
            ServiceError::invalid_input(format!("failed to read {}: {error}", path.display()))
        })?;
        Self::new(file_name, bytes)
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|extension| !extension.is_empty())
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "docx" => DOCX_MIME,
        _ => "application/octet-stream",
    }
}
