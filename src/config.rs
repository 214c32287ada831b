//! Environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Which backend the service seams are bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceKind {
    #[default]
    Http,
    Mock,
}

impl ServiceKind {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "http" => Some(Self::Http),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Mock => "mock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub api_url: String,
    pub service: ServiceKind,
    /// Explicit token file; the platform default is used when unset.
    pub token_path: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
    /// Values that were set but ignored. Reported once logging is up.
    pub warnings: Vec<String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            service: ServiceKind::default(),
            token_path: None,
            timeout: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_file: None,
            warnings: Vec::new(),
        }
    }
}

impl EnvConfig {
    pub fn from_env() -> Self {
        let mut warnings = Vec::new();

        let service = match env_string_opt("DOCCHAT_SERVICE") {
            Some(raw) => ServiceKind::parse(&raw).unwrap_or_else(|| {
                warnings.push(format!(
                    "ignoring DOCCHAT_SERVICE={raw:?}; expected \"http\" or \"mock\""
                ));
                ServiceKind::default()
            }),
            None => ServiceKind::default(),
        };

        let timeout = env_string_opt("DOCCHAT_TIMEOUT_SEC").and_then(|raw| {
            match raw.trim().parse::<u64>() {
                Ok(seconds) if seconds > 0 => Some(Duration::from_secs(seconds)),
                _ => {
                    warnings.push(format!(
                        "ignoring DOCCHAT_TIMEOUT_SEC={raw:?}; expected a positive number of seconds"
                    ));
                    None
                }
            }
        });

        Self {
            api_url: env_string_opt("DOCCHAT_API_URL")
                .map(|value| value.trim().to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            service,
            token_path: env_string_opt("DOCCHAT_TOKEN_PATH").map(PathBuf::from),
            timeout,
            log_filter: env_string_opt("DOCCHAT_LOG")
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            log_file: env_string_opt("DOCCHAT_LOG_FILE").map(PathBuf::from),
            warnings,
        }
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
