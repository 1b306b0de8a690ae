//! Process configuration from environment variables.

use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_MODEL_DIR: &str = "models";
pub const DEFAULT_STAGING_DIR: &str = "files";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: String,
    /// Directory holding the demand model artifacts.
    pub model_dir: PathBuf,
    /// Uploaded files are staged under `<staging_dir>/<run_id>/`.
    pub staging_dir: PathBuf,
    /// Reports are written under `<output_dir>/<run_id>/`.
    pub output_dir: PathBuf,
    /// Browser origin allowed by CORS.
    pub allowed_origin: String,
    pub max_upload_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl ApiConfig {
    /// Read `STOCKWISE_*` variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: env_or("STOCKWISE_BIND", defaults.bind_addr),
            model_dir: env_or("STOCKWISE_MODEL_DIR", DEFAULT_MODEL_DIR.to_string()).into(),
            staging_dir: env_or("STOCKWISE_STAGING_DIR", DEFAULT_STAGING_DIR.to_string()).into(),
            output_dir: env_or("STOCKWISE_OUTPUT_DIR", DEFAULT_OUTPUT_DIR.to_string()).into(),
            allowed_origin: env_or("STOCKWISE_ALLOWED_ORIGIN", defaults.allowed_origin),
            max_upload_bytes: upload_limit_bytes(std::env::var("STOCKWISE_MAX_UPLOAD_MB").ok().as_deref()),
        }
    }
}

/// Upload cap in bytes from a megabyte count; unset, unparsable or
/// overflowing values fall back to [`DEFAULT_MAX_UPLOAD_MB`].
fn upload_limit_bytes(raw: Option<&str>) -> usize {
    let default = DEFAULT_MAX_UPLOAD_MB * 1024 * 1024;
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<usize>() {
        Ok(mb) => mb.checked_mul(1024 * 1024).unwrap_or_else(|| {
            tracing::warn!(value = %raw, "STOCKWISE_MAX_UPLOAD_MB is too large; using default");
            default
        }),
        Err(_) => {
            tracing::warn!(value = %raw, "STOCKWISE_MAX_UPLOAD_MB is not a number; using default");
            default
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        tracing::debug!(key, default = %default, "not set; using default");
        default
    })
}
