use serde::Deserialize;
use service_core::config::{self as core_config, get_env, get_optional_env, parse_env};
use service_core::error::AppError;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_VLM_MODEL: &str = "bakllava";

/// CPU-bound inference is slow; this is a ceiling, not a retry budget.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 90;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Base64 camera frames routinely exceed axum's 2MB default body limit.
const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub vlm: VlmConfig,
    pub static_dir: PathBuf,
    pub max_body_bytes: usize,
    pub otlp_endpoint: Option<String>,
}

/// Where the upstream inference service lives and how long to wait for it.
#[derive(Debug, Clone, Deserialize)]
pub struct VlmConfig {
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
    pub probe_timeout_secs: u64,
}

impl VlmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for VlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_VLM_MODEL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = core_config::is_production();

        let request_timeout = get_env(
            "VLM_REQUEST_TIMEOUT_SECS",
            Some(&DEFAULT_REQUEST_TIMEOUT_SECS.to_string()),
            is_prod,
        )?;
        let probe_timeout = get_env(
            "VLM_PROBE_TIMEOUT_SECS",
            Some(&DEFAULT_PROBE_TIMEOUT_SECS.to_string()),
            is_prod,
        )?;
        let max_body_bytes = get_env(
            "MAX_BODY_BYTES",
            Some(&DEFAULT_MAX_BODY_BYTES.to_string()),
            is_prod,
        )?;

        Ok(RelayConfig {
            common: common_config,
            vlm: VlmConfig {
                base_url: normalize_base_url(&get_env(
                    "OLLAMA_URL",
                    Some(DEFAULT_OLLAMA_URL),
                    is_prod,
                )?),
                model: get_env("VLM_MODEL", Some(DEFAULT_VLM_MODEL), is_prod)?,
                request_timeout_secs: parse_env("VLM_REQUEST_TIMEOUT_SECS", &request_timeout)?,
                probe_timeout_secs: parse_env("VLM_PROBE_TIMEOUT_SECS", &probe_timeout)?,
            },
            static_dir: PathBuf::from(get_env(
                "STATIC_DIR",
                Some(&default_static_dir().to_string_lossy()),
                is_prod,
            )?),
            max_body_bytes: parse_env("MAX_BODY_BYTES", &max_body_bytes)?,
            otlp_endpoint: get_optional_env("OTLP_ENDPOINT"),
        })
    }
}

/// Front-end assets live in `relay-service/static`, whether the binary runs
/// from the crate directory or from the workspace root.
fn default_static_dir() -> PathBuf {
    env::current_dir()
        .map(|base| resolve_static_dir(&base))
        .unwrap_or_else(|_| PathBuf::from("relay-service").join("static"))
}

fn resolve_static_dir(base: &Path) -> PathBuf {
    if base.ends_with("relay-service") {
        base.join("static")
    } else {
        base.join("relay-service").join("static")
    }
}

/// Endpoint paths are appended with a leading slash.
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
