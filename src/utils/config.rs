use std::path::PathBuf;

const ENV_API_BASE: &str = "STUDYFLOW_API_BASE";
const ENV_DATA_DIR: &str = "STUDYFLOW_DATA_DIR";
const ENV_REFRESH_SECS: &str = "STUDYFLOW_REFRESH_SECS";
const ENV_HTTP_TIMEOUT_SECS: &str = "STUDYFLOW_HTTP_TIMEOUT_SECS";

pub const DEFAULT_API_BASE: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub data_dir: PathBuf,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            data_dir: default_data_dir(),
            refresh_interval_secs: 60,
            request_timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        apply_env_overrides(&mut config);
        config
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

pub fn apply_env_overrides(config: &mut ClientConfig) {
    if let Some(base) = env_trimmed(ENV_API_BASE) {
        config.api_base = base.trim_end_matches('/').to_string();
    }
    if let Some(dir) = env_trimmed(ENV_DATA_DIR) {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(secs) = env_trimmed(ENV_REFRESH_SECS).and_then(|v| v.parse().ok()) {
        config.refresh_interval_secs = secs;
    }
    if let Some(secs) = env_trimmed(ENV_HTTP_TIMEOUT_SECS).and_then(|v| v.parse().ok()) {
        config.request_timeout_secs = secs;
    }
}

fn env_trimmed(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studyflow")
}
