use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Search centre latitude, kept as the operator typed it so the search
    /// URL round-trips exactly.
    pub latitude: String,
    pub longitude: String,
    pub output_dir: PathBuf,
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub zoom: u8,
    pub navigation_timeout_secs: u64,
    pub selector_timeout_secs: u64,
    pub network_idle_ms: u64,
    pub settle_interval_ms: u64,
    pub settle_max_ms: u64,
    pub max_scroll_iterations: u32,
    pub item_timeout_secs: u64,
    /// `0` disables the whole-run deadline.
    pub run_timeout_secs: u64,
    pub item_max_retries: u32,
}
