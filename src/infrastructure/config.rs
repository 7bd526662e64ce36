use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_FILE: &str = "config/dashboard";
const ENV_PREFIX: &str = "NETCHECK";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub brush: BrushSettings,
    #[serde(default)]
    pub ui: UiSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub history_limit: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RefreshSettings {
    pub interval_secs: u64,
    pub poll_attempts: u32,
    pub poll_interval_secs: u64,
    pub completion_message_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BrushSettings {
    pub lookback_hours: i64,
    pub minimum_width_pct: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UiSettings {
    pub snapshot_path: PathBuf,
    pub log_file: PathBuf,
    pub log_filter: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            history_limit: 50,
            timeout_secs: 10,
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            poll_attempts: 6,
            poll_interval_secs: 10,
            completion_message_secs: 5,
        }
    }
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            lookback_hours: 6,
            minimum_width_pct: 1.0,
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("netcheck-snapshot.html"),
            log_file: PathBuf::from("netcheck-dashboard.log"),
            log_filter: "info".to_string(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RefreshSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn completion_message(&self) -> Duration {
        Duration::from_secs(self.completion_message_secs)
    }
}

impl BrushSettings {
    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::hours(self.lookback_hours)
    }
}

/// Defaults, then `config/dashboard.{toml,...}` if present, then
/// `NETCHECK__SECTION__KEY` environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_with(environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn load_settings_with(environment: config::Environment) -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::Config::try_from(&Settings::default())?)
        .add_source(config::File::with_name(CONFIG_FILE).required(false))
        .add_source(environment)
        .build()?;

    Ok(settings.try_deserialize()?)
}
