use chrono::{FixedOffset, Local, Offset};
use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SETTINGS_PATH: &str = "data/settings.json";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_RECONCILE_DELAY: Duration = Duration::from_millis(2000);

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub settings_path: PathBuf,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub reconcile_delay: Duration,
    /// Zone used to show timestamps as calendar dates.
    pub display_offset: FixedOffset,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            settings_path: PathBuf::from(DEFAULT_SETTINGS_PATH),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            reconcile_delay: DEFAULT_RECONCILE_DELAY,
            display_offset: local_offset(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            port: non_empty("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(defaults.port),
            settings_path: resolve_settings_path(non_empty("APP_SETTINGS_PATH")),
            gemini_api_key: non_empty("API_KEY").or_else(|| non_empty("GEMINI_API_KEY")),
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: non_empty("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gemini_base_url),
            reconcile_delay: non_empty("RECONCILE_DELAY_MS")
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.reconcile_delay),
            display_offset: non_empty("DISPLAY_UTC_OFFSET_MINUTES")
                .and_then(|value| value.trim().parse::<i32>().ok())
                .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
                .unwrap_or(defaults.display_offset),
        }
    }
}

pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

pub fn resolve_settings_path(explicit: Option<String>) -> PathBuf {
    match explicit {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(DEFAULT_SETTINGS_PATH),
    }
}
