use std::time::Duration;

use crate::feed::cursor::CursorMode;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub cursor_mode: CursorMode,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cursor_mode: CursorMode::default(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Unparseable values keep their defaults.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(base) = get("HERB_API_URL") {
            cfg.base_url = base;
        }
        if let Some(timeout) = get("HERB_TIMEOUT_SECS") {
            // zero would fail every request
            if let Some(parsed) = timeout.parse::<u64>().ok().filter(|&secs| secs > 0) {
                cfg.timeout = Duration::from_secs(parsed);
            }
        }
        if let Some(mode) = get("HERB_CURSOR_MODE") {
            if let Ok(parsed) = mode.parse::<CursorMode>() {
                cfg.cursor_mode = parsed;
            }
        }
        cfg
    }

    /// CLI flags win over the environment.
    pub fn with_overrides(mut self, base_url: Option<String>, cursor_mode: Option<CursorMode>) -> Self {
        if let Some(base) = base_url { self.base_url = base; }
        if let Some(mode) = cursor_mode { self.cursor_mode = mode; }
        self
    }
}
