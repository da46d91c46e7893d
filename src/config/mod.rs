// src/config/mod.rs
//! Process configuration: credentials and knobs from the environment, plus the
//! static feed catalog.
//!
//! Missing credentials never fail startup. A missing Telegram pair turns
//! dispatch into a logged no-op; a missing Gist pair makes the state store
//! read as empty and write nothing.

pub mod catalog;

use std::time::Duration;

pub use catalog::Catalog;

// --- env names ---
pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const ENV_TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const ENV_TELEGRAM_API_BASE: &str = "TELEGRAM_API_BASE";
pub const ENV_GIST_TOKEN: &str = "GIST_TOKEN";
pub const ENV_GIST_ID: &str = "GIST_ID";
pub const ENV_GITHUB_API_BASE: &str = "GITHUB_API_BASE";
pub const ENV_STATE_FILE: &str = "BORDERADAR_STATE_FILE";
pub const ENV_POLL_SECS: &str = "BORDERADAR_POLL_SECS";
pub const ENV_MAX_SEEN: &str = "BORDERADAR_MAX_SEEN";

// --- defaults ---
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_STATE_FILE: &str = "borderadar_state.json";
pub const DEFAULT_MAX_SEEN: usize = 5_000;

pub const USER_AGENT: &str = concat!("Borderadar/", env!("CARGO_PKG_VERSION"));

/// Per-run volume limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Entries considered per feed (feed order, newest first in practice).
    pub per_source: usize,
    /// Notifications sent per run.
    pub notify_cap: usize,
    /// Events kept in the persisted history.
    pub max_events: usize,
    /// Seen identifiers kept; `None` means unbounded.
    pub max_seen: Option<usize>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            per_source: 10,
            notify_cap: 3,
            max_events: 200,
            max_seen: Some(DEFAULT_MAX_SEEN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramSettings {
    pub token: String,
    pub chat_id: String,
    pub api_base: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GistSettings {
    pub token: String,
    pub gist_id: String,
    pub api_base: String,
    /// File inside the gist holding the state document.
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub telegram: Option<TelegramSettings>,
    pub gist: Option<GistSettings>,
    pub poll_interval: Option<Duration>,
    pub limits: Limits,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build settings from any key lookup; blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| {
            lookup(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let telegram = match (get(ENV_TELEGRAM_TOKEN), get(ENV_TELEGRAM_CHAT_ID)) {
            (Some(token), Some(chat_id)) => Some(TelegramSettings {
                token,
                chat_id,
                api_base: get(ENV_TELEGRAM_API_BASE)
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            }),
            _ => None,
        };

        let gist = match (get(ENV_GIST_TOKEN), get(ENV_GIST_ID)) {
            (Some(token), Some(gist_id)) => Some(GistSettings {
                token,
                gist_id,
                api_base: get(ENV_GITHUB_API_BASE)
                    .unwrap_or_else(|| DEFAULT_GITHUB_API_BASE.to_string()),
                file_name: get(ENV_STATE_FILE).unwrap_or_else(|| DEFAULT_STATE_FILE.to_string()),
            }),
            _ => None,
        };

        let poll_interval = get(ENV_POLL_SECS)
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs);

        let mut limits = Limits::default();
        if let Some(n) = get(ENV_MAX_SEEN).and_then(|v| v.parse::<usize>().ok()) {
            limits.max_seen = (n > 0).then_some(n);
        }

        Self {
            telegram,
            gist,
            poll_interval,
            limits,
        }
    }
}
