// File: kudos-core/src/config.rs
//
// Runtime settings. Defaults are a 300 ms vote window with failed vote saves
// silently dropped; every value can be overridden from the environment or a
// `.env` file.

use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use url::Url;
use crate::Error;

pub const DEFAULT_STORE_URL: &str = "http://localhost:3000";
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 200;

/// What to do when a write to the store fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFailurePolicy {
    /// Log and keep going; the optimistic value stays on screen.
    SilentDrop,
    /// Try again up to `attempts` more times, doubling `backoff` after each
    /// failure. Logged and dropped if every attempt fails.
    Retry { attempts: u32, backoff: Duration },
    /// Hand the failure to the UI through the widget's alert channel.
    Alert,
}

impl Default for SaveFailurePolicy {
    fn default() -> Self {
        SaveFailurePolicy::SilentDrop
    }
}

impl FromStr for SaveFailurePolicy {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "silent" | "silent-drop" | "drop" => Ok(SaveFailurePolicy::SilentDrop),
            "retry" => Ok(SaveFailurePolicy::Retry {
                attempts: DEFAULT_RETRY_ATTEMPTS,
                backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            }),
            "alert" => Ok(SaveFailurePolicy::Alert),
            other => Err(Error::Config(format!("unknown save policy '{}'", other))),
        }
    }
}

/// Per-widget vote settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteSettings {
    pub debounce: Duration,
    pub save_policy: SaveFailurePolicy,
}

impl Default for VoteSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            save_policy: SaveFailurePolicy::default(),
        }
    }
}

/// Retry knobs applied whenever the `retry` policy is chosen, whether from
/// the environment or a command-line flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_RETRY_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KudosConfig {
    pub store_url: Url,
    pub votes: VoteSettings,
    pub retry: RetrySettings,
}

impl Default for KudosConfig {
    fn default() -> Self {
        Self {
            store_url: Url::parse(DEFAULT_STORE_URL).expect("default store url is valid"),
            votes: VoteSettings::default(),
            retry: RetrySettings::default(),
        }
    }
}

impl KudosConfig {
    /// Loads `.env` (if any) and reads `KUDOS_*` variables.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; missing keys keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup("KUDOS_STORE_URL") {
            cfg.store_url = Url::parse(raw.trim())?;
        }
        if let Some(raw) = lookup("KUDOS_DEBOUNCE_MS") {
            cfg.votes.debounce = Duration::from_millis(parse_number(&raw, "KUDOS_DEBOUNCE_MS")?);
        }
        if let Some(raw) = lookup("KUDOS_RETRY_ATTEMPTS") {
            let n = parse_number(&raw, "KUDOS_RETRY_ATTEMPTS")?;
            cfg.retry.attempts = u32::try_from(n)
                .map_err(|_| Error::Config(format!("KUDOS_RETRY_ATTEMPTS out of range: {}", n)))?;
        }
        if let Some(raw) = lookup("KUDOS_RETRY_BACKOFF_MS") {
            cfg.retry.backoff = Duration::from_millis(parse_number(&raw, "KUDOS_RETRY_BACKOFF_MS")?);
        }
        if let Some(raw) = lookup("KUDOS_SAVE_POLICY") {
            cfg.set_save_policy(&raw)?;
        }

        debug!("Loaded config: store_url={}, votes={:?}", cfg.store_url, cfg.votes);
        Ok(cfg)
    }

    /// Parses and installs a save policy. `retry` picks up the configured
    /// [`RetrySettings`].
    pub fn set_save_policy(&mut self, raw: &str) -> Result<(), Error> {
        self.votes.save_policy = match raw.parse::<SaveFailurePolicy>()? {
            SaveFailurePolicy::Retry { .. } => SaveFailurePolicy::Retry {
                attempts: self.retry.attempts,
                backoff: self.retry.backoff,
            },
            other => other,
        };
        Ok(())
    }
}

fn parse_number(raw: &str, key: &str) -> Result<u64, Error> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| Error::Config(format!("{} must be a non-negative integer: {}", key, e)))
}
