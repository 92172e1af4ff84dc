//! Deriver configuration (windows, grace period, date format).

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::format::is_valid_date_format;

pub const DEFAULT_EXPIRING_WINDOW_DAYS: u32 = 7;
pub const DEFAULT_WARRANTY_WINDOW_DAYS: u32 = 30;
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 5_000;
pub const DEFAULT_DATE_FORMAT: &str = "%b %d, %Y";
/// Upper bound for window settings read from the environment (about a century).
pub const MAX_WINDOW_DAYS: u32 = 36_500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriverConfig {
    /// Items expiring within this many days are "expiring soon".
    pub expiring_window_days: u32,
    /// Items whose warranty ends within this many days raise a warranty alert.
    pub warranty_window_days: u32,
    /// How long the last feed is held after the last subscriber detaches.
    pub grace_period_ms: u64,
    /// strftime pattern for dates in messages.
    pub date_format: String,
}

impl Default for DeriverConfig {
    fn default() -> Self {
        Self {
            expiring_window_days: DEFAULT_EXPIRING_WINDOW_DAYS,
            warranty_window_days: DEFAULT_WARRANTY_WINDOW_DAYS,
            grace_period_ms: DEFAULT_GRACE_PERIOD_MS,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl DeriverConfig {
    /// Defaults overridden by `STOCKWATCH_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable name.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let date_format = match lookup("STOCKWATCH_DATE_FORMAT") {
            Some(fmt) if is_valid_date_format(&fmt) => fmt,
            Some(fmt) => {
                warn!(value = %fmt, "STOCKWATCH_DATE_FORMAT is not a valid strftime pattern; using default");
                defaults.date_format
            }
            None => defaults.date_format,
        };

        Self {
            expiring_window_days: parse_window(
                &lookup,
                "STOCKWATCH_EXPIRING_DAYS",
                defaults.expiring_window_days,
            ),
            warranty_window_days: parse_window(
                &lookup,
                "STOCKWATCH_WARRANTY_DAYS",
                defaults.warranty_window_days,
            ),
            grace_period_ms: parse_or(&lookup, "STOCKWATCH_FEED_GRACE_MS", defaults.grace_period_ms),
            date_format,
        }
    }

    pub fn with_expiring_window_days(mut self, days: u32) -> Self {
        self.expiring_window_days = days;
        self
    }

    pub fn with_warranty_window_days(mut self, days: u32) -> Self {
        self.warranty_window_days = days;
        self
    }

    pub fn with_grace_period_ms(mut self, ms: u64) -> Self {
        self.grace_period_ms = ms;
        self
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    pub fn expiring_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.expiring_window_days))
    }

    pub fn warranty_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.warranty_window_days))
    }

    pub fn grace_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.grace_period_ms)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + core::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, fallback = %default, "invalid config value; using default");
            default
        }),
        None => default,
    }
}

fn parse_window(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> u32 {
    let days = parse_or(lookup, key, default);
    if days > MAX_WINDOW_DAYS {
        warn!(key, value = days, max = MAX_WINDOW_DAYS, "window too large; clamping");
        return MAX_WINDOW_DAYS;
    }
    days
}
