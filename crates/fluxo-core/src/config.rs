//! Ledger configuration
//!
//! Loaded from `~/.config/fluxo/config.toml` when present, then overlaid with
//! environment variables:
//!
//! - `FLUXO_FETCH_LIMIT`: upper bound of rows read per owner scan (default: 1000)
//! - `FLUXO_REMINDER_LOOKAHEAD_DAYS`: reminder horizon in days (default: 1)
//! - `FLUXO_SWEEP_HORIZON_DAYS`: days past today the sweep materializes (default: 0)
//! - `FLUXO_SWEEP_INTERVAL_MINUTES`: recurring sweep period, 0 disables (default: 60)
//! - `FLUXO_SENDER_EMAIL`: From address for reminder emails
//!
//! ```toml
//! fetch_limit = 500
//! reminder_lookahead_days = 2
//!
//! [sweep]
//! interval_minutes = 30
//! horizon_days = 0
//! ```
//!
//! Day counts are clamped to `0..=MAX_DAYS`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::window::days_after;

/// Upper bound for every day-count setting (about ten years)
pub const MAX_DAYS: i64 = 3650;

pub const DEFAULT_FALLBACK_TIP: &str =
    "Não foi possível gerar dicas no momento. Tente novamente mais tarde.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub fetch_limit: i64,
    pub reminder_lookahead_days: i64,
    /// Horizon of the upcoming-transactions alert
    pub upcoming_days: i64,
    /// Appended to the description of entries materialized from a recurring definition
    pub recurring_suffix: String,
    pub fallback_tip: String,
    pub sender_email: String,
    pub sweep: SweepConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub interval_minutes: u64,
    /// Days past today the sweep materializes
    pub horizon_days: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            fetch_limit: 1000,
            reminder_lookahead_days: 1,
            upcoming_days: 3,
            recurring_suffix: " (Recorrente)".to_string(),
            fallback_tip: DEFAULT_FALLBACK_TIP.to_string(),
            sender_email: "onboarding@resend.dev".to_string(),
            sweep: SweepConfig::default(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 60,
            horizon_days: 0,
        }
    }
}

impl LedgerConfig {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fluxo")
            .join("config.toml")
    }

    /// Load from a TOML file, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.clamp();
        Ok(config)
    }

    /// Pull out-of-range values back into bounds
    fn clamp(&mut self) {
        self.fetch_limit = self.fetch_limit.max(1);
        self.reminder_lookahead_days = self.reminder_lookahead_days.clamp(0, MAX_DAYS);
        self.upcoming_days = self.upcoming_days.clamp(0, MAX_DAYS);
        self.sweep.horizon_days = self.sweep.horizon_days.clamp(0, MAX_DAYS);
    }

    /// Latest date a sweep or manual materialization may expand to
    pub fn materialize_limit(&self, today: NaiveDate) -> NaiveDate {
        days_after(today, self.sweep.horizon_days)
    }

    /// Load from the default location and apply environment overrides
    pub fn from_env() -> Result<Self> {
        let path = std::env::var("FLUXO_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        let mut config = Self::load(&path)?;
        config.apply_env();
        Ok(config)
    }

    /// Overlay `FLUXO_*` environment variables; unparseable values are ignored
    pub fn apply_env(&mut self) {
        if let Some(limit) = env_parse::<i64>("FLUXO_FETCH_LIMIT") {
            self.fetch_limit = limit;
        }
        if let Some(days) = env_parse::<i64>("FLUXO_REMINDER_LOOKAHEAD_DAYS") {
            self.reminder_lookahead_days = days;
        }
        if let Some(days) = env_parse::<i64>("FLUXO_SWEEP_HORIZON_DAYS") {
            self.sweep.horizon_days = days;
        }
        if let Some(minutes) = env_parse::<u64>("FLUXO_SWEEP_INTERVAL_MINUTES") {
            self.sweep.interval_minutes = minutes;
        }
        if let Ok(sender) = std::env::var("FLUXO_SENDER_EMAIL") {
            if !sender.trim().is_empty() {
                self.sender_email = sender.trim().to_string();
            }
        }
        self.clamp();
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable config override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.fetch_limit, 1000);
        assert_eq!(config.reminder_lookahead_days, 1);
        assert_eq!(config.recurring_suffix, " (Recorrente)");
        assert_eq!(config.sweep.interval_minutes, 60);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LedgerConfig::from_toml(
            r#"
            fetch_limit = 200

            [sweep]
            interval_minutes = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.fetch_limit, 200);
        assert_eq!(config.sweep.interval_minutes, 5);
        assert_eq!(config.sweep.horizon_days, 0);
        assert_eq!(config.fallback_tip, DEFAULT_FALLBACK_TIP);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = LedgerConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.upcoming_days, 3);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reminder_lookahead_days = 4").unwrap();
        let config = LedgerConfig::load(file.path()).unwrap();
        assert_eq!(config.reminder_lookahead_days, 4);
    }

    #[test]
    fn test_day_counts_are_clamped() {
        let config = LedgerConfig::from_toml(
            r#"
            fetch_limit = -5
            reminder_lookahead_days = 9223372036854775807
            upcoming_days = -3

            [sweep]
            horizon_days = 100000
            "#,
        )
        .unwrap();
        assert_eq!(config.fetch_limit, 1);
        assert_eq!(config.reminder_lookahead_days, MAX_DAYS);
        assert_eq!(config.upcoming_days, 0);
        assert_eq!(config.sweep.horizon_days, MAX_DAYS);

        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(
            config.materialize_limit(today),
            today + chrono::Duration::days(MAX_DAYS)
        );
    }

    #[test]
    fn test_env_day_counts_are_clamped() {
        std::env::set_var("FLUXO_REMINDER_LOOKAHEAD_DAYS", "9223372036854775807");
        std::env::set_var("FLUXO_SWEEP_HORIZON_DAYS", "-9223372036854775808");
        let mut config = LedgerConfig::default();
        config.apply_env();
        std::env::remove_var("FLUXO_REMINDER_LOOKAHEAD_DAYS");
        std::env::remove_var("FLUXO_SWEEP_HORIZON_DAYS");

        assert_eq!(config.reminder_lookahead_days, MAX_DAYS);
        assert_eq!(config.sweep.horizon_days, 0);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = LedgerConfig::from_toml("fetch_limit = \"lots\"").unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }
}
