//! # Configuration State
//!
//! Terminal configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TALLY_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Read-only after initialization, so no mutex.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tally_core::calendar::{local_date, DocumentStyle};
use tally_core::{Money, DEFAULT_SHOP_ID};
use tracing::warn;

/// Largest accepted offset, just under one day.
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

/// Database file name inside the platform data directory.
pub const DATABASE_FILE: &str = "tally.db";

/// Terminal configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Shop all items, transactions and counters belong to.
    pub shop_id: String,

    /// Printed at the top of receipts and invoices.
    pub shop_name: String,

    /// Currency symbol for display.
    pub currency_symbol: String,

    /// Fixed offset from UTC, in minutes, that defines the shop's calendar
    /// day. Used for day views, document-number prefixes and the times shown
    /// in edit records.
    pub utc_offset_minutes: i32,

    /// Explicit database path. `None` means the platform data directory.
    pub db_path: Option<PathBuf>,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Shop: `DEFAULT_SHOP_ID`, "My Shop"
    /// - Currency: `$`
    /// - Calendar days in UTC
    fn default() -> Self {
        ConfigState {
            shop_id: DEFAULT_SHOP_ID.to_string(),
            shop_name: "My Shop".to_string(),
            currency_symbol: "$".to_string(),
            utc_offset_minutes: 0,
            db_path: None,
        }
    }
}

impl ConfigState {
    /// Creates a ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `TALLY_SHOP_ID`: shop identifier
    /// - `TALLY_SHOP_NAME`: name printed on documents
    /// - `TALLY_UTC_OFFSET_MINUTES`: e.g. `-300` for UTC-5
    /// - `TALLY_CURRENCY_SYMBOL`: e.g. `€`
    /// - `TALLY_DB_PATH`: database file override
    pub fn from_env() -> Self {
        ConfigState::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigState::from_env`] with a custom variable source.
    ///
    /// Blank values are ignored. An unparsable or out-of-range offset is
    /// logged and the default kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = ConfigState::default();

        if let Some(shop_id) = var("TALLY_SHOP_ID") {
            config.shop_id = shop_id;
        }

        if let Some(shop_name) = var("TALLY_SHOP_NAME") {
            config.shop_name = shop_name;
        }

        if let Some(symbol) = var("TALLY_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(raw) = var("TALLY_UTC_OFFSET_MINUTES") {
            match raw.parse::<i32>() {
                Ok(minutes) if minutes.abs() <= MAX_OFFSET_MINUTES => {
                    config.utc_offset_minutes = minutes;
                }
                _ => warn!(value = %raw, "Ignoring invalid TALLY_UTC_OFFSET_MINUTES"),
            }
        }

        if let Some(path) = var("TALLY_DB_PATH") {
            config.db_path = Some(PathBuf::from(path));
        }

        config
    }

    /// The shop's fixed offset.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// The shop's calendar day at `now`.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        local_date(now, self.offset())
    }

    /// Formats a cent amount as a currency string.
    ///
    /// ```rust
    /// use tally_terminal::state::ConfigState;
    ///
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(1234), "$12.34");
    /// assert_eq!(config.format_currency(-1234), "-$12.34");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        Money::from_cents(cents).format_with(&self.currency_symbol)
    }

    /// Settings for rendering receipts and invoices.
    pub fn document_style(&self) -> DocumentStyle<'_> {
        DocumentStyle {
            shop_name: &self.shop_name,
            currency_symbol: &self.currency_symbol,
            offset: self.offset(),
        }
    }

    /// Determines the database file path.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.tally.pos/tally.db`
    /// - **Windows**: `%APPDATA%\tally\pos\data\tally.db`
    /// - **Linux**: `~/.local/share/pos/tally.db`
    ///
    /// `TALLY_DB_PATH` wins when set. The data directory is created if
    /// missing.
    pub fn database_path(&self) -> std::io::Result<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        let dirs = ProjectDirs::from("com", "tally", "pos").ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine app data directory",
            )
        })?;

        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join(DATABASE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_format_currency() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(100), "$1.00");
        assert_eq!(config.format_currency(1), "$0.01");
        assert_eq!(config.format_currency(0), "$0.00");
        assert_eq!(config.format_currency(-1234), "-$12.34");
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigState::from_lookup(lookup(&[
            ("TALLY_SHOP_ID", "corner-shop"),
            ("TALLY_SHOP_NAME", "Corner Shop"),
            ("TALLY_CURRENCY_SYMBOL", "€"),
            ("TALLY_UTC_OFFSET_MINUTES", "-300"),
            ("TALLY_DB_PATH", "/tmp/corner.db"),
        ]));

        assert_eq!(config.shop_id, "corner-shop");
        assert_eq!(config.shop_name, "Corner Shop");
        assert_eq!(config.format_currency(250), "€2.50");
        assert_eq!(config.offset().local_minus_utc(), -300 * 60);
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/corner.db"));
    }

    #[test]
    fn test_invalid_and_blank_values_keep_defaults() {
        let config = ConfigState::from_lookup(lookup(&[
            ("TALLY_SHOP_ID", "   "),
            ("TALLY_UTC_OFFSET_MINUTES", "east"),
        ]));
        assert_eq!(config, ConfigState::default());

        let config = ConfigState::from_lookup(lookup(&[("TALLY_UTC_OFFSET_MINUTES", "1440")]));
        assert_eq!(config.utc_offset_minutes, 0);
    }

    #[test]
    fn test_today_uses_the_shop_offset() {
        let late_evening_utc = Utc.with_ymd_and_hms(2025, 3, 9, 23, 30, 0).unwrap();

        let utc = ConfigState::default();
        assert_eq!(utc.today(late_evening_utc), NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());

        let plus_two = ConfigState {
            utc_offset_minutes: 120,
            ..ConfigState::default()
        };
        assert_eq!(plus_two.today(late_evening_utc), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
    }
}
