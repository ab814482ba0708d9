//! Application configuration management.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Default exchange rates (CUP per foreign unit).
    #[serde(default)]
    pub rates: RatesConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path of the ledger snapshot file.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    /// Directory where backup exports are written.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("cobro.json")
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            backup_dir: default_backup_dir(),
        }
    }
}

/// Default exchange rates, in CUP per one foreign unit.
///
/// These are starting values only; every transaction records the rate
/// actually used, so changing a default never rewrites history.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    /// CUP per USD.
    #[serde(default = "default_usd_rate")]
    pub usd: Decimal,
    /// CUP per USDT.
    #[serde(default = "default_usdt_rate")]
    pub usdt: Decimal,
    /// CUP per Zelle dollar.
    #[serde(default = "default_zelle_rate")]
    pub zelle: Decimal,
    /// CUP per EUR.
    #[serde(default = "default_eur_rate")]
    pub eur: Decimal,
}

fn default_usd_rate() -> Decimal {
    Decimal::from(320)
}

fn default_usdt_rate() -> Decimal {
    Decimal::from(325)
}

fn default_zelle_rate() -> Decimal {
    Decimal::from(315)
}

fn default_eur_rate() -> Decimal {
    Decimal::from(340)
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            usd: default_usd_rate(),
            usdt: default_usdt_rate(),
            zelle: default_zelle_rate(),
            eur: default_eur_rate(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("COBRO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_rates() {
        let rates = RatesConfig::default();
        assert_eq!(rates.usd, dec!(320));
        assert_eq!(rates.usdt, dec!(325));
        assert_eq!(rates.zelle, dec!(315));
        assert_eq!(rates.eur, dec!(340));
    }

    #[test]
    fn test_default_storage_paths() {
        let storage = StorageConfig::default();
        assert_eq!(storage.snapshot_path, PathBuf::from("cobro.json"));
        assert_eq!(storage.backup_dir, PathBuf::from("."));
    }

    #[test]
    fn test_config_deserializes_with_partial_input() {
        let json = r#"{ "rates": { "usd": "330" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.rates.usd, dec!(330));
        assert_eq!(config.rates.eur, dec!(340));
    }
}
