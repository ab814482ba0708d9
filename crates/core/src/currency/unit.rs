//! Currency units and the default exchange-rate table.

use std::collections::HashMap;

use cobro_shared::config::RatesConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::conversion::InvalidRate;

/// Currency units accepted by the ledger.
///
/// `Cup` is the base unit: every debt and payment is normalized into CUP
/// for comparison and aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Cuban peso - the base unit.
    Cup,
    /// US dollar (cash).
    Usd,
    /// Tether stablecoin.
    Usdt,
    /// US dollar via Zelle transfer.
    Zelle,
    /// Euro.
    Eur,
}

impl Currency {
    /// The base unit everything is normalized into.
    pub const BASE: Self = Self::Cup;

    /// Returns true for the base unit.
    #[must_use]
    pub fn is_base(self) -> bool {
        self == Self::BASE
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cup => write!(f, "CUP"),
            Self::Usd => write!(f, "USD"),
            Self::Usdt => write!(f, "USDT"),
            Self::Zelle => write!(f, "ZELLE"),
            Self::Eur => write!(f, "EUR"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CUP" => Ok(Self::Cup),
            "USD" => Ok(Self::Usd),
            "USDT" => Ok(Self::Usdt),
            "ZELLE" => Ok(Self::Zelle),
            "EUR" => Ok(Self::Eur),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

/// Default exchange rates per currency (CUP per one foreign unit).
///
/// Rates are mutable configuration, not identity: the table only supplies
/// the suggested rate for new transactions. Each debt and payment stores
/// the rate actually used, so editing the table never rewrites history.
#[derive(Debug, Clone)]
pub struct RateTable {
    rates: HashMap<Currency, Decimal>,
}

impl RateTable {
    /// Builds the table from configured defaults.
    #[must_use]
    pub fn from_config(config: &RatesConfig) -> Self {
        let mut rates = HashMap::new();
        rates.insert(Currency::Usd, config.usd);
        rates.insert(Currency::Usdt, config.usdt);
        rates.insert(Currency::Zelle, config.zelle);
        rates.insert(Currency::Eur, config.eur);
        Self { rates }
    }

    /// Returns the default rate for a unit. The base unit is always 1.
    #[must_use]
    pub fn default_rate(&self, currency: Currency) -> Decimal {
        if currency.is_base() {
            return Decimal::ONE;
        }
        self.rates.get(&currency).copied().unwrap_or(Decimal::ONE)
    }

    /// Overrides the default rate for a foreign unit.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRate`] if `rate` is not positive. The base unit
    /// cannot be re-rated; setting it is ignored.
    pub fn set_rate(&mut self, currency: Currency, rate: Decimal) -> Result<(), InvalidRate> {
        if rate <= Decimal::ZERO {
            return Err(InvalidRate(rate));
        }
        if !currency.is_base() {
            self.rates.insert(currency, rate);
        }
        Ok(())
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::from_config(&RatesConfig::default())
    }
}
