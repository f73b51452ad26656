//! # Configuration State
//!
//! Stores terminal configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TILL_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use serde::Serialize;
use till_core::{Actor, Money, Role, DEFAULT_LOW_STOCK_THRESHOLD};

/// Terminal configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Store name (printed on receipts)
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places the minor unit is split into.
    /// 0 means amounts are whole pesos.
    pub currency_decimals: u8,

    /// Products at or below this stock count are reported as low.
    pub low_stock_threshold: i64,

    /// Operators that can sign in at this terminal.
    pub operators: Vec<Actor>,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Store: "Café POS"
    /// - Currency: "$" with no decimals
    /// - Low stock: 10 units
    /// - Operators: `admin` (Admin), `cajero` (Cashier)
    fn default() -> Self {
        ConfigState {
            store_name: "Café POS".to_string(),
            currency_symbol: "$".to_string(),
            currency_decimals: 0,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            operators: vec![
                Actor::new("1", "admin", "Administrador", Role::Admin),
                Actor::new("2", "cajero", "Cajero", Role::Cashier),
            ],
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `TILL_STORE_NAME`: Override store name
    /// - `TILL_CURRENCY_SYMBOL`: Override currency symbol
    /// - `TILL_CURRENCY_DECIMALS`: Override decimal places (0-4)
    /// - `TILL_LOW_STOCK_THRESHOLD`: Override the low-stock alert level
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = ConfigState::default();

        if let Ok(store_name) = std::env::var("TILL_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Ok(symbol) = std::env::var("TILL_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Ok(decimals) = std::env::var("TILL_CURRENCY_DECIMALS") {
            if let Ok(decimals) = decimals.parse::<u8>() {
                if decimals <= 4 {
                    config.currency_decimals = decimals;
                }
            }
        }

        if let Ok(threshold) = std::env::var("TILL_LOW_STOCK_THRESHOLD") {
            if let Ok(threshold) = threshold.parse::<i64>() {
                if threshold >= 0 {
                    config.low_stock_threshold = threshold;
                }
            }
        }

        config
    }

    /// Formats an amount in the configured currency.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_money(Money::from_minor(52500)), "$52500");
    /// ```
    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with(&self.currency_symbol, self.currency_decimals)
    }

    /// Looks up a configured operator by username, ignoring case.
    pub fn operator(&self, username: &str) -> Option<&Actor> {
        self.operators
            .iter()
            .find(|o| o.username.eq_ignore_ascii_case(username.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money_whole_units() {
        let config = ConfigState::default();
        assert_eq!(config.format_money(Money::from_minor(52500)), "$52500");
        assert_eq!(config.format_money(Money::from_minor(-500)), "-$500");
    }

    #[test]
    fn test_format_money_with_decimals() {
        let config = ConfigState {
            currency_decimals: 2,
            ..ConfigState::default()
        };
        assert_eq!(config.format_money(Money::from_minor(1234)), "$12.34");
        assert_eq!(config.format_money(Money::from_minor(1)), "$0.01");
    }

    #[test]
    fn test_operator_lookup() {
        let config = ConfigState::default();
        assert_eq!(config.operator("CAJERO").map(|o| o.role), Some(Role::Cashier));
        assert_eq!(config.operator(" admin ").map(|o| o.role), Some(Role::Admin));
        assert!(config.operator("ghost").is_none());
    }
}
