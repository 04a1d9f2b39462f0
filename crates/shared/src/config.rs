//! System settings configuration.
//!
//! The posting engine consumes a small set of switches maintained through the
//! master-data screens. They are loaded from layered config files plus
//! `MEEZAN__`-prefixed environment variables, and fall back to the documented
//! defaults when no source provides them.

use serde::Deserialize;

/// Default payment terms applied to new invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPaymentTerms {
    /// Settle the full net amount from a safe at posting time.
    Cash,
    /// Carry the net amount on the counterparty account.
    Credit,
}

/// How to handle the same product appearing twice in a document's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateItemHandling {
    /// Keep duplicate lines as entered.
    AllowDuplicate,
    /// Merge duplicates into one line by adding their quantities.
    IncreaseQuantity,
}

/// System settings consumed by the posting engine.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemSettings {
    /// Update a product unit's purchase price from posted purchase invoices.
    #[serde(default = "default_update_purchase_price")]
    pub update_purchase_price: bool,
    /// Update a product unit's sale price from posted sale invoices.
    #[serde(default = "default_update_sale_price")]
    pub update_sale_price: bool,
    /// Payment terms preselected for new invoices.
    #[serde(default = "default_invoice_payment")]
    pub default_invoice_payment: DefaultPaymentTerms,
    /// Handling of duplicated products within one document's lines.
    #[serde(default = "default_duplicate_item_handling")]
    pub duplicate_item_handling: DuplicateItemHandling,
}

fn default_update_purchase_price() -> bool {
    true
}

fn default_update_sale_price() -> bool {
    false
}

fn default_invoice_payment() -> DefaultPaymentTerms {
    DefaultPaymentTerms::Cash
}

fn default_duplicate_item_handling() -> DuplicateItemHandling {
    DuplicateItemHandling::IncreaseQuantity
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            update_purchase_price: default_update_purchase_price(),
            update_sale_price: default_update_sale_price(),
            default_invoice_payment: default_invoice_payment(),
            duplicate_item_handling: default_duplicate_item_handling(),
        }
    }
}

impl SystemSettings {
    /// Loads settings from config files and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a config source exists but cannot be parsed.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("MEEZAN").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = SystemSettings::default();
        assert!(settings.update_purchase_price);
        assert!(!settings.update_sale_price);
        assert_eq!(
            settings.default_invoice_payment,
            DefaultPaymentTerms::Cash
        );
        assert_eq!(
            settings.duplicate_item_handling,
            DuplicateItemHandling::IncreaseQuantity
        );
    }
}
