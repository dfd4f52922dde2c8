use std::{collections::BTreeSet, sync::Arc};

use crate::errors::BoxError;

/// Store metadata for a purchasable product.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub product_id: String,
    pub localized_title: String,
    pub localized_description: String,
    pub price_info: PriceInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceInfo {
    /// Price in micro-units of the currency (1,000,000 micro-units equal one
    /// unit of the currency).
    pub price_micros: i64,
    pub currency_iso_4217: String,
}

impl PriceInfo {
    /// Price with two decimals and the currency code, e.g. "USD 0.99".
    pub fn display_price(&self) -> String {
        let sign = if self.price_micros < 0 { "-" } else { "" };
        // Rounds half away from zero.
        let cents = self.price_micros.unsigned_abs().saturating_add(5_000) / 10_000;
        format!(
            "{} {sign}{}.{:02}",
            self.currency_iso_4217,
            cents / 100,
            cents % 100
        )
    }
}

/// Result of a product metadata lookup.
#[derive(Debug, Clone, Default)]
pub struct RetrieveResults {
    pub retrieved_products: Vec<Product>,
    pub invalid_product_ids: BTreeSet<String>,
    pub error: Option<Arc<BoxError>>,
}

impl RetrieveResults {
    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.retrieved_products
            .iter()
            .find(|p| p.product_id == product_id)
    }
}
