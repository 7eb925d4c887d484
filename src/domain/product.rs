//! Catalog product snapshot
//!
//! Products are created or overwritten wholesale on each catalog sync and
//! are immutable between syncs; the last sync wins.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    /// Stable upstream identifier.
    pub id: String,
    /// Merchant-local SKU, used as the landing-page slug.
    #[serde(default)]
    pub retailer_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Strike-through price shown next to the current one.
    #[serde(default)]
    pub original_price: Option<Decimal>,
    pub merchant_id: String,
    #[serde(default)]
    pub merchant_name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub availability: Availability,
    /// Wholesale unit cost, used for carton-based purchase planning.
    #[serde(default)]
    pub wholesale_price: Decimal,
    /// Carton size for merchants that only sell whole cartons.
    #[serde(default = "one")]
    pub pack_size: u32,
    #[serde(default = "one")]
    pub min_order_qty: u32,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_currency() -> String {
    "EGP".to_string()
}

fn one() -> u32 {
    1
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    #[default]
    #[serde(rename = "in stock")]
    InStock,
    #[serde(other, rename = "unavailable")]
    Unavailable,
}

impl Product {
    pub fn is_available(&self) -> bool {
        self.availability == Availability::InStock
    }

    pub fn display_price(&self) -> String {
        format!("{:.2} {}", self.price, self.currency)
    }

    /// Repair out-of-range feed values; upstream catalogs occasionally send
    /// a zero pack size or a negative price.
    pub fn sanitize(mut self) -> Self {
        if self.price < Decimal::ZERO {
            self.price = Decimal::ZERO;
        }
        if self.pack_size == 0 {
            self.pack_size = 1;
        }
        if self.min_order_qty == 0 {
            self.min_order_qty = 1;
        }
        self
    }

    /// True when `key` matches the upstream id or the retailer slug.
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || (!self.retailer_id.is_empty() && self.retailer_id == key)
    }
}
