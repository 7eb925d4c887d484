//! Argento Storefront
//!
//! Multi-merchant storefront backend: mirrors merchant product catalogs
//! into a local cache, accepts customer orders from landing pages, computes
//! per-merchant commissions, and exports pending orders in the Speedaf
//! carrier manifest format.
//!
//! ## Features
//! - Cached product catalog merged from several merchant feeds
//! - Per-merchant commission schemes and return terms
//! - Order lifecycle with offers, free shipping and an audit trail
//! - 22-column Speedaf shipment export

use thiserror::Error;

pub mod config;
pub mod domain;
pub mod store;
pub mod sync;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("invalid order data: {0}")]
    Validation(String),

    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("malformed document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("catalog sync failed: {0}")]
    Sync(String),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
