//! Facebook Graph API catalog sync
//!
//! Pulls every configured merchant catalog and merges the results into one
//! product list. Sync failures are collected into the report and never
//! propagate into order or commission logic, which only ever reads the
//! local cache.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::merchant::MerchantRegistry;
use crate::domain::product::{Availability, Product};
use crate::{Result, StorefrontError};

const GRAPH_BASE: &str = "https://graph.facebook.com";
const API_VERSION: &str = "v18.0";
const PAGE_LIMIT: u32 = 100;
const PRODUCT_FIELDS: &str =
    "id,name,description,price,currency,image_url,availability,retailer_id";

#[derive(Debug, Deserialize)]
struct GraphPage {
    #[serde(default)]
    data: Vec<GraphProduct>,
    paging: Option<GraphPaging>,
}

#[derive(Debug, Deserialize)]
struct GraphPaging {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphProduct {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    availability: Option<String>,
    #[serde(default)]
    retailer_id: Option<String>,
}

/// Outcome of one full sync pass. Always returned, never thrown: a sync
/// that fetched nothing is a failed report, not a crashed server.
#[derive(Clone, Debug, Serialize)]
pub struct SyncReport {
    pub success: bool,
    pub total_products: usize,
    /// Product count per merchant catalog.
    pub catalogs: HashMap<String, usize>,
    pub errors: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

pub struct FacebookSync {
    client: reqwest::Client,
    access_token: String,
    /// merchant id → upstream catalog id
    catalog_ids: HashMap<String, String>,
}

impl FacebookSync {
    pub fn new(access_token: String, catalog_ids: HashMap<String, String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token,
            catalog_ids,
        }
    }

    /// Configuration comes from the environment: `FBACCSESSTOKEN` plus one
    /// variable per merchant id holding its catalog id.
    pub fn from_env(registry: &MerchantRegistry) -> Option<Self> {
        let access_token = std::env::var("FBACCSESSTOKEN").ok()?;
        let catalog_ids: HashMap<String, String> = registry
            .ids()
            .filter_map(|id| std::env::var(id).ok().map(|v| (id.to_string(), v)))
            .collect();
        if catalog_ids.is_empty() {
            tracing::warn!("FBACCSESSTOKEN is set but no catalog ids are configured");
            return None;
        }
        Some(Self::new(access_token, catalog_ids))
    }

    /// Fetch every configured catalog. Per-catalog failures are recorded
    /// and the remaining catalogs still sync.
    pub async fn sync_all(&self, registry: &MerchantRegistry) -> (SyncReport, Vec<Product>) {
        let mut all_products = Vec::new();
        let mut catalogs = HashMap::new();
        let mut errors = Vec::new();

        for (merchant_id, catalog_id) in &self.catalog_ids {
            tracing::info!(merchant = %merchant_id, catalog = %catalog_id, "syncing catalog");
            match self.fetch_catalog(merchant_id, catalog_id, registry).await {
                Ok(products) => {
                    catalogs.insert(merchant_id.clone(), products.len());
                    all_products.extend(products);
                }
                Err(e) => {
                    tracing::warn!(merchant = %merchant_id, error = %e, "catalog sync failed");
                    errors.push(format!("{merchant_id}: {e}"));
                }
            }
        }

        let report = SyncReport {
            success: !all_products.is_empty(),
            total_products: all_products.len(),
            catalogs,
            errors,
            completed_at: Utc::now(),
        };
        (report, all_products)
    }

    async fn fetch_catalog(
        &self,
        merchant_id: &str,
        catalog_id: &str,
        registry: &MerchantRegistry,
    ) -> Result<Vec<Product>> {
        let merchant = registry.lookup(merchant_id);
        let mut products = Vec::new();
        let mut url = format!(
            "{GRAPH_BASE}/{API_VERSION}/{catalog_id}/products\
             ?access_token={}&fields={PRODUCT_FIELDS}&limit={PAGE_LIMIT}",
            self.access_token
        );

        loop {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| StorefrontError::Sync(e.to_string()))?;
            if !response.status().is_success() {
                return Err(StorefrontError::Sync(format!(
                    "graph api returned {} for {merchant_id}",
                    response.status()
                )));
            }
            let page: GraphPage = response
                .json()
                .await
                .map_err(|e| StorefrontError::Sync(e.to_string()))?;

            for raw in page.data {
                products.push(graph_to_product(raw, merchant_id, &merchant.name));
            }

            // next-page links carry the full query string
            match page.paging.and_then(|p| p.next) {
                Some(next) => url = next,
                None => break,
            }
        }

        tracing::info!(merchant = %merchant_id, count = products.len(), "catalog fetched");
        Ok(products)
    }
}

fn graph_to_product(raw: GraphProduct, merchant_id: &str, merchant_name: &str) -> Product {
    Product {
        id: raw.id,
        retailer_id: raw.retailer_id.unwrap_or_default(),
        title: raw.name.unwrap_or_else(|| "منتج بدون اسم".to_string()),
        description: raw.description.unwrap_or_default(),
        price: raw.price.as_deref().map(parse_price).unwrap_or(Decimal::ZERO),
        currency: raw.currency.unwrap_or_else(|| "EGP".to_string()),
        original_price: None,
        merchant_id: merchant_id.to_string(),
        merchant_name: merchant_name.to_string(),
        image_url: raw.image_url.unwrap_or_default(),
        availability: parse_availability(raw.availability.as_deref()),
        wholesale_price: Decimal::ZERO,
        pack_size: 1,
        min_order_qty: 1,
        updated_at: Some(Utc::now()),
    }
    .sanitize()
}

/// Graph prices arrive as display strings like "EGP1,234.50".
fn parse_price(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().unwrap_or(Decimal::ZERO)
}

fn parse_availability(raw: Option<&str>) -> Availability {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("in stock") | Some("available") | None => Availability::InStock,
        _ => Availability::Unavailable,
    }
}
