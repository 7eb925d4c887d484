//! Cached product catalog document

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::{Result, StorefrontError};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogMetadata {
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_products: usize,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub metadata: CatalogMetadata,
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Older dumps were a bare product array; current ones carry metadata.
/// The flat shape must be tried first: a struct also deserializes from a
/// sequence, so the document variant would swallow arrays.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCatalog {
    Flat(Vec<Product>),
    Document(CatalogDocument),
}

pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the cached catalog; a missing file is an empty catalog, not an
    /// error.
    pub fn load(&self) -> Result<CatalogDocument> {
        if !self.path.exists() {
            return Ok(CatalogDocument::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        let stored: StoredCatalog = serde_json::from_str(&raw)?;
        Ok(match stored {
            StoredCatalog::Document(doc) => doc,
            StoredCatalog::Flat(products) => CatalogDocument {
                metadata: CatalogMetadata {
                    last_updated: None,
                    total_products: products.len(),
                },
                products,
            },
        })
    }

    /// Replace the whole catalog. Syncs overwrite wholesale; the last one
    /// wins.
    pub fn save(&self, products: Vec<Product>) -> Result<CatalogDocument> {
        let doc = CatalogDocument {
            metadata: CatalogMetadata {
                last_updated: Some(Utc::now()),
                total_products: products.len(),
            },
            products,
        };
        let bytes = serde_json::to_vec_pretty(&doc)?;
        super::write_atomic(&self.path, &bytes)?;
        Ok(doc)
    }

    /// Look a product up by upstream id first, then by retailer slug.
    pub fn find_by_id_or_slug(&self, key: &str) -> Result<Product> {
        let doc = self.load()?;
        if let Some(p) = doc.products.iter().find(|p| p.id == key) {
            return Ok(p.clone());
        }
        doc.products
            .iter()
            .find(|p| p.matches(key))
            .cloned()
            .ok_or_else(|| StorefrontError::ProductNotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("argento-catalog-{name}-{}.json", std::process::id()))
    }

    fn product(id: &str, slug: &str) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "retailer_id": slug,
            "title": format!("منتج {id}"),
            "price": "45.0",
            "merchant_id": "SUDIID",
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_catalog() {
        let store = CatalogStore::new(temp_path("missing"));
        let doc = store.load().unwrap();
        assert!(doc.products.is_empty());
    }

    #[test]
    fn test_save_then_find_by_id_or_slug() {
        let path = temp_path("roundtrip");
        let store = CatalogStore::new(&path);
        store.save(vec![product("111", "SKU-A"), product("222", "SKU-B")]).unwrap();

        assert_eq!(store.find_by_id_or_slug("111").unwrap().id, "111");
        assert_eq!(store.find_by_id_or_slug("SKU-B").unwrap().id, "222");
        assert!(matches!(
            store.find_by_id_or_slug("nope"),
            Err(StorefrontError::ProductNotFound(_))
        ));

        let doc = store.load().unwrap();
        assert_eq!(doc.metadata.total_products, 2);
        assert!(doc.metadata.last_updated.is_some());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_flat_array_document_still_loads() {
        let path = temp_path("flat");
        std::fs::write(
            &path,
            r#"[{"id":"9","title":"x","price":"5","merchant_id":"FOFO"}]"#,
        )
        .unwrap();
        let store = CatalogStore::new(&path);
        let doc = store.load().unwrap();
        assert_eq!(doc.products.len(), 1);
        assert_eq!(doc.metadata.total_products, 1);
        std::fs::remove_file(path).ok();
    }
}
