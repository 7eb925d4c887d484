//! Flat-file document stores
//!
//! The catalog and order books live in JSON documents. There is no locking
//! discipline; the one guarantee preserved is atomic replace-on-write so a
//! crash mid-save never leaves a truncated document behind.

use std::fs;
use std::path::Path;

use crate::Result;

pub mod catalog;
pub mod orders;

pub use catalog::CatalogStore;
pub use orders::OrderStore;

/// Write `bytes` to a sibling temp file, then atomically rename into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
