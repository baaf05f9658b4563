//! Reference Catalog for Picker Options

use crate::io::read_raw_listings;
use crate::record::RawListing;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{info, warn};

/// Previous-owner brackets offered to users
pub const OWNER_BRACKETS: [&str; 4] = ["First", "Second", "Third", "Fourth & Above"];

const FALLBACK_BRANDS: [&str; 3] = ["Toyota", "Honda", "Lainnya"];
const FALLBACK_LOCATIONS: [&str; 3] = ["Jakarta", "Bandung", "Lainnya"];

/// Known brands, locations and per-brand model details
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReferenceCatalog {
    brands: BTreeSet<String>,
    locations: BTreeSet<String>,
    models_by_brand: BTreeMap<String, BTreeSet<String>>,
    fallback: bool,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ReferenceCatalog {
    /// Build from raw rows, skipping blank cells
    pub fn from_rows(rows: &[RawListing]) -> Self {
        let mut catalog = Self::default();
        for row in rows {
            let brand = non_blank(&row.brand);
            if let Some(brand) = &brand {
                catalog.brands.insert(brand.clone());
            }
            if let Some(location) = non_blank(&row.location) {
                catalog.locations.insert(location);
            }
            if let (Some(brand), Some(model)) = (brand, non_blank(&row.model_detail)) {
                catalog.models_by_brand.entry(brand).or_default().insert(model);
            }
        }
        catalog
    }

    /// Fixed catalog used when no reference dataset is available
    pub fn fallback() -> Self {
        Self {
            brands: FALLBACK_BRANDS.iter().map(|s| s.to_string()).collect(),
            locations: FALLBACK_LOCATIONS.iter().map(|s| s.to_string()).collect(),
            models_by_brand: BTreeMap::new(),
            fallback: true,
        }
    }

    /// Load from a reference CSV, falling back to the fixed catalog on failure
    pub fn load_or_fallback<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match read_raw_listings(path) {
            Ok(rows) => {
                let catalog = Self::from_rows(&rows);
                info!(
                    "Reference catalog: {} brands, {} locations",
                    catalog.brands.len(),
                    catalog.locations.len()
                );
                catalog
            }
            Err(e) => {
                warn!(
                    "Reference dataset {} unavailable ({}), using fallback options",
                    path.display(),
                    e
                );
                Self::fallback()
            }
        }
    }

    /// Sorted brands
    pub fn brands(&self) -> Vec<String> {
        self.brands.iter().cloned().collect()
    }

    /// Sorted locations
    pub fn locations(&self) -> Vec<String> {
        self.locations.iter().cloned().collect()
    }

    /// Sorted model details seen for a brand; empty for unknown brands
    pub fn models_for(&self, brand: &str) -> Vec<String> {
        self.models_by_brand
            .get(brand)
            .map(|models| models.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether this is the fixed fallback catalog
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}
