use std::collections::HashSet;

use crate::{AvailableSize, Product};

/// The descriptive part of a product's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductKey {
    pub title: String,
    pub image_url: String,
    pub handle: String,
}

impl ProductKey {
    pub fn of(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            image_url: product.image_url.clone(),
            handle: product.handle.clone(),
        }
    }
}

/// Identity of an in-stock record: the product plus the exact sizes seen available.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StockKey {
    pub product: ProductKey,
    pub sizes: Vec<AvailableSize>,
}

/// Records currently believed to be in stock. Lives for the whole process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityIndex {
    records: HashSet<StockKey>,
}

impl AvailabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &StockKey) -> bool {
        self.records.contains(key)
    }

    /// Returns `false` when the record was already present.
    pub fn insert(&mut self, key: StockKey) -> bool {
        self.records.insert(key)
    }

    /// Drops every record of `product`, whatever size composition it was stored with.
    /// Returns how many records were removed.
    pub fn remove_product(&mut self, product: &ProductKey) -> usize {
        let before = self.records.len();
        self.records.retain(|record| &record.product != product);
        before - self.records.len()
    }

    pub fn has_product(&self, product: &ProductKey) -> bool {
        self.records.iter().any(|record| &record.product == product)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
