use crate::{AvailabilityIndex, AvailableSize, Product, ProductKey, StockKey};

/// A stock change worth telling someone about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    BecameAvailable {
        product: Product,
        sizes: Vec<AvailableSize>,
    },
    BecameUnavailable { product: Product },
}

impl Transition {
    pub fn product(&self) -> &Product {
        match self {
            Transition::BecameAvailable { product, .. } | Transition::BecameUnavailable { product } => {
                product
            }
        }
    }
}

/// Compares a freshly scraped product against the [`AvailabilityIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDetector {
    action_url: String,
    notify_out_of_stock: bool,
}

impl ChangeDetector {
    /// `action_url` is the call-to-action link attached to every available size.
    pub fn new(action_url: impl Into<String>) -> Self {
        Self {
            action_url: action_url.into(),
            notify_out_of_stock: false,
        }
    }

    /// Also report products whose last available size sold out.
    pub fn with_out_of_stock_notifications(mut self, enabled: bool) -> Self {
        self.notify_out_of_stock = enabled;
        self
    }

    /// Updates `index` for `product` and returns the transition to dispatch, if any.
    ///
    /// With `suppress_notify` set the index is still updated but nothing is
    /// returned, so pre-existing inventory does not alert on startup.
    pub fn evaluate(
        &self,
        product: &Product,
        index: &mut AvailabilityIndex,
        suppress_notify: bool,
    ) -> Option<Transition> {
        let sizes = product.available_sizes(&self.action_url);
        let product_key = ProductKey::of(product);

        if sizes.is_empty() {
            let removed = index.remove_product(&product_key);
            if removed == 0 || suppress_notify || !self.notify_out_of_stock {
                return None;
            }
            return Some(Transition::BecameUnavailable {
                product: product.clone(),
            });
        }

        let key = StockKey {
            product: product_key,
            sizes: sizes.clone(),
        };
        if !index.insert(key) || suppress_notify {
            return None;
        }
        Some(Transition::BecameAvailable {
            product: product.clone(),
            sizes,
        })
    }
}
