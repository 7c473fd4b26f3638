/// A product as listed in the storefront catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub title: String,
    pub image_url: String,
    pub handle: String,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub title: String,
    pub available: bool,
}

/// A sellable size, ready to be shown in a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AvailableSize {
    pub title: String,
    pub action_url: String,
}

impl Product {
    /// Sizes whose variant is currently available, in catalog order.
    pub fn available_sizes(&self, action_url: &str) -> Vec<AvailableSize> {
        self.variants
            .iter()
            .filter(|variant| variant.available)
            .map(|variant| AvailableSize {
                title: variant.title.clone(),
                action_url: action_url.to_string(),
            })
            .collect()
    }
}

impl Variant {
    pub fn new(title: impl Into<String>, available: bool) -> Self {
        Self {
            title: title.into(),
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_sizes_keeps_catalog_order() {
        let product = Product {
            title: "Tee".into(),
            image_url: String::new(),
            handle: "tee".into(),
            variants: vec![
                Variant::new("L", true),
                Variant::new("M", false),
                Variant::new("S", true),
            ],
        };

        let titles: Vec<_> = product
            .available_sizes("https://shop.example/products.json")
            .into_iter()
            .map(|size| size.title)
            .collect();
        assert_eq!(titles, vec!["L", "S"]);
    }
}
