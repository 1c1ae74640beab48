//! Catalog entry types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A product catalog entry.
///
/// Only `itemId` is required when decoding; the remaining fields are passed
/// through to the store as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog item identifier (store key).
    pub item_id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(rename = "desc", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unit price, exchanged as a JSON number.
    #[serde(default, with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
}

impl Product {
    /// Create a product with the given id and price.
    pub fn new(item_id: impl Into<String>, price: Decimal) -> Self {
        Self {
            item_id: item_id.into(),
            name: None,
            description: None,
            price,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn product_uses_catalog_field_names() {
        let product = Product::new("329299", dec!(34.99))
            .with_name("Red Fedora")
            .with_description("Official Red Hat Fedora");

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "itemId": "329299",
                "name": "Red Fedora",
                "desc": "Official Red Hat Fedora",
                "price": 34.99
            })
        );
    }

    #[test]
    fn product_decodes_with_only_item_id() {
        let product: Product = serde_json::from_str(r#"{"itemId":"444434"}"#).unwrap();
        assert_eq!(product.item_id, "444434");
        assert_eq!(product.name, None);
        assert_eq!(product.price, Decimal::ZERO);
    }

    #[test]
    fn product_decodes_numeric_price() {
        let product: Product =
            serde_json::from_str(r#"{"itemId":"165613","name":"Solid Performance Polo","price":17.8}"#)
                .unwrap();
        assert_eq!(product.price, dec!(17.8));
        assert_eq!(product.name.as_deref(), Some("Solid Performance Polo"));
    }

    #[test]
    fn product_requires_item_id() {
        let result: Result<Product, _> = serde_json::from_str(r#"{"name":"Nameless"}"#);
        assert!(result.is_err());
    }
}
