//! Supplier record

use serde::{Deserialize, Serialize};

use crate::entities::de_opt_id;

/// An approved supplier. `products` survived two backend generations: an
/// array of product objects, or one comma-joined string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<i64>,

    #[serde(default)]
    pub name: String,

    /// Tax id, 11 digits
    #[serde(default)]
    pub cuit: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub products: ProductsField,
}

/// Offered products in either historical representation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductsField {
    List(Vec<ProductEntry>),
    Joined(String),
}

impl Default for ProductsField {
    fn default() -> Self {
        ProductsField::Joined(String::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductEntry {
    Name(String),
    Object(ProductRef),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRef {
    #[serde(default, alias = "productName", alias = "product_name", alias = "product")]
    pub name: String,
}

impl ProductsField {
    /// Comma-joined rendering, the shape filters and reports work with
    pub fn joined(&self) -> String {
        match self {
            ProductsField::Joined(s) => s.clone(),
            ProductsField::List(entries) => entries
                .iter()
                .map(|entry| match entry {
                    ProductEntry::Name(name) => name.as_str(),
                    ProductEntry::Object(obj) => obj.name.as_str(),
                })
                .filter(|name| !name.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
