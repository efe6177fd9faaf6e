//! Product domain types.

use chrono::{DateTime, Utc};

use fornecedores_core::{Price, ProductId, SupplierId};

/// A product (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Owning supplier (must exist).
    pub supplier_id: SupplierId,
    pub name: String,
    pub description: String,
    /// Stored image filename, relative to the image directory.
    pub image: Option<String>,
    pub price: Price,
    /// When the product was registered.
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

/// A product joined with its supplier's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListing {
    pub product: Product,
    pub supplier_name: String,
}
