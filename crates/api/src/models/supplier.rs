//! Supplier and address domain types.

use fornecedores_core::{AddressId, Document, SupplierId, SupplierKind};

use super::product::Product;

/// A supplier (domain type).
///
/// `address` and `products` are populated only by the repository fetch
/// variants that join them; plain fetches leave them empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supplier {
    /// Unique supplier ID.
    pub id: SupplierId,
    /// Display name.
    pub name: String,
    /// Validated CPF or CNPJ digits.
    pub document: Document,
    /// Individual or company.
    pub kind: SupplierKind,
    /// Whether the supplier is active.
    pub active: bool,
    /// Owned address, when joined.
    pub address: Option<Address>,
    /// Products referencing this supplier, when joined.
    pub products: Vec<Product>,
}

/// A supplier's postal address.
///
/// Owned by exactly one supplier and removed together with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// Owning supplier.
    pub supplier_id: SupplierId,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    /// Eight-digit CEP.
    pub zip_code: String,
    pub district: String,
    pub city: String,
    pub state: String,
}
