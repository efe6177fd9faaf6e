//! Business logic services.
//!
//! # Services
//!
//! - `suppliers` - Supplier and address use cases (add, update, update address, remove)
//! - `products` - Product use cases (add, update, remove)
//! - `auth` - User registration and login
//!
//! Supplier and product services take the repositories they need by
//! reference and record business-rule failures on the caller's
//! [`Notifications`](crate::notification::Notifications). Only
//! infrastructure failures come back as `Err`.

pub mod auth;
pub mod products;
pub mod suppliers;

pub use auth::{AuthError, AuthService};
pub use products::ProductService;
pub use suppliers::SupplierService;

/// Messages recorded on business-rule failures.
pub mod messages {
    pub const ID_MISMATCH: &str = "The id provided is not the same as the one in the route!";
    pub const SUPPLIER_NOT_FOUND: &str = "Supplier not found!";
    pub const ADDRESS_NOT_FOUND: &str = "Address not found!";
    pub const PRODUCT_NOT_FOUND: &str = "Product not found!";
    pub const ADDRESS_REQUIRED: &str = "Provide an address for this supplier!";
    pub const DOCUMENT_IN_USE: &str = "A supplier with this document is already registered!";
    pub const ID_IN_USE: &str = "A record with this id already exists!";
    pub const SUPPLIER_HAS_PRODUCTS: &str = "The supplier still has registered products!";
    pub const IMAGE_REQUIRED: &str = "Provide an image for this product!";
    pub const IMAGE_INVALID: &str = "The image is not valid base64!";
    pub const IMAGE_EXISTS: &str = "A file with this name already exists!";
}
