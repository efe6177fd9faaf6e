//! Domain models for the supplier catalog.
//!
//! These types represent persisted entities, separate from the wire DTOs in
//! [`crate::dto`]. Conversions between the two live in [`crate::conversions`].

pub mod product;
pub mod session;
pub mod supplier;
pub mod user;

pub use product::{Product, ProductListing};
pub use session::{CurrentUser, keys as session_keys};
pub use supplier::{Address, Supplier};
pub use user::User;
