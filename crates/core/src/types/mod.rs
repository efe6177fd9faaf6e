//! Core types for the supplier catalog.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod document;
pub mod email;
pub mod id;
pub mod kind;
pub mod price;

pub use document::{Document, DocumentError};
pub use email::{Email, EmailError};
pub use id::*;
pub use kind::{InvalidSupplierKind, SupplierKind};
pub use price::{Price, PriceError};
