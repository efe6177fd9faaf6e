//! Supplier catalog core - shared types library.
//!
//! This crate provides the types shared by every component of the workspace:
//! - `api` - The REST backend for suppliers, addresses and products
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, taxpayer documents, supplier kinds and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
