//! Supplier catalog REST API.
//!
//! Manages suppliers ("fornecedores"), their postal addresses and the
//! products they sell. Exposed as a library so the binary, the CLI and the
//! integration tests share the same router and repositories.
//!
//! # Layers
//!
//! - [`routes`]: axum handlers and the middleware stack
//! - [`dto`] and [`conversions`]: wire types and mapping to [`models`]
//! - [`services`]: business rules, reporting failures as [`notification`]s
//! - [`db`]: repository traits with `PostgreSQL` and in-memory backends
//! - [`storage`]: product image files

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod conversions;
pub mod db;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod notification;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
