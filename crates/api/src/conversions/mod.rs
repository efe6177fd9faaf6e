//! Explicit conversions between domain models and wire DTOs.
//!
//! Every field is copied by hand. Derived read-only fields (`nomeFornecedor`)
//! are filled only from joined data and never flow back into a model.

mod product;
mod supplier;

use thiserror::Error;

use fornecedores_core::{DocumentError, InvalidSupplierKind, PriceError};

pub use product::{convert_listing, convert_product, product_from_dto};
pub use supplier::{address_from_dto, convert_address, convert_supplier, supplier_from_dto};

/// A DTO passed schema validation but does not form a valid model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("tipoFornecedor: {0}")]
    Kind(#[from] InvalidSupplierKind),

    #[error("documento: {0}")]
    Document(#[from] DocumentError),

    #[error("valor: {0}")]
    Price(#[from] PriceError),
}
