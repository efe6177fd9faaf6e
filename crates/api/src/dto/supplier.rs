//! Supplier and address bodies.

use serde::{Deserialize, Serialize};
use validator::Validate;

use fornecedores_core::{AddressId, SupplierId};

use super::product::ProductDto;
use super::{digits_only, required_supplier};

/// Supplier as sent and received over HTTP.
///
/// A nil (or absent) `id` on create means "assign one".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplierDto {
    pub id: SupplierId,

    #[validate(length(min = 2, max = 100, message = "must be between 2 and 100 characters"))]
    pub nome: String,

    /// CPF (11 digits) or CNPJ (14 digits), punctuation allowed.
    #[validate(length(min = 11, max = 18, message = "must be between 11 and 18 characters"))]
    pub documento: String,

    /// `1` for an individual, `2` for a company.
    #[validate(range(min = 1, max = 2, message = "must be 1 (individual) or 2 (company)"))]
    pub tipo_fornecedor: i32,

    pub ativo: bool,

    #[validate(nested)]
    pub endereco: Option<AddressDto>,

    /// Only populated on reads; ignored on writes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub produtos: Vec<ProductDto>,
}

/// Address as sent and received over HTTP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressDto {
    pub id: AddressId,

    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub logradouro: String,

    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub numero: String,

    #[validate(length(max = 250, message = "must be at most 250 characters"))]
    pub complemento: Option<String>,

    #[validate(
        length(equal = 8, message = "must have exactly 8 digits"),
        custom(function = "digits_only")
    )]
    pub cep: String,

    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub bairro: String,

    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub cidade: String,

    #[validate(length(min = 2, max = 50, message = "must be between 2 and 50 characters"))]
    pub estado: String,

    /// Owning supplier; on supplier create it is filled from the supplier.
    pub fornecedor_id: SupplierId,
}

impl AddressDto {
    /// Check the owning supplier is set, for standalone address updates.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of the body plus a missing `fornecedorId`.
    pub fn validate_standalone(&self) -> Result<(), validator::ValidationErrors> {
        let mut result = self.validate();
        if let Err(e) = required_supplier(&self.fornecedor_id) {
            let mut errors = result.err().unwrap_or_default();
            errors.add("fornecedor_id", e);
            result = Err(errors);
        }
        result
    }
}
