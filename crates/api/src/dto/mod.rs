//! Wire-shaped request and response bodies.
//!
//! Field names follow the public JSON format (camelCase Portuguese). Schema
//! rules are declared with `validator` derives and checked by handlers before
//! any service call; [`validation_messages`] turns a failed check into the
//! `field: message` strings returned in the failure envelope.

pub mod auth;
pub mod product;
pub mod supplier;

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use fornecedores_core::{Price, SupplierId};

pub use auth::{LoginRequest, RegisterRequest, UserDto};
pub use product::{ProductDto, ProductImageForm, UploadedFile};
pub use supplier::{AddressDto, SupplierDto};

/// Flatten validator errors into sorted `field: message` strings.
///
/// Nested structs are reported as `parent.child` and list items as
/// `parent[index].child`, using wire field names.
#[must_use]
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect(errors, None, &mut messages);
    messages.sort();
    messages
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        // Struct-level checks carry a complete message of their own.
        if let ("__all__", ValidationErrorsKind::Field(struct_errors)) = (&**field, kind) {
            out.extend(struct_errors.iter().map(describe));
            continue;
        }

        let name = camel_case(field);
        let path = match prefix {
            Some(parent) => format!("{parent}.{name}"),
            None => name,
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    out.push(format!("{path}: {}", describe(error)));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, Some(&format!("{path}[{index}]")), out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map_or_else(|| format!("is invalid ({})", error.code), ToString::to_string)
}

/// `tipo_fornecedor` -> `tipoFornecedor`.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

// =============================================================================
// Custom validators
// =============================================================================

pub(crate) fn required_supplier(id: &SupplierId) -> Result<(), ValidationError> {
    if id.is_nil() {
        return Err(ValidationError::new("required").with_message("is required".into()));
    }
    Ok(())
}

/// Strictly positive, and storable as a [`Price`].
pub(crate) fn positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(
            ValidationError::new("range").with_message("must be greater than zero".into())
        );
    }
    Price::new(*amount)
        .map(|_| ())
        .map_err(|e| ValidationError::new("range").with_message(e.to_string().into()))
}

pub(crate) fn digits_only(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }
    Err(ValidationError::new("digits").with_message("must contain only digits".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_matches_wire_names() {
        assert_eq!(camel_case("tipo_fornecedor"), "tipoFornecedor");
        assert_eq!(camel_case("nome"), "nome");
        assert_eq!(camel_case("_private"), "private");
    }

    #[test]
    fn custom_validators() {
        assert!(required_supplier(&SupplierId::nil()).is_err());
        assert!(required_supplier(&SupplierId::new()).is_ok());
        assert!(positive_amount(&Decimal::ZERO).is_err());
        assert!(positive_amount(&Decimal::new(1, 2)).is_ok());
        assert!(positive_amount(&Decimal::new(1, 3)).is_err());
        assert!(digits_only("01001000").is_ok());
        assert!(digits_only("01001-000").is_err());
    }
}
