//! Brazilian taxpayer documents (CPF and CNPJ).
//!
//! Individuals are identified by an 11-digit CPF and companies by a 14-digit
//! CNPJ. Both end in two check digits computed with a weighted modulo-11 sum,
//! which [`Document::parse`] verifies.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::kind::SupplierKind;

/// CNPJ check-digit weights. The first check digit skips the leading `6`.
const CNPJ_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Errors that can occur when parsing a [`Document`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The input contains characters other than digits and punctuation.
    #[error("document must contain only digits")]
    NonDigit,
    /// Wrong number of digits for the supplier kind.
    #[error("document for a {kind} supplier must have {expected} digits (got {actual})")]
    WrongLength {
        /// Supplier kind the document was checked against.
        kind: SupplierKind,
        /// Required digit count.
        expected: usize,
        /// Digit count found.
        actual: usize,
    },
    /// All digits are the same (e.g. `111.111.111-11`), which passes the
    /// checksum but is never issued.
    #[error("document cannot repeat a single digit")]
    RepeatedDigits,
    /// The check digits do not match.
    #[error("document check digits are invalid")]
    InvalidCheckDigits,
}

/// A validated CPF or CNPJ, stored as bare digits.
///
/// Punctuation (`.`, `-`, `/`) and surrounding whitespace are accepted on
/// input and stripped.
///
/// ```
/// use fornecedores_core::{Document, SupplierKind};
///
/// let cpf = Document::parse("529.982.247-25", SupplierKind::Individual).unwrap();
/// assert_eq!(cpf.as_str(), "52998224725");
///
/// let cnpj = Document::parse("11.222.333/0001-81", SupplierKind::Company).unwrap();
/// assert_eq!(cnpj.as_str(), "11222333000181");
///
/// assert!(Document::parse("529.982.247-26", SupplierKind::Individual).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(String);

impl Document {
    /// Parse and validate a document for the given supplier kind.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentError`] if the input has non-digit characters, the
    /// wrong length for `kind`, a single repeated digit, or bad check digits.
    pub fn parse(input: &str, kind: SupplierKind) -> Result<Self, DocumentError> {
        let mut digits = Vec::with_capacity(kind.document_len());
        for c in input.trim().chars() {
            match c {
                '.' | '-' | '/' | ' ' => {}
                _ => digits.push(c.to_digit(10).ok_or(DocumentError::NonDigit)?),
            }
        }

        if digits.len() != kind.document_len() {
            return Err(DocumentError::WrongLength {
                kind,
                expected: kind.document_len(),
                actual: digits.len(),
            });
        }

        if digits.windows(2).all(|pair| pair.first() == pair.last()) {
            return Err(DocumentError::RepeatedDigits);
        }

        let valid = match kind {
            SupplierKind::Individual => cpf_is_valid(&digits),
            SupplierKind::Company => cnpj_is_valid(&digits),
        };
        if !valid {
            return Err(DocumentError::InvalidCheckDigits);
        }

        Ok(Self(
            digits
                .iter()
                .filter_map(|d| char::from_digit(*d, 10))
                .collect(),
        ))
    }

    /// Wrap digits loaded from storage without re-validating them.
    #[must_use]
    pub const fn from_trusted(digits: String) -> Self {
        Self(digits)
    }

    /// Returns the bare digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Document {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Modulo-11 check digit over `digits` with the given weights.
fn check_digit(digits: &[u32], weights: impl Iterator<Item = u32>) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        0 | 1 => 0,
        r => 11 - r,
    }
}

fn cpf_is_valid(digits: &[u32]) -> bool {
    let (Some(body), Some(tail)) = (digits.get(..9), digits.get(9..)) else {
        return false;
    };
    let first = check_digit(body, (2..=10).rev());
    let mut extended = body.to_vec();
    extended.push(first);
    let second = check_digit(&extended, (2..=11).rev());
    tail == [first, second].as_slice()
}

fn cnpj_is_valid(digits: &[u32]) -> bool {
    let (Some(body), Some(tail)) = (digits.get(..12), digits.get(12..)) else {
        return false;
    };
    let first = check_digit(body, CNPJ_WEIGHTS.iter().skip(1).copied());
    let mut extended = body.to_vec();
    extended.push(first);
    let second = check_digit(&extended, CNPJ_WEIGHTS.iter().copied());
    tail == [first, second].as_slice()
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Document {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Document {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Document {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
