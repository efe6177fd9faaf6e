//! Supplier kind (individual or company).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a numeric code does not name a [`SupplierKind`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid supplier kind: {0} (expected 1 or 2)")]
pub struct InvalidSupplierKind(pub i32);

/// Whether a supplier is a natural person or a legal entity.
///
/// On the wire and in the database the kind is an integer code:
/// `1` for an individual (identified by a CPF) and `2` for a company
/// (identified by a CNPJ).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "i32", into = "i32")]
pub enum SupplierKind {
    /// Natural person, identified by an 11-digit CPF.
    #[default]
    Individual,
    /// Legal entity, identified by a 14-digit CNPJ.
    Company,
}

impl SupplierKind {
    /// Integer code used on the wire and in storage.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Individual => 1,
            Self::Company => 2,
        }
    }

    /// Number of digits in this kind's taxpayer document.
    #[must_use]
    pub const fn document_len(self) -> usize {
        match self {
            Self::Individual => 11,
            Self::Company => 14,
        }
    }
}

impl TryFrom<i32> for SupplierKind {
    type Error = InvalidSupplierKind;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Individual),
            2 => Ok(Self::Company),
            other => Err(InvalidSupplierKind(other)),
        }
    }
}

impl From<SupplierKind> for i32 {
    fn from(kind: SupplierKind) -> Self {
        kind.code()
    }
}

impl fmt::Display for SupplierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual => write!(f, "individual"),
            Self::Company => write!(f, "company"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes() {
        assert_eq!(serde_json::to_string(&SupplierKind::Company).unwrap(), "2");
        let kind: SupplierKind = serde_json::from_str("1").unwrap();
        assert_eq!(kind, SupplierKind::Individual);
        assert!(serde_json::from_str::<SupplierKind>("3").is_err());
    }

    #[test]
    fn document_lengths() {
        assert_eq!(SupplierKind::Individual.document_len(), 11);
        assert_eq!(SupplierKind::Company.document_len(), 14);
    }
}
