//! Address repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use fornecedores_core::{AddressId, SupplierId};

use super::RepositoryError;
use crate::models::Address;

/// Column list shared by every address query.
pub(super) const ADDRESS_COLUMNS: &str =
    "id, supplier_id, street, number, complement, zip_code, district, city, state";

/// Address persistence operations.
///
/// Addresses are created and deleted with their supplier; this trait only
/// reads and updates them.
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Get an address by ID.
    async fn get(&self, id: AddressId) -> Result<Option<Address>, RepositoryError>;

    /// Replace an address's fields. The owning supplier is never changed.
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist.
    async fn update(&self, address: &Address) -> Result<(), RepositoryError>;
}

/// Row shape of the `address` table.
#[derive(sqlx::FromRow)]
pub(super) struct AddressRow {
    id: Uuid,
    supplier_id: Uuid,
    street: String,
    number: String,
    complement: Option<String>,
    zip_code: String,
    district: String,
    city: String,
    state: String,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::from_uuid(row.id),
            supplier_id: SupplierId::from_uuid(row.supplier_id),
            street: row.street,
            number: row.number,
            complement: row.complement,
            zip_code: row.zip_code,
            district: row.district,
            city: row.city,
            state: row.state,
        }
    }
}

/// `PostgreSQL` address repository.
#[derive(Debug, Clone)]
pub struct PgAddressRepository {
    pool: PgPool,
}

impl PgAddressRepository {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AddressRepository for PgAddressRepository {
    async fn get(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM address WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn update(&self, address: &Address) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE address
            SET street = $2, number = $3, complement = $4, zip_code = $5,
                district = $6, city = $7, state = $8
            WHERE id = $1
            ",
        )
        .bind(address.id)
        .bind(&address.street)
        .bind(&address.number)
        .bind(&address.complement)
        .bind(&address.zip_code)
        .bind(&address.district)
        .bind(&address.city)
        .bind(&address.state)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
