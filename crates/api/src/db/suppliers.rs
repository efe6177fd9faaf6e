//! Supplier repository.
//!
//! A supplier is always written together with its address: `add` inserts both
//! in one transaction and `remove` deletes both in one transaction.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use fornecedores_core::{Document, SupplierId, SupplierKind};

use super::addresses::{ADDRESS_COLUMNS, AddressRow};
use super::products::{PRODUCT_COLUMNS, ProductRow};
use super::{RepositoryError, map_constraint_error};
use crate::models::Supplier;

/// Supplier persistence operations.
#[async_trait]
pub trait SupplierRepository: Send + Sync {
    /// All suppliers, without address or products.
    async fn list(&self) -> Result<Vec<Supplier>, RepositoryError>;

    /// A supplier without joins.
    async fn get(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError>;

    /// A supplier with its address populated.
    async fn get_with_address(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError>;

    /// A supplier with its address and products populated.
    async fn get_with_products_and_address(
        &self,
        id: SupplierId,
    ) -> Result<Option<Supplier>, RepositoryError>;

    /// Whether another supplier (other than `except`) already uses `document`.
    async fn document_in_use(
        &self,
        document: &Document,
        except: Option<SupplierId>,
    ) -> Result<bool, RepositoryError>;

    /// Insert a supplier and its address.
    ///
    /// Returns `RepositoryError::Conflict` if the document is already taken.
    async fn add(&self, supplier: &Supplier) -> Result<(), RepositoryError>;

    /// Replace the supplier's scalar fields (name, document, kind, active).
    ///
    /// Returns `RepositoryError::NotFound` if the supplier doesn't exist.
    async fn update(&self, supplier: &Supplier) -> Result<(), RepositoryError>;

    /// Delete a supplier and its address.
    ///
    /// Returns `RepositoryError::NotFound` if the supplier doesn't exist and
    /// `RepositoryError::Conflict` if products still reference it.
    async fn remove(&self, id: SupplierId) -> Result<(), RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Row shape of the `supplier` table.
#[derive(sqlx::FromRow)]
struct SupplierRow {
    id: Uuid,
    name: String,
    document: String,
    kind: i32,
    active: bool,
}

impl TryFrom<SupplierRow> for Supplier {
    type Error = RepositoryError;

    fn try_from(row: SupplierRow) -> Result<Self, Self::Error> {
        let kind = SupplierKind::try_from(row.kind)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: SupplierId::from_uuid(row.id),
            name: row.name,
            document: Document::from_trusted(row.document),
            kind,
            active: row.active,
            address: None,
            products: Vec::new(),
        })
    }
}

/// `PostgreSQL` supplier repository.
#[derive(Debug, Clone)]
pub struct PgSupplierRepository {
    pool: PgPool,
}

impl PgSupplierRepository {
    /// Create a new supplier repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SupplierRepository for PgSupplierRepository {
    async fn list(&self) -> Result<Vec<Supplier>, RepositoryError> {
        let rows = sqlx::query_as::<_, SupplierRow>(
            r"
            SELECT id, name, document, kind, active
            FROM supplier
            ORDER BY name ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Supplier::try_from).collect()
    }

    async fn get(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let row = sqlx::query_as::<_, SupplierRow>(
            r"
            SELECT id, name, document, kind, active
            FROM supplier
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Supplier::try_from).transpose()
    }

    async fn get_with_address(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let Some(mut supplier) = self.get(id).await? else {
            return Ok(None);
        };

        let address = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM address WHERE supplier_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        supplier.address = address.map(Into::into);
        Ok(Some(supplier))
    }

    async fn get_with_products_and_address(
        &self,
        id: SupplierId,
    ) -> Result<Option<Supplier>, RepositoryError> {
        let Some(mut supplier) = self.get_with_address(id).await? else {
            return Ok(None);
        };

        let products = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE supplier_id = $1 ORDER BY name ASC"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        supplier.products = products
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;
        Ok(Some(supplier))
    }

    async fn document_in_use(
        &self,
        document: &Document,
        except: Option<SupplierId>,
    ) -> Result<bool, RepositoryError> {
        let in_use: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM supplier
                WHERE document = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            ",
        )
        .bind(document)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;

        Ok(in_use)
    }

    async fn add(&self, supplier: &Supplier) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO supplier (id, name, document, kind, active)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.document)
        .bind(supplier.kind.code())
        .bind(supplier.active)
        .execute(&mut *tx)
        .await
        .map_err(map_constraint_error)?;

        if let Some(address) = &supplier.address {
            sqlx::query(
                r"
                INSERT INTO address
                    (id, supplier_id, street, number, complement, zip_code, district, city, state)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ",
            )
            .bind(address.id)
            .bind(supplier.id)
            .bind(&address.street)
            .bind(&address.number)
            .bind(&address.complement)
            .bind(&address.zip_code)
            .bind(&address.district)
            .bind(&address.city)
            .bind(&address.state)
            .execute(&mut *tx)
            .await
            .map_err(map_constraint_error)?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, supplier: &Supplier) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE supplier
            SET name = $2, document = $3, kind = $4, active = $5
            WHERE id = $1
            ",
        )
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.document)
        .bind(supplier.kind.code())
        .bind(supplier.active)
        .execute(&self.pool)
        .await
        .map_err(map_constraint_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn remove(&self, id: SupplierId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM address WHERE supplier_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM supplier WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_constraint_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
