//! Product repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use fornecedores_core::{Price, ProductId, SupplierId};

use super::{RepositoryError, map_constraint_error};
use crate::models::{Product, ProductListing};

/// Column list shared by every product query.
pub(super) const PRODUCT_COLUMNS: &str =
    "id, supplier_id, name, description, image, price, created_at, active";

/// Product persistence operations.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products joined with their supplier's name.
    async fn list_with_suppliers(&self) -> Result<Vec<ProductListing>, RepositoryError>;

    /// A product without joins.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// A product joined with its supplier's name.
    async fn get_with_supplier(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductListing>, RepositoryError>;

    /// Products owned by a supplier.
    async fn list_by_supplier(
        &self,
        supplier_id: SupplierId,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Insert a product.
    ///
    /// Returns `RepositoryError::Conflict` if the supplier doesn't exist.
    async fn add(&self, product: &Product) -> Result<(), RepositoryError>;

    /// Replace name, description, image, price and active flag.
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    async fn update(&self, product: &Product) -> Result<(), RepositoryError>;

    /// Delete a product.
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    async fn remove(&self, id: ProductId) -> Result<(), RepositoryError>;
}

/// Row shape of the `product` table.
#[derive(sqlx::FromRow)]
pub(super) struct ProductRow {
    id: Uuid,
    supplier_id: Uuid,
    name: String,
    description: String,
    image: Option<String>,
    price: Decimal,
    created_at: DateTime<Utc>,
    active: bool,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price =
            Price::new(row.price).map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: ProductId::from_uuid(row.id),
            supplier_id: SupplierId::from_uuid(row.supplier_id),
            name: row.name,
            description: row.description,
            image: row.image,
            price,
            created_at: row.created_at,
            active: row.active,
        })
    }
}

/// Product row joined with `supplier.name`.
#[derive(sqlx::FromRow)]
struct ProductListingRow {
    #[sqlx(flatten)]
    product: ProductRow,
    supplier_name: String,
}

impl TryFrom<ProductListingRow> for ProductListing {
    type Error = RepositoryError;

    fn try_from(row: ProductListingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product: row.product.try_into()?,
            supplier_name: row.supplier_name,
        })
    }
}

const LISTING_SELECT: &str = r"
    SELECT p.id, p.supplier_id, p.name, p.description, p.image, p.price,
           p.created_at, p.active, s.name AS supplier_name
    FROM product p
    JOIN supplier s ON s.id = p.supplier_id
";

/// `PostgreSQL` product repository.
#[derive(Debug, Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list_with_suppliers(&self) -> Result<Vec<ProductListing>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductListingRow>(&format!(
            "{LISTING_SELECT} ORDER BY p.name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn get_with_supplier(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductListing>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductListingRow>(&format!(
            "{LISTING_SELECT} WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_by_supplier(
        &self,
        supplier_id: SupplierId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE supplier_id = $1 ORDER BY name ASC"
        ))
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn add(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO product
                (id, supplier_id, name, description, image, price, created_at, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(product.id)
        .bind(product.supplier_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.image)
        .bind(product.price)
        .bind(product.created_at)
        .bind(product.active)
        .execute(&self.pool)
        .await
        .map_err(map_constraint_error)?;

        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE product
            SET name = $2, description = $3, image = $4, price = $5, active = $6
            WHERE id = $1
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.image)
        .bind(product.price)
        .bind(product.active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn remove(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
