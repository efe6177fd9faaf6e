//! Product use cases.

use fornecedores_core::{ProductId, SupplierId};

use super::messages;
use crate::db::{Constraint, ProductRepository, RepositoryError, SupplierRepository};
use crate::models::Product;
use crate::notification::Notifications;

/// Product use cases.
pub struct ProductService<'a> {
    products: &'a dyn ProductRepository,
    suppliers: &'a dyn SupplierRepository,
}

impl<'a> ProductService<'a> {
    #[must_use]
    pub const fn new(
        products: &'a dyn ProductRepository,
        suppliers: &'a dyn SupplierRepository,
    ) -> Self {
        Self {
            products,
            suppliers,
        }
    }

    /// Check the owning supplier exists, notifying when it doesn't.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on infrastructure failures.
    pub async fn ensure_supplier(
        &self,
        supplier_id: SupplierId,
        notifications: &mut Notifications,
    ) -> Result<bool, RepositoryError> {
        if self.suppliers.get(supplier_id).await?.is_some() {
            return Ok(true);
        }
        notifications.notify(messages::SUPPLIER_NOT_FOUND);
        Ok(false)
    }

    /// Register a product for an existing supplier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on infrastructure failures.
    #[tracing::instrument(skip_all, fields(product_id = %product.id))]
    pub async fn add(
        &self,
        product: &Product,
        notifications: &mut Notifications,
    ) -> Result<(), RepositoryError> {
        if !self
            .ensure_supplier(product.supplier_id, notifications)
            .await?
        {
            return Ok(());
        }

        match self.products.add(product).await {
            Ok(()) => {
                tracing::info!("product added");
                Ok(())
            }
            Err(RepositoryError::Conflict(Constraint::Reference)) => {
                notifications.notify(messages::SUPPLIER_NOT_FOUND);
                Ok(())
            }
            Err(RepositoryError::Conflict(Constraint::DuplicateId)) => {
                notifications.notify(messages::ID_IN_USE);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Persist name, description, image, price and active flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on infrastructure failures.
    #[tracing::instrument(skip_all, fields(product_id = %product.id))]
    pub async fn update(
        &self,
        product: &Product,
        notifications: &mut Notifications,
    ) -> Result<(), RepositoryError> {
        match self.products.update(product).await {
            Err(RepositoryError::NotFound) => {
                notifications.notify(messages::PRODUCT_NOT_FOUND);
                Ok(())
            }
            other => other,
        }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` on infrastructure failures.
    #[tracing::instrument(skip_all, fields(product_id = %id))]
    pub async fn remove(
        &self,
        id: ProductId,
        notifications: &mut Notifications,
    ) -> Result<(), RepositoryError> {
        match self.products.remove(id).await {
            Ok(()) => {
                tracing::info!("product removed");
                Ok(())
            }
            Err(RepositoryError::NotFound) => {
                notifications.notify(messages::PRODUCT_NOT_FOUND);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
