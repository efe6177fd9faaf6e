//! Supplier use cases.

use fornecedores_core::SupplierId;

use super::messages;
use crate::db::{
    AddressRepository, Constraint, ProductRepository, RepositoryError, SupplierRepository,
};
use crate::models::{Address, Supplier};
use crate::notification::Notifications;

/// Supplier and address use cases.
pub struct SupplierService<'a> {
    suppliers: &'a dyn SupplierRepository,
    addresses: &'a dyn AddressRepository,
    products: &'a dyn ProductRepository,
}

impl<'a> SupplierService<'a> {
    #[must_use]
    pub const fn new(
        suppliers: &'a dyn SupplierRepository,
        addresses: &'a dyn AddressRepository,
        products: &'a dyn ProductRepository,
    ) -> Self {
        Self {
            suppliers,
            addresses,
            products,
        }
    }

    /// Register a supplier together with its address.
    ///
    /// Refused when the address is missing or the document is already used.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on infrastructure failures.
    #[tracing::instrument(skip_all, fields(supplier_id = %supplier.id))]
    pub async fn add(
        &self,
        supplier: &Supplier,
        notifications: &mut Notifications,
    ) -> Result<(), RepositoryError> {
        if supplier.address.is_none() {
            notifications.notify(messages::ADDRESS_REQUIRED);
            return Ok(());
        }
        if self
            .suppliers
            .document_in_use(&supplier.document, None)
            .await?
        {
            notifications.notify(messages::DOCUMENT_IN_USE);
            return Ok(());
        }

        match self.suppliers.add(supplier).await {
            Ok(()) => {
                tracing::info!("supplier added");
                Ok(())
            }
            Err(RepositoryError::Conflict(Constraint::DuplicateKey)) => {
                notifications.notify(messages::DOCUMENT_IN_USE);
                Ok(())
            }
            // Supplier or address id sent by the client is taken.
            Err(RepositoryError::Conflict(Constraint::DuplicateId)) => {
                notifications.notify(messages::ID_IN_USE);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Replace a supplier's scalar fields. Address and products are untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on infrastructure failures.
    #[tracing::instrument(skip_all, fields(supplier_id = %supplier.id))]
    pub async fn update(
        &self,
        supplier: &Supplier,
        notifications: &mut Notifications,
    ) -> Result<(), RepositoryError> {
        if self
            .suppliers
            .document_in_use(&supplier.document, Some(supplier.id))
            .await?
        {
            notifications.notify(messages::DOCUMENT_IN_USE);
            return Ok(());
        }

        match self.suppliers.update(supplier).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => {
                notifications.notify(messages::SUPPLIER_NOT_FOUND);
                Ok(())
            }
            Err(RepositoryError::Conflict(Constraint::DuplicateKey)) => {
                notifications.notify(messages::DOCUMENT_IN_USE);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Replace an address's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on infrastructure failures.
    #[tracing::instrument(skip_all, fields(address_id = %address.id))]
    pub async fn update_address(
        &self,
        address: &Address,
        notifications: &mut Notifications,
    ) -> Result<(), RepositoryError> {
        match self.addresses.get(address.id).await? {
            Some(stored) if stored.supplier_id == address.supplier_id => {}
            _ => {
                notifications.notify(messages::ADDRESS_NOT_FOUND);
                return Ok(());
            }
        }

        match self.addresses.update(address).await {
            Err(RepositoryError::NotFound) => {
                notifications.notify(messages::ADDRESS_NOT_FOUND);
                Ok(())
            }
            other => other,
        }
    }

    /// Remove a supplier and its address.
    ///
    /// Refused while any product still references the supplier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on infrastructure failures.
    #[tracing::instrument(skip_all, fields(supplier_id = %id))]
    pub async fn remove(
        &self,
        id: SupplierId,
        notifications: &mut Notifications,
    ) -> Result<(), RepositoryError> {
        if !self.products.list_by_supplier(id).await?.is_empty() {
            notifications.notify(messages::SUPPLIER_HAS_PRODUCTS);
            return Ok(());
        }

        match self.suppliers.remove(id).await {
            Ok(()) => {
                tracing::info!("supplier removed");
                Ok(())
            }
            Err(RepositoryError::NotFound) => {
                notifications.notify(messages::SUPPLIER_NOT_FOUND);
                Ok(())
            }
            Err(RepositoryError::Conflict(Constraint::Reference)) => {
                notifications.notify(messages::SUPPLIER_HAS_PRODUCTS);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use fornecedores_core::{AddressId, Document, Price, ProductId, SupplierKind};

    use super::*;
    use crate::db::InMemoryStore;
    use crate::models::Product;

    fn supplier(document: &str) -> Supplier {
        let id = SupplierId::new();
        Supplier {
            id,
            name: "Distribuidora Norte".to_owned(),
            document: Document::parse(document, SupplierKind::Individual).unwrap(),
            kind: SupplierKind::Individual,
            active: true,
            address: Some(Address {
                id: AddressId::new(),
                supplier_id: id,
                street: "Rua das Flores".to_owned(),
                number: "100".to_owned(),
                complement: None,
                zip_code: "01001000".to_owned(),
                district: "Centro".to_owned(),
                city: "São Paulo".to_owned(),
                state: "SP".to_owned(),
            }),
            products: Vec::new(),
        }
    }

    fn service(store: &InMemoryStore) -> SupplierService<'_> {
        SupplierService::new(store, store, store)
    }

    #[tokio::test]
    async fn add_requires_address() {
        let store = InMemoryStore::new();
        let mut notifications = Notifications::new();
        let s = Supplier {
            address: None,
            ..supplier("52998224725")
        };

        service(&store).add(&s, &mut notifications).await.unwrap();

        assert_eq!(notifications.messages(), [messages::ADDRESS_REQUIRED]);
        assert!(SupplierRepository::get(&store, s.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_document_is_notified() {
        let store = InMemoryStore::new();
        let mut notifications = Notifications::new();
        service(&store)
            .add(&supplier("52998224725"), &mut notifications)
            .await
            .unwrap();
        assert!(!notifications.has_any());

        service(&store)
            .add(&supplier("529.982.247-25"), &mut notifications)
            .await
            .unwrap();
        assert_eq!(notifications.messages(), [messages::DOCUMENT_IN_USE]);
    }

    #[tokio::test]
    async fn reused_id_is_not_reported_as_a_document_clash() {
        let store = InMemoryStore::new();
        let mut notifications = Notifications::new();
        let s = supplier("52998224725");
        service(&store).add(&s, &mut notifications).await.unwrap();

        let same_id = Supplier {
            id: s.id,
            document: Document::parse("11222333000181", SupplierKind::Company).unwrap(),
            kind: SupplierKind::Company,
            ..supplier("52998224725")
        };
        service(&store).add(&same_id, &mut notifications).await.unwrap();

        assert_eq!(notifications.messages(), [messages::ID_IN_USE]);
    }

    #[tokio::test]
    async fn update_keeps_own_document() {
        let store = InMemoryStore::new();
        let mut notifications = Notifications::new();
        let s = supplier("52998224725");
        service(&store).add(&s, &mut notifications).await.unwrap();

        let renamed = Supplier {
            name: "Distribuidora Sul".to_owned(),
            address: None,
            ..s.clone()
        };
        service(&store)
            .update(&renamed, &mut notifications)
            .await
            .unwrap();

        assert!(!notifications.has_any());
        let stored = store.get_with_address(s.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Distribuidora Sul");
        assert_eq!(stored.address, s.address);
    }

    #[tokio::test]
    async fn address_cannot_move_to_another_supplier() {
        let store = InMemoryStore::new();
        let mut notifications = Notifications::new();
        let s = supplier("52998224725");
        service(&store).add(&s, &mut notifications).await.unwrap();

        let moved = Address {
            supplier_id: SupplierId::new(),
            ..s.address.clone().unwrap()
        };
        service(&store)
            .update_address(&moved, &mut notifications)
            .await
            .unwrap();
        assert_eq!(notifications.messages(), [messages::ADDRESS_NOT_FOUND]);
    }

    #[tokio::test]
    async fn remove_is_refused_while_products_exist() {
        let store = InMemoryStore::new();
        let mut notifications = Notifications::new();
        let s = supplier("52998224725");
        service(&store).add(&s, &mut notifications).await.unwrap();
        ProductRepository::add(
            &store,
            &Product {
                id: ProductId::new(),
                supplier_id: s.id,
                name: "Caneta".to_owned(),
                description: "Caneta azul".to_owned(),
                image: None,
                price: Price::new(Decimal::ONE).unwrap(),
                created_at: Utc::now(),
                active: true,
            },
        )
        .await
        .unwrap();

        service(&store).remove(s.id, &mut notifications).await.unwrap();

        assert_eq!(notifications.messages(), [messages::SUPPLIER_HAS_PRODUCTS]);
        assert!(SupplierRepository::get(&store, s.id).await.unwrap().is_some());
    }
}
