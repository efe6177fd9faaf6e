//! In-memory implementation of every repository trait.
//!
//! Mirrors the `PostgreSQL` constraints that matter to callers: unique
//! supplier documents, one address per supplier, products must reference an
//! existing supplier, a supplier with products cannot be deleted, and emails
//! are unique. Used by the test suites and for running without a database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use fornecedores_core::{AddressId, Document, Email, ProductId, SupplierId, UserId};

use super::{
    AddressRepository, Constraint, ProductRepository, RepositoryError, SupplierRepository,
    UserRepository,
};
use crate::models::{Address, Product, ProductListing, Supplier, User};

#[derive(Debug, Default)]
struct Tables {
    /// Suppliers stored without joins.
    suppliers: HashMap<SupplierId, Supplier>,
    addresses: HashMap<AddressId, Address>,
    products: HashMap<ProductId, Product>,
    users: HashMap<UserId, (User, String)>,
}

impl Tables {
    fn address_of(&self, supplier_id: SupplierId) -> Option<&Address> {
        self.addresses
            .values()
            .find(|a| a.supplier_id == supplier_id)
    }

    fn products_of(&self, supplier_id: SupplierId) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .values()
            .filter(|p| p.supplier_id == supplier_id)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }

    fn listing(&self, product: &Product) -> Option<ProductListing> {
        let supplier = self.suppliers.get(&product.supplier_id)?;
        Some(ProductListing {
            product: product.clone(),
            supplier_name: supplier.name.clone(),
        })
    }
}

/// Shared in-memory tables. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SupplierRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Supplier>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut suppliers: Vec<Supplier> = tables.suppliers.values().cloned().collect();
        suppliers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(suppliers)
    }

    async fn get(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        Ok(self.tables.read().await.suppliers.get(&id).cloned())
    }

    async fn get_with_address(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.suppliers.get(&id).map(|s| Supplier {
            address: tables.address_of(id).cloned(),
            ..s.clone()
        }))
    }

    async fn get_with_products_and_address(
        &self,
        id: SupplierId,
    ) -> Result<Option<Supplier>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.suppliers.get(&id).map(|s| Supplier {
            address: tables.address_of(id).cloned(),
            products: tables.products_of(id),
            ..s.clone()
        }))
    }

    async fn document_in_use(
        &self,
        document: &Document,
        except: Option<SupplierId>,
    ) -> Result<bool, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .suppliers
            .values()
            .any(|s| &s.document == document && Some(s.id) != except))
    }

    async fn add(&self, supplier: &Supplier) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;

        if tables.suppliers.contains_key(&supplier.id) {
            return Err(RepositoryError::Conflict(Constraint::DuplicateId));
        }
        if tables
            .suppliers
            .values()
            .any(|s| s.document == supplier.document)
        {
            return Err(RepositoryError::Conflict(Constraint::DuplicateKey));
        }
        if let Some(address) = &supplier.address
            && tables.addresses.contains_key(&address.id)
        {
            return Err(RepositoryError::Conflict(Constraint::DuplicateId));
        }

        if let Some(address) = &supplier.address {
            tables.addresses.insert(
                address.id,
                Address {
                    supplier_id: supplier.id,
                    ..address.clone()
                },
            );
        }
        tables.suppliers.insert(
            supplier.id,
            Supplier {
                address: None,
                products: Vec::new(),
                ..supplier.clone()
            },
        );
        Ok(())
    }

    async fn update(&self, supplier: &Supplier) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;

        if tables
            .suppliers
            .values()
            .any(|s| s.document == supplier.document && s.id != supplier.id)
        {
            return Err(RepositoryError::Conflict(Constraint::DuplicateKey));
        }

        let stored = tables
            .suppliers
            .get_mut(&supplier.id)
            .ok_or(RepositoryError::NotFound)?;
        stored.name.clone_from(&supplier.name);
        stored.document = supplier.document.clone();
        stored.kind = supplier.kind;
        stored.active = supplier.active;
        Ok(())
    }

    async fn remove(&self, id: SupplierId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;

        if !tables.suppliers.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if tables.products.values().any(|p| p.supplier_id == id) {
            return Err(RepositoryError::Conflict(Constraint::Reference));
        }

        tables.addresses.retain(|_, a| a.supplier_id != id);
        tables.suppliers.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl AddressRepository for InMemoryStore {
    async fn get(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        Ok(self.tables.read().await.addresses.get(&id).cloned())
    }

    async fn update(&self, address: &Address) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .addresses
            .get_mut(&address.id)
            .ok_or(RepositoryError::NotFound)?;
        *stored = Address {
            supplier_id: stored.supplier_id,
            ..address.clone()
        };
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn list_with_suppliers(&self) -> Result<Vec<ProductListing>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut listings: Vec<ProductListing> = tables
            .products
            .values()
            .filter_map(|p| tables.listing(p))
            .collect();
        listings.sort_by(|a, b| a.product.name.cmp(&b.product.name));
        Ok(listings)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn get_with_supplier(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductListing>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.products.get(&id).and_then(|p| tables.listing(p)))
    }

    async fn list_by_supplier(
        &self,
        supplier_id: SupplierId,
    ) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.tables.read().await.products_of(supplier_id))
    }

    async fn add(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;

        if !tables.suppliers.contains_key(&product.supplier_id) {
            return Err(RepositoryError::Conflict(Constraint::Reference));
        }
        if tables.products.contains_key(&product.id) {
            return Err(RepositoryError::Conflict(Constraint::DuplicateId));
        }

        tables.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .products
            .get_mut(&product.id)
            .ok_or(RepositoryError::NotFound)?;
        stored.name.clone_from(&product.name);
        stored.description.clone_from(&product.description);
        stored.image.clone_from(&product.image);
        stored.price = product.price;
        stored.active = product.active;
        Ok(())
    }

    async fn remove(&self, id: ProductId) -> Result<(), RepositoryError> {
        self.tables
            .write()
            .await
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|(user, _)| &user.email == email)
            .cloned())
    }

    async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|(user, _)| &user.email == email) {
            return Err(RepositoryError::Conflict(Constraint::DuplicateKey));
        }

        let user = User {
            id: UserId::new(),
            email: email.clone(),
            created_at: Utc::now(),
        };
        tables
            .users
            .insert(user.id, (user.clone(), password_hash.to_owned()));
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fornecedores_core::{Price, SupplierKind};
    use rust_decimal::Decimal;

    use super::*;

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

    fn product(supplier_id: SupplierId) -> Product {
        Product {
            id: ProductId::new(),
            supplier_id,
            name: "Caneta".to_owned(),
            description: "Caneta azul".to_owned(),
            image: Some("x_caneta.png".to_owned()),
            price: Price::new(Decimal::new(350, 2)).unwrap(),
            created_at: Utc::now(),
            active: true,
        }
    }

    #[tokio::test]
    async fn supplier_is_stored_with_its_address() {
        let store = InMemoryStore::new();
        let s = supplier("52998224725");
        SupplierRepository::add(&store, &s).await.unwrap();

        let plain = SupplierRepository::get(&store, s.id).await.unwrap().unwrap();
        assert!(plain.address.is_none());

        let joined = store.get_with_address(s.id).await.unwrap().unwrap();
        assert_eq!(joined.address, s.address);
    }

    #[tokio::test]
    async fn duplicate_document_conflicts() {
        let store = InMemoryStore::new();
        SupplierRepository::add(&store, &supplier("52998224725"))
            .await
            .unwrap();

        let err = SupplierRepository::add(&store, &supplier("529.982.247-25"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(Constraint::DuplicateKey)));
    }

    #[tokio::test]
    async fn reused_ids_conflict_on_the_id() {
        let store = InMemoryStore::new();
        let s = supplier("52998224725");
        SupplierRepository::add(&store, &s).await.unwrap();

        let same_id = Supplier {
            document: Document::parse("11222333000181", SupplierKind::Company).unwrap(),
            kind: SupplierKind::Company,
            address: None,
            ..s.clone()
        };
        let err = SupplierRepository::add(&store, &same_id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(Constraint::DuplicateId)));

        let p = product(s.id);
        ProductRepository::add(&store, &p).await.unwrap();
        let err = ProductRepository::add(&store, &p).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(Constraint::DuplicateId)));
    }

    #[tokio::test]
    async fn document_in_use_ignores_the_excepted_supplier() {
        let store = InMemoryStore::new();
        let s = supplier("52998224725");
        SupplierRepository::add(&store, &s).await.unwrap();

        assert!(store.document_in_use(&s.document, None).await.unwrap());
        assert!(!store.document_in_use(&s.document, Some(s.id)).await.unwrap());
    }

    #[tokio::test]
    async fn supplier_with_products_cannot_be_removed() {
        let store = InMemoryStore::new();
        let s = supplier("52998224725");
        SupplierRepository::add(&store, &s).await.unwrap();
        let p = product(s.id);
        ProductRepository::add(&store, &p).await.unwrap();

        let err = SupplierRepository::remove(&store, s.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(Constraint::Reference)));

        ProductRepository::remove(&store, p.id).await.unwrap();
        SupplierRepository::remove(&store, s.id).await.unwrap();

        let address_id = s.address.unwrap().id;
        assert!(AddressRepository::get(&store, address_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn product_requires_existing_supplier() {
        let store = InMemoryStore::new();
        let err = ProductRepository::add(&store, &product(SupplierId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(Constraint::Reference)));
    }

    #[tokio::test]
    async fn product_update_keeps_supplier_and_timestamp() {
        let store = InMemoryStore::new();
        let s = supplier("52998224725");
        SupplierRepository::add(&store, &s).await.unwrap();
        let p = product(s.id);
        ProductRepository::add(&store, &p).await.unwrap();

        let changed = Product {
            supplier_id: SupplierId::new(),
            created_at: Utc::now() + chrono::Duration::days(1),
            name: "Lápis".to_owned(),
            ..p.clone()
        };
        ProductRepository::update(&store, &changed).await.unwrap();

        let stored = ProductRepository::get(&store, p.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Lápis");
        assert_eq!(stored.supplier_id, p.supplier_id);
        assert_eq!(stored.created_at, p.created_at);

        let listing = store.get_with_supplier(p.id).await.unwrap().unwrap();
        assert_eq!(listing.supplier_name, "Distribuidora Norte");
    }

    #[tokio::test]
    async fn missing_rows_report_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            SupplierRepository::remove(&store, SupplierId::new()).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            ProductRepository::remove(&store, ProductId::new()).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn emails_are_unique() {
        let store = InMemoryStore::new();
        let email = Email::parse("compras@fornecedor.com.br").unwrap();
        store.create_with_password(&email, "hash").await.unwrap();

        let err = store
            .create_with_password(&email, "other")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let (user, hash) = store.get_password_hash(&email).await.unwrap().unwrap();
        assert_eq!(hash, "hash");
        assert_eq!(user.email, email);
    }
}
