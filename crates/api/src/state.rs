//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::Repositories;
use crate::services::{AuthService, ProductService, SupplierService};
use crate::storage::ImageStorage;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// repositories, image storage and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    repositories: Repositories,
    images: ImageStorage,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Images are written to `config.image_dir`.
    #[must_use]
    pub fn new(config: ApiConfig, repositories: Repositories) -> Self {
        let images = ImageStorage::new(config.image_dir.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                repositories,
                images,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the repository set.
    #[must_use]
    pub fn repositories(&self) -> &Repositories {
        &self.inner.repositories
    }

    /// Get a reference to the image storage.
    #[must_use]
    pub fn images(&self) -> &ImageStorage {
        &self.inner.images
    }

    /// Supplier use cases over this state's repositories.
    #[must_use]
    pub fn supplier_service(&self) -> SupplierService<'_> {
        let repos = self.repositories();
        SupplierService::new(&*repos.suppliers, &*repos.addresses, &*repos.products)
    }

    /// Product use cases over this state's repositories.
    #[must_use]
    pub fn product_service(&self) -> ProductService<'_> {
        let repos = self.repositories();
        ProductService::new(&*repos.products, &*repos.suppliers)
    }

    /// Authentication over this state's user repository.
    #[must_use]
    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(&*self.repositories().users)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("images", &self.inner.images)
            .finish_non_exhaustive()
    }
}
