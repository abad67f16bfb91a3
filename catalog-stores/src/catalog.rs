use std::sync::Arc;

use catalog_core::{CatalogConfig, CatalogError, CatalogResult, DeadlineStore, DocumentStore, ErrorKind, StoreSettings};
use catalog_images::{ImageHostConfig, ImageResolver, ImgbbHost};
use tracing::info;

use crate::admins::{AdminStore, DuplicateEmailPolicy};
use crate::products::ProductStore;
use crate::slugs::SlugKeyedStore;

/// One document store and one image resolver, shared by every store.
///
/// Cheap to clone; each accessor returns a store handle over the same
/// backend.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn DocumentStore>,
    images: ImageResolver,
    duplicate_emails: DuplicateEmailPolicy,
}

impl Catalog {
    pub fn new(store: Arc<dyn DocumentStore>, images: ImageResolver) -> Self {
        Self {
            store,
            images,
            duplicate_emails: DuplicateEmailPolicy::default(),
        }
    }

    /// Build from configuration: ImgBB uploads with `images.*` settings and
    /// `backend` wrapped in a [`DeadlineStore`] bounded by `store.timeout_ms`.
    pub fn from_config<S>(backend: S, config: &CatalogConfig) -> CatalogResult<Self>
    where
        S: DocumentStore + 'static,
    {
        let snapshot = config.snapshot();

        let image_config = ImageHostConfig::from_config(&snapshot);
        let host = ImgbbHost::new(&image_config).map_err(|err| {
            CatalogError::new(ErrorKind::Upload, format!("Image host is not usable: {err}")).with_source(err)
        })?;

        let settings = StoreSettings::from_config(&snapshot);
        let store = DeadlineStore::from_settings(backend, &settings);
        let duplicate_emails = DuplicateEmailPolicy::from_config(&snapshot)?;

        info!(
            endpoint = %image_config.endpoint,
            store_timeout = ?settings.timeout,
            %duplicate_emails,
            "catalog configured"
        );

        Ok(Self::new(Arc::new(store), ImageResolver::new(host, image_config))
            .with_duplicate_email_policy(duplicate_emails))
    }

    pub fn with_duplicate_email_policy(mut self, policy: DuplicateEmailPolicy) -> Self {
        self.duplicate_emails = policy;
        self
    }

    pub fn admins(&self) -> AdminStore {
        AdminStore::new(Arc::clone(&self.store), self.images.clone()).with_duplicate_policy(self.duplicate_emails)
    }

    pub fn brands(&self) -> SlugKeyedStore {
        SlugKeyedStore::brands(Arc::clone(&self.store))
    }

    pub fn categories(&self) -> SlugKeyedStore {
        SlugKeyedStore::categories(Arc::clone(&self.store))
    }

    pub fn products(&self) -> ProductStore {
        ProductStore::new(Arc::clone(&self.store), self.images.clone())
    }

    /// Resolver for brand and category images, which take a final URL.
    pub fn images(&self) -> &ImageResolver {
        &self.images
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::MemoryDocumentStore;

    #[test]
    fn from_config_reads_policy_and_image_settings() {
        let config = CatalogConfig::new()
            .with("images.api_key", "k")
            .with("images.gallery_concurrency", "3")
            .with("admins.on_duplicate_email", "overwrite");

        let catalog = Catalog::from_config(MemoryDocumentStore::new(), &config).unwrap();
        assert_eq!(catalog.admins().duplicate_policy(), DuplicateEmailPolicy::Overwrite);
        assert_eq!(catalog.images().config().gallery_concurrency, 3);
    }

    #[test]
    fn from_config_requires_an_api_key() {
        let err = Catalog::from_config(MemoryDocumentStore::new(), &CatalogConfig::new())
            .err()
            .unwrap();
        assert!(err.is(ErrorKind::Upload));
    }

    #[test]
    fn from_config_rejects_unknown_policies() {
        let config = CatalogConfig::new()
            .with("images.api_key", "k")
            .with("admins.on_duplicate_email", "merge");
        let err = Catalog::from_config(MemoryDocumentStore::new(), &config).err().unwrap();
        assert!(err.is(ErrorKind::Validation));
    }
}
