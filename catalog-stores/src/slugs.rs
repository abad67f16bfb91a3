use std::fmt;
use std::sync::Arc;

use catalog_core::{bail_catalog, decode_all, CatalogError, CatalogResult, ChangeFeed, Collection, DocumentStore, Resource};
use catalog_images::ensure_absolute_url;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use crate::inputs::{check, require_id, SlugFields};
use crate::records::SlugEntity;

/// Which slug-keyed collection a [`SlugKeyedStore`] serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlugKind {
    Brands,
    Categories,
}

impl SlugKind {
    pub fn collection(&self) -> Collection {
        match self {
            SlugKind::Brands => Collection::Brands,
            SlugKind::Categories => Collection::Categories,
        }
    }

    /// Singular label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            SlugKind::Brands => "Brand",
            SlugKind::Categories => "Category",
        }
    }
}

impl fmt::Display for SlugKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Brands and categories. Keys are allocated by the store and never
/// derived from the name or slug; slugs are not required to be unique.
#[derive(Clone)]
pub struct SlugKeyedStore {
    store: Arc<dyn DocumentStore>,
    kind: SlugKind,
}

impl SlugKeyedStore {
    pub fn new(store: Arc<dyn DocumentStore>, kind: SlugKind) -> Self {
        Self { store, kind }
    }

    pub fn brands(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, SlugKind::Brands)
    }

    pub fn categories(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, SlugKind::Categories)
    }

    pub fn kind(&self) -> SlugKind {
        self.kind
    }

    /// `image_url` is the already-resolved image, see
    /// [`catalog_images::ImageResolver::resolve`].
    pub async fn create(&self, data: SlugFields, image_url: &str) -> CatalogResult<SlugEntity> {
        self.validate(&data, image_url)?;

        let id = self.store.allocate_id().await?;
        let entity = SlugEntity {
            id,
            name: data.name,
            slug: data.slug,
            image: image_url.trim().to_string(),
            timestamp_create: Utc::now(),
            timestamp_update: None,
        };

        self.store
            .insert(self.collection(), &entity.id, entity.to_document()?)
            .await?;

        info!(kind = %self.kind, id = %entity.id, slug = %entity.slug, "created");
        Ok(entity)
    }

    pub async fn update(&self, id: &str, data: SlugFields, image_url: &str) -> CatalogResult<SlugEntity> {
        require_id(id, self.kind.label())?;
        self.validate(&data, image_url)?;
        let existing = self.get_by_id(id).await?;

        let entity = SlugEntity {
            id: existing.id,
            name: data.name,
            slug: data.slug,
            image: image_url.trim().to_string(),
            timestamp_create: existing.timestamp_create,
            timestamp_update: Some(Utc::now()),
        };

        self.store
            .merge(self.collection(), id, entity.to_document()?)
            .await?;

        info!(kind = %self.kind, %id, "updated");
        Ok(entity)
    }

    pub async fn get_by_id(&self, id: &str) -> CatalogResult<SlugEntity> {
        require_id(id, self.kind.label())?;
        debug!(kind = %self.kind, %id, "loading");
        let Some(doc) = self.store.get(self.collection(), id).await? else {
            bail_catalog!(not_found, "{} not found: {}", self.kind, id);
        };
        SlugEntity::from_document(self.collection(), id, doc)
    }

    /// Whole collection ordered by key. No paging.
    pub async fn get_all(&self) -> CatalogResult<Vec<SlugEntity>> {
        let docs = self.store.list(self.collection()).await?;
        debug!(kind = %self.kind, count = docs.len(), "loaded");
        decode_all(self.collection(), docs)
    }

    /// Remove an entry. Removing an unknown id succeeds.
    pub async fn delete(&self, id: &str) -> CatalogResult<()> {
        require_id(id, self.kind.label())?;
        self.store.delete(self.collection(), id).await?;
        info!(kind = %self.kind, %id, "deleted");
        Ok(())
    }

    pub fn watch(&self) -> ChangeFeed<SlugEntity> {
        ChangeFeed::new(Arc::clone(&self.store), self.collection())
    }

    fn collection(&self) -> Collection {
        self.kind.collection()
    }

    fn validate(&self, data: &SlugFields, image_url: &str) -> CatalogResult<()> {
        check(data, self.kind.label())?;

        let image_url = image_url.trim();
        if image_url.is_empty() {
            return Err(CatalogError::validation(format!("{} image is required", self.kind))
                .with_errors(json!({ "image": ["is required"] })));
        }
        ensure_absolute_url(image_url)
            .map_err(|_| CatalogError::validation(format!("{} image must be an absolute URL", self.kind))
                .with_errors(json!({ "image": ["must be a valid URL"] })))
    }
}
