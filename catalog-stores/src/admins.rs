use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use catalog_core::{
    bail_catalog, decode_all, CatalogConfigSnapshot, CatalogError, CatalogResult, ChangeFeed, Collection,
    DocumentStore, ErrorKind, Resource,
};
use catalog_images::{ImageFile, ImageResolver};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::inputs::{check, require_id, AdminChanges, NewAdmin};
use crate::orphans;
use crate::records::Admin;

/// What to do when an admin is written under an email that is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateEmailPolicy {
    /// Fail with a Conflict error and leave the existing admin alone.
    #[default]
    Reject,
    /// Last write wins.
    Overwrite,
}

impl DuplicateEmailPolicy {
    /// Read `admins.on_duplicate_email`; absent means [`Self::Reject`].
    pub fn from_config(config: &CatalogConfigSnapshot) -> CatalogResult<Self> {
        match config.get("admins.on_duplicate_email") {
            Some(raw) => raw.parse(),
            None => Ok(Self::default()),
        }
    }
}

impl FromStr for DuplicateEmailPolicy {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "overwrite" => Ok(Self::Overwrite),
            other => Err(CatalogError::validation(format!(
                "admins.on_duplicate_email must be `reject` or `overwrite`, got `{other}`"
            ))),
        }
    }
}

impl fmt::Display for DuplicateEmailPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => f.write_str("reject"),
            Self::Overwrite => f.write_str("overwrite"),
        }
    }
}

/// Admins, keyed by their email.
///
/// Changing an admin's email moves the document: the new key is written
/// first and the old one removed after. If the removal fails both
/// documents exist and the error is returned. Retrying the same update
/// resumes the move, and so does a plain delete of the old key.
#[derive(Clone)]
pub struct AdminStore {
    store: Arc<dyn DocumentStore>,
    images: ImageResolver,
    on_duplicate: DuplicateEmailPolicy,
}

impl AdminStore {
    pub fn new(store: Arc<dyn DocumentStore>, images: ImageResolver) -> Self {
        Self {
            store,
            images,
            on_duplicate: DuplicateEmailPolicy::default(),
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicateEmailPolicy) -> Self {
        self.on_duplicate = policy;
        self
    }

    pub fn duplicate_policy(&self) -> DuplicateEmailPolicy {
        self.on_duplicate
    }

    pub async fn create(&self, data: NewAdmin, image: Option<ImageFile>) -> CatalogResult<Admin> {
        check(&data, Admin::LABEL)?;
        let image = image.ok_or_else(|| CatalogError::validation("Image is required"))?;

        let image_url = self.images.upload(image).await?;

        let admin = Admin {
            id: data.email.clone(),
            name: data.name,
            email: data.email,
            image_url,
            timestamp_create: Utc::now(),
            timestamp_update: None,
        };

        if let Err(err) = self.write_new(&admin).await {
            orphans::report(Admin::LABEL, std::slice::from_ref(&admin.image_url), &err);
            return Err(err);
        }

        info!(id = %admin.id, "admin created");
        Ok(admin)
    }

    /// Update an admin. When `data.email` differs from `data.id` the admin
    /// is re-keyed under the new email.
    pub async fn update(&self, data: AdminChanges, image: Option<ImageFile>) -> CatalogResult<Admin> {
        check(&data, Admin::LABEL)?;
        let existing = self.get_by_id(&data.id).await?;

        let uploaded = match image {
            Some(file) => Some(self.images.upload(file).await?),
            None => None,
        };

        let now = Utc::now();
        let admin = Admin {
            id: data.email.clone(),
            name: data.name,
            email: data.email,
            image_url: uploaded.clone().unwrap_or(existing.image_url),
            timestamp_create: existing.timestamp_create,
            timestamp_update: Some(now),
        };

        let written = if admin.id == data.id {
            self.patch(&admin).await
        } else {
            self.rename(&data.id, &admin).await
        };

        if let Err(err) = written {
            if let Some(url) = &uploaded {
                orphans::report(Admin::LABEL, std::slice::from_ref(url), &err);
            }
            return Err(err);
        }

        Ok(admin)
    }

    /// Remove an admin. Removing an unknown id succeeds.
    pub async fn delete(&self, id: &str) -> CatalogResult<()> {
        require_id(id, Admin::LABEL)?;
        self.store.delete(Collection::Admins, id).await?;
        info!(%id, "admin deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> CatalogResult<Admin> {
        require_id(id, Admin::LABEL)?;
        debug!(%id, "loading admin");
        let Some(doc) = self.store.get(Collection::Admins, id).await? else {
            bail_catalog!(not_found, "Admin not found: {}", id);
        };
        Admin::from_document(Collection::Admins, id, doc)
    }

    /// Every admin, ordered by email.
    pub async fn get_all(&self) -> CatalogResult<Vec<Admin>> {
        let docs = self.store.list(Collection::Admins).await?;
        debug!(count = docs.len(), "loaded admins");
        decode_all(Collection::Admins, docs)
    }

    pub fn watch(&self) -> ChangeFeed<Admin> {
        ChangeFeed::new(Arc::clone(&self.store), Collection::Admins)
    }

    async fn write_new(&self, admin: &Admin) -> CatalogResult<()> {
        let doc = admin.to_document()?;
        match self.on_duplicate {
            DuplicateEmailPolicy::Overwrite => self.store.set(Collection::Admins, &admin.id, doc).await,
            DuplicateEmailPolicy::Reject => {
                self.store
                    .insert(Collection::Admins, &admin.id, doc)
                    .await
                    .map_err(|err| match err.kind {
                        ErrorKind::Conflict => CatalogError::conflict(format!(
                            "An admin with email {} already exists",
                            admin.email
                        ))
                        .with_source(err),
                        _ => err,
                    })
            }
        }
    }

    /// The new key already holds this admin from an earlier rename whose
    /// old key survived.
    async fn is_unfinished_move(&self, admin: &Admin) -> CatalogResult<bool> {
        let Some(doc) = self.store.get(Collection::Admins, &admin.id).await? else {
            return Ok(false);
        };
        let stored = Admin::from_document(Collection::Admins, &admin.id, doc)?;
        Ok(stored.name == admin.name
            && stored.image_url == admin.image_url
            && stored.timestamp_create == admin.timestamp_create)
    }

    async fn patch(&self, admin: &Admin) -> CatalogResult<()> {
        self.store
            .merge(Collection::Admins, &admin.id, admin.to_document()?)
            .await?;
        info!(id = %admin.id, "admin updated");
        Ok(())
    }

    async fn rename(&self, old_id: &str, admin: &Admin) -> CatalogResult<()> {
        if let Err(err) = self.write_new(admin).await {
            if !err.is(ErrorKind::Conflict) || !self.is_unfinished_move(admin).await? {
                return Err(err);
            }
            warn!(from = %old_id, to = %admin.id, "resuming an unfinished email change");
            self.store
                .merge(Collection::Admins, &admin.id, admin.to_document()?)
                .await?;
        }

        if let Err(err) = self.store.delete(Collection::Admins, old_id).await {
            error!(from = %old_id, to = %admin.id, error = %err, "admin re-keyed but the old document could not be removed");
            return Err(err);
        }

        info!(from = %old_id, to = %admin.id, "admin email changed");
        Ok(())
    }
}
