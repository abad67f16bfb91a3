use std::sync::Arc;

use catalog_core::{bail_catalog, decode_all, CatalogError, CatalogResult, ChangeFeed, Collection, DocumentStore, Resource};
use catalog_images::{ImageFile, ImageResolver};
use chrono::Utc;
use tracing::{debug, info};

use crate::inputs::{check, require_id, NewProduct, ProductChanges};
use crate::orphans;
use crate::records::Product;

/// Products with a feature image and an ordered gallery.
///
/// Gallery updates are all-or-nothing: an empty list keeps the stored
/// gallery, a non-empty one is uploaded in full and replaces it.
#[derive(Clone)]
pub struct ProductStore {
    store: Arc<dyn DocumentStore>,
    images: ImageResolver,
}

impl ProductStore {
    pub fn new(store: Arc<dyn DocumentStore>, images: ImageResolver) -> Self {
        Self { store, images }
    }

    pub async fn create(
        &self,
        data: NewProduct,
        feature_image: Option<ImageFile>,
        image_list: Vec<ImageFile>,
    ) -> CatalogResult<Product> {
        check(&data, Product::LABEL)?;
        let feature_image = feature_image.ok_or_else(|| CatalogError::validation("Feature image is required"))?;
        self.precheck(Some(&feature_image), &image_list)?;

        let feature_image_url = self.images.upload(feature_image).await?;
        let mut uploaded = vec![feature_image_url.clone()];

        let gallery = match self.images.upload_all(image_list).await {
            Ok(urls) => urls,
            Err(err) => {
                let err = CatalogError::from(err);
                orphans::report(Product::LABEL, &uploaded, &err);
                return Err(err);
            }
        };
        uploaded.extend(gallery.iter().cloned());

        let written = async move {
            let id = self.store.allocate_id().await?;
            let product = Product {
                id,
                title: data.title,
                description: data.description,
                feature_image_url,
                image_list: gallery,
                timestamp_create: Utc::now(),
                timestamp_update: None,
            };
            self.store
                .insert(Collection::Products, &product.id, product.to_document()?)
                .await?;
            Ok::<_, CatalogError>(product)
        }
        .await;

        match written {
            Ok(product) => {
                info!(id = %product.id, gallery = product.image_list.len(), "product created");
                Ok(product)
            }
            Err(err) => {
                orphans::report(Product::LABEL, &uploaded, &err);
                Err(err)
            }
        }
    }

    /// Update a product. `feature_image` replaces the feature image when
    /// given; a non-empty `image_list` replaces the whole gallery.
    pub async fn update(
        &self,
        data: ProductChanges,
        feature_image: Option<ImageFile>,
        image_list: Vec<ImageFile>,
    ) -> CatalogResult<Product> {
        check(&data, Product::LABEL)?;
        let existing = self.get_by_id(&data.id).await?;
        self.precheck(feature_image.as_ref(), &image_list)?;

        let mut uploaded = Vec::new();

        let feature_image_url = match feature_image {
            Some(file) => {
                let url = self.images.upload(file).await?;
                uploaded.push(url.clone());
                url
            }
            None => existing.feature_image_url,
        };

        let image_list = if image_list.is_empty() {
            existing.image_list
        } else {
            match self.images.upload_all(image_list).await {
                Ok(urls) => {
                    uploaded.extend(urls.iter().cloned());
                    urls
                }
                Err(err) => {
                    let err = CatalogError::from(err);
                    orphans::report(Product::LABEL, &uploaded, &err);
                    return Err(err);
                }
            }
        };

        let product = Product {
            id: existing.id,
            title: data.title,
            description: data.description,
            feature_image_url,
            image_list,
            timestamp_create: existing.timestamp_create,
            timestamp_update: Some(Utc::now()),
        };

        let written = async {
            let doc = product.to_document()?;
            self.store.set(Collection::Products, &product.id, doc).await
        }
        .await;

        if let Err(err) = written {
            orphans::report(Product::LABEL, &uploaded, &err);
            return Err(err);
        }

        info!(id = %product.id, gallery = product.image_list.len(), "product updated");
        Ok(product)
    }

    /// Remove a product. Removing an unknown id succeeds.
    pub async fn delete(&self, id: &str) -> CatalogResult<()> {
        require_id(id, Product::LABEL)?;
        self.store.delete(Collection::Products, id).await?;
        info!(%id, "product deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> CatalogResult<Product> {
        require_id(id, Product::LABEL)?;
        debug!(%id, "loading product");
        let Some(doc) = self.store.get(Collection::Products, id).await? else {
            bail_catalog!(not_found, "Product not found: {}", id);
        };
        Product::from_document(Collection::Products, id, doc)
    }

    pub async fn get_all(&self) -> CatalogResult<Vec<Product>> {
        let docs = self.store.list(Collection::Products).await?;
        debug!(count = docs.len(), "loaded products");
        decode_all(Collection::Products, docs)
    }

    pub fn watch(&self) -> ChangeFeed<Product> {
        ChangeFeed::new(Arc::clone(&self.store), Collection::Products)
    }

    /// Bad files fail here, before the first upload.
    fn precheck(&self, feature_image: Option<&ImageFile>, image_list: &[ImageFile]) -> CatalogResult<()> {
        if let Some(file) = feature_image {
            self.images.check(file)?;
        }
        for file in image_list {
            self.images.check(file)?;
        }
        Ok(())
    }
}
