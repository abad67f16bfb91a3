#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use catalog_core::{
    BoxStream, CatalogError, CatalogResult, ChangeEvent, Collection, Document, DocumentStore, MemoryDocumentStore,
};
use catalog_images::{ImageError, ImageFile, ImageHost, ImageHostConfig, ImageResolver, ImageResult};
use catalog_stores::Catalog;
use parking_lot::Mutex;

/// Image host double. Serves `https://img.test/<filename>`, records the
/// order uploads finish in, rejects any file named `fail*` and never
/// answers for `hang*`. A `wait<ms>-` prefix delays the upload by that many
/// milliseconds.
#[derive(Default)]
pub struct RecordingHost {
    uploads: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().clone()
    }
}

#[async_trait]
impl ImageHost for RecordingHost {
    async fn upload(&self, file: ImageFile) -> ImageResult<String> {
        let name = file.display_name().to_string();
        if name.starts_with("hang") {
            futures::future::pending::<()>().await;
        }
        if let Some(ms) = wait_millis(&name) {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        self.uploads.lock().push(name.clone());
        if name.starts_with("fail") {
            return Err(ImageError::rejected("Failed to upload image"));
        }
        Ok(format!("https://img.test/{name}"))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn wait_millis(name: &str) -> Option<u64> {
    let (ms, _) = name.strip_prefix("wait")?.split_once('-')?;
    ms.parse().ok()
}

/// Memory backend whose writes can be switched off.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryDocumentStore,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
}

impl FlakyStore {
    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, on: bool) {
        self.fail_deletes.store(on, Ordering::SeqCst);
    }

    fn guard(&self, flag: &AtomicBool, op: &str) -> CatalogResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(CatalogError::store(format!("{op} unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn allocate_id(&self) -> CatalogResult<String> {
        self.inner.allocate_id().await
    }

    async fn get(&self, collection: Collection, key: &str) -> CatalogResult<Option<Document>> {
        self.inner.get(collection, key).await
    }

    async fn list(&self, collection: Collection) -> CatalogResult<Vec<(String, Document)>> {
        self.inner.list(collection).await
    }

    async fn set(&self, collection: Collection, key: &str, document: Document) -> CatalogResult<()> {
        self.guard(&self.fail_writes, "set")?;
        self.inner.set(collection, key, document).await
    }

    async fn insert(&self, collection: Collection, key: &str, document: Document) -> CatalogResult<()> {
        self.guard(&self.fail_writes, "insert")?;
        self.inner.insert(collection, key, document).await
    }

    async fn merge(&self, collection: Collection, key: &str, patch: Document) -> CatalogResult<()> {
        self.guard(&self.fail_writes, "merge")?;
        self.inner.merge(collection, key, patch).await
    }

    async fn delete(&self, collection: Collection, key: &str) -> CatalogResult<()> {
        self.guard(&self.fail_deletes, "delete")?;
        self.inner.delete(collection, key).await
    }

    async fn watch(&self, collection: Collection) -> CatalogResult<BoxStream<CatalogResult<ChangeEvent>>> {
        self.inner.watch(collection).await
    }
}

pub struct Harness {
    pub store: Arc<MemoryDocumentStore>,
    pub host: Arc<RecordingHost>,
    pub catalog: Catalog,
}

pub fn harness() -> Harness {
    harness_with(ImageHostConfig::new())
}

pub fn harness_with(config: ImageHostConfig) -> Harness {
    let store = Arc::new(MemoryDocumentStore::new());
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::new(store.clone(), ImageResolver::with_host(host.clone(), config));
    Harness { store, host, catalog }
}

pub struct FlakyHarness {
    pub store: Arc<FlakyStore>,
    pub host: Arc<RecordingHost>,
    pub catalog: Catalog,
}

pub fn flaky_harness() -> FlakyHarness {
    let store = Arc::new(FlakyStore::default());
    let host = Arc::new(RecordingHost::default());
    let catalog = Catalog::new(store.clone(), ImageResolver::with_host(host.clone(), ImageHostConfig::new()));
    FlakyHarness { store, host, catalog }
}

pub fn png(name: &str) -> ImageFile {
    ImageFile::new(&b"\x89PNG\r\n"[..])
        .with_filename(name)
        .with_content_type("image/png")
}
