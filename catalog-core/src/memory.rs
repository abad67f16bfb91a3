use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::debug;
use uuid::Uuid;

use crate::store::{BoxStream, ChangeEvent, ChangeKind, Collection, Document, DocumentStore};
use crate::{CatalogError, CatalogResult, StoreSettings};

type Collections = HashMap<Collection, BTreeMap<String, Document>>;

/// In-memory document store for tests, demos and local development.
///
/// Each write takes the lock once, so single-document writes are atomic.
/// Change events go out on one broadcast channel after the lock is released.
pub struct MemoryDocumentStore {
    collections: RwLock<Collections>,
    events: broadcast::Sender<ChangeEvent>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::with_settings(&StoreSettings::default())
    }

    pub fn with_settings(settings: &StoreSettings) -> Self {
        let (events, _) = broadcast::channel(settings.feed_capacity.max(1));
        Self {
            collections: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Number of live change streams across all collections.
    pub fn watcher_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Number of documents currently stored in `collection`.
    pub fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .get(&collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    fn emit(&self, collection: Collection, key: &str, kind: ChangeKind) {
        // No receivers is not an error.
        let _ = self.events.send(ChangeEvent::new(collection, key, kind));
    }

    fn not_found(collection: Collection, key: &str) -> CatalogError {
        CatalogError::not_found(format!("Document not found: {collection}/{key}"))
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn allocate_id(&self) -> CatalogResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.collections
            .write()
            .entry(Collection::Ids)
            .or_default()
            .insert(id.clone(), Document::new());
        self.emit(Collection::Ids, &id, ChangeKind::Created);
        Ok(id)
    }

    async fn get(&self, collection: Collection, key: &str) -> CatalogResult<Option<Document>> {
        let collections = self.collections.read();
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn list(&self, collection: Collection) -> CatalogResult<Vec<(String, Document)>> {
        let collections = self.collections.read();
        Ok(collections
            .get(&collection)
            .into_iter()
            .flat_map(|docs| docs.iter())
            .map(|(key, doc)| (key.clone(), doc.clone()))
            .collect())
    }

    async fn set(&self, collection: Collection, key: &str, document: Document) -> CatalogResult<()> {
        let previous = self
            .collections
            .write()
            .entry(collection)
            .or_default()
            .insert(key.to_string(), document);

        let kind = if previous.is_some() {
            ChangeKind::Updated
        } else {
            ChangeKind::Created
        };
        debug!(%collection, key, ?kind, "set document");
        self.emit(collection, key, kind);
        Ok(())
    }

    async fn insert(&self, collection: Collection, key: &str, document: Document) -> CatalogResult<()> {
        {
            let mut collections = self.collections.write();
            let docs = collections.entry(collection).or_default();
            if docs.contains_key(key) {
                return Err(CatalogError::conflict(format!(
                    "Document already exists: {collection}/{key}"
                )));
            }
            docs.insert(key.to_string(), document);
        }

        debug!(%collection, key, "inserted document");
        self.emit(collection, key, ChangeKind::Created);
        Ok(())
    }

    async fn merge(&self, collection: Collection, key: &str, patch: Document) -> CatalogResult<()> {
        {
            let mut collections = self.collections.write();
            let existing = collections
                .get_mut(&collection)
                .and_then(|docs| docs.get_mut(key))
                .ok_or_else(|| Self::not_found(collection, key))?;

            for (field, value) in patch {
                existing.insert(field, value);
            }
        }

        debug!(%collection, key, "merged document");
        self.emit(collection, key, ChangeKind::Updated);
        Ok(())
    }

    async fn delete(&self, collection: Collection, key: &str) -> CatalogResult<()> {
        let removed = self
            .collections
            .write()
            .get_mut(&collection)
            .and_then(|docs| docs.remove(key));

        if removed.is_some() {
            debug!(%collection, key, "deleted document");
            self.emit(collection, key, ChangeKind::Removed);
        }
        Ok(())
    }

    async fn watch(&self, collection: Collection) -> CatalogResult<BoxStream<CatalogResult<ChangeEvent>>> {
        let stream = BroadcastStream::new(self.events.subscribe()).filter_map(move |received| {
            match received {
                Ok(event) if event.collection == collection => Some(Ok(event)),
                Ok(_) => None,
                Err(BroadcastStreamRecvError::Lagged(missed)) => {
                    debug!(%collection, missed, "change stream lagged, forcing resync");
                    Some(Ok(ChangeEvent::resync(collection)))
                }
            }
        });

        Ok(Box::pin(stream))
    }
}
