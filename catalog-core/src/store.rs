use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde_json::{Map, Value};

use crate::CatalogResult;

/// A stored document: a flat mapping from field name to value.
pub type Document = Map<String, Value>;

/// Stream type handed out by [`DocumentStore::watch`].
pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send + 'static>>;

/// Collections known to the catalog layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Keyed by email.
    Admins,
    Brands,
    Categories,
    Products,
    /// Id allocation only; documents here are empty.
    Ids,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Admins => "admins",
            Collection::Brands => "brands",
            Collection::Categories => "categories",
            Collection::Products => "products",
            Collection::Ids => "ids",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Updated,
    Removed,
    /// Events were dropped; consumers must re-read the collection.
    Resync,
}

/// One change notification from a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: Collection,
    /// `None` only for [`ChangeKind::Resync`].
    pub key: Option<String>,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(collection: Collection, key: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            collection,
            key: Some(key.into()),
            kind,
        }
    }

    pub fn resync(collection: Collection) -> Self {
        Self {
            collection,
            key: None,
            kind: ChangeKind::Resync,
        }
    }
}

/// Schemaless key -> document persistence backend.
///
/// Implementations guarantee per-document atomic writes and nothing more;
/// there are no multi-document transactions. Field validation is the
/// caller's job.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Allocate a fresh, collision-resistant key by creating an empty
    /// document in [`Collection::Ids`].
    async fn allocate_id(&self) -> CatalogResult<String>;

    /// Fetch one document, `None` if absent.
    async fn get(&self, collection: Collection, key: &str) -> CatalogResult<Option<Document>>;

    /// Every document in the collection, ordered by key.
    async fn list(&self, collection: Collection) -> CatalogResult<Vec<(String, Document)>>;

    /// Write a document, replacing whatever was stored at `key`.
    async fn set(&self, collection: Collection, key: &str, document: Document) -> CatalogResult<()>;

    /// Create-if-absent. Fails with a Conflict error when `key` exists.
    async fn insert(&self, collection: Collection, key: &str, document: Document) -> CatalogResult<()>;

    /// Merge fields into an existing document. Fails with NotFound when absent.
    async fn merge(&self, collection: Collection, key: &str, patch: Document) -> CatalogResult<()>;

    /// Remove a document. Removing an absent key succeeds.
    async fn delete(&self, collection: Collection, key: &str) -> CatalogResult<()>;

    /// Change notifications for one collection. Dropping the stream
    /// releases the underlying channel.
    async fn watch(&self, collection: Collection) -> CatalogResult<BoxStream<CatalogResult<ChangeEvent>>>;
}
