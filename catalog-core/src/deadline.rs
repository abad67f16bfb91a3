use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::warn;

use crate::store::{BoxStream, ChangeEvent, Collection, Document, DocumentStore};
use crate::{CatalogError, CatalogResult, StoreSettings};

/// Wraps any [`DocumentStore`] so no call can hang forever.
///
/// An elapsed deadline surfaces as a Store error. Change streams are only
/// bounded while they are being opened.
pub struct DeadlineStore<S> {
    inner: S,
    deadline: Duration,
}

impl<S: DocumentStore> DeadlineStore<S> {
    pub fn new(inner: S, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    pub fn from_settings(inner: S, settings: &StoreSettings) -> Self {
        Self::new(inner, settings.timeout)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn bounded<T, F>(&self, op: &'static str, collection: Collection, fut: F) -> CatalogResult<T>
    where
        F: Future<Output = CatalogResult<T>>,
    {
        match timeout(self.deadline, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(op, %collection, deadline = ?self.deadline, "store call timed out");
                Err(CatalogError::store(format!(
                    "Store call {op} on {collection} timed out after {:?}",
                    self.deadline
                )))
            }
        }
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for DeadlineStore<S> {
    async fn allocate_id(&self) -> CatalogResult<String> {
        self.bounded("allocate_id", Collection::Ids, self.inner.allocate_id())
            .await
    }

    async fn get(&self, collection: Collection, key: &str) -> CatalogResult<Option<Document>> {
        self.bounded("get", collection, self.inner.get(collection, key))
            .await
    }

    async fn list(&self, collection: Collection) -> CatalogResult<Vec<(String, Document)>> {
        self.bounded("list", collection, self.inner.list(collection))
            .await
    }

    async fn set(&self, collection: Collection, key: &str, document: Document) -> CatalogResult<()> {
        self.bounded("set", collection, self.inner.set(collection, key, document))
            .await
    }

    async fn insert(&self, collection: Collection, key: &str, document: Document) -> CatalogResult<()> {
        self.bounded("insert", collection, self.inner.insert(collection, key, document))
            .await
    }

    async fn merge(&self, collection: Collection, key: &str, patch: Document) -> CatalogResult<()> {
        self.bounded("merge", collection, self.inner.merge(collection, key, patch))
            .await
    }

    async fn delete(&self, collection: Collection, key: &str) -> CatalogResult<()> {
        self.bounded("delete", collection, self.inner.delete(collection, key))
            .await
    }

    async fn watch(&self, collection: Collection) -> CatalogResult<BoxStream<CatalogResult<ChangeEvent>>> {
        self.bounded("watch", collection, self.inner.watch(collection))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use tracing_test::traced_test;

    /// Backend whose reads never complete.
    struct StalledStore;

    #[async_trait]
    impl DocumentStore for StalledStore {
        async fn allocate_id(&self) -> CatalogResult<String> {
            Ok("id".to_string())
        }
        async fn get(&self, _: Collection, _: &str) -> CatalogResult<Option<Document>> {
            futures::future::pending().await
        }
        async fn list(&self, _: Collection) -> CatalogResult<Vec<(String, Document)>> {
            futures::future::pending().await
        }
        async fn set(&self, _: Collection, _: &str, _: Document) -> CatalogResult<()> {
            Ok(())
        }
        async fn insert(&self, _: Collection, _: &str, _: Document) -> CatalogResult<()> {
            Ok(())
        }
        async fn merge(&self, _: Collection, _: &str, _: Document) -> CatalogResult<()> {
            Ok(())
        }
        async fn delete(&self, _: Collection, _: &str) -> CatalogResult<()> {
            Ok(())
        }
        async fn watch(&self, _: Collection) -> CatalogResult<BoxStream<CatalogResult<ChangeEvent>>> {
            Ok(Box::pin(futures::stream::empty()))
        }
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn hung_calls_become_store_errors() {
        let store = DeadlineStore::new(StalledStore, Duration::from_secs(2));

        let err = store.get(Collection::Brands, "b1").await.unwrap_err();
        assert!(err.is(ErrorKind::Store));
        assert!(err.message.contains("timed out"));
        assert!(logs_contain("store call timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_calls_pass_through() {
        let store = DeadlineStore::new(StalledStore, Duration::from_secs(2));
        assert_eq!(store.allocate_id().await.unwrap(), "id");
        store.delete(Collection::Brands, "b1").await.unwrap();
    }
}
