//! Live collection snapshots.
//!
//! A [`ChangeFeed`] hands out independent [`FeedSubscription`]s. Each
//! subscription owns one background task holding one change stream from the
//! store. Whenever anything in the collection changes, the task re-reads the
//! whole collection and publishes it as the latest [`FeedState`]; listeners
//! always see a full snapshot, never a delta.
//!
//! The task watches first and reads second, so a write that lands between
//! the two is never missed.

use std::marker::PhantomData;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::resource::{decode_all, Resource};
use crate::store::{BoxStream, Collection, DocumentStore};

/// What a listener currently knows about the collection.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState<R> {
    /// No snapshot has arrived yet.
    Loading,
    /// Latest snapshot ordered by key; `None` when the collection is empty.
    Data(Option<Vec<R>>),
    /// The subscription failed. No further states follow.
    Error(String),
}

impl<R> FeedState<R> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FeedState::Loading)
    }

    pub fn data(&self) -> Option<&[R]> {
        match self {
            FeedState::Data(Some(items)) => Some(items),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FeedState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Factory for live subscriptions over one collection.
pub struct ChangeFeed<R> {
    store: Arc<dyn DocumentStore>,
    collection: Collection,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Clone for ChangeFeed<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            collection: self.collection,
            _marker: PhantomData,
        }
    }
}

impl<R> ChangeFeed<R>
where
    R: Resource + Clone,
{
    pub fn new(store: Arc<dyn DocumentStore>, collection: Collection) -> Self {
        Self {
            store,
            collection,
            _marker: PhantomData,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Start a new listener. Must be called inside a tokio runtime.
    pub fn subscribe(&self) -> FeedSubscription<R> {
        let (tx, rx) = watch::channel(FeedState::Loading);
        let store = Arc::clone(&self.store);
        let collection = self.collection;

        info!(%collection, "change feed subscribed");
        let task = tokio::spawn(run_feed::<R>(store, collection, tx));

        FeedSubscription {
            collection,
            state: rx,
            task,
        }
    }
}

/// One live listener. Dropping it cancels the listener.
pub struct FeedSubscription<R> {
    collection: Collection,
    state: watch::Receiver<FeedState<R>>,
    task: JoinHandle<()>,
}

impl<R> FeedSubscription<R>
where
    R: Clone + Send + Sync + 'static,
{
    /// Latest state without waiting.
    pub fn current(&self) -> FeedState<R> {
        self.state.borrow().clone()
    }

    /// Wait for the next state. `None` once the feed has stopped and the
    /// last state was already observed.
    pub async fn changed(&mut self) -> Option<FeedState<R>> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop listening and release the store channel.
    pub fn cancel(self) {
        debug!(collection = %self.collection, "change feed cancelled");
        drop(self);
    }

    /// Current state followed by every later one.
    pub fn into_stream(mut self) -> BoxStream<FeedState<R>> {
        let first = self.state.borrow_and_update().clone();
        let rest = futures::stream::unfold(self, |mut sub| async move {
            let next = sub.changed().await?;
            Some((next, sub))
        });
        Box::pin(futures::stream::once(async move { first }).chain(rest))
    }
}

impl<R> Drop for FeedSubscription<R> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_feed<R>(store: Arc<dyn DocumentStore>, collection: Collection, tx: watch::Sender<FeedState<R>>)
where
    R: Resource + Clone,
{
    let mut changes = match store.watch(collection).await {
        Ok(changes) => changes,
        Err(err) => {
            warn!(%collection, error = %err, "change feed could not subscribe");
            let _ = tx.send(FeedState::Error(err.to_string()));
            return;
        }
    };

    if !publish_snapshot(store.as_ref(), collection, &tx).await {
        return;
    }

    while let Some(change) = changes.next().await {
        match change {
            Ok(event) => {
                debug!(%collection, kind = ?event.kind, key = ?event.key, "collection changed");
                if !publish_snapshot(store.as_ref(), collection, &tx).await {
                    return;
                }
            }
            Err(err) => {
                warn!(%collection, error = %err, "change stream failed");
                let _ = tx.send(FeedState::Error(err.to_string()));
                return;
            }
        }
    }

    let _ = tx.send(FeedState::Error(format!("Change stream for {collection} closed")));
}

/// Returns false once the feed should stop.
async fn publish_snapshot<R>(store: &dyn DocumentStore, collection: Collection, tx: &watch::Sender<FeedState<R>>) -> bool
where
    R: Resource + Clone,
{
    let state = match store.list(collection).await {
        Ok(docs) => match decode_all::<R>(collection, docs) {
            Ok(items) if items.is_empty() => FeedState::Data(None),
            Ok(items) => FeedState::Data(Some(items)),
            Err(err) => FeedState::Error(err.to_string()),
        },
        Err(err) => FeedState::Error(err.to_string()),
    };

    let keep_going = !matches!(state, FeedState::Error(_));
    if let FeedState::Error(message) = &state {
        warn!(%collection, error = %message, "change feed snapshot failed");
    }

    tx.send(state).is_ok() && keep_going
}
