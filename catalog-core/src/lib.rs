//! catalog-core: storage-agnostic core of the catalog admin layer.
//!
//! - [`errors`]: the error taxonomy every operation returns
//! - [`config`]: key/value configuration with env overrides
//! - [`store`]: the [`DocumentStore`] seam over a schemaless backend
//! - [`feed`]: live full-snapshot subscriptions over a collection
//!
//! The in-memory backend ships behind the default `memory` feature.

pub mod config;
pub mod deadline;
pub mod errors;
pub mod feed;
#[cfg(feature = "memory")]
pub mod memory;
pub mod resource;
pub mod store;

pub use config::{CatalogConfig, CatalogConfigSnapshot, StoreSettings};
pub use deadline::DeadlineStore;
pub use errors::{CatalogError, CatalogResult, ErrorKind};
pub use feed::{ChangeFeed, FeedState, FeedSubscription};
#[cfg(feature = "memory")]
pub use memory::MemoryDocumentStore;
pub use resource::{decode_all, Resource};
pub use store::{BoxStream, ChangeEvent, ChangeKind, Collection, Document, DocumentStore};
