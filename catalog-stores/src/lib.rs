//! # catalog-stores
//!
//! Create, update, delete and watch the four catalog resources:
//!
//! - [`AdminStore`]: admins keyed by email, re-keyed when the email changes
//! - [`SlugKeyedStore`]: brands and categories under generated ids
//! - [`ProductStore`]: products with a feature image and an ordered gallery
//!
//! [`Catalog`] wires them to one [`catalog_core::DocumentStore`] and one
//! [`catalog_images::ImageResolver`].
//!
//! ```rust,no_run
//! use catalog_core::{CatalogConfig, CatalogResult, MemoryDocumentStore, StoreSettings};
//! use catalog_stores::{Catalog, SlugFields};
//!
//! # async fn demo() -> CatalogResult<()> {
//! let config = CatalogConfig::from_env("CATALOG__");
//! let settings = StoreSettings::from_config(&config.snapshot());
//! let catalog = Catalog::from_config(MemoryDocumentStore::with_settings(&settings), &config)?;
//!
//! let brand = catalog
//!     .brands()
//!     .create(SlugFields { name: "Acme".into(), slug: "acme".into() }, "https://img.test/acme.png")
//!     .await?;
//!
//! let mut feed = catalog.brands().watch().subscribe();
//! while let Some(state) = feed.changed().await {
//!     println!("{:?}", state.data().map(|brands| brands.len()));
//! }
//! # let _ = brand;
//! # Ok(())
//! # }
//! ```

mod admins;
mod catalog;
mod inputs;
mod orphans;
mod products;
mod records;
mod slugs;

pub use admins::{AdminStore, DuplicateEmailPolicy};
pub use catalog::Catalog;
pub use inputs::{AdminChanges, NewAdmin, NewProduct, ProductChanges, SlugFields};
pub use products::ProductStore;
pub use records::{Admin, Brand, Category, Product, SlugEntity};
pub use slugs::{SlugKeyedStore, SlugKind};
