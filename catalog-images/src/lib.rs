//! # catalog-images: image asset resolution
//!
//! Records in the catalog only ever store absolute image URLs. This crate
//! turns whatever a form hands over (a freshly picked file, a pasted URL,
//! or nothing at all while editing) into that URL.
//!
//! ```text
//! ┌─────────────────┐
//! │   Your Store    │  ← Business rules only
//! ├─────────────────┤
//! │  ImageResolver  │  ← Precedence, validation, ordering, timeouts
//! ├─────────────────┤
//! │   ImageHost     │  ← One upload, one URL
//! └─────────────────┘
//! ```
//!
//! ```rust,no_run
//! use catalog_images::prelude::*;
//!
//! # async fn demo() -> ImageResult<()> {
//! let config = ImageHostConfig::new().with_api_key("my-key");
//! let resolver = ImageResolver::new(ImgbbHost::new(&config)?, config);
//!
//! let file = ImageFile::new(std::fs::read("logo.png").unwrap_or_default())
//!     .with_filename("logo.png")
//!     .with_content_type("image/png");
//! let url = resolver.resolve(None, Some(file), None).await?;
//! # let _ = url;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod host;
mod imgbb;
mod resolver;
mod types;

pub use config::{ImageHostConfig, DEFAULT_ENDPOINT};
pub use error::{ImageError, ImageResult};
pub use host::ImageHost;
pub use imgbb::ImgbbHost;
pub use resolver::{ensure_absolute_url, ImageResolver};
pub use types::ImageFile;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ImageError, ImageFile, ImageHost, ImageHostConfig, ImageResolver, ImageResult, ImgbbHost,
    };
}
