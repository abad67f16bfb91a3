use async_trait::async_trait;

use crate::{ImageFile, ImageResult};

/// External image hosting backend.
///
/// Implementations take one image and return the absolute URL it is
/// served from. They do not validate the file; [`crate::ImageResolver`]
/// does that before calling them.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, file: ImageFile) -> ImageResult<String>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "image-host"
    }
}
