use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use reqwest::Url;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::{ImageError, ImageFile, ImageHost, ImageHostConfig, ImageResult};

/// Turns form image inputs into hosted URLs.
///
/// Stores embed one of these; it owns every rule about which URL ends up
/// on a record.
#[derive(Clone)]
pub struct ImageResolver {
    host: Arc<dyn ImageHost>,
    config: ImageHostConfig,
}

impl ImageResolver {
    pub fn new<H: ImageHost + 'static>(host: H, config: ImageHostConfig) -> Self {
        Self::with_host(Arc::new(host), config)
    }

    pub fn with_host(host: Arc<dyn ImageHost>, config: ImageHostConfig) -> Self {
        Self { host, config }
    }

    pub fn config(&self) -> &ImageHostConfig {
        &self.config
    }

    /// Reject files that should never reach the host.
    pub fn check(&self, file: &ImageFile) -> ImageResult<()> {
        if file.is_empty() {
            return Err(ImageError::invalid(format!("Image {} is empty", file.display_name())));
        }

        if file.len() as u64 > self.config.max_image_bytes {
            return Err(ImageError::invalid(format!(
                "Image {} is {} bytes, above the {} byte limit",
                file.display_name(),
                file.len(),
                self.config.max_image_bytes
            )));
        }

        if let Some(content_type) = &file.content_type {
            if !content_type.trim().to_ascii_lowercase().starts_with("image/") {
                return Err(ImageError::invalid(format!(
                    "{} is not an image ({content_type})",
                    file.display_name()
                )));
            }
        }

        Ok(())
    }

    /// Upload one image and return its hosted URL.
    pub async fn upload(&self, file: ImageFile) -> ImageResult<String> {
        self.check(&file)?;
        self.upload_checked(file).await
    }

    /// Upload a gallery. The returned URLs follow input order whatever the
    /// configured concurrency; the first failure aborts the batch.
    pub async fn upload_all(&self, files: Vec<ImageFile>) -> ImageResult<Vec<String>> {
        for file in &files {
            self.check(file)?;
        }

        let total = files.len();
        let urls: Vec<String> = futures::stream::iter(files)
            .map(|file| self.upload_checked(file))
            .buffered(self.config.gallery_concurrency.max(1))
            .try_collect()
            .await?;

        debug!(total, "gallery uploaded");
        Ok(urls)
    }

    /// Pick the final URL for an image field.
    ///
    /// A newly picked file wins, then a non-blank manual URL, then the URL
    /// already on the record. With none of the three there is no image.
    pub async fn resolve(
        &self,
        existing_url: Option<&str>,
        new_file: Option<ImageFile>,
        manual_url: Option<&str>,
    ) -> ImageResult<String> {
        if let Some(file) = new_file {
            return self.upload(file).await;
        }

        if let Some(manual) = manual_url.map(str::trim).filter(|u| !u.is_empty()) {
            ensure_absolute_url(manual)?;
            return Ok(manual.to_string());
        }

        match existing_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(existing) => Ok(existing.to_string()),
            None => Err(ImageError::invalid("Please upload an image or provide an image URL")),
        }
    }

    async fn upload_checked(&self, file: ImageFile) -> ImageResult<String> {
        let name = file.display_name().to_string();
        debug!(host = self.host.name(), file = %name, bytes = file.len(), "uploading image");

        let url = match timeout(self.config.timeout, self.host.upload(file)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ImageError::Timeout {
                    after: self.config.timeout,
                })
            }
        };

        info!(host = self.host.name(), file = %name, %url, "image uploaded");
        Ok(url)
    }
}

/// Succeeds when `url` parses as an absolute URL.
pub fn ensure_absolute_url(url: &str) -> ImageResult<()> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|_| ImageError::invalid(format!("Invalid image URL: {url}")))
}
