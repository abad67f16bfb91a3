use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::{ImageError, ImageFile, ImageHost, ImageHostConfig, ImageResult};

/// ImgBB-compatible HTTP host.
///
/// `POST {endpoint}?key={api_key}` with a multipart field `image`; the
/// answer is `{success, data: {url}}` or `{success: false, error: {message}}`.
pub struct ImgbbHost {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl ImgbbHost {
    pub fn new(config: &ImageHostConfig) -> ImageResult<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| ImageError::config(format!("invalid endpoint {:?}: {e}", config.endpoint)))?;

        if config.api_key.trim().is_empty() {
            return Err(ImageError::config("api key is empty"));
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    fn form_for(file: ImageFile) -> ImageResult<Form> {
        let filename = file.display_name().to_string();
        let mut part = Part::bytes(file.bytes.to_vec()).file_name(filename);
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| ImageError::invalid(format!("bad content type {content_type:?}: {e}")))?;
        }
        Ok(Form::new().part("image", part))
    }
}

#[async_trait]
impl ImageHost for ImgbbHost {
    async fn upload(&self, file: ImageFile) -> ImageResult<String> {
        let form = Self::form_for(file)?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str())])
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "image host responded");

        let parsed: HostResponse = match serde_json::from_slice(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(ImageError::rejected(format!("image host returned {status}")));
            }
            Err(e) => return Err(ImageError::malformed(e.to_string())),
        };

        parsed.into_url()
    }

    fn name(&self) -> &str {
        "imgbb"
    }
}

#[derive(Debug, Deserialize)]
struct HostResponse {
    #[serde(default)]
    success: bool,
    data: Option<HostData>,
    error: Option<HostFailure>,
}

#[derive(Debug, Deserialize)]
struct HostData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HostFailure {
    message: Option<String>,
}

impl HostResponse {
    fn into_url(self) -> ImageResult<String> {
        if !self.success {
            let message = self
                .error
                .and_then(|e| e.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Failed to upload image".to_string());
            return Err(ImageError::rejected(message));
        }

        let url = self
            .data
            .and_then(|d| d.url)
            .ok_or_else(|| ImageError::malformed("success without data.url"))?;

        Url::parse(&url).map_err(|e| ImageError::malformed(format!("data.url {url:?} is not absolute: {e}")))?;
        Ok(url)
    }
}
