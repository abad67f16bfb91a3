use catalog_core::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A back-office user. Stored under its email, so `id == email` always.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub timestamp_create: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_update: Option<DateTime<Utc>>,
}

impl Resource for Admin {
    const LABEL: &'static str = "Admin";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Brand or category: a named entry with a non-unique slug and one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugEntity {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub timestamp_create: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_update: Option<DateTime<Utc>>,
}

impl Resource for SlugEntity {
    const LABEL: &'static str = "Brand/Category";

    fn id(&self) -> &str {
        &self.id
    }
}

pub type Brand = SlugEntity;
pub type Category = SlugEntity;

/// A catalog item with a feature image and an ordered gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "featureImageURL")]
    pub feature_image_url: String,
    /// Display order.
    #[serde(default)]
    pub image_list: Vec<String>,
    pub timestamp_create: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_update: Option<DateTime<Utc>>,
}

impl Resource for Product {
    const LABEL: &'static str = "Product";

    fn id(&self) -> &str {
        &self.id
    }
}
