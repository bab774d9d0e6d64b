use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use entity::prelude::*;

#[derive(Serialize, ToSchema)]
pub struct CatalogItem {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub category: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<NewsEntity> for CatalogItem {
    fn from(value: NewsEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            subtitle: value.subtitle,
            category: value.category.as_str().to_string(),
            image_url: value.image_url,
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct GetCatalogResponse {
    /// The record currently highlighted by the rotation clock, if the
    /// filtered list is non-empty.
    pub featured: Option<CatalogItem>,
    /// The remaining records, in recency order.
    pub items: Vec<CatalogItem>,
}
