use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use entity::prelude::*;

#[derive(Serialize, ToSchema)]
pub struct ManagedNews {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub category: String,
    pub image_url: Option<String>,
    pub author_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<NewsEntity> for ManagedNews {
    fn from(value: NewsEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            subtitle: value.subtitle,
            content: value.content,
            category: value.category.as_str().to_string(),
            image_url: value.image_url,
            author_id: value.author_id,
            author_name: value.author_name,
            status: value.status.as_str().to_string(),
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ListNewsResponse {
    pub news: Vec<ManagedNews>,
}
