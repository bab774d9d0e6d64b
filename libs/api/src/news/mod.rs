use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

pub mod response;

use crate::response::{ApiResponse, IntoApiResponse as _};
use crate::{ApiError, ApiState};
use entity::news::Status;
use entity::prelude::*;

use self::response::GetNewsResponse;

/// Public detail of one published news item
///
/// A record that exists but is not published answers exactly like a
/// missing one, with a distinct message; none of its fields leave the
/// server on that path.
#[utoipa::path(
    get,
    path = "/news/:id",
    responses(
        (status = 200, description = "The published news item", body = GetNewsResponse),
        (status = 404, description = "Unknown id, or the item is not publicly available")
    ),
    params(
        ("id", description = "news item id"),
    )
)]
pub async fn get_news(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> ApiResponse<Json<GetNewsResponse>> {
    let item = state
        .repo
        .news
        .find_by_id(id)
        .await
        .into_response("in find news by id")?;

    Ok(Json(published_or_not_found(item)?.into()))
}

/// Resolves a lookup into the one record the public may see. Both refusals
/// answer 404; the unpublished one carries a distinct message and nothing
/// from the record itself.
fn published_or_not_found(
    item: Option<NewsEntity>,
) -> Result<NewsEntity, ApiError> {
    let Some(item) = item else {
        return Err(ApiError::NotFound(
            "the news item was not found or was deleted".to_string(),
        ));
    };

    if item.status != Status::Published {
        return Err(ApiError::NotFound(
            "this news item is not publicly available".to_string(),
        ));
    }

    Ok(item)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_missing_record_answers_not_found() {
        let Err(ApiError::NotFound(message)) = published_or_not_found(None)
        else {
            panic!("expected a not-found refusal");
        };

        assert_eq!(message, "the news item was not found or was deleted");
    }

    #[test]
    fn test_unpublished_record_leaks_none_of_its_fields() {
        // Arrange
        let item = NewsEntity {
            title: "Borrador interno".to_string(),
            content: "Texto sin revisar".to_string(),
            status: Status::Disabled,
            ..Default::default()
        };

        // Act
        let Err(ApiError::NotFound(message)) =
            published_or_not_found(Some(item))
        else {
            panic!("expected a not-found refusal");
        };

        // Assert: the distinct message, and none of the record's content
        assert_eq!(message, "this news item is not publicly available");
        assert!(!message.contains("Borrador"));
        assert!(!message.contains("Texto"));
    }

    #[test]
    fn test_published_record_passes_through() {
        let item = NewsEntity {
            title: "Acreditación renovada".to_string(),
            status: Status::Published,
            ..Default::default()
        };

        let found = published_or_not_found(Some(item.clone()));

        assert!(matches!(found, Ok(f) if f.id == item.id));
    }
}
