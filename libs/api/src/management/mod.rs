use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info};
use uuid::Uuid;

pub mod request;
pub mod response;

use crate::auth::CurrentUser;
use crate::response::{ApiResponse, IntoApiResponse as _};
use crate::{ApiError, ApiState};
use entity::news::{Category, NewsDraft, Status};
use entity::prelude::*;

use self::request::DeleteParams;
use self::response::{ListNewsResponse, ManagedNews};

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// What a form submission is asked to do. Creating and revising are
/// structurally distinct, so the insert path and the author-scoped update
/// path cannot be confused.
enum Submission {
    Create,
    Revise(NewsEntity),
}

#[derive(Default)]
struct NewsForm {
    title: Option<String>,
    subtitle: Option<String>,
    content: Option<String>,
    category: Option<String>,
    status: Option<String>,
    images: Vec<ImageField>,
}

struct ImageField {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

/// The acting user's news items; every author's items when the actor is an
/// editor
#[utoipa::path(
    get,
    path = "/management/news",
    responses(
        (status = 200, description = "News items in recency order", body = ListNewsResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_news(
    State(state): State<ApiState>,
    user: CurrentUser,
) -> ApiResponse<Json<ListNewsResponse>> {
    let news = if user.role.manages_all_authors() {
        state.repo.news.find_all().await
    } else {
        state.repo.news.find_by_author(user.id).await
    }
    .into_response("in list managed news")?;

    Ok(Json(ListNewsResponse {
        news: news.into_iter().map(ManagedNews::from).collect(),
    }))
}

/// Create a news item from a multipart form (fields plus zero or more
/// `image` files)
#[utoipa::path(
    post,
    path = "/management/news",
    responses(
        (status = 201, description = "The created item", body = ManagedNews),
        (status = 400, description = "Invalid form fields"),
        (status = 401, description = "Not signed in"),
        (status = 502, description = "An image upload failed")
    )
)]
pub async fn create_news(
    State(state): State<ApiState>,
    user: CurrentUser,
    multipart: Multipart,
) -> ApiResponse<(StatusCode, Json<ManagedNews>)> {
    let saved = submit(&state, &user, Submission::Create, multipart).await?;

    Ok((StatusCode::CREATED, Json(saved)))
}

/// Update a news item in place; scoped to the authoring user
#[utoipa::path(
    put,
    path = "/management/news/:id",
    responses(
        (status = 200, description = "The updated item", body = ManagedNews),
        (status = 403, description = "The item belongs to another author"),
        (status = 404, description = "Unknown id")
    ),
    params(
        ("id", description = "news item id"),
    )
)]
pub async fn update_news(
    State(state): State<ApiState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResponse<Json<ManagedNews>> {
    let original = state
        .repo
        .news
        .find_by_id(id)
        .await
        .into_response("in find news by id")?;

    let Some(original) = original else {
        return Err(ApiError::NotFound(format!(
            "news item {} was not found",
            id
        )));
    };

    let saved =
        submit(&state, &user, Submission::Revise(original), multipart).await?;

    Ok(Json(saved))
}

/// Flip a news item between published and hidden
#[utoipa::path(
    post,
    path = "/management/news/:id/toggle-status",
    responses(
        (status = 200, description = "The item with its new status", body = ManagedNews),
        (status = 400, description = "The item is in an editorial state"),
        (status = 403, description = "The item belongs to another author"),
        (status = 404, description = "Unknown id")
    ),
    params(
        ("id", description = "news item id"),
    )
)]
pub async fn toggle_status(
    State(state): State<ApiState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResponse<Json<ManagedNews>> {
    let item = state
        .repo
        .news
        .find_by_id(id)
        .await
        .into_response("in find news by id")?;

    let Some(item) = item else {
        return Err(ApiError::NotFound(format!(
            "news item {} was not found",
            id
        )));
    };

    let next = next_status(&item, author_scope(&user))?;

    let saved = state
        .repo
        .news
        .set_status(id, next, author_scope(&user))
        .await
        .into_response("in set news status")?;

    info!(
        task = "toggle status",
        id = id.to_string(),
        status = next.as_str()
    );

    Ok(Json(saved.into()))
}

/// Delete a news item permanently
#[utoipa::path(
    delete,
    path = "/management/news/:id",
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "The deletion was not confirmed"),
        (status = 403, description = "The item belongs to another author"),
        (status = 404, description = "Unknown id")
    ),
    params(
        ("id", description = "news item id"),
        DeleteParams
    )
)]
pub async fn delete_news(
    State(state): State<ApiState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> ApiResponse<StatusCode> {
    if !params.confirm {
        return Err(ApiError::ClientError(
            "deleting a news item is irreversible and must be confirmed"
                .to_string(),
        ));
    }

    state
        .repo
        .news
        .delete(id, author_scope(&user))
        .await
        .into_response("in delete news")?;

    info!(task = "delete news", id = id.to_string());

    Ok(StatusCode::NO_CONTENT)
}

/// Editors operate over all authors' items; reporters over their own.
fn author_scope(user: &CurrentUser) -> Option<Uuid> {
    if user.role.manages_all_authors() {
        None
    } else {
        Some(user.id)
    }
}

/// Ownership is decided before togglability, so a non-owner's answer is the
/// same 403 whatever editorial state the item is in.
fn next_status(
    item: &NewsEntity,
    author_scope: Option<Uuid>,
) -> Result<Status, ApiError> {
    if let Some(author_id) = author_scope {
        if item.author_id != Some(author_id) {
            return Err(ApiError::Forbidden(
                "cannot change the status of a news item owned by another \
                 author"
                    .to_string(),
            ));
        }
    }

    item.status.toggled().ok_or_else(|| {
        ApiError::ClientError(
            "only published or hidden news items can be toggled".to_string(),
        )
    })
}

/// The shared submit path: read the form, upload images first, then write
/// the record with the already-known URLs. A failed record write after the
/// uploads leaves the objects orphaned in the bucket; that is accepted and
/// not rolled back.
async fn submit(
    state: &ApiState,
    user: &CurrentUser,
    submission: Submission,
    mut multipart: Multipart,
) -> ApiResponse<ManagedNews> {
    let form = read_form(&mut multipart).await?;
    let mut draft = validate(&form)?;

    // Sequential uploads: the first failure aborts the rest.
    let mut uploaded = Vec::with_capacity(form.images.len());
    for image in &form.images {
        let url = state
            .images
            .upload(
                &image.file_name,
                image.content_type.as_deref(),
                image.bytes.clone(),
            )
            .await
            .map_err(|e| {
                error!(task = "upload image", error = format!("{:?}", e));
                ApiError::UploadError(format!(
                    "failed to upload {}",
                    image.file_name
                ))
            })?;
        uploaded.push(url);
    }

    draft.image_url = resolve_image_url(&uploaded, &submission);

    let saved = match submission {
        Submission::Create => state
            .repo
            .news
            .create(draft, user.id, user.email.clone())
            .await
            .into_response("in create news")?,
        Submission::Revise(original) => state
            .repo
            .news
            .update_scoped(original.id, user.id, draft)
            .await
            .into_response("in update news")?,
    };

    info!(task = "submit news", id = saved.id.to_string());

    Ok(saved.into())
}

async fn read_form(multipart: &mut Multipart) -> Result<NewsForm, ApiError> {
    let mut form = NewsForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::ClientError(format!("malformed multipart form: {}", e))
    })? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "title" => form.title = Some(read_text(field).await?),
            "subtitle" => form.subtitle = Some(read_text(field).await?),
            "content" => form.content = Some(read_text(field).await?),
            "category" => form.category = Some(read_text(field).await?),
            "status" => form.status = Some(read_text(field).await?),
            "image" => {
                let file_name =
                    field.file_name().unwrap_or("image").to_string();
                let content_type = field.content_type().map(String::from);
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::ClientError(format!(
                        "failed to read uploaded file: {}",
                        e
                    ))
                })?;

                if bytes.len() > MAX_IMAGE_BYTES {
                    return Err(ApiError::ClientError(format!(
                        "{} exceeds the 5MB image limit",
                        file_name
                    )));
                }

                form.images.push(ImageField {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(
    field: axum::extract::multipart::Field<'_>,
) -> Result<String, ApiError> {
    field.text().await.map_err(|e| {
        ApiError::ClientError(format!("malformed multipart field: {}", e))
    })
}

fn validate(form: &NewsForm) -> Result<NewsDraft, ApiError> {
    let title = form.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(ApiError::ClientError("a title is required".to_string()));
    }

    let content = form.content.as_deref().map(str::trim).unwrap_or_default();
    if content.is_empty() {
        return Err(ApiError::ClientError(
            "the content cannot be empty".to_string(),
        ));
    }

    let category = match form.category.as_deref() {
        None => {
            return Err(ApiError::ClientError(
                "a category is required".to_string(),
            ))
        }
        Some(name) => Category::parse(name).ok_or_else(|| {
            ApiError::ClientError(format!("unknown category: {}", name))
        })?,
    };

    let status = match form.status.as_deref() {
        None => Status::default(),
        Some(name) => Status::parse(name).ok_or_else(|| {
            ApiError::ClientError(format!("unknown status: {}", name))
        })?,
    };

    let subtitle = form
        .subtitle
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Ok(NewsDraft {
        title: title.to_string(),
        subtitle,
        content: content.to_string(),
        category,
        image_url: None,
        status,
    })
}

fn join_image_urls(urls: &[String]) -> Option<String> {
    if urls.is_empty() {
        return None;
    }

    Some(urls.join(","))
}

/// Freshly uploaded URLs win; without them, a revision keeps the record's
/// existing image_url and a creation stores none.
fn resolve_image_url(
    uploaded: &[String],
    submission: &Submission,
) -> Option<String> {
    match join_image_urls(uploaded) {
        Some(joined) => Some(joined),
        None => match submission {
            Submission::Create => None,
            Submission::Revise(original) => original.image_url.clone(),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_urls_are_comma_joined_in_upload_order() {
        // Arrange
        let urls = vec![
            "http://img/1_a.jpg".to_string(),
            "http://img/2_b.jpg".to_string(),
        ];

        // Act
        let joined = join_image_urls(&urls);

        // Assert: order preserved, no trailing separator
        assert_eq!(
            joined.as_deref(),
            Some("http://img/1_a.jpg,http://img/2_b.jpg")
        );
    }

    #[test]
    fn test_no_uploads_yields_no_image_url_on_create() {
        assert_eq!(join_image_urls(&[]), None);
        assert_eq!(resolve_image_url(&[], &Submission::Create), None);
    }

    #[test]
    fn test_revision_without_uploads_keeps_the_existing_image_url() {
        // Arrange
        let original = NewsEntity {
            image_url: Some("http://img/0_old.jpg".to_string()),
            ..Default::default()
        };

        // Act
        let kept = resolve_image_url(&[], &Submission::Revise(original));

        // Assert
        assert_eq!(kept.as_deref(), Some("http://img/0_old.jpg"));
    }

    #[test]
    fn test_revision_with_uploads_replaces_the_image_url() {
        let original = NewsEntity {
            image_url: Some("http://img/0_old.jpg".to_string()),
            ..Default::default()
        };
        let uploaded = vec!["http://img/1_new.jpg".to_string()];

        let resolved =
            resolve_image_url(&uploaded, &Submission::Revise(original));

        assert_eq!(resolved.as_deref(), Some("http://img/1_new.jpg"));
    }

    #[test]
    fn test_validate_rejects_blank_required_fields() {
        let form = NewsForm {
            title: Some("   ".to_string()),
            content: Some("texto".to_string()),
            category: Some("Cultura".to_string()),
            ..Default::default()
        };

        assert!(validate(&form).is_err());
    }

    #[test]
    fn test_validate_defaults_status_to_published() {
        // Arrange
        let form = NewsForm {
            title: Some("Titular".to_string()),
            subtitle: Some("".to_string()),
            content: Some("texto".to_string()),
            category: Some("Medio Ambiente".to_string()),
            ..Default::default()
        };

        // Act
        let draft = validate(&form).unwrap();

        // Assert
        assert_eq!(draft.status, Status::Published);
        assert_eq!(draft.category, Category::MedioAmbiente);
        assert_eq!(draft.subtitle, None);
    }

    #[test]
    fn test_non_owner_gets_forbidden_whatever_the_status() {
        // Arrange: an editorial-state item owned by somebody else
        let item = NewsEntity {
            author_id: Some(Uuid::new_v4()),
            status: Status::Editing,
            ..Default::default()
        };
        let actor = Uuid::new_v4();

        // Act
        let result = next_status(&item, Some(actor));

        // Assert: 403, not a 400 revealing the editorial state
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_owner_cannot_toggle_an_editorial_state() {
        let author = Uuid::new_v4();
        let item = NewsEntity {
            author_id: Some(author),
            status: Status::Finished,
            ..Default::default()
        };

        assert!(matches!(
            next_status(&item, Some(author)),
            Err(ApiError::ClientError(_))
        ));
    }

    #[test]
    fn test_unscoped_actor_toggles_any_published_item() {
        let item = NewsEntity {
            author_id: Some(Uuid::new_v4()),
            status: Status::Published,
            ..Default::default()
        };

        assert_eq!(next_status(&item, None).ok(), Some(Status::Disabled));
    }

    #[test]
    fn test_validate_rejects_unknown_category() {
        let form = NewsForm {
            title: Some("Titular".to_string()),
            content: Some("texto".to_string()),
            category: Some("Farándula".to_string()),
            ..Default::default()
        };

        assert!(validate(&form).is_err());
    }
}
