use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::active_models::{news, prelude::*};
use crate::{IntoResponse as _, RepositoryError, Response};
use entity::news::{NewsDraft, Status};
use entity::prelude::*;

#[derive(Clone, Debug)]
pub struct NewsRepository {
    db: DatabaseConnection,
}

impl NewsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<news::Model> for NewsEntity {
    fn from(value: news::Model) -> Self {
        Self {
            id: value.id,
            title: value.title,
            subtitle: value.subtitle,
            content: value.content,
            category: value.category.into(),
            image_url: value.image_url,
            author_id: value.author_id,
            author_name: value.author_name,
            status: value.status.into(),
            created_at: value.created_at.and_utc(),
        }
    }
}

impl NewsRepository {
    /// Everything visible to anonymous visitors, newest first.
    pub async fn find_published(&self) -> Response<Vec<NewsEntity>> {
        let rows = News::find()
            .filter(news::Column::Status.eq(Status::Published.as_str()))
            .order_by_desc(news::Column::CreatedAt)
            .all(&self.db)
            .await
            .into_response("in find published news")?;

        Ok(rows.into_iter().map(NewsEntity::from).collect())
    }

    pub async fn find_all(&self) -> Response<Vec<NewsEntity>> {
        let rows = News::find()
            .order_by_desc(news::Column::CreatedAt)
            .all(&self.db)
            .await
            .into_response("in find all news")?;

        Ok(rows.into_iter().map(NewsEntity::from).collect())
    }

    pub async fn find_by_author(
        &self,
        author_id: Uuid,
    ) -> Response<Vec<NewsEntity>> {
        let rows = News::find()
            .filter(news::Column::AuthorId.eq(author_id))
            .order_by_desc(news::Column::CreatedAt)
            .all(&self.db)
            .await
            .into_response("in find news by author")?;

        Ok(rows.into_iter().map(NewsEntity::from).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Response<Option<NewsEntity>> {
        let row = News::find_by_id(id)
            .one(&self.db)
            .await
            .into_response("in find news by id")?;

        Ok(row.map(NewsEntity::from))
    }

    /// Inserts a new record. The server assigns the id and created_at;
    /// the acting user is stamped as the author.
    pub async fn create(
        &self,
        draft: NewsDraft,
        author_id: Uuid,
        author_name: String,
    ) -> Response<NewsEntity> {
        let model = news::ActiveModel {
            id: ActiveValue::set(Uuid::new_v4()),
            title: ActiveValue::set(draft.title),
            subtitle: ActiveValue::set(draft.subtitle),
            content: ActiveValue::set(draft.content),
            category: ActiveValue::set(String::from(draft.category)),
            image_url: ActiveValue::set(draft.image_url),
            author_id: ActiveValue::set(Some(author_id)),
            author_name: ActiveValue::set(Some(author_name)),
            status: ActiveValue::set(String::from(draft.status)),
            created_at: ActiveValue::set(Utc::now().naive_utc()),
        };

        let saved = model
            .insert(&self.db)
            .await
            .into_response("in insert news")?;

        Ok(saved.into())
    }

    /// Updates a record in place, scoped to the acting author. A record
    /// owned by someone else fails with Forbidden, never a silent no-op.
    /// The id and created_at columns are left untouched.
    pub async fn update_scoped(
        &self,
        id: Uuid,
        author_id: Uuid,
        draft: NewsDraft,
    ) -> Response<NewsEntity> {
        let found = self.find_model(id).await?;
        authorize(
            found.author_id,
            Some(author_id),
            "update a news item owned by another author",
        )?;

        let mut model = found.into_active_model();
        model.title = ActiveValue::set(draft.title);
        model.subtitle = ActiveValue::set(draft.subtitle);
        model.content = ActiveValue::set(draft.content);
        model.category = ActiveValue::set(String::from(draft.category));
        model.image_url = ActiveValue::set(draft.image_url);
        model.status = ActiveValue::set(String::from(draft.status));

        let saved = model
            .update(&self.db)
            .await
            .into_response("in update news")?;

        Ok(saved.into())
    }

    /// Flips the stored status. `author_scope` is `None` when the actor
    /// manages all authors' items.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: Status,
        author_scope: Option<Uuid>,
    ) -> Response<NewsEntity> {
        let found = self.find_model(id).await?;
        authorize(
            found.author_id,
            author_scope,
            "change the status of a news item owned by another author",
        )?;

        let mut model = found.into_active_model();
        model.status = ActiveValue::set(String::from(status));

        let saved = model
            .update(&self.db)
            .await
            .into_response("in update news status")?;

        Ok(saved.into())
    }

    /// Permanent removal. There is no soft-delete distinct from the
    /// disabled status, which merely hides without removing.
    pub async fn delete(
        &self,
        id: Uuid,
        author_scope: Option<Uuid>,
    ) -> Response<()> {
        let found = self.find_model(id).await?;
        authorize(
            found.author_id,
            author_scope,
            "delete a news item owned by another author",
        )?;

        found
            .delete(&self.db)
            .await
            .into_response("in delete news")?;

        Ok(())
    }

    async fn find_model(&self, id: Uuid) -> Response<news::Model> {
        let found = News::find_by_id(id)
            .one(&self.db)
            .await
            .into_response("in find news by id")?;

        found.ok_or_else(|| RepositoryError::NotFound {
            what: format!("news item {}", id),
        })
    }
}

/// The ownership decision behind every scoped mutation. `author_scope` is
/// `None` when the actor manages all authors' items; otherwise the record
/// must belong to that author, never a silent no-op.
fn authorize(
    owner: Option<Uuid>,
    author_scope: Option<Uuid>,
    action: &str,
) -> Result<(), RepositoryError> {
    match author_scope {
        Some(author_id) if owner != Some(author_id) => {
            Err(RepositoryError::Forbidden {
                action: action.to_string(),
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use entity::news::Category;

    #[test]
    fn test_model_conversion_keeps_caller_supplied_fields() {
        // Arrange
        let id = Uuid::new_v4();
        let author = Uuid::new_v4();
        let model = news::Model {
            id,
            title: "Acreditación renovada".to_string(),
            subtitle: None,
            content: "El programa fue reacreditado.".to_string(),
            category: "Educación".to_string(),
            image_url: Some("http://img/a.jpg,http://img/b.jpg".to_string()),
            author_id: Some(author),
            author_name: Some("redaccion@uni.edu".to_string()),
            status: "published".to_string(),
            created_at: Utc::now().naive_utc(),
        };

        // Act
        let entity = NewsEntity::from(model);

        // Assert
        assert_eq!(entity.id, id);
        assert_eq!(entity.category, Category::Educacion);
        assert_eq!(entity.status, Status::Published);
        assert_eq!(entity.author_id, Some(author));
        assert_eq!(
            entity.image_url.as_deref(),
            Some("http://img/a.jpg,http://img/b.jpg")
        );
    }

    #[test]
    fn test_owner_passes_the_author_scope_check() {
        let author = Uuid::new_v4();

        assert!(authorize(Some(author), Some(author), "update").is_ok());
    }

    #[test]
    fn test_non_owner_is_forbidden() {
        // Arrange
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        // Act
        let result = authorize(Some(owner), Some(other), "delete");

        // Assert
        assert!(matches!(
            result,
            Err(RepositoryError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_unscoped_actor_reaches_any_record() {
        let owner = Uuid::new_v4();

        assert!(authorize(Some(owner), None, "update").is_ok());
        assert!(authorize(None, None, "delete").is_ok());
    }

    #[test]
    fn test_ownerless_record_is_forbidden_to_a_scoped_actor() {
        let actor = Uuid::new_v4();

        assert!(matches!(
            authorize(None, Some(actor), "update"),
            Err(RepositoryError::Forbidden { .. })
        ));
    }
}
