use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter,
};
use uuid::Uuid;

use crate::active_models::{prelude::*, user};
use crate::{IntoResponse as _, Response};
use entity::prelude::*;
use entity::user::Role;

#[derive(Clone, Debug)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<user::Model> for UserEntity {
    fn from(value: user::Model) -> Self {
        UserEntity {
            id: value.id,
            email: value.email,
            password_hash: value.password_hash,
            role: value.role.into(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl UserRepository {
    pub async fn find_by_id(&self, id: Uuid) -> Response<Option<UserEntity>> {
        let found = User::find_by_id(id)
            .one(&self.db)
            .await
            .into_response("in find user by id")?;

        Ok(found.map(UserEntity::from))
    }

    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Response<Option<UserEntity>> {
        let found = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .into_response("in find user by email")?;

        Ok(found.map(UserEntity::from))
    }

    pub async fn count(&self) -> Response<u64> {
        User::find()
            .count(&self.db)
            .await
            .into_response("in count users")
    }

    pub async fn create(
        &self,
        email: String,
        password_hash: String,
        role: Role,
    ) -> Response<UserEntity> {
        let now = Utc::now().naive_utc();
        let model = user::ActiveModel {
            id: ActiveValue::set(Uuid::new_v4()),
            email: ActiveValue::set(email),
            password_hash: ActiveValue::set(password_hash),
            role: ActiveValue::set(String::from(role)),
            created_at: ActiveValue::set(now),
            updated_at: ActiveValue::set(now),
        };

        let saved = model
            .insert(&self.db)
            .await
            .into_response("in insert user")?;

        Ok(saved.into())
    }
}
