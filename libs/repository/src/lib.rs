use migration::Migrator;
use migration::MigratorTrait;
use news::NewsRepository;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use user::UserRepository;

mod active_models;
pub mod news;
pub mod user;

#[derive(Clone, Debug)]
pub struct Repository {
    pub news: NewsRepository,
    pub user: UserRepository,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database operation failed: {}: {}", message, source)]
    InSeaOrmDbErr {
        message: String,
        source: sea_orm::DbErr,
    },

    #[error("{} was not found", what)]
    NotFound { what: String },

    #[error("not allowed to {}", action)]
    Forbidden { action: String },
}

pub type Response<T> = Result<T, RepositoryError>;

pub trait IntoResponse<T> {
    fn into_response(self, message: &str) -> Response<T>;
}

impl<T> IntoResponse<T> for Result<T, sea_orm::DbErr> {
    fn into_response(self, message: &str) -> Response<T> {
        self.map_err(|e| RepositoryError::InSeaOrmDbErr {
            message: message.to_string(),
            source: e,
        })
    }
}

pub async fn init_repository(db_url: &str) -> Response<Repository> {
    let db = init_db(db_url).await?;

    let repository = Repository {
        news: NewsRepository::new(db.clone()),
        user: UserRepository::new(db.clone()),
    };

    Ok(repository)
}

async fn init_db(db_url: &str) -> Response<DatabaseConnection> {
    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(5)
        .min_connections(1)
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt)
        .await
        .into_response("in database connect")?;

    Migrator::up(&db, None)
        .await
        .into_response("in migrator up")?;

    Ok(db)
}
