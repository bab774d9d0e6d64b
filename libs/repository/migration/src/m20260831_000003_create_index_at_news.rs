use sea_orm_migration::prelude::*;

use crate::m20260831_000002_create_news_table::News;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Both the catalog and the management list order by recency.
        manager
            .create_index(
                Index::create()
                    .name("idx-news-created-at")
                    .table(News::Table)
                    .col(News::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-news-author-id")
                    .table(News::Table)
                    .col(News::AuthorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-news-author-id")
                    .table(News::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx-news-created-at")
                    .table(News::Table)
                    .to_owned(),
            )
            .await
    }
}
