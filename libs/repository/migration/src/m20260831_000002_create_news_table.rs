use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(News::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(News::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(News::Title).string().not_null())
                    .col(ColumnDef::new(News::Subtitle).string())
                    .col(ColumnDef::new(News::Content).text().not_null())
                    .col(ColumnDef::new(News::Category).string().not_null())
                    .col(ColumnDef::new(News::ImageUrl).string())
                    .col(ColumnDef::new(News::AuthorId).uuid())
                    .col(ColumnDef::new(News::AuthorName).string())
                    .col(ColumnDef::new(News::Status).string().not_null())
                    .col(
                        ColumnDef::new(News::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(News::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum News {
    Table,
    Id,
    Title,
    Subtitle,
    Content,
    Category,
    ImageUrl,
    AuthorId,
    AuthorName,
    Status,
    CreatedAt,
}
