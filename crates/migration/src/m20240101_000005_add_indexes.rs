use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Umkm: listing filters on is_active and category_id
        manager
            .create_index(
                Index::create()
                    .name("idx_umkm_active")
                    .table(Umkm::Table)
                    .col(Umkm::IsActive)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_umkm_category")
                    .table(Umkm::Table)
                    .col(Umkm::CategoryId)
                    .to_owned(),
            )
            .await?;

        // Comment: per-business listing ordered by id
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_umkm")
                    .table(Comment::Table)
                    .col(Comment::UmkmId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_umkm_active").table(Umkm::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_umkm_category").table(Umkm::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_comment_umkm").table(Comment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Umkm { Table, IsActive, CategoryId }

#[derive(DeriveIden)]
enum Comment { Table, UmkmId }
