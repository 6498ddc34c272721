//! Create `umkm` table with FKs to `category` and `user`.
//!
//! Carries the running rating aggregate and the activation flag.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Umkm::Table)
                    .if_not_exists()
                    .col(pk_auto(Umkm::Id))
                    .col(string_len(Umkm::Name, 128).not_null())
                    .col(string_len(Umkm::Location, 128).not_null())
                    .col(text(Umkm::Description).not_null())
                    .col(integer(Umkm::CategoryId).not_null())
                    .col(ColumnDef::new(Umkm::Photo).text().null())
                    .col(integer(Umkm::UserId).not_null())
                    .col(double(Umkm::Rating).not_null())
                    .col(integer(Umkm::TotalRating).not_null())
                    .col(boolean(Umkm::IsActive).not_null())
                    .col(timestamp_with_time_zone(Umkm::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_umkm_category")
                            .from(Umkm::Table, Umkm::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_umkm_user")
                            .from(Umkm::Table, Umkm::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Umkm::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Umkm { Table, Id, Name, Location, Description, CategoryId, Photo, UserId, Rating, TotalRating, IsActive, CreatedAt }

#[derive(DeriveIden)]
enum Category { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
