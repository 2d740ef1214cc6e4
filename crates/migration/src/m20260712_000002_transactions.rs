use sea_orm_migration::prelude::*;

use crate::m20260712_000001_categories::Categories;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    OwnerId,
    CategoryId,
    AmountMinor,
    LessMinor,
    Kind,
    Note,
    EffectiveDate,
    Serial,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::OwnerId).string().not_null())
                    .col(ColumnDef::new(Transactions::CategoryId).uuid())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::LessMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::Note).string())
                    .col(
                        ColumnDef::new(Transactions::EffectiveDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Serial).integer().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-category_id")
                            .from(Transactions::Table, Transactions::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-owner_id-effective_date")
                    .table(Transactions::Table)
                    .col(Transactions::OwnerId)
                    .col(Transactions::EffectiveDate)
                    .to_owned(),
            )
            .await?;

        // The serial race guard: concurrent creates for the same owner+day
        // cannot end up with the same serial.
        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-owner_id-effective_date-serial")
                    .table(Transactions::Table)
                    .col(Transactions::OwnerId)
                    .col(Transactions::EffectiveDate)
                    .col(Transactions::Serial)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        Ok(())
    }
}
