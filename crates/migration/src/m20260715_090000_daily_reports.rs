use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum DailyReports {
    Table,
    Id,
    OwnerId,
    ReportDate,
    TotalCreditMinor,
    TotalDebitMinor,
    NetChangeMinor,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyReports::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DailyReports::OwnerId).string().not_null())
                    .col(ColumnDef::new(DailyReports::ReportDate).date().not_null())
                    .col(
                        ColumnDef::new(DailyReports::TotalCreditMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyReports::TotalDebitMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyReports::NetChangeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyReports::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One snapshot per owner per day; regeneration updates in place.
        manager
            .create_index(
                Index::create()
                    .name("idx-daily_reports-owner_id-report_date")
                    .table(DailyReports::Table)
                    .col(DailyReports::OwnerId)
                    .col(DailyReports::ReportDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyReports::Table).to_owned())
            .await?;
        Ok(())
    }
}
