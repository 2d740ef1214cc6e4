pub use sea_orm_migration::prelude::*;

mod m20260712_000001_categories;
mod m20260712_000002_transactions;
mod m20260715_090000_daily_reports;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260712_000001_categories::Migration),
            Box::new(m20260712_000002_transactions::Migration),
            Box::new(m20260715_090000_daily_reports::Migration),
        ]
    }
}
