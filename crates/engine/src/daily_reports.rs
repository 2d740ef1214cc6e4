//! Persisted daily report snapshots.
//!
//! One row per (owner, calendar day), written only by the report generator.
//! Totals are recomputed from transactions at generation time; regenerating a
//! day replaces the previous snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReport {
    pub id: Uuid,
    pub owner_id: String,
    pub report_date: NaiveDate,
    pub total_credit: Money,
    pub total_debit: Money,
    /// total credit − total debit.
    pub net_change: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "daily_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: String,
    pub report_date: Date,
    pub total_credit_minor: i64,
    pub total_debit_minor: i64,
    pub net_change_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&DailyReport> for ActiveModel {
    fn from(report: &DailyReport) -> Self {
        Self {
            id: ActiveValue::Set(report.id),
            owner_id: ActiveValue::Set(report.owner_id.clone()),
            report_date: ActiveValue::Set(report.report_date),
            total_credit_minor: ActiveValue::Set(report.total_credit.cents()),
            total_debit_minor: ActiveValue::Set(report.total_debit.cents()),
            net_change_minor: ActiveValue::Set(report.net_change.cents()),
            created_at: ActiveValue::Set(report.created_at),
        }
    }
}

impl TryFrom<Model> for DailyReport {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            report_date: model.report_date,
            total_credit: Money::new(model.total_credit_minor),
            total_debit: Money::new(model.total_debit_minor),
            net_change: Money::new(model.net_change_minor),
            created_at: model.created_at,
        })
    }
}
