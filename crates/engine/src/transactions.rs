//! Transaction primitives.
//!
//! A `Transaction` is a single monetary event: a credit or debit of a fixed
//! decimal amount, effective on one calendar day, scoped to one owner.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Increases the owner's balance.
    Credit,
    /// Decreases the owner's balance.
    Debit,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub owner_id: String,
    pub category_id: Option<Uuid>,
    /// Non-negative magnitude; the sign of its effect comes from `kind`.
    pub amount: Money,
    /// Secondary deduction ("less"). Stored, not aggregated.
    pub less: Money,
    pub kind: TransactionKind,
    pub note: Option<String>,
    /// Effective calendar day (UTC).
    pub effective_date: NaiveDate,
    /// Position within the owner's day, assigned at insert.
    ///
    /// Serials are never reassigned, so deleting a row leaves a gap.
    pub serial: i32,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        owner_id: String,
        category_id: Option<Uuid>,
        amount: Money,
        less: Money,
        kind: TransactionKind,
        note: Option<String>,
        effective_date: NaiveDate,
        serial: i32,
    ) -> ResultEngine<Self> {
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "amount must not be negative".to_string(),
            ));
        }
        if less.is_negative() {
            return Err(EngineError::InvalidAmount(
                "less must not be negative".to_string(),
            ));
        }
        if serial < 1 {
            return Err(EngineError::InvalidAmount(
                "serial must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            category_id,
            amount,
            less,
            kind,
            note,
            effective_date,
            serial,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: String,
    pub category_id: Option<Uuid>,
    pub amount_minor: i64,
    pub less_minor: i64,
    pub kind: String,
    pub note: Option<String>,
    pub effective_date: Date,
    pub serial: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Categories,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            owner_id: ActiveValue::Set(tx.owner_id.clone()),
            category_id: ActiveValue::Set(tx.category_id),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            less_minor: ActiveValue::Set(tx.less.cents()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            note: ActiveValue::Set(tx.note.clone()),
            effective_date: ActiveValue::Set(tx.effective_date),
            serial: ActiveValue::Set(tx.serial),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            category_id: model.category_id,
            amount: Money::new(model.amount_minor),
            less: Money::new(model.less_minor),
            kind: TransactionKind::try_from(model.kind.as_str())?,
            note: model.note,
            effective_date: model.effective_date,
            serial: model.serial,
            created_at: model.created_at,
        })
    }
}
