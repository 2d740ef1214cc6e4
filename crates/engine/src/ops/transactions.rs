use base64::Engine as _;
use chrono::NaiveDate;
use sea_orm::{
    Condition, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Category, EngineError, Money, ResultEngine, Transaction, TransactionKind, categories,
    transactions,
};

use super::{Engine, normalize_optional_text, with_tx};

/// How many times a create retries when two writers race for the same
/// (owner, day) serial. The unique index makes the loser fail, not collide.
const SERIAL_MAX_RETRIES: usize = 3;

/// Filters for listing transactions.
///
/// The date range is inclusive on both ends (`[from, to]`); both bounds are
/// UTC calendar days.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub kind: Option<TransactionKind>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from > to
    {
        return Err(EngineError::InvalidFilter(
            "invalid range: from must be <= to".to_string(),
        ));
    }
    Ok(())
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, owner_id: &str, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, owner_id: &str, filter: &TransactionListFilter) -> Self {
        // Owner scoping is an invariant, not an optimization: it is applied
        // here so no listing path can forget it.
        self = self.filter(transactions::Column::OwnerId.eq(owner_id));

        if let Some(kind) = filter.kind {
            self = self.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::EffectiveDate.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(transactions::Column::EffectiveDate.lte(to));
        }
        if let Some(category_id) = filter.category_id {
            self = self.filter(transactions::Column::CategoryId.eq(category_id));
        }

        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TransactionsCursor {
    effective_date: NaiveDate,
    transaction_id: Uuid,
}

impl TransactionsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidFilter("invalid transactions cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidFilter("invalid transactions cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidFilter("invalid transactions cursor".to_string()))
    }
}

/// Fields for creating a transaction.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub owner_id: String,
    pub category_id: Option<Uuid>,
    pub amount: Money,
    /// Secondary deduction; defaults to zero.
    pub less: Money,
    pub kind: TransactionKind,
    pub note: Option<String>,
    pub effective_date: NaiveDate,
}

/// Partial update; absent fields keep their stored values.
///
/// The effective date is immutable: the serial is bound to the day it was
/// assigned on.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub owner_id: String,
    pub transaction_id: Uuid,
    pub amount: Option<Money>,
    pub less: Option<Money>,
    pub kind: Option<TransactionKind>,
    pub category_id: Option<Uuid>,
    pub note: Option<String>,
}

fn row_to_pair(
    tx_model: transactions::Model,
    category_model: Option<categories::Model>,
) -> ResultEngine<(Transaction, Option<Category>)> {
    let tx = Transaction::try_from(tx_model)?;
    let category = category_model.map(Category::try_from).transpose()?;
    Ok((tx, category))
}

impl Engine {
    /// Lists the owner's transactions, newest day first.
    ///
    /// Equivalent to [`Engine::list_transactions_page`] without pagination.
    pub async fn list_transactions(
        &self,
        owner_id: &str,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<(Transaction, Option<Category>)>> {
        let (items, _next) = self
            .list_transactions_page(owner_id, u64::from(u32::MAX), None, filter)
            .await?;
        Ok(items)
    }

    /// Lists the owner's transactions with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(effective_date DESC, id DESC)`; the
    /// id tiebreak keeps the order deterministic within a day.
    pub async fn list_transactions_page(
        &self,
        owner_id: &str,
        limit: u64,
        cursor: Option<&str>,
        filter: &TransactionListFilter,
    ) -> ResultEngine<(Vec<(Transaction, Option<Category>)>, Option<String>)> {
        validate_list_filter(filter)?;

        let mut query = transactions::Entity::find()
            .apply_tx_filters(owner_id, filter)
            .order_by_desc(transactions::Column::EffectiveDate)
            .order_by_desc(transactions::Column::Id);

        if let Some(cursor) = cursor {
            let cursor = TransactionsCursor::decode(cursor)?;
            query = query.filter(
                Condition::any()
                    .add(transactions::Column::EffectiveDate.lt(cursor.effective_date))
                    .add(
                        Condition::all()
                            .add(transactions::Column::EffectiveDate.eq(cursor.effective_date))
                            .add(transactions::Column::Id.lt(cursor.transaction_id)),
                    ),
            );
        }

        let limit_plus_one = limit.saturating_add(1);
        let rows: Vec<(transactions::Model, Option<categories::Model>)> = query
            .find_also_related(categories::Entity)
            .limit(limit_plus_one)
            .all(&self.database)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for (tx_model, category_model) in rows {
            items.push(row_to_pair(tx_model, category_model)?);
        }

        let next_cursor = if items.len() as u64 > limit {
            items.truncate(limit as usize);
            items.last().map(|(tx, _)| {
                TransactionsCursor {
                    effective_date: tx.effective_date,
                    transaction_id: tx.id,
                }
                .encode()
            })
        } else {
            None
        };

        Ok((items, next_cursor.transpose()?))
    }

    /// Creates a transaction and assigns its per-day serial.
    ///
    /// The serial is `last serial for (owner, day) + 1`, computed and inserted
    /// inside one DB transaction. A unique index on (owner, day, serial)
    /// rejects the loser of a concurrent race; the create then retries with a
    /// fresh serial. Serials are never reassigned, so deletes leave gaps.
    pub async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Transaction> {
        let mut attempts = 0;
        loop {
            match self.try_create_transaction(&cmd).await {
                Ok(tx) => return Ok(tx),
                Err(EngineError::Database(db_err))
                    if matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
                        && attempts + 1 < SERIAL_MAX_RETRIES =>
                {
                    attempts += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_create_transaction(&self, cmd: &CreateTransactionCmd) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            if let Some(category_id) = cmd.category_id {
                Self::require_category(&db_tx, &cmd.owner_id, category_id).await?;
            }

            let last = transactions::Entity::find()
                .filter(transactions::Column::OwnerId.eq(cmd.owner_id.clone()))
                .filter(transactions::Column::EffectiveDate.eq(cmd.effective_date))
                .order_by_desc(transactions::Column::Serial)
                .one(&db_tx)
                .await?;
            let serial = last.map(|model| model.serial).unwrap_or(0) + 1;

            let tx = Transaction::new(
                cmd.owner_id.clone(),
                cmd.category_id,
                cmd.amount,
                cmd.less,
                cmd.kind,
                normalize_optional_text(cmd.note.as_deref()),
                cmd.effective_date,
                serial,
            )?;

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok(tx)
        })
    }

    /// Applies a partial update to an owned transaction.
    ///
    /// Rows of other owners are invisible: the lookup itself is owner-scoped,
    /// so a foreign id fails with `KeyNotFound` rather than being denied.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(cmd.transaction_id)
                .filter(transactions::Column::OwnerId.eq(cmd.owner_id.clone()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;

            let mut tx = Transaction::try_from(model)?;

            if let Some(amount) = cmd.amount {
                if amount.is_negative() {
                    return Err(EngineError::InvalidAmount(
                        "amount must not be negative".to_string(),
                    ));
                }
                tx.amount = amount;
            }
            if let Some(less) = cmd.less {
                if less.is_negative() {
                    return Err(EngineError::InvalidAmount(
                        "less must not be negative".to_string(),
                    ));
                }
                tx.less = less;
            }
            if let Some(kind) = cmd.kind {
                tx.kind = kind;
            }
            if let Some(category_id) = cmd.category_id {
                Self::require_category(&db_tx, &cmd.owner_id, category_id).await?;
                tx.category_id = Some(category_id);
            }
            if let Some(note) = cmd.note.as_deref() {
                tx.note = normalize_optional_text(Some(note));
            }

            let mut active = transactions::ActiveModel::from(&tx);
            active.id = sea_orm::ActiveValue::Unchanged(tx.id);
            active.update(&db_tx).await?;

            Ok(tx)
        })
    }

    /// Deletes an owned transaction; returns whether a row was removed.
    pub async fn delete_transaction(&self, transaction_id: Uuid, owner_id: &str) -> ResultEngine<bool> {
        let result = transactions::Entity::delete_many()
            .filter(transactions::Column::Id.eq(transaction_id))
            .filter(transactions::Column::OwnerId.eq(owner_id))
            .exec(&self.database)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
