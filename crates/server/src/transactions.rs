//! Transactions API endpoints.

use api_types::transaction::{
    TransactionCreate, TransactionListParams, TransactionListResponse, TransactionUpdate,
    TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{CreateTransactionCmd, Money, TransactionListFilter, UpdateTransactionCmd};
use uuid::Uuid;

use crate::{
    ServerError,
    categories::{map_category, map_kind, parse_kind},
    server::{OwnerId, ServerState},
};

const DEFAULT_PAGE_SIZE: u64 = 50;

fn map_transaction(tx: engine::Transaction, category: Option<engine::Category>) -> TransactionView {
    TransactionView {
        id: tx.id,
        serial: tx.serial,
        kind: map_kind(tx.kind),
        amount: tx.amount.to_string(),
        less: tx.less.to_string(),
        category_id: tx.category_id,
        category: category.map(map_category),
        note: tx.note,
        date: tx.effective_date,
        created_at: tx.created_at,
    }
}

fn parse_amount(raw: &str) -> Result<Money, ServerError> {
    let amount: Money = raw.parse()?;
    Ok(amount)
}

pub async fn list(
    Extension(owner): Extension<OwnerId>,
    State(state): State<ServerState>,
    Query(params): Query<TransactionListParams>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let filter = TransactionListFilter {
        kind: params.kind.as_deref().map(parse_kind).transpose()?,
        from: params.start_date,
        to: params.end_date,
        category_id: params.category_id,
    };
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);

    let (items, next_cursor) = state
        .engine
        .list_transactions_page(&owner.0, limit, params.cursor.as_deref(), &filter)
        .await?;

    let transactions = items
        .into_iter()
        .map(|(tx, category)| map_transaction(tx, category))
        .collect();

    Ok(Json(TransactionListResponse {
        transactions,
        next_cursor,
    }))
}

pub async fn create(
    Extension(owner): Extension<OwnerId>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionCreate>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let amount = parse_amount(&payload.amount)?;
    let less = payload
        .less
        .as_deref()
        .map(|raw| raw.parse::<Money>())
        .transpose()?
        .unwrap_or(Money::ZERO);

    let tx = state
        .engine
        .create_transaction(CreateTransactionCmd {
            owner_id: owner.0.clone(),
            category_id: payload.category_id,
            amount,
            less,
            kind: parse_kind(&payload.kind)?,
            note: payload.note,
            effective_date: payload.date.unwrap_or_else(|| Utc::now().date_naive()),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(map_transaction(tx, None))))
}

pub async fn update(
    Extension(owner): Extension<OwnerId>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let amount = payload.amount.as_deref().map(parse_amount).transpose()?;
    let less = payload
        .less
        .as_deref()
        .map(|raw| raw.parse::<Money>())
        .transpose()?;

    let tx = state
        .engine
        .update_transaction(UpdateTransactionCmd {
            owner_id: owner.0.clone(),
            transaction_id: id,
            amount,
            less,
            kind: payload.kind.as_deref().map(parse_kind).transpose()?,
            category_id: payload.category_id,
            note: payload.note,
        })
        .await?;

    Ok(Json(map_transaction(tx, None)))
}

pub async fn remove(
    Extension(owner): Extension<OwnerId>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let removed = state.engine.delete_transaction(id, &owner.0).await?;
    if !removed {
        return Err(ServerError::Engine(engine::EngineError::KeyNotFound(
            "transaction not exists".to_string(),
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}
