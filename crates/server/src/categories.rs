//! Categories API endpoints.

use api_types::{
    EntryKind,
    category::{CategoryCreate, CategoryListResponse, CategoryView},
};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{
    ServerError,
    server::{OwnerId, ServerState},
};

pub(crate) fn map_kind(kind: engine::TransactionKind) -> EntryKind {
    match kind {
        engine::TransactionKind::Credit => EntryKind::Credit,
        engine::TransactionKind::Debit => EntryKind::Debit,
    }
}

pub(crate) fn parse_kind(raw: &str) -> Result<engine::TransactionKind, ServerError> {
    Ok(engine::TransactionKind::try_from(raw)?)
}

pub(crate) fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: map_kind(category.kind),
        code: category.code,
        created_at: category.created_at,
    }
}

pub async fn list(
    Extension(owner): Extension<OwnerId>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state
        .engine
        .list_categories(&owner.0)
        .await?
        .into_iter()
        .map(map_category)
        .collect();

    Ok(Json(CategoryListResponse { categories }))
}

pub async fn create(
    Extension(owner): Extension<OwnerId>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(
            &owner.0,
            &payload.name,
            parse_kind(&payload.kind)?,
            payload.code.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(map_category(category))))
}
