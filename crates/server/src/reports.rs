//! Reports API endpoints: live dashboard and persisted daily snapshots.

use api_types::report::{
    DailyReportListResponse, DailyReportView, DashboardResponse, GenerateReport, TodaySummaryView,
};
use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::{
    ServerError,
    server::{OwnerId, ServerState},
};

fn map_report(report: engine::DailyReport) -> DailyReportView {
    DailyReportView {
        id: report.id,
        report_date: report.report_date,
        total_credit: report.total_credit.to_string(),
        total_debit: report.total_debit.to_string(),
        net_change: report.net_change.to_string(),
        created_at: report.created_at,
    }
}

pub async fn dashboard(
    Extension(owner): Extension<OwnerId>,
    State(state): State<ServerState>,
) -> Result<Json<DashboardResponse>, ServerError> {
    // Day membership follows the UTC calendar everywhere in this service.
    let today = Utc::now().date_naive();
    let (summary, today_summary) = state.engine.dashboard_summary(&owner.0, today).await?;

    Ok(Json(DashboardResponse {
        total_credit: summary.total_credit.to_string(),
        total_debit: summary.total_debit.to_string(),
        outstanding_balance: summary.outstanding_balance.to_string(),
        today_summary: TodaySummaryView {
            credit: today_summary.credit.to_string(),
            debit: today_summary.debit.to_string(),
        },
    }))
}

pub async fn list_daily(
    Extension(owner): Extension<OwnerId>,
    State(state): State<ServerState>,
) -> Result<Json<DailyReportListResponse>, ServerError> {
    let reports = state
        .engine
        .list_daily_reports(&owner.0)
        .await?
        .into_iter()
        .map(map_report)
        .collect();

    Ok(Json(DailyReportListResponse { reports }))
}

pub async fn generate(
    Extension(owner): Extension<OwnerId>,
    State(state): State<ServerState>,
    Json(payload): Json<GenerateReport>,
) -> Result<Json<DailyReportView>, ServerError> {
    let report = state
        .engine
        .generate_daily_report(&owner.0, payload.date)
        .await?;

    Ok(Json(map_report(report)))
}
