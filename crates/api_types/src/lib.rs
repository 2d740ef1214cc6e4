use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire-level transaction/category kind.
///
/// Serialized as `"credit"` / `"debit"`; a credit increases the owner's
/// balance, a debit decreases it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Credit,
    Debit,
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryCreate {
        pub name: String,
        /// `"credit"` or `"debit"`; validated server-side.
        #[serde(rename = "type")]
        pub kind: String,
        /// Optional short code, unique within the owner scope.
        pub code: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: EntryKind,
        pub code: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod transaction {
    use super::*;

    /// Query parameters for `GET /api/transactions`.
    ///
    /// The date range is inclusive on both ends.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionListParams {
        #[serde(rename = "type")]
        pub kind: Option<String>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub category_id: Option<Uuid>,
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `nextCursor`.
        ///
        /// Newest → older pagination.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionCreate {
        /// Decimal string with at most 2 fractional digits, e.g. `"156.75"`.
        pub amount: String,
        /// `"credit"` or `"debit"`; validated server-side.
        #[serde(rename = "type")]
        pub kind: String,
        pub category_id: Option<Uuid>,
        #[serde(rename = "notes")]
        pub note: Option<String>,
        /// Secondary deduction, decimal string. Defaults to `"0"`.
        pub less: Option<String>,
        /// Effective calendar day (UTC). Defaults to the current UTC day.
        pub date: Option<NaiveDate>,
    }

    /// Partial update: absent fields keep their stored values.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionUpdate {
        pub amount: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<String>,
        pub category_id: Option<Uuid>,
        #[serde(rename = "notes")]
        pub note: Option<String>,
        pub less: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: Uuid,
        /// Per-day position within the owner's ledger.
        pub serial: i32,
        #[serde(rename = "type")]
        pub kind: EntryKind,
        pub amount: String,
        pub less: String,
        pub category_id: Option<Uuid>,
        pub category: Option<super::category::CategoryView>,
        #[serde(rename = "notes")]
        pub note: Option<String>,
        pub date: NaiveDate,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }
}

pub mod report {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TodaySummaryView {
        pub credit: String,
        pub debit: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DashboardResponse {
        pub total_credit: String,
        pub total_debit: String,
        /// total credit − total debit.
        pub outstanding_balance: String,
        pub today_summary: TodaySummaryView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DailyReportView {
        pub id: Uuid,
        pub report_date: NaiveDate,
        pub total_credit: String,
        pub total_debit: String,
        pub net_change: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DailyReportListResponse {
        pub reports: Vec<DailyReportView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GenerateReport {
        /// Calendar day to snapshot, `YYYY-MM-DD`.
        pub date: NaiveDate,
    }
}
