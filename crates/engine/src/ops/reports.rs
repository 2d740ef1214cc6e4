use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    DailyReport, Money, ResultEngine, Transaction,
    aggregate::{self, Summary, TodaySummary},
    daily_reports, transactions,
};

use super::{Engine, with_tx};

impl Engine {
    /// Computes the live dashboard for an owner: lifetime totals plus the
    /// totals of `today` (a UTC calendar day supplied by the caller).
    pub async fn dashboard_summary(
        &self,
        owner_id: &str,
        today: NaiveDate,
    ) -> ResultEngine<(Summary, TodaySummary)> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::OwnerId.eq(owner_id))
            .all(&self.database)
            .await?;

        let txs: Vec<Transaction> = models
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultEngine<_>>()?;

        Ok((
            aggregate::summarize(&txs),
            aggregate::summarize_today(&txs, today),
        ))
    }

    /// Lists the owner's persisted daily reports, newest day first.
    pub async fn list_daily_reports(&self, owner_id: &str) -> ResultEngine<Vec<DailyReport>> {
        let models = daily_reports::Entity::find()
            .filter(daily_reports::Column::OwnerId.eq(owner_id))
            .order_by_desc(daily_reports::Column::ReportDate)
            .all(&self.database)
            .await?;

        models.into_iter().map(DailyReport::try_from).collect()
    }

    /// Materializes the daily report snapshot for `(owner, date)`.
    ///
    /// Totals are recomputed from the day's transactions every time; an
    /// existing snapshot for the same day is replaced (upsert). The read and
    /// the write share one DB transaction; concurrent transaction writes are
    /// not fenced off, so the snapshot is a best-effort summary of the day.
    pub async fn generate_daily_report(
        &self,
        owner_id: &str,
        date: NaiveDate,
    ) -> ResultEngine<DailyReport> {
        with_tx!(self, |db_tx| {
            let models = transactions::Entity::find()
                .filter(transactions::Column::OwnerId.eq(owner_id))
                .filter(transactions::Column::EffectiveDate.eq(date))
                .all(&db_tx)
                .await?;

            let txs: Vec<Transaction> = models
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<_>>()?;

            let (total_credit, total_debit, net_change) = aggregate::group_by_day(&txs)
                .into_iter()
                .find(|day| day.date == date)
                .map(|day| (day.total_credit, day.total_debit, day.net_change))
                .unwrap_or((Money::ZERO, Money::ZERO, Money::ZERO));

            let existing = daily_reports::Entity::find()
                .filter(daily_reports::Column::OwnerId.eq(owner_id))
                .filter(daily_reports::Column::ReportDate.eq(date))
                .one(&db_tx)
                .await?;

            let report = DailyReport {
                id: existing.as_ref().map(|model| model.id).unwrap_or_else(Uuid::new_v4),
                owner_id: owner_id.to_string(),
                report_date: date,
                total_credit,
                total_debit,
                net_change,
                created_at: Utc::now(),
            };

            let active = daily_reports::ActiveModel::from(&report);
            if existing.is_some() {
                let mut active = active;
                active.id = ActiveValue::Unchanged(report.id);
                active.update(&db_tx).await?;
            } else {
                active.insert(&db_tx).await?;
            }

            Ok(report)
        })
    }
}
