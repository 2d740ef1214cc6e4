//! Pure aggregation over already-fetched transaction sets.
//!
//! Nothing here touches the database: callers fetch rows first and hand a
//! slice in, which keeps every total reproducible in plain unit tests.
//!
//! Sign convention: `outstanding_balance = total_credit - total_debit`, and a
//! day's `net_change = total_credit - total_debit`. Day membership uses the
//! transaction's `effective_date` (a UTC calendar day).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Money, Transaction, TransactionKind};

/// Lifetime totals over a transaction set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_credit: Money,
    pub total_debit: Money,
    pub outstanding_balance: Money,
}

/// Totals restricted to a single reference day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodaySummary {
    pub credit: Money,
    pub debit: Money,
}

/// One row per distinct calendar day present in the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total_credit: Money,
    pub total_debit: Money,
    pub net_change: Money,
}

fn credit_debit<'a, I>(transactions: I) -> (Money, Money)
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut credit = Money::ZERO;
    let mut debit = Money::ZERO;
    for tx in transactions {
        match tx.kind {
            TransactionKind::Credit => credit += tx.amount,
            TransactionKind::Debit => debit += tx.amount,
        }
    }
    (credit, debit)
}

/// Sums credits and debits over the whole set.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let (total_credit, total_debit) = credit_debit(transactions);
    Summary {
        total_credit,
        total_debit,
        outstanding_balance: total_credit - total_debit,
    }
}

/// Sums credits and debits over rows effective on `reference_date`.
pub fn summarize_today(transactions: &[Transaction], reference_date: NaiveDate) -> TodaySummary {
    let (credit, debit) = credit_debit(
        transactions
            .iter()
            .filter(|tx| tx.effective_date == reference_date),
    );
    TodaySummary { credit, debit }
}

/// Groups the set by calendar day, newest day first.
///
/// The rows partition the input: summing them reproduces [`summarize`].
pub fn group_by_day(transactions: &[Transaction]) -> Vec<DaySummary> {
    let mut days: BTreeMap<NaiveDate, (Money, Money)> = BTreeMap::new();
    for tx in transactions {
        let entry = days.entry(tx.effective_date).or_default();
        match tx.kind {
            TransactionKind::Credit => entry.0 += tx.amount,
            TransactionKind::Debit => entry.1 += tx.amount,
        }
    }

    days.into_iter()
        .rev()
        .map(|(date, (total_credit, total_debit))| DaySummary {
            date,
            total_credit,
            total_debit,
            net_change: total_credit - total_debit,
        })
        .collect()
}
