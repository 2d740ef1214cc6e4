//! Core ledger engine: entities, exact money arithmetic, pure aggregation and
//! owner-scoped operations over an injected database connection.
//!
//! The engine never authenticates anyone. Every operation takes an opaque
//! `owner_id` resolved by the caller and applies it as a scoping predicate;
//! rows of other owners are invisible, not merely forbidden.

pub use aggregate::{DaySummary, Summary, TodaySummary};
pub use categories::Category;
pub use daily_reports::DailyReport;
pub use error::EngineError;
pub use money::Money;
pub use ops::{
    CreateTransactionCmd, Engine, EngineBuilder, TransactionListFilter, UpdateTransactionCmd,
};
pub use transactions::{Transaction, TransactionKind};

pub mod aggregate;
mod categories;
mod daily_reports;
mod error;
mod money;
mod ops;
mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
