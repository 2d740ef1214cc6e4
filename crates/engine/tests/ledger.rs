use chrono::{Days, NaiveDate};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    CreateTransactionCmd, Engine, EngineError, Money, TransactionKind, TransactionListFilter,
    UpdateTransactionCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn file_db() -> (DatabaseConnection, String, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    (db, url, path)
}

fn day(offset_from: NaiveDate, days_back: u64) -> NaiveDate {
    offset_from - Days::new(days_back)
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

fn cmd(owner: &str, amount: &str, kind: TransactionKind, date: NaiveDate) -> CreateTransactionCmd {
    CreateTransactionCmd {
        owner_id: owner.to_string(),
        category_id: None,
        amount: amount.parse().unwrap(),
        less: Money::ZERO,
        kind,
        note: None,
        effective_date: date,
    }
}

#[tokio::test]
async fn create_assigns_per_day_serials() {
    let engine = engine_with_db().await;
    let date = base_date();

    for expected in 1..=3 {
        let tx = engine
            .create_transaction(cmd("alice", "10.00", TransactionKind::Credit, date))
            .await
            .unwrap();
        assert_eq!(tx.serial, expected);
    }

    // A different day and a different owner both restart at 1.
    let other_day = engine
        .create_transaction(cmd("alice", "10.00", TransactionKind::Credit, day(date, 1)))
        .await
        .unwrap();
    assert_eq!(other_day.serial, 1);

    let other_owner = engine
        .create_transaction(cmd("bob", "10.00", TransactionKind::Credit, date))
        .await
        .unwrap();
    assert_eq!(other_owner.serial, 1);
}

#[tokio::test]
async fn deleting_leaves_serial_gaps() {
    let engine = engine_with_db().await;
    let date = base_date();

    let mut ids = Vec::new();
    for _ in 0..3 {
        let tx = engine
            .create_transaction(cmd("alice", "5.00", TransactionKind::Debit, date))
            .await
            .unwrap();
        ids.push(tx.id);
    }

    assert!(engine.delete_transaction(ids[1], "alice").await.unwrap());

    let tx = engine
        .create_transaction(cmd("alice", "5.00", TransactionKind::Debit, date))
        .await
        .unwrap();
    assert_eq!(tx.serial, 4);

    let serials: Vec<i32> = engine
        .list_transactions("alice", &TransactionListFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|(tx, _)| tx.serial)
        .collect();
    let mut sorted = serials.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![1, 3, 4]);
}

#[tokio::test]
async fn serials_stay_unique_across_engine_instances() {
    let (db, url, path) = file_db().await;
    let engine_a = Engine::builder().database(db).build().await.unwrap();
    let db_b = Database::connect(&url).await.unwrap();
    let engine_b = Engine::builder().database(db_b).build().await.unwrap();
    let date = base_date();

    let mut serials = Vec::new();
    for engine in [&engine_a, &engine_b, &engine_a, &engine_b] {
        let tx = engine
            .create_transaction(cmd("alice", "1.00", TransactionKind::Credit, date))
            .await
            .unwrap();
        serials.push(tx.serial);
    }

    serials.sort_unstable();
    assert_eq!(serials, vec![1, 2, 3, 4]);

    drop(engine_a);
    drop(engine_b);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn amount_round_trips_exactly() {
    let engine = engine_with_db().await;

    let created = engine
        .create_transaction(cmd("alice", "156.75", TransactionKind::Debit, base_date()))
        .await
        .unwrap();
    assert_eq!(created.amount.to_string(), "156.75");

    let (stored, _) = engine
        .list_transactions("alice", &TransactionListFilter::default())
        .await
        .unwrap()
        .into_iter()
        .next()
        .unwrap();
    assert_eq!(stored.amount.to_string(), "156.75");
    assert_eq!(stored.amount.cents(), 15675);
}

#[tokio::test]
async fn create_rejects_negative_amounts() {
    let engine = engine_with_db().await;

    let err = engine
        .create_transaction(cmd("alice", "-3.00", TransactionKind::Debit, base_date()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount("amount must not be negative".to_string())
    );
}

#[tokio::test]
async fn owners_cannot_see_or_touch_each_other() {
    let engine = engine_with_db().await;
    let date = base_date();

    let alice_tx = engine
        .create_transaction(cmd("alice", "20.00", TransactionKind::Credit, date))
        .await
        .unwrap();
    engine
        .create_transaction(cmd("bob", "30.00", TransactionKind::Credit, date))
        .await
        .unwrap();

    let listed = engine
        .list_transactions("bob", &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].0.owner_id, "bob");

    let err = engine
        .update_transaction(UpdateTransactionCmd {
            owner_id: "bob".to_string(),
            transaction_id: alice_tx.id,
            amount: Some("1.00".parse().unwrap()),
            less: None,
            kind: None,
            category_id: None,
            note: None,
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("transaction not exists".to_string())
    );

    assert!(!engine.delete_transaction(alice_tx.id, "bob").await.unwrap());
    assert_eq!(
        engine
            .list_transactions("alice", &TransactionListFilter::default())
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn list_filters_by_kind_range_and_category() {
    let engine = engine_with_db().await;
    let date = base_date();

    let groceries = engine
        .create_category("alice", "Groceries", TransactionKind::Debit, None)
        .await
        .unwrap();

    let mut grocery_cmd = cmd("alice", "12.50", TransactionKind::Debit, date);
    grocery_cmd.category_id = Some(groceries.id);
    engine.create_transaction(grocery_cmd).await.unwrap();

    engine
        .create_transaction(cmd("alice", "100.00", TransactionKind::Credit, day(date, 2)))
        .await
        .unwrap();
    engine
        .create_transaction(cmd("alice", "7.00", TransactionKind::Debit, day(date, 5)))
        .await
        .unwrap();

    let debits = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                kind: Some(TransactionKind::Debit),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(debits.len(), 2);

    // Both range bounds are inclusive.
    let ranged = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                from: Some(day(date, 2)),
                to: Some(date),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ranged.len(), 2);

    let by_category = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                category_id: Some(groceries.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(
        by_category[0].1.as_ref().map(|c| c.name.as_str()),
        Some("Groceries")
    );

    let err = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                from: Some(date),
                to: Some(day(date, 2)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidFilter("invalid range: from must be <= to".to_string())
    );
}

#[tokio::test]
async fn list_orders_newest_first_and_paginates() {
    let engine = engine_with_db().await;
    let date = base_date();

    for back in [5u64, 3, 1, 0] {
        engine
            .create_transaction(cmd("alice", "1.00", TransactionKind::Credit, day(date, back)))
            .await
            .unwrap();
    }

    let all = engine
        .list_transactions("alice", &TransactionListFilter::default())
        .await
        .unwrap();
    let dates: Vec<NaiveDate> = all.iter().map(|(tx, _)| tx.effective_date).collect();
    assert_eq!(
        dates,
        vec![date, day(date, 1), day(date, 3), day(date, 5)]
    );

    let (page_one, cursor) = engine
        .list_transactions_page("alice", 3, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(page_one.len(), 3);
    let cursor = cursor.expect("expected a second page");

    let (page_two, end) = engine
        .list_transactions_page("alice", 3, Some(&cursor), &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(page_two.len(), 1);
    assert_eq!(page_two[0].0.effective_date, day(date, 5));
    assert!(end.is_none());
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let engine = engine_with_db().await;

    let mut create = cmd("alice", "50.00", TransactionKind::Debit, base_date());
    create.note = Some("lunch".to_string());
    let tx = engine.create_transaction(create).await.unwrap();

    let updated = engine
        .update_transaction(UpdateTransactionCmd {
            owner_id: "alice".to_string(),
            transaction_id: tx.id,
            amount: Some("55.25".parse().unwrap()),
            less: None,
            kind: None,
            category_id: None,
            note: None,
        })
        .await
        .unwrap();

    assert_eq!(updated.amount.to_string(), "55.25");
    assert_eq!(updated.kind, TransactionKind::Debit);
    assert_eq!(updated.note.as_deref(), Some("lunch"));
    assert_eq!(updated.serial, tx.serial);
    assert_eq!(updated.effective_date, tx.effective_date);
}

#[tokio::test]
async fn create_rejects_foreign_category() {
    let engine = engine_with_db().await;

    let bobs = engine
        .create_category("bob", "Rent", TransactionKind::Debit, None)
        .await
        .unwrap();

    let mut create = cmd("alice", "700.00", TransactionKind::Debit, base_date());
    create.category_id = Some(bobs.id);
    let err = engine.create_transaction(create).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("category not exists".to_string())
    );
}

#[tokio::test]
async fn category_names_and_codes_are_unique_per_owner() {
    let engine = engine_with_db().await;

    engine
        .create_category("alice", "Groceries", TransactionKind::Debit, Some("GR"))
        .await
        .unwrap();

    let err = engine
        .create_category("alice", "  groceries ", TransactionKind::Debit, None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("groceries".to_string()));

    let err = engine
        .create_category("alice", "Garden", TransactionKind::Debit, Some("GR"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("GR".to_string()));

    // Another owner can reuse both freely.
    engine
        .create_category("bob", "Groceries", TransactionKind::Debit, Some("GR"))
        .await
        .unwrap();
}

async fn seed_scenario(engine: &Engine, date: NaiveDate) {
    engine
        .create_transaction(cmd("alice", "5000.00", TransactionKind::Credit, day(date, 7)))
        .await
        .unwrap();
    engine
        .create_transaction(cmd("alice", "800.00", TransactionKind::Credit, day(date, 1)))
        .await
        .unwrap();
    engine
        .create_transaction(cmd("alice", "1200.00", TransactionKind::Debit, day(date, 7)))
        .await
        .unwrap();
    engine
        .create_transaction(cmd("alice", "156.75", TransactionKind::Debit, day(date, 1)))
        .await
        .unwrap();
    engine
        .create_transaction(cmd("alice", "89.50", TransactionKind::Debit, date))
        .await
        .unwrap();
}

#[tokio::test]
async fn dashboard_matches_the_ledger() {
    let engine = engine_with_db().await;
    let date = base_date();
    seed_scenario(&engine, date).await;

    let (summary, today) = engine.dashboard_summary("alice", date).await.unwrap();
    assert_eq!(summary.total_credit.to_string(), "5800.00");
    assert_eq!(summary.total_debit.to_string(), "1446.25");
    assert_eq!(summary.outstanding_balance.to_string(), "4353.75");
    assert_eq!(today.credit.to_string(), "0.00");
    assert_eq!(today.debit.to_string(), "89.50");

    // Removing today's debit moves both the lifetime totals and the balance.
    let todays = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                from: Some(date),
                to: Some(date),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(
        engine
            .delete_transaction(todays[0].0.id, "alice")
            .await
            .unwrap()
    );

    let (summary, today) = engine.dashboard_summary("alice", date).await.unwrap();
    assert_eq!(summary.total_debit.to_string(), "1356.75");
    assert_eq!(summary.outstanding_balance.to_string(), "4443.75");
    assert_eq!(today.debit.to_string(), "0.00");
}

#[tokio::test]
async fn report_generation_upserts_per_day() {
    let engine = engine_with_db().await;
    let date = base_date();
    seed_scenario(&engine, date).await;

    let report = engine
        .generate_daily_report("alice", day(date, 7))
        .await
        .unwrap();
    assert_eq!(report.total_credit.to_string(), "5000.00");
    assert_eq!(report.total_debit.to_string(), "1200.00");
    assert_eq!(report.net_change.to_string(), "3800.00");

    // Regenerating without changes keeps the same totals and the same row.
    let again = engine
        .generate_daily_report("alice", day(date, 7))
        .await
        .unwrap();
    assert_eq!(again.id, report.id);
    assert_eq!(again.total_credit, report.total_credit);
    assert_eq!(again.total_debit, report.total_debit);
    assert_eq!(again.net_change, report.net_change);

    engine
        .create_transaction(cmd("alice", "100.00", TransactionKind::Debit, day(date, 7)))
        .await
        .unwrap();
    let refreshed = engine
        .generate_daily_report("alice", day(date, 7))
        .await
        .unwrap();
    assert_eq!(refreshed.id, report.id);
    assert_eq!(refreshed.total_debit.to_string(), "1300.00");
    assert_eq!(refreshed.net_change.to_string(), "3700.00");

    // A day with no transactions snapshots zeros.
    let empty = engine
        .generate_daily_report("alice", day(date, 30))
        .await
        .unwrap();
    assert_eq!(empty.total_credit, Money::ZERO);
    assert_eq!(empty.total_debit, Money::ZERO);
    assert_eq!(empty.net_change, Money::ZERO);

    let reports = engine.list_daily_reports("alice").await.unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].report_date, day(date, 7));
    assert_eq!(reports[1].report_date, day(date, 30));

    assert!(engine.list_daily_reports("bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn restart_reads_same_state() {
    let (db, url, path) = file_db().await;
    let engine = Engine::builder().database(db).build().await.unwrap();

    engine
        .create_transaction(cmd("alice", "42.00", TransactionKind::Credit, base_date()))
        .await
        .unwrap();
    drop(engine);

    let db2 = Database::connect(&url).await.unwrap();
    let engine2 = Engine::builder().database(db2).build().await.unwrap();
    let listed = engine2
        .list_transactions("alice", &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].0.amount.to_string(), "42.00");

    drop(engine2);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn many_small_amounts_sum_exactly() {
    let engine = engine_with_db().await;
    let date = base_date();

    for _ in 0..10 {
        engine
            .create_transaction(cmd("alice", "0.10", TransactionKind::Credit, date))
            .await
            .unwrap();
    }

    let (summary, _) = engine.dashboard_summary("alice", date).await.unwrap();
    assert_eq!(summary.total_credit.to_string(), "1.00");
}
