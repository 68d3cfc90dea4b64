//! Integration tests for competencia-core services
//!
//! These tests exercise the services end to end against real DuckDB files.
//! Store failures are injected at the trait level.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

use competencia_core::adapters::{DuckDbStore, MemoryStore};
use competencia_core::config::Config;
use competencia_core::ports::{FixedClock, TransactionStore};
use competencia_core::services::{TransactionFilter, TransactionInput};
use competencia_core::{
    CompetenciaContext, Error, NewTransaction, Result, Transaction, TransactionKind,
    TransactionPatch, TransactionStatus, DB_FILE,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Open a context in `temp_dir` with "today" pinned
fn create_test_context(temp_dir: &TempDir, today: NaiveDate) -> CompetenciaContext {
    CompetenciaContext::new(temp_dir.path(), Arc::new(FixedClock(today)))
        .expect("Failed to create context")
}

fn internet_bill(date: NaiveDate) -> TransactionInput {
    TransactionInput {
        kind: TransactionKind::Expense,
        occurred_on: date,
        category: "Internet".to_string(),
        description: "Internet".to_string(),
        amount: Decimal::new(12000, 2),
        status: TransactionStatus::Paid,
        recurring: true,
    }
}

/// Store that delegates to memory but can fail on demand
struct FlakyStore {
    inner: MemoryStore,
    fail_list: AtomicBool,
    fail_create_for: Option<String>,
}

impl FlakyStore {
    fn new(fail_create_for: Option<&str>) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_list: AtomicBool::new(false),
            fail_create_for: fail_create_for.map(str::to_string),
        }
    }
}

impl TransactionStore for FlakyStore {
    fn list(&self, owner: &str) -> Result<Vec<Transaction>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Error::database("connection lost"));
        }
        self.inner.list(owner)
    }

    fn get(&self, id: Uuid) -> Result<Option<Transaction>> {
        self.inner.get(id)
    }

    fn create(&self, draft: &NewTransaction) -> Result<Uuid> {
        if self.fail_create_for.as_deref() == Some(draft.description.as_str())
            && draft.reference_period.to_string() == "Fevereiro 2026"
        {
            return Err(Error::database("disk full"));
        }
        self.inner.create(draft)
    }

    fn update(&self, id: Uuid, patch: &TransactionPatch) -> Result<()> {
        self.inner.update(id, patch)
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        self.inner.delete(id)
    }
}

// ============================================================================
// Recurrence End to End
// ============================================================================

#[test]
fn test_recurring_internet_bill_rolls_into_february() {
    let temp_dir = TempDir::new().unwrap();
    {
        let ctx = create_test_context(&temp_dir, ymd(2026, 1, 10));
        ctx.transaction_service.create(internet_bill(ymd(2026, 1, 10))).unwrap();
    }

    let ctx = create_test_context(&temp_dir, ymd(2026, 2, 3));
    let report = ctx.session.bootstrap().unwrap().expect("first bootstrap runs");

    assert_eq!(report.created.len(), 1);
    let february = ctx
        .transaction_service
        .list(&TransactionFilter {
            period: Some("Fevereiro 2026".parse().unwrap()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(february.len(), 1);
    let tx = &february[0];
    assert_eq!(tx.amount, Decimal::new(12000, 2));
    assert_eq!(tx.occurred_on, ymd(2026, 2, 10));
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert!(tx.recurring);

    // Same session: nothing more
    assert!(ctx.session.bootstrap().unwrap().is_none());
}

#[test]
fn test_recurrence_is_idempotent_across_sessions() {
    let temp_dir = TempDir::new().unwrap();
    {
        let ctx = create_test_context(&temp_dir, ymd(2026, 1, 31));
        ctx.transaction_service.create(internet_bill(ymd(2026, 1, 31))).unwrap();
    }

    for _ in 0..3 {
        let ctx = create_test_context(&temp_dir, ymd(2026, 2, 20));
        ctx.session.bootstrap().unwrap();
    }

    let ctx = create_test_context(&temp_dir, ymd(2026, 2, 20));
    let all = ctx.transaction_service.list(&TransactionFilter::default()).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].occurred_on, ymd(2026, 2, 28));
}

#[test]
fn test_failed_creation_does_not_stop_the_pass() {
    let store = Arc::new(FlakyStore::new(Some("Energia")));
    for description in ["Energia", "Internet"] {
        store
            .create(&NewTransaction {
                owner: "local".to_string(),
                kind: TransactionKind::Expense,
                occurred_on: ymd(2026, 1, 5),
                reference_period: "Janeiro 2026".parse().unwrap(),
                category: description.to_string(),
                description: description.to_string(),
                amount: Decimal::new(10000, 2),
                status: TransactionStatus::Paid,
                recurring: true,
            })
            .unwrap();
    }

    let ctx = CompetenciaContext::with_store(
        Config::default(),
        store.clone(),
        Arc::new(FixedClock(ymd(2026, 2, 1))),
    );
    let report = ctx.session.bootstrap().unwrap().unwrap();

    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].error.contains("disk full"));
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.created[0].description, "Internet");
}

#[test]
fn test_failed_list_aborts_and_can_retry() {
    let store = Arc::new(FlakyStore::new(None));
    store.fail_list.store(true, Ordering::SeqCst);

    let ctx = CompetenciaContext::with_store(
        Config::default(),
        store.clone(),
        Arc::new(FixedClock(ymd(2026, 2, 1))),
    );
    assert!(matches!(ctx.session.bootstrap(), Err(Error::Database(_))));

    store.fail_list.store(false, Ordering::SeqCst);
    assert!(ctx.session.bootstrap().unwrap().is_some());
}

// ============================================================================
// Reference Periods
// ============================================================================

#[test]
fn test_ac4_income_lands_two_months_later() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir, ymd(2026, 3, 15));

    let tx = ctx
        .transaction_service
        .quick_add(TransactionKind::Income, ymd(2026, 3, 15), "AC-4", "Auxílio", Decimal::new(800, 0))
        .unwrap();
    assert_eq!(tx.reference_period.to_string(), "Maio 2026");
    assert_eq!(tx.status, TransactionStatus::Received);

    let summary = ctx
        .summary_service
        .summarize(&ctx.transaction_service.list(&TransactionFilter::default()).unwrap(), Some(tx.reference_period));
    assert_eq!(summary.income_total, Decimal::new(800, 0));
}

#[test]
fn test_doctor_fixes_periods_after_shift_change() {
    let temp_dir = TempDir::new().unwrap();
    let id = {
        let ctx = create_test_context(&temp_dir, ymd(2026, 1, 5));
        ctx.transaction_service
            .quick_add(TransactionKind::Income, ymd(2026, 1, 5), "Salário", "Salário", Decimal::new(5000, 0))
            .unwrap()
            .id
    };

    let mut config = Config::load(temp_dir.path()).unwrap();
    config.period_shifts.set(TransactionKind::Income, "Salário", 1);
    config.save(temp_dir.path()).unwrap();

    let ctx = create_test_context(&temp_dir, ymd(2026, 1, 5));
    let drifts = ctx.doctor_service.check_periods().unwrap();
    assert_eq!(drifts.len(), 1);
    assert_eq!(drifts[0].expected.to_string(), "Fevereiro 2026");

    assert_eq!(ctx.doctor_service.fix_periods().unwrap(), 1);
    let tx = ctx.transaction_service.get(id).unwrap().unwrap();
    assert_eq!(tx.reference_period.to_string(), "Fevereiro 2026");
}

#[test]
fn test_doctor_fix_keeps_recurring_ac4_chain() {
    let temp_dir = TempDir::new().unwrap();
    {
        let ctx = create_test_context(&temp_dir, ymd(2026, 1, 10));
        let tx = ctx
            .transaction_service
            .create(TransactionInput {
                kind: TransactionKind::Income,
                occurred_on: ymd(2026, 1, 10),
                category: "AC-4".to_string(),
                description: "Auxílio".to_string(),
                amount: Decimal::new(800, 0),
                status: TransactionStatus::Received,
                recurring: true,
            })
            .unwrap();
        assert_eq!(tx.reference_period.to_string(), "Março 2026");
    }

    let ctx = create_test_context(&temp_dir, ymd(2026, 4, 5));
    let april = ctx.session.bootstrap().unwrap().unwrap();
    assert_eq!(april.created.len(), 1);
    assert_eq!(april.created[0].reference_period.to_string(), "Abril 2026");

    assert!(ctx.doctor_service.check_periods().unwrap().is_empty());
    assert_eq!(ctx.doctor_service.fix_periods().unwrap(), 0);

    let ctx = create_test_context(&temp_dir, ymd(2026, 5, 5));
    let may = ctx.session.bootstrap().unwrap().unwrap();
    assert_eq!(may.created.len(), 1);
    assert_eq!(may.created[0].occurred_on, ymd(2026, 5, 10));
}

// ============================================================================
// Installments
// ============================================================================

#[test]
fn test_failed_installment_removes_the_earlier_ones() {
    let store = Arc::new(FlakyStore::new(Some("Geladeira (2/3)")));
    let ctx = CompetenciaContext::with_store(
        Config::default(),
        store.clone(),
        Arc::new(FixedClock(ymd(2026, 1, 15))),
    );

    let result = ctx.transaction_service.create_installments(
        TransactionInput {
            kind: TransactionKind::Expense,
            occurred_on: ymd(2026, 1, 15),
            category: "Cartão".to_string(),
            description: "Geladeira".to_string(),
            amount: Decimal::new(100000, 2),
            status: TransactionStatus::Paid,
            recurring: false,
        },
        3,
    );

    assert!(matches!(result, Err(Error::Database(_))));
    assert!(store.list("local").unwrap().is_empty());
}

// ============================================================================
// DuckDB Adapter
// ============================================================================

#[test]
fn test_sub_cent_amount_is_rejected_before_storage() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir, ymd(2026, 2, 1));

    let mut input = internet_bill(ymd(2026, 2, 1));
    input.amount = "0.004".parse().unwrap();
    let err = ctx.transaction_service.create(input).unwrap_err();
    assert!(err.is_validation());

    let stored = ctx.transaction_service.list(&TransactionFilter::default()).unwrap();
    assert!(stored.is_empty());
}

#[test]
fn test_duckdb_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join(DB_FILE);

    let id = {
        let store = DuckDbStore::open(&db_path).unwrap();
        store
            .create(&NewTransaction {
                owner: "local".to_string(),
                kind: TransactionKind::Expense,
                occurred_on: ymd(2024, 2, 29),
                reference_period: "Fevereiro 2024".parse().unwrap(),
                category: "Consórcio".to_string(),
                description: "Parcela consórcio".to_string(),
                amount: Decimal::new(45678, 2),
                status: TransactionStatus::Pending,
                recurring: false,
            })
            .unwrap()
    };

    let store = DuckDbStore::open(&db_path).unwrap();
    let tx = store.get(id).unwrap().unwrap();
    assert_eq!(tx.occurred_on, ymd(2024, 2, 29));
    assert_eq!(tx.amount, Decimal::new(45678, 2));
    assert_eq!(tx.category, "Consórcio");
    assert_eq!(store.list("local").unwrap().len(), 1);
    assert!(store.list("someone-else").unwrap().is_empty());
}

#[test]
fn test_corrupt_period_label_is_integrity_error() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join(DB_FILE);

    {
        let store = DuckDbStore::open(&db_path).unwrap();
        store
            .create(&NewTransaction {
                owner: "local".to_string(),
                kind: TransactionKind::Expense,
                occurred_on: ymd(2026, 1, 5),
                reference_period: "Janeiro 2026".parse().unwrap(),
                category: "Outros".to_string(),
                description: "Padaria".to_string(),
                amount: Decimal::new(1500, 2),
                status: TransactionStatus::Paid,
                recurring: false,
            })
            .unwrap();
    }
    {
        let conn = duckdb::Connection::open(&db_path).unwrap();
        conn.execute("UPDATE sys_transactions SET reference_period = 'Geral'", [])
            .unwrap();
    }

    let store = DuckDbStore::open(&db_path).unwrap();
    assert!(matches!(store.list("local"), Err(Error::DataIntegrity(_))));
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_filtered_period_to_csv() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir, ymd(2026, 2, 1));
    ctx.transaction_service.create(internet_bill(ymd(2026, 1, 10))).unwrap();
    ctx.transaction_service.create(internet_bill(ymd(2026, 2, 10))).unwrap();

    let january = ctx
        .transaction_service
        .list(&TransactionFilter {
            period: Some("Janeiro 2026".parse().unwrap()),
            ..Default::default()
        })
        .unwrap();
    let path = temp_dir.path().join("janeiro.csv");
    let rows = ctx.export_service.export_csv_to_path(&january, &path).unwrap();
    assert_eq!(rows, 1);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("10/01/2026,Internet,Internet,Expense,120.00,Paid,Janeiro 2026,true"));
}
