use chrono::{Days, NaiveDate};
use outlay_core::db::establish_connection;
use outlay_core::error::CoreError;
use outlay_core::models::{Frequency, NewExpenseData, NewRuleData, UpdateRuleData};
use outlay_core::recurrence::MaterializationConfig;
use outlay_core::repository::{
    ExpenseRepository, MaterializationRepository, RuleRepository, SqliteRepository,
};
use rust_decimal_macros::dec;
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

/// Helper function to create a test database.
///
/// The pool is returned alongside the repository so tests can inspect or
/// corrupt rows directly.
async fn setup_test_db() -> (SqliteRepository, SqlitePool, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = establish_connection(&db_path)
        .await
        .expect("Failed to establish test database connection");

    let repository = SqliteRepository::new(pool.clone(), MaterializationConfig::default());

    (repository, pool, temp_dir)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn daily_rule_data(user_id: Uuid, start_date: NaiveDate, end_date: Option<NaiveDate>) -> NewRuleData {
    NewRuleData {
        user_id,
        category_id: None,
        amount: dec!(4.50),
        currency: "usd".to_string(),
        description: Some("  Morning coffee  ".to_string()),
        frequency: Frequency::Daily,
        start_date,
        end_date,
    }
}

async fn expense_count(pool: &SqlitePool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM expenses")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

#[tokio::test]
async fn test_rule_crud_workflow() {
    let (repo, _pool, _temp_dir) = setup_test_db().await;
    let user_id = Uuid::now_v7();
    let today = date(2025, 6, 1);

    let rule = repo
        .create_rule(daily_rule_data(user_id, today, None), today)
        .await
        .unwrap();

    // Inputs are normalized on the way in.
    assert_eq!(rule.currency, "USD");
    assert_eq!(rule.description.as_deref(), Some("Morning coffee"));
    assert_eq!(rule.amount.value(), dec!(4.50));
    assert_eq!(rule.next_occurrence, today);
    assert!(rule.active);

    let found = repo.find_rule_by_id(rule.id).await.unwrap().unwrap();
    assert_eq!(found.id, rule.id);

    let listed = repo.find_rules_by_user(user_id).await.unwrap();
    assert_eq!(listed.len(), 1);

    let updated = repo
        .update_rule(
            rule.id,
            UpdateRuleData {
                amount: Some(dec!(5.258)),
                frequency: Some(Frequency::Weekly),
                ..Default::default()
            },
            today,
        )
        .await
        .unwrap();
    assert_eq!(updated.amount.value(), dec!(5.26));
    assert_eq!(updated.frequency, Frequency::Weekly);

    repo.delete_rule(rule.id).await.unwrap();
    assert!(repo.find_rule_by_id(rule.id).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_rule(rule.id).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_create_rule_validation() {
    let (repo, _pool, _temp_dir) = setup_test_db().await;
    let user_id = Uuid::now_v7();
    let today = date(2025, 6, 1);

    let mut zero_amount = daily_rule_data(user_id, today, None);
    zero_amount.amount = dec!(0);
    assert!(matches!(
        repo.create_rule(zero_amount, today).await,
        Err(CoreError::InvalidInput(_))
    ));

    let mut bad_currency = daily_rule_data(user_id, today, None);
    bad_currency.currency = "DOLLARS".to_string();
    assert!(matches!(
        repo.create_rule(bad_currency, today).await,
        Err(CoreError::InvalidInput(_))
    ));

    let end_before_start = daily_rule_data(user_id, today, Some(today - Days::new(1)));
    assert!(matches!(
        repo.create_rule(end_before_start, today).await,
        Err(CoreError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_initial_cursor_fast_forwards_without_materializing() {
    let (repo, pool, _temp_dir) = setup_test_db().await;
    let today = date(2025, 6, 1);
    let start = today - Days::new(400);

    let rule = repo
        .create_rule(daily_rule_data(Uuid::now_v7(), start, None), today)
        .await
        .unwrap();

    // The cursor lands on today; no historical expense exists.
    assert_eq!(rule.next_occurrence, today);
    assert_eq!(rule.start_date, start);
    assert_eq!(expense_count(&pool).await, 0);
}

#[tokio::test]
async fn test_rule_created_past_its_end_is_born_terminal() {
    let (repo, _pool, _temp_dir) = setup_test_db().await;
    let today = date(2025, 6, 1);

    let rule = repo
        .create_rule(
            daily_rule_data(
                Uuid::now_v7(),
                today - Days::new(30),
                Some(today - Days::new(10)),
            ),
            today,
        )
        .await
        .unwrap();

    assert!(!rule.active);
}

#[tokio::test]
async fn test_batch_run_catches_up_every_missed_occurrence() {
    let (repo, _pool, _temp_dir) = setup_test_db().await;
    let user_id = Uuid::now_v7();
    let start = date(2025, 5, 1);

    let rule = repo
        .create_rule(daily_rule_data(user_id, start, None), start)
        .await
        .unwrap();

    let created = repo.process_due_rules(start + Days::new(9)).await.unwrap();
    assert_eq!(created, 10);

    let expenses = repo.find_expenses_for_rule(rule.id).await.unwrap();
    assert_eq!(expenses.len(), 10);
    for (i, expense) in expenses.iter().enumerate() {
        assert_eq!(expense.expense_date, start + Days::new(i as u64));
        assert_eq!(expense.user_id, user_id);
        assert_eq!(expense.amount, rule.amount);
        assert_eq!(expense.currency, rule.currency);
        assert_eq!(expense.recurring_rule_id, Some(rule.id));
    }

    let after = repo.find_rule_by_id(rule.id).await.unwrap().unwrap();
    assert_eq!(after.next_occurrence, start + Days::new(10));
    assert!(after.active);

    // Re-running against the same reference date is a no-op.
    let created_again = repo.process_due_rules(start + Days::new(9)).await.unwrap();
    assert_eq!(created_again, 0);
    assert_eq!(repo.find_expenses_for_rule(rule.id).await.unwrap().len(), 10);
}

#[tokio::test]
async fn test_end_date_terminates_rule_during_run() {
    let (repo, _pool, _temp_dir) = setup_test_db().await;
    let start = date(2025, 5, 1);
    let end = start + Days::new(5);

    let rule = repo
        .create_rule(daily_rule_data(Uuid::now_v7(), start, Some(end)), start)
        .await
        .unwrap();

    let created = repo.process_due_rules(start + Days::new(9)).await.unwrap();
    assert_eq!(created, 6);

    let after = repo.find_rule_by_id(rule.id).await.unwrap().unwrap();
    assert!(!after.active);

    // A terminal rule never shows up as due again.
    let created_again = repo.process_due_rules(start + Days::new(30)).await.unwrap();
    assert_eq!(created_again, 0);
}

#[tokio::test]
async fn test_failed_run_commits_nothing() {
    let (repo, pool, _temp_dir) = setup_test_db().await;
    let start = date(2025, 5, 1);

    let healthy = repo
        .create_rule(daily_rule_data(Uuid::now_v7(), start, None), start)
        .await
        .unwrap();
    let corrupt = repo
        .create_rule(daily_rule_data(Uuid::now_v7(), start, None), start)
        .await
        .unwrap();

    // Sabotage the second rule: a cursor before the start date is a data
    // integrity error that must abort the whole run.
    sqlx::query("UPDATE recurring_rules SET next_occurrence = $1 WHERE id = $2")
        .bind(start - Days::new(10))
        .bind(corrupt.id)
        .execute(&pool)
        .await
        .unwrap();

    let result = repo.process_due_rules(start + Days::new(4)).await;
    assert!(matches!(result, Err(CoreError::DataIntegrity(_))));

    // No partial state: no expenses, and the healthy rule's cursor is
    // exactly where it was.
    assert_eq!(expense_count(&pool).await, 0);
    let healthy_after = repo.find_rule_by_id(healthy.id).await.unwrap().unwrap();
    assert_eq!(healthy_after.next_occurrence, healthy.next_occurrence);

    // Repair the corrupt rule and re-run: the full catch-up happens as if
    // the failed run never existed.
    sqlx::query("UPDATE recurring_rules SET next_occurrence = $1 WHERE id = $2")
        .bind(start)
        .bind(corrupt.id)
        .execute(&pool)
        .await
        .unwrap();

    let created = repo.process_due_rules(start + Days::new(4)).await.unwrap();
    assert_eq!(created, 10); // 5 per rule
}

#[tokio::test]
async fn test_concurrent_runs_materialize_exactly_once() {
    let (_repo, pool, _temp_dir) = setup_test_db().await;
    let start = date(2025, 5, 1);
    let reference = start + Days::new(9);

    let repo_a = SqliteRepository::new(pool.clone(), MaterializationConfig::default());
    let repo_b = SqliteRepository::new(pool.clone(), MaterializationConfig::default());

    let rule = repo_a
        .create_rule(daily_rule_data(Uuid::now_v7(), start, None), start)
        .await
        .unwrap();

    // Either both runs serialize cleanly (one creates 10, the other 0) or
    // the loser surfaces a retryable error; duplicates are never committed.
    let (result_a, result_b) = tokio::join!(
        repo_a.process_due_rules(reference),
        repo_b.process_due_rules(reference),
    );

    let created: usize = [&result_a, &result_b]
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .copied()
        .sum();
    assert!(result_a.is_ok() || result_b.is_ok());
    assert_eq!(created, 10);

    let expenses = repo_a.find_expenses_for_rule(rule.id).await.unwrap();
    assert_eq!(expenses.len(), 10);
    let mut dates: Vec<NaiveDate> = expenses.iter().map(|e| e.expense_date).collect();
    dates.dedup();
    assert_eq!(dates.len(), 10);
}

#[tokio::test]
async fn test_pending_cap_aborts_without_side_effects() {
    let (_repo, pool, _temp_dir) = setup_test_db().await;
    let repo = SqliteRepository::new(
        pool.clone(),
        MaterializationConfig {
            max_pending_occurrences: 10,
        },
    );
    let start = date(2025, 1, 1);

    let rule = repo
        .create_rule(daily_rule_data(Uuid::now_v7(), start, None), start)
        .await
        .unwrap();

    let result = repo.process_due_rules(start + Days::new(30)).await;
    assert!(matches!(result, Err(CoreError::TooManyPending(_, 10))));
    assert_eq!(expense_count(&pool).await, 0);

    let after = repo.find_rule_by_id(rule.id).await.unwrap().unwrap();
    assert_eq!(after.next_occurrence, start);
}

#[tokio::test]
async fn test_dry_run_preview_does_not_mutate() {
    let (repo, pool, _temp_dir) = setup_test_db().await;
    let start = date(2025, 5, 1);

    let rule = repo
        .create_rule(daily_rule_data(Uuid::now_v7(), start, None), start)
        .await
        .unwrap();

    let pending = repo
        .pending_occurrences(rule.id, start + Days::new(4))
        .await
        .unwrap();
    assert_eq!(
        pending,
        (0..5).map(|i| start + Days::new(i)).collect::<Vec<_>>()
    );

    assert_eq!(expense_count(&pool).await, 0);
    let after = repo.find_rule_by_id(rule.id).await.unwrap().unwrap();
    assert_eq!(after.next_occurrence, start);
}

#[tokio::test]
async fn test_deleting_a_rule_keeps_its_expense_history() {
    let (repo, _pool, _temp_dir) = setup_test_db().await;
    let user_id = Uuid::now_v7();
    let start = date(2025, 5, 1);

    let rule = repo
        .create_rule(daily_rule_data(user_id, start, None), start)
        .await
        .unwrap();
    repo.process_due_rules(start + Days::new(2)).await.unwrap();

    repo.delete_rule(rule.id).await.unwrap();

    // The back-reference is nulled, the records survive.
    let expenses = repo.find_expenses_by_user(user_id).await.unwrap();
    assert_eq!(expenses.len(), 3);
    assert!(expenses.iter().all(|e| e.recurring_rule_id.is_none()));
}

#[tokio::test]
async fn test_manual_expense_workflow() {
    let (repo, _pool, _temp_dir) = setup_test_db().await;
    let user_id = Uuid::now_v7();

    let expense = repo
        .add_expense(NewExpenseData {
            user_id,
            category_id: None,
            amount: dec!(120.004),
            currency: "eur".to_string(),
            description: Some("Annual insurance".to_string()),
            expense_date: date(2025, 6, 15),
        })
        .await
        .unwrap();

    assert_eq!(expense.amount.value(), dec!(120.00));
    assert_eq!(expense.currency, "EUR");
    assert!(expense.recurring_rule_id.is_none());

    let fetched = repo.find_expense_by_id(expense.id).await.unwrap().unwrap();
    assert_eq!(fetched.expense_date, date(2025, 6, 15));

    repo.delete_expense(expense.id).await.unwrap();
    assert!(repo.find_expense_by_id(expense.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_reactivates_terminal_rule_with_fresh_cursor() {
    let (repo, _pool, _temp_dir) = setup_test_db().await;
    let start = date(2025, 5, 1);
    let end = start + Days::new(5);

    let rule = repo
        .create_rule(daily_rule_data(Uuid::now_v7(), start, Some(end)), start)
        .await
        .unwrap();
    repo.process_due_rules(start + Days::new(30)).await.unwrap();

    let terminal = repo.find_rule_by_id(rule.id).await.unwrap().unwrap();
    assert!(!terminal.active);

    // An explicit edit extending the window resets the cursor and revives
    // the rule.
    let today = date(2025, 6, 10);
    let revived = repo
        .update_rule(
            rule.id,
            UpdateRuleData {
                end_date: Some(Some(date(2025, 12, 31))),
                active: Some(true),
                ..Default::default()
            },
            today,
        )
        .await
        .unwrap();

    assert!(revived.active);
    assert_eq!(revived.next_occurrence, today);
}
