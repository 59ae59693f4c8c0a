use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{Expense, NewExpenseData, NewRuleData, RecurringRule, UpdateRuleData};
use crate::recurrence::MaterializationConfig;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

// Domain modules; traits live here, implementations there.
pub mod expenses;
pub mod materialization;
pub mod rules;

/// Domain-specific trait for recurring-rule operations.
///
/// `create_rule` and `update_rule` take `today` explicitly: the initial
/// cursor is resolved against the caller's clock, never an internal one.
#[async_trait]
pub trait RuleRepository {
    async fn create_rule(&self, data: NewRuleData, today: NaiveDate) -> Result<RecurringRule, CoreError>;
    async fn find_rule_by_id(&self, id: Uuid) -> Result<Option<RecurringRule>, CoreError>;
    async fn find_rules_by_user(&self, user_id: Uuid) -> Result<Vec<RecurringRule>, CoreError>;
    async fn find_due_rules(&self, reference_date: NaiveDate) -> Result<Vec<RecurringRule>, CoreError>;
    async fn update_rule(&self, id: Uuid, data: UpdateRuleData, today: NaiveDate) -> Result<RecurringRule, CoreError>;
    async fn delete_rule(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for expense records.
#[async_trait]
pub trait ExpenseRepository {
    async fn add_expense(&self, data: NewExpenseData) -> Result<Expense, CoreError>;
    async fn find_expense_by_id(&self, id: Uuid) -> Result<Option<Expense>, CoreError>;
    async fn find_expenses_by_user(&self, user_id: Uuid) -> Result<Vec<Expense>, CoreError>;
    async fn find_expenses_for_rule(&self, rule_id: Uuid) -> Result<Vec<Expense>, CoreError>;
    async fn delete_expense(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for batch materialization.
#[async_trait]
pub trait MaterializationRepository {
    /// Catches up every due rule against `reference_date` in one atomic
    /// transaction and returns the number of expenses created.
    async fn process_due_rules(&self, reference_date: NaiveDate) -> Result<usize, CoreError>;

    /// Read-only preview of the dates a run would materialize for one rule.
    async fn pending_occurrences(&self, rule_id: Uuid, reference_date: NaiveDate) -> Result<Vec<NaiveDate>, CoreError>;
}

/// Main repository trait that composes all domain traits.
#[async_trait]
pub trait Repository: RuleRepository + ExpenseRepository + MaterializationRepository {}

/// SQLite implementation of the repository pattern.
pub struct SqliteRepository {
    pool: DbPool,
    config: MaterializationConfig,
}

impl SqliteRepository {
    pub fn new(pool: DbPool, config: MaterializationConfig) -> Self {
        Self { pool, config }
    }

    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub(crate) fn config(&self) -> &MaterializationConfig {
        &self.config
    }
}

impl Repository for SqliteRepository {}
