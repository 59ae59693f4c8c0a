use crate::error::CoreError;
use crate::models::{Expense, RecurringRule};
use crate::recurrence::catch_up;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl super::MaterializationRepository for SqliteRepository {
    async fn process_due_rules(&self, reference_date: NaiveDate) -> Result<usize, CoreError> {
        let mut tx = self.pool().begin().await?;

        let due_rules: Vec<RecurringRule> = sqlx::query_as(
            r#"SELECT * FROM recurring_rules
            WHERE active = true AND next_occurrence <= $1
            ORDER BY next_occurrence"#,
        )
        .bind(reference_date)
        .fetch_all(&mut *tx)
        .await?;

        tracing::debug!(
            %reference_date,
            due = due_rules.len(),
            "starting materialization run"
        );

        let mut created = 0usize;
        for rule in &due_rules {
            created += Self::materialize_rule(&mut tx, rule, reference_date, self.config().max_pending_occurrences).await?;
        }

        // Every due rule advances its cursor or retires, so an empty
        // candidate set means there is nothing to commit.
        if due_rules.is_empty() {
            return Ok(0);
        }

        tx.commit().await?;

        tracing::info!(created, rules = due_rules.len(), "materialization run committed");
        Ok(created)
    }

    async fn pending_occurrences(
        &self,
        rule_id: Uuid,
        reference_date: NaiveDate,
    ) -> Result<Vec<NaiveDate>, CoreError> {
        let rule: RecurringRule = sqlx::query_as("SELECT * FROM recurring_rules WHERE id = $1")
            .bind(rule_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Recurring rule {} not found", rule_id)))?;

        let outcome = catch_up(&rule, reference_date, self.config().max_pending_occurrences)?;
        Ok(outcome.occurrences)
    }
}

impl SqliteRepository {
    /// Catches up a single rule inside the run's transaction: one expense
    /// row per accrued occurrence, then a guarded cursor update.
    ///
    /// The `WHERE next_occurrence = <cursor as read>` clause is the
    /// optimistic-concurrency token. Two overlapping runs read the same
    /// cursor; the first to commit advances it, so the second's update
    /// matches zero rows and the whole losing run rolls back instead of
    /// double-creating the same occurrences.
    async fn materialize_rule(
        tx: &mut Transaction<'_, Sqlite>,
        rule: &RecurringRule,
        reference_date: NaiveDate,
        max_pending: u32,
    ) -> Result<usize, CoreError> {
        let outcome = catch_up(rule, reference_date, max_pending)?;

        for occurrence in &outcome.occurrences {
            let expense = Expense {
                id: Uuid::now_v7(),
                user_id: rule.user_id,
                category_id: rule.category_id,
                amount: rule.amount,
                currency: rule.currency.clone(),
                description: rule.description.clone(),
                expense_date: *occurrence,
                recurring_rule_id: Some(rule.id),
                created_at: Utc::now(),
            };

            sqlx::query(
                r#"INSERT INTO expenses
                (id, user_id, category_id, amount, currency, description,
                 expense_date, recurring_rule_id, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
            )
            .bind(expense.id)
            .bind(expense.user_id)
            .bind(expense.category_id)
            .bind(expense.amount)
            .bind(&expense.currency)
            .bind(&expense.description)
            .bind(expense.expense_date)
            .bind(expense.recurring_rule_id)
            .bind(expense.created_at)
            .execute(&mut **tx)
            .await?;
        }

        let result = sqlx::query(
            r#"UPDATE recurring_rules
            SET next_occurrence = $1, active = $2, updated_at = $3
            WHERE id = $4 AND next_occurrence = $5"#,
        )
        .bind(outcome.next_occurrence)
        .bind(outcome.active)
        .bind(Utc::now())
        .bind(rule.id)
        .bind(rule.next_occurrence)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ConcurrentModification(rule.id.to_string()));
        }

        tracing::debug!(
            rule = %rule.id,
            occurrences = outcome.occurrences.len(),
            cursor = %outcome.next_occurrence,
            active = outcome.active,
            "rule caught up"
        );

        Ok(outcome.occurrences.len())
    }
}
