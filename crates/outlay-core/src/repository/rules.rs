use crate::error::CoreError;
use crate::models::{
    normalize_currency, Amount, NewRuleData, RecurringRule, UpdateRuleData,
};
use crate::recurrence::initial_occurrence;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

#[async_trait]
impl super::RuleRepository for SqliteRepository {
    async fn create_rule(
        &self,
        data: NewRuleData,
        today: NaiveDate,
    ) -> Result<RecurringRule, CoreError> {
        if data.amount <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "Amount must be greater than zero".to_string(),
            ));
        }
        let currency = normalize_currency(&data.currency)?;
        if let Some(end) = data.end_date {
            if end < data.start_date {
                return Err(CoreError::InvalidInput(format!(
                    "End date {} is before start date {}",
                    end, data.start_date
                )));
            }
        }

        let next_occurrence = initial_occurrence(data.start_date, data.frequency, today);
        // A rule whose fast-forwarded cursor already sits past its end date
        // is born terminal.
        let active = data.end_date.map_or(true, |end| next_occurrence <= end);

        let now = Utc::now();
        let rule = RecurringRule {
            id: Uuid::now_v7(),
            user_id: data.user_id,
            category_id: data.category_id,
            amount: Amount::new(data.amount),
            currency,
            description: trimmed(data.description),
            frequency: data.frequency,
            start_date: data.start_date,
            end_date: data.end_date,
            next_occurrence,
            active,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"INSERT INTO recurring_rules
            (id, user_id, category_id, amount, currency, description, frequency,
             start_date, end_date, next_occurrence, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"#,
        )
        .bind(rule.id)
        .bind(rule.user_id)
        .bind(rule.category_id)
        .bind(rule.amount)
        .bind(&rule.currency)
        .bind(&rule.description)
        .bind(rule.frequency)
        .bind(rule.start_date)
        .bind(rule.end_date)
        .bind(rule.next_occurrence)
        .bind(rule.active)
        .bind(rule.created_at)
        .bind(rule.updated_at)
        .execute(self.pool())
        .await?;

        Ok(rule)
    }

    async fn find_rule_by_id(&self, id: Uuid) -> Result<Option<RecurringRule>, CoreError> {
        let rule = sqlx::query_as("SELECT * FROM recurring_rules WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(rule)
    }

    async fn find_rules_by_user(&self, user_id: Uuid) -> Result<Vec<RecurringRule>, CoreError> {
        let rules = sqlx::query_as(
            "SELECT * FROM recurring_rules WHERE user_id = $1 ORDER BY next_occurrence",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rules)
    }

    async fn find_due_rules(
        &self,
        reference_date: NaiveDate,
    ) -> Result<Vec<RecurringRule>, CoreError> {
        let rules = sqlx::query_as(
            r#"SELECT * FROM recurring_rules
            WHERE active = true AND next_occurrence <= $1
            ORDER BY next_occurrence"#,
        )
        .bind(reference_date)
        .fetch_all(self.pool())
        .await?;
        Ok(rules)
    }

    async fn update_rule(
        &self,
        id: Uuid,
        data: UpdateRuleData,
        today: NaiveDate,
    ) -> Result<RecurringRule, CoreError> {
        let mut tx = self.pool().begin().await?;

        let current: RecurringRule =
            sqlx::query_as("SELECT * FROM recurring_rules WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("Recurring rule {} not found", id)))?;

        let amount = match data.amount {
            Some(value) if value <= Decimal::ZERO => {
                return Err(CoreError::InvalidInput(
                    "Amount must be greater than zero".to_string(),
                ));
            }
            Some(value) => Amount::new(value),
            None => current.amount,
        };
        let currency = match data.currency {
            Some(raw) => normalize_currency(&raw)?,
            None => current.currency,
        };
        let category_id = data.category_id.unwrap_or(current.category_id);
        let description = match data.description {
            Some(patch) => trimmed(patch),
            None => current.description,
        };
        let frequency = data.frequency.unwrap_or(current.frequency);
        let start_date = data.start_date.unwrap_or(current.start_date);
        let end_date = data.end_date.unwrap_or(current.end_date);
        if let Some(end) = end_date {
            if end < start_date {
                return Err(CoreError::InvalidInput(format!(
                    "End date {} is before start date {}",
                    end, start_date
                )));
            }
        }

        // Edits always re-resolve the cursor; this is also the only path
        // that can bring a terminal rule back to life.
        let next_occurrence = initial_occurrence(start_date, frequency, today);
        let active = data.active.unwrap_or(current.active)
            && end_date.map_or(true, |end| next_occurrence <= end);

        let updated = RecurringRule {
            id: current.id,
            user_id: current.user_id,
            category_id,
            amount,
            currency,
            description,
            frequency,
            start_date,
            end_date,
            next_occurrence,
            active,
            created_at: current.created_at,
            updated_at: Utc::now(),
        };

        sqlx::query(
            r#"UPDATE recurring_rules
            SET category_id = $1, amount = $2, currency = $3, description = $4,
                frequency = $5, start_date = $6, end_date = $7,
                next_occurrence = $8, active = $9, updated_at = $10
            WHERE id = $11"#,
        )
        .bind(updated.category_id)
        .bind(updated.amount)
        .bind(&updated.currency)
        .bind(&updated.description)
        .bind(updated.frequency)
        .bind(updated.start_date)
        .bind(updated.end_date)
        .bind(updated.next_occurrence)
        .bind(updated.active)
        .bind(updated.updated_at)
        .bind(updated.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_rule(&self, id: Uuid) -> Result<(), CoreError> {
        // Expenses keep their history: the schema nulls their back-reference
        // instead of cascading.
        let result = sqlx::query("DELETE FROM recurring_rules WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!(
                "Recurring rule {} not found",
                id
            )));
        }

        Ok(())
    }
}

fn trimmed(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}
