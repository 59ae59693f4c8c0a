use crate::error::CoreError;
use crate::models::{normalize_currency, Amount, Expense, NewExpenseData};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

#[async_trait]
impl super::ExpenseRepository for SqliteRepository {
    async fn add_expense(&self, data: NewExpenseData) -> Result<Expense, CoreError> {
        if data.amount <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "Amount must be greater than zero".to_string(),
            ));
        }
        let currency = normalize_currency(&data.currency)?;

        let expense = Expense {
            id: Uuid::now_v7(),
            user_id: data.user_id,
            category_id: data.category_id,
            amount: Amount::new(data.amount),
            currency,
            description: data.description,
            expense_date: data.expense_date,
            recurring_rule_id: None,
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
        .execute(self.pool())
        .await?;

        Ok(expense)
    }

    async fn find_expense_by_id(&self, id: Uuid) -> Result<Option<Expense>, CoreError> {
        let expense = sqlx::query_as("SELECT * FROM expenses WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(expense)
    }

    async fn find_expenses_by_user(&self, user_id: Uuid) -> Result<Vec<Expense>, CoreError> {
        let expenses = sqlx::query_as(
            "SELECT * FROM expenses WHERE user_id = $1 ORDER BY expense_date DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(expenses)
    }

    async fn find_expenses_for_rule(&self, rule_id: Uuid) -> Result<Vec<Expense>, CoreError> {
        let expenses = sqlx::query_as(
            "SELECT * FROM expenses WHERE recurring_rule_id = $1 ORDER BY expense_date",
        )
        .bind(rule_id)
        .fetch_all(self.pool())
        .await?;
        Ok(expenses)
    }

    async fn delete_expense(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Expense {} not found", id)));
        }

        Ok(())
    }
}
