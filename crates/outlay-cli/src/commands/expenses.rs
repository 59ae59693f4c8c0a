use anyhow::Result;
use chrono::Utc;
use outlay_core::models::NewExpenseData;
use outlay_core::repository::Repository;
use owo_colors::{OwoColorize, Style};
use uuid::Uuid;

use crate::cli::{AddExpenseCommand, DeleteExpenseCommand, ListExpensesCommand};
use crate::config::Config;
use crate::util::resolve_rule_id;
use crate::views::table;

pub async fn list_expenses(
    repo: &impl Repository,
    user_id: Uuid,
    command: ListExpensesCommand,
) -> Result<()> {
    let expenses = match command.rule {
        Some(ref input) => {
            let rule_id = resolve_rule_id(repo, user_id, input).await?;
            repo.find_expenses_for_rule(rule_id).await?
        }
        None => repo.find_expenses_by_user(user_id).await?,
    };

    if command.json {
        println!("{}", serde_json::to_string_pretty(&expenses)?);
    } else {
        table::display_expenses(&expenses);
    }

    Ok(())
}

pub async fn add_expense(
    repo: &impl Repository,
    user_id: Uuid,
    command: AddExpenseCommand,
    config: &Config,
) -> Result<()> {
    let data = NewExpenseData {
        user_id,
        category_id: command.category,
        amount: command.amount,
        currency: command
            .currency
            .unwrap_or_else(|| config.default_currency.clone()),
        description: command.description,
        expense_date: command.date.unwrap_or_else(|| Utc::now().date_naive()),
    };

    let expense = repo.add_expense(data).await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Recorded {} {} on {}",
        "✓".style(success_style),
        expense.amount,
        expense.currency,
        expense.expense_date.to_string().cyan()
    );
    println!("  Expense ID: {}", expense.id.to_string().yellow());
    Ok(())
}

pub async fn delete_expense(repo: &impl Repository, command: DeleteExpenseCommand) -> Result<()> {
    repo.delete_expense(command.id).await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Deleted expense {}.",
        "✓".style(success_style),
        command.id.to_string().yellow()
    );
    Ok(())
}
