use anyhow::Result;
use chrono::Utc;
use outlay_core::models::UpdateRuleData;
use outlay_core::repository::Repository;
use owo_colors::{OwoColorize, Style};
use uuid::Uuid;

use crate::cli::EditCommand;
use crate::util::describe;

pub async fn edit_rule(repo: &impl Repository, rule_id: Uuid, command: EditCommand) -> Result<()> {
    let description = if command.description_clear {
        Some(None)
    } else {
        command.description.map(Some)
    };
    let end_date = if command.end_clear {
        Some(None)
    } else {
        command.end.map(Some)
    };
    let active = if command.pause {
        Some(false)
    } else if command.resume {
        Some(true)
    } else {
        None
    };

    let patch = UpdateRuleData {
        amount: command.amount,
        currency: command.currency,
        description,
        frequency: command.frequency,
        start_date: command.start,
        end_date,
        active,
        category_id: None,
    };

    let today = Utc::now().date_naive();
    let rule = repo.update_rule(rule_id, patch, today).await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Updated rule: {}",
        "✓".style(success_style),
        describe(&rule).bright_white().bold()
    );
    if rule.active {
        println!(
            "  next due {}",
            rule.next_occurrence.to_string().cyan()
        );
    } else {
        println!("  the rule is {}", "inactive".yellow());
    }

    Ok(())
}
