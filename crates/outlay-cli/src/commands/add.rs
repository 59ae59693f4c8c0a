use anyhow::Result;
use chrono::Utc;
use outlay_core::models::NewRuleData;
use outlay_core::repository::Repository;
use owo_colors::{OwoColorize, Style};
use uuid::Uuid;

use crate::cli::AddCommand;
use crate::config::Config;
use crate::util::describe;

pub async fn add_rule(
    repo: &impl Repository,
    user_id: Uuid,
    command: AddCommand,
    config: &Config,
) -> Result<()> {
    let today = Utc::now().date_naive();
    let start_date = command.start.unwrap_or(today);

    let data = NewRuleData {
        user_id,
        category_id: command.category,
        amount: command.amount,
        currency: command
            .currency
            .unwrap_or_else(|| config.default_currency.clone()),
        description: command.description,
        frequency: command.frequency,
        start_date,
        end_date: command.end,
    };

    let rule = repo.create_rule(data, today).await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    println!(
        "{} Created recurring rule: {}",
        "✓".style(success_style),
        describe(&rule).bright_white().bold()
    );
    println!(
        "  {} Rule ID: {}",
        "→".style(info_style),
        rule.id.to_string().yellow()
    );
    println!(
        "  {} {} {} {}, next due {}",
        "→".style(info_style),
        rule.amount,
        rule.currency,
        rule.frequency,
        rule.next_occurrence.to_string().cyan()
    );
    if !rule.active {
        println!(
            "  {} The end date is already behind the first due date; the rule starts inactive.",
            "!".yellow().bold()
        );
    } else if rule.next_occurrence <= today {
        println!(
            "  {} Run {} to materialize what is already due.",
            "→".style(info_style),
            "outlay process".bright_white()
        );
    }

    Ok(())
}
