use anyhow::Result;
use chrono::{NaiveDate, Utc};
use outlay_core::repository::Repository;
use owo_colors::{OwoColorize, Style};
use serde::Serialize;
use uuid::Uuid;

use crate::cli::ProcessCommand;
use crate::util::describe;
use crate::views::table;

#[derive(Serialize)]
struct PendingRule {
    rule_id: Uuid,
    description: Option<String>,
    dates: Vec<NaiveDate>,
}

#[derive(Serialize)]
struct RunReport {
    reference_date: NaiveDate,
    expenses_created: usize,
}

pub async fn process(repo: &impl Repository, command: ProcessCommand) -> Result<()> {
    let reference_date = command.as_of.unwrap_or_else(|| Utc::now().date_naive());

    if command.dry_run {
        return preview(repo, reference_date, command.json).await;
    }

    let created = repo.process_due_rules(reference_date).await?;

    if command.json {
        let report = RunReport {
            reference_date,
            expenses_created: created,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let success_style = Style::new().green().bold();
    if created == 0 {
        println!("Nothing to materialize as of {}.", reference_date);
    } else {
        println!(
            "{} Materialized {} expense{} as of {}.",
            "✓".style(success_style),
            created.to_string().bright_white().bold(),
            if created == 1 { "" } else { "s" },
            reference_date.to_string().cyan()
        );
    }
    Ok(())
}

async fn preview(repo: &impl Repository, reference_date: NaiveDate, json: bool) -> Result<()> {
    let due = repo.find_due_rules(reference_date).await?;

    let mut pending = Vec::with_capacity(due.len());
    for rule in due {
        let dates = repo.pending_occurrences(rule.id, reference_date).await?;
        pending.push((rule, dates));
    }

    if json {
        let report: Vec<PendingRule> = pending
            .iter()
            .map(|(rule, dates)| PendingRule {
                rule_id: rule.id,
                description: rule.description.clone(),
                dates: dates.clone(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Dry run as of {}. No expenses were written.",
        reference_date.to_string().cyan()
    );
    table::display_pending(&pending);

    for (rule, dates) in &pending {
        if dates.len() > 100 {
            println!(
                "{} Rule '{}' owes {} occurrences. Check its start date before processing.",
                "!".yellow().bold(),
                describe(rule),
                dates.len()
            );
        }
    }
    Ok(())
}
