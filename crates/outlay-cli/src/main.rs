use clap::Parser;
use dialoguer::Confirm;
use outlay_core::db;
use outlay_core::error::CoreError;
use outlay_core::recurrence::MaterializationConfig;
use outlay_core::repository::{RuleRepository, SqliteRepository};
use owo_colors::{OwoColorize, Style};
use tracing_subscriber::EnvFilter;
use util::{describe, resolve_rule_id};
use uuid::Uuid;

mod cli;
mod commands;
mod config;
mod util;
mod views;

/// The single local profile this CLI manages.
const LOCAL_USER: Uuid = Uuid::nil();

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("OUTLAY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::Config::new().unwrap_or_default();

    let db_pool = match db::establish_connection(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    tracing::debug!(db = %config.database_path, "database ready");

    let materialization = MaterializationConfig {
        max_pending_occurrences: config.materialization.max_pending_occurrences,
    };
    let repository = SqliteRepository::new(db_pool, materialization);

    let cli = cli::Cli::parse();

    let result = match cli.command {
        cli::Commands::Add(command) => {
            commands::add::add_rule(&repository, LOCAL_USER, command, &config).await
        }
        cli::Commands::List(command) => {
            commands::list::list_rules(&repository, LOCAL_USER, command).await
        }
        cli::Commands::Edit(command) => {
            let rule_id = match resolve_rule_id(&repository, LOCAL_USER, &command.id).await {
                Ok(id) => id,
                Err(e) => {
                    handle_error(e);
                    return;
                }
            };
            commands::edit::edit_rule(&repository, rule_id, command).await
        }
        cli::Commands::Delete(command) => {
            let rule_id = match resolve_rule_id(&repository, LOCAL_USER, &command.id).await {
                Ok(id) => id,
                Err(e) => {
                    handle_error(e);
                    return;
                }
            };
            let rule = match repository.find_rule_by_id(rule_id).await {
                Ok(Some(r)) => r,
                Ok(None) => {
                    let error_style = Style::new().red().bold();
                    eprintln!(
                        "{} Rule with ID '{}' not found.",
                        "Error:".style(error_style),
                        rule_id
                    );
                    return;
                }
                Err(e) => {
                    handle_error(e.into());
                    return;
                }
            };

            if !command.force {
                let confirmation = Confirm::new()
                    .with_prompt(format!(
                        "Are you sure you want to delete rule '{}'?",
                        describe(&rule)
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

                if !confirmation {
                    println!("Deletion cancelled.");
                    return;
                }
            }
            commands::delete::delete_rule(&repository, rule_id).await
        }
        cli::Commands::Expenses(command) => match command.command {
            cli::ExpensesSubcommand::List(command) => {
                commands::expenses::list_expenses(&repository, LOCAL_USER, command).await
            }
            cli::ExpensesSubcommand::Add(command) => {
                commands::expenses::add_expense(&repository, LOCAL_USER, command, &config).await
            }
            cli::ExpensesSubcommand::Delete(command) => {
                commands::expenses::delete_expense(&repository, command).await
            }
        },
        cli::Commands::Process(command) => commands::process::process(&repository, command).await,
    };

    if let Err(e) = result {
        handle_error(e);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    let core_error = err
        .downcast_ref::<CoreError>()
        .or_else(|| err.source().and_then(|e| e.downcast_ref::<CoreError>()));

    if let Some(core_error) = core_error {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(rules) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, label) in rules {
                    eprintln!("  {} ({})", id.yellow(), label);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::TooManyPending(rule_id, cap) => {
                eprintln!(
                    "{} Rule {} owes more than {} occurrences; nothing was written.",
                    "Error:".style(error_style),
                    rule_id.yellow(),
                    cap
                );
                eprintln!("Edit the rule's start date, or raise max_pending_occurrences in outlay.toml.");
            }
            CoreError::ConcurrentModification(rule_id) => {
                eprintln!(
                    "{} Another run updated rule {} at the same time; nothing was written.",
                    "Error:".style(error_style),
                    rule_id.yellow()
                );
                eprintln!("Re-run `outlay process`; the other run's results are intact.");
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {}", "Error:".style(error_style), err);
    }
}
