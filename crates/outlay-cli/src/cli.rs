use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use outlay_core::models::Frequency;
use rust_decimal::Decimal;
use uuid::Uuid;

/// A CLI expense tracker with recurring expense materialization
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new recurring rule
    Add(AddCommand),
    /// List recurring rules
    List(ListCommand),
    /// Edit a recurring rule
    Edit(EditCommand),
    /// Delete a recurring rule
    Delete(DeleteCommand),
    /// Manage expense records
    Expenses(ExpensesCommand),
    /// Materialize due occurrences of every active rule
    Process(ProcessCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The amount charged per occurrence
    pub amount: Decimal,
    /// How often the expense recurs (daily, weekly, biweekly, monthly, quarterly, yearly)
    pub frequency: Frequency,
    /// ISO 4217 currency code (defaults to the configured currency)
    #[clap(short, long)]
    pub currency: Option<String>,
    /// A description of the expense
    #[clap(short, long)]
    pub description: Option<String>,
    /// First date the expense is due (defaults to today)
    #[clap(short, long)]
    pub start: Option<NaiveDate>,
    /// Last date the expense is due, inclusive
    #[clap(short, long)]
    pub end: Option<NaiveDate>,
    /// Category to file generated expenses under
    #[clap(long)]
    pub category: Option<Uuid>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Include inactive rules
    #[clap(short, long)]
    pub all: bool,
    /// Print as JSON instead of a table
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID of the rule to edit (a unique prefix is enough)
    pub id: String,

    #[arg(long)]
    pub amount: Option<Decimal>,

    #[arg(long)]
    pub currency: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, conflicts_with = "description")]
    pub description_clear: bool,

    #[arg(long)]
    pub frequency: Option<Frequency>,

    #[arg(long)]
    pub start: Option<NaiveDate>,

    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long, conflicts_with = "end")]
    pub end_clear: bool,

    /// Stop the rule from generating expenses
    #[arg(long, conflicts_with = "resume")]
    pub pause: bool,
    /// Resume a paused or terminal rule
    #[arg(long)]
    pub resume: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID of the rule to delete (a unique prefix is enough)
    pub id: String,
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ExpensesCommand {
    #[command(subcommand)]
    pub command: ExpensesSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExpensesSubcommand {
    /// List expenses, newest first
    List(ListExpensesCommand),
    /// Record a one-off expense
    Add(AddExpenseCommand),
    /// Delete an expense record
    Delete(DeleteExpenseCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct ListExpensesCommand {
    /// Only show expenses generated by this rule
    #[clap(long)]
    pub rule: Option<String>,
    /// Print as JSON instead of a table
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct AddExpenseCommand {
    /// The amount spent
    pub amount: Decimal,
    /// ISO 4217 currency code (defaults to the configured currency)
    #[clap(short, long)]
    pub currency: Option<String>,
    /// A description of the expense
    #[clap(short, long)]
    pub description: Option<String>,
    /// The date the expense occurred (defaults to today)
    #[clap(long)]
    pub date: Option<NaiveDate>,
    /// Category to file the expense under
    #[clap(long)]
    pub category: Option<Uuid>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteExpenseCommand {
    /// The ID of the expense to delete
    pub id: Uuid,
}

#[derive(Parser, Debug, Clone)]
pub struct ProcessCommand {
    /// Run as if today were this date
    #[clap(long)]
    pub as_of: Option<NaiveDate>,
    /// Show what would be materialized without writing anything
    #[clap(long)]
    pub dry_run: bool,
    /// Print the result as JSON
    #[clap(long)]
    pub json: bool,
}
