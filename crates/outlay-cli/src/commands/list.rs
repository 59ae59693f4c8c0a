use anyhow::Result;
use chrono::Utc;
use outlay_core::repository::Repository;
use uuid::Uuid;

use crate::cli::ListCommand;
use crate::views::table;

pub async fn list_rules(repo: &impl Repository, user_id: Uuid, command: ListCommand) -> Result<()> {
    let mut rules = repo.find_rules_by_user(user_id).await?;
    if !command.all {
        rules.retain(|r| r.active);
    }

    if command.json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
    } else {
        table::display_rules(&rules, Utc::now().date_naive());
    }

    Ok(())
}
