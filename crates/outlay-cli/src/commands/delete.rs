use anyhow::Result;
use outlay_core::repository::Repository;
use owo_colors::{OwoColorize, Style};
use uuid::Uuid;

pub async fn delete_rule(repo: &impl Repository, rule_id: Uuid) -> Result<()> {
    repo.delete_rule(rule_id).await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Deleted rule {}. Its expense history is kept.",
        "✓".style(success_style),
        rule_id.to_string().yellow()
    );
    Ok(())
}
