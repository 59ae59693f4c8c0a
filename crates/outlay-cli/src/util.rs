use anyhow::{anyhow, Result};
use outlay_core::error::CoreError;
use outlay_core::models::RecurringRule;
use outlay_core::repository::Repository;
use uuid::Uuid;

/// Resolves a full or prefixed rule ID against the user's rules.
pub async fn resolve_rule_id(repo: &impl Repository, user_id: Uuid, input: &str) -> Result<Uuid> {
    if let Ok(id) = input.parse::<Uuid>() {
        return Ok(id);
    }
    if input.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }

    let prefix = input.to_lowercase();
    let matches: Vec<RecurringRule> = repo
        .find_rules_by_user(user_id)
        .await?
        .into_iter()
        .filter(|r| r.id.to_string().starts_with(&prefix))
        .collect();

    if matches.len() == 1 {
        Ok(matches[0].id)
    } else if matches.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No rule found with ID prefix '{}'",
            input
        ))))
    } else {
        let rule_info: Vec<(String, String)> = matches
            .into_iter()
            .map(|r| (r.id.to_string(), describe(&r)))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(rule_info)))
    }
}

/// A one-line human label for a rule.
pub fn describe(rule: &RecurringRule) -> String {
    match &rule.description {
        Some(d) => d.clone(),
        None => format!("{} {} {}", rule.amount, rule.currency, rule.frequency),
    }
}
