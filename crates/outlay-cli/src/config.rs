use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database file
    pub database_path: String,
    /// Currency assumed when a command does not name one
    pub default_currency: String,
    #[serde(default)]
    pub materialization: MaterializationSettings,
}

/// Engine guardrails for the batch run
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct MaterializationSettings {
    /// Abort a run when a single rule owes more occurrences than this
    pub max_pending_occurrences: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "outlay.db".to_string(),
            default_currency: "USD".to_string(),
            materialization: MaterializationSettings::default(),
        }
    }
}

impl Default for MaterializationSettings {
    fn default() -> Self {
        Self {
            max_pending_occurrences:
                outlay_core::recurrence::MaterializationConfig::default().max_pending_occurrences,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("outlay.toml"))
            .merge(Env::prefixed("OUTLAY_"))
            .extract()
    }
}
