//! # Outlay Core Library
//!
//! Expense-tracking core with a recurring-rule materialization engine:
//! catch-up of missed occurrences, calendar-aware frequency arithmetic, and
//! an atomic batch commit over SQLite.
//!
//! ## Features
//!
//! - **Recurring rules**: daily through yearly frequency templates with an
//!   inclusive validity window and a persistent `next_occurrence` cursor
//! - **Deterministic catch-up**: a rule processed late materializes every
//!   missed occurrence, not just the latest, bounded by a configurable cap
//! - **Atomic batch runs**: all expense creations and cursor advances of a
//!   run commit together or not at all, with an optimistic guard against
//!   concurrent double-processing
//! - **Exact money**: `rust_decimal` amounts, two fractional digits, no
//!   floating point anywhere
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`repository`]: Data access layer with Repository pattern
//! - [`recurrence`]: Frequency arithmetic and the catch-up engine
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use outlay_core::{
//!     db,
//!     models::{Frequency, NewRuleData},
//!     recurrence::MaterializationConfig,
//!     repository::{MaterializationRepository, RuleRepository, SqliteRepository},
//! };
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = db::establish_connection("outlay.db").await?;
//!     let repo = SqliteRepository::new(pool, MaterializationConfig::default());
//!
//!     let today = Utc::now().date_naive();
//!     let rule = repo
//!         .create_rule(
//!             NewRuleData {
//!                 user_id: Uuid::now_v7(),
//!                 category_id: None,
//!                 amount: Decimal::from_str("4.50")?,
//!                 currency: "USD".to_string(),
//!                 description: Some("Morning coffee".to_string()),
//!                 frequency: Frequency::Daily,
//!                 start_date: today,
//!                 end_date: None,
//!             },
//!             today,
//!         )
//!         .await?;
//!     println!("Created rule {}", rule.id);
//!
//!     let created = repo.process_due_rules(today).await?;
//!     println!("Materialized {} expenses", created);
//!
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod repository;
