use chrono::{Days, Months, NaiveDate};

use crate::error::CoreError;
use crate::models::{Frequency, RecurringRule};

/// Policy knobs for batch materialization.
#[derive(Debug, Clone)]
pub struct MaterializationConfig {
    /// Upper bound on occurrences a single rule may accrue in one run.
    /// A long-neglected daily rule can otherwise materialize years of
    /// history in one call; past the cap the run fails with
    /// [`CoreError::TooManyPending`] instead of silently flooding the store.
    pub max_pending_occurrences: u32,
}

impl Default for MaterializationConfig {
    fn default() -> Self {
        Self {
            max_pending_occurrences: 1000,
        }
    }
}

/// Returns the occurrence date that follows `date` under `frequency`.
///
/// Daily/Weekly/BiWeekly add fixed day counts; Monthly/Quarterly/Yearly add
/// calendar months with chrono's end-of-month clamping (Jan 31 + 1 month is
/// the last day of February). Total over every variant; date arithmetic out
/// of chrono's representable range panics, which is the correct loud failure
/// for corrupt data.
pub fn next_occurrence(date: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Daily => date + Days::new(1),
        Frequency::Weekly => date + Days::new(7),
        Frequency::BiWeekly => date + Days::new(14),
        Frequency::Monthly => date + Months::new(1),
        Frequency::Quarterly => date + Months::new(3),
        Frequency::Yearly => date + Months::new(12),
    }
}

/// Resolves the initial cursor for a rule created or edited today.
///
/// A start date in the future is returned unchanged; a start date in the
/// past is fast-forwarded along the rule's phase to the first occurrence at
/// or after `today`. Creating a daily rule that "started" a year ago must
/// position the cursor at today, not retroactively owe 365 expenses — the
/// batch engine exists for the opposite case, where the cursor itself has
/// fallen behind.
pub fn initial_occurrence(
    start_date: NaiveDate,
    frequency: Frequency,
    today: NaiveDate,
) -> NaiveDate {
    let mut next = start_date;
    while next < today {
        next = next_occurrence(next, frequency);
    }
    next
}

/// Result of catching up one rule against a reference date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchUpOutcome {
    /// Occurrence dates accrued since the last run, oldest first.
    pub occurrences: Vec<NaiveDate>,
    /// Where the cursor lands after materializing `occurrences`.
    pub next_occurrence: NaiveDate,
    /// False once the cursor has passed the rule's end date.
    pub active: bool,
}

/// Computes every occurrence a rule has accrued up to and including
/// `reference_date`, together with the advanced cursor and active flag.
///
/// # Behavior
/// - Walks the cursor forward one period at a time, emitting each date that
///   is due (`cursor <= reference_date`) and within the validity window.
/// - A cursor past the inclusive `end_date` emits nothing and marks the rule
///   terminal; the end check is applied again after the walk so a rule whose
///   first remaining occurrence already exceeds its end date is retired even
///   when nothing was due.
/// - Every frequency strictly increases the date, so the walk terminates;
///   `max_pending` bounds how much history one call may emit.
///
/// Pure function: no I/O, never mutates the rule. The caller persists the
/// outcome (or discards it for a dry run).
///
/// # Errors
/// - [`CoreError::DataIntegrity`] if the cursor precedes the start date —
///   that rule was constructed wrong and must not be silently skipped.
/// - [`CoreError::TooManyPending`] if more than `max_pending` occurrences
///   are due in a single call.
pub fn catch_up(
    rule: &RecurringRule,
    reference_date: NaiveDate,
    max_pending: u32,
) -> Result<CatchUpOutcome, CoreError> {
    if rule.next_occurrence < rule.start_date {
        return Err(CoreError::DataIntegrity(format!(
            "rule {} has cursor {} before start date {}",
            rule.id, rule.next_occurrence, rule.start_date
        )));
    }

    let mut cursor = rule.next_occurrence;
    let mut active = rule.active;
    let mut occurrences = Vec::new();

    while active && cursor <= reference_date {
        if rule.end_date.is_some_and(|end| cursor > end) {
            active = false;
            break;
        }
        if occurrences.len() as u32 >= max_pending {
            return Err(CoreError::TooManyPending(rule.id.to_string(), max_pending));
        }
        occurrences.push(cursor);
        cursor = next_occurrence(cursor, rule.frequency);
    }

    // Re-check against the advanced cursor; also retires rules whose very
    // first remaining occurrence sits beyond the end date.
    if rule.end_date.is_some_and(|end| cursor > end) {
        active = false;
    }

    Ok(CatchUpOutcome {
        occurrences,
        next_occurrence: cursor,
        active,
    })
}
