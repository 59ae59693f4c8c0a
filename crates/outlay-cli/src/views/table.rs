use chrono::NaiveDate;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use outlay_core::models::{Expense, RecurringRule};

pub fn display_rules(rules: &[RecurringRule], today: NaiveDate) {
    if rules.is_empty() {
        println!("No recurring rules found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID",
        "Description",
        "Amount",
        "Frequency",
        "Next Due",
        "Ends",
        "Status",
    ]);

    for rule in rules {
        let mut row = Row::new();
        row.add_cell(Cell::new(&rule.id.to_string()[..8]));

        let description = rule.description.as_deref().unwrap_or("-");
        let mut name_cell = Cell::new(description);
        if !rule.active {
            name_cell = name_cell
                .add_attribute(Attribute::CrossedOut)
                .fg(Color::DarkGrey);
        }
        row.add_cell(name_cell);

        row.add_cell(Cell::new(format!("{} {}", rule.amount, rule.currency)));
        row.add_cell(Cell::new(rule.frequency.to_string()));

        let due_cell = if rule.active && rule.next_occurrence <= today {
            // Catch-up pending until the next process run.
            Cell::new(rule.next_occurrence.to_string()).fg(Color::Yellow)
        } else {
            Cell::new(rule.next_occurrence.to_string())
        };
        row.add_cell(due_cell);

        row.add_cell(Cell::new(
            rule.end_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ));

        let status_cell = if rule.active {
            Cell::new("active").fg(Color::Green)
        } else {
            Cell::new("inactive").fg(Color::DarkGrey)
        };
        row.add_cell(status_cell);

        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_expenses(expenses: &[Expense]) {
    if expenses.is_empty() {
        println!("No expenses found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Amount", "Description", "Source"]);

    for expense in expenses {
        let mut row = Row::new();
        row.add_cell(Cell::new(&expense.id.to_string()[..8]));
        row.add_cell(Cell::new(expense.expense_date.to_string()));
        row.add_cell(Cell::new(format!(
            "{} {}",
            expense.amount, expense.currency
        )));
        row.add_cell(Cell::new(expense.description.as_deref().unwrap_or("-")));

        let source_cell = match expense.recurring_rule_id {
            Some(rule_id) => Cell::new(format!("rule {}", &rule_id.to_string()[..8])),
            None => Cell::new("manual").fg(Color::DarkGrey),
        };
        row.add_cell(source_cell);

        table.add_row(row);
    }

    println!("{table}");
}

/// The dry-run preview: one row per due rule with the dates it owes.
pub fn display_pending(pending: &[(RecurringRule, Vec<NaiveDate>)]) {
    if pending.iter().all(|(_, dates)| dates.is_empty()) {
        println!("Nothing to materialize.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Rule", "Description", "Occurrences", "Dates"]);

    for (rule, dates) in pending {
        if dates.is_empty() {
            continue;
        }
        let shown = if dates.len() > 5 {
            format!(
                "{} .. {} ({} total)",
                dates[0],
                dates[dates.len() - 1],
                dates.len()
            )
        } else {
            dates
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut row = Row::new();
        row.add_cell(Cell::new(&rule.id.to_string()[..8]));
        row.add_cell(Cell::new(rule.description.as_deref().unwrap_or("-")));
        row.add_cell(Cell::new(dates.len()).fg(Color::Yellow));
        row.add_cell(Cell::new(shown));
        table.add_row(row);
    }

    println!("{table}");
}
