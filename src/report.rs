// 📊 Reporting
// Text table for listings and totals with a readable range description

use crate::date::format_for_display;
use crate::db::ExpenseRecord;
use crate::filter::{DateSpan, Filter};
use prettytable::{format, Cell, Row, Table};
use std::fmt;

fn title() -> Row {
    Row::new(
        ["id", "amount", "category", "date", "description"]
            .iter()
            .map(|h| Cell::new(h))
            .collect(),
    )
}

fn row(record: &ExpenseRecord) -> Row {
    Row::new(vec![
        Cell::new(&record.id.to_string()).style_spec("r"),
        Cell::new(&record.amount.to_string()).style_spec("r"),
        Cell::new(&record.category),
        Cell::new(&record.date.to_string()),
        Cell::new(&record.description),
    ])
}

/// Markdown pipe layout: `|` borders, one dashed rule under the titles.
fn markdown_format() -> format::TableFormat {
    format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separators(
            &[format::LinePosition::Title],
            format::LineSeparator::new('-', '|', '|', '|'),
        )
        .padding(1, 1)
        .build()
}

/// Render records as a markdown-style table, rows in the order given.
pub fn render_table(records: &[ExpenseRecord]) -> String {
    let mut table = Table::new();

    table.set_format(markdown_format());
    table.set_titles(title());

    for record in records {
        table.add_row(row(record));
    }

    table.to_string()
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Wide enough that no sum of i64 amounts can overflow
    pub total: i128,
    pub description: String,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "The total for {} is: {}", self.description, self.total)
    }
}

/// Sum amounts and describe what was summed. An empty set totals 0.
pub fn summarize(records: &[ExpenseRecord], filter: &Filter) -> Summary {
    let total = records.iter().map(|r| i128::from(r.amount)).sum();
    Summary {
        total,
        description: describe(filter),
    }
}

/// "the food category from 08/20/2025 to 08/21/2025", "all categories on 08/20/2025", ...
pub fn describe(filter: &Filter) -> String {
    let category = match filter.category.name() {
        Some(name) => format!("the {} category", name),
        None => "all categories".to_string(),
    };

    let range = match filter.span {
        DateSpan::Any => String::new(),
        DateSpan::On(day) => format!(" on {}", format_for_display(day)),
        DateSpan::Between(start, end) => format!(
            " from {} to {}",
            format_for_display(start),
            format_for_display(end)
        ),
    };

    format!("{}{}", category, range)
}
