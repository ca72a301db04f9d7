// 🧮 Query Builder
// Filter -> ordered list of optional clauses, each with its own bound parameters.
// Values never get spliced into SQL text.

use crate::db::ExpenseRecord;
use crate::filter::{CategoryFilter, DateSpan, Filter};
use chrono::NaiveDate;
use rusqlite::types::Value;

/// Storage format of the `date` column. Text order equals calendar order.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_COLUMNS: &str = "SELECT id, amount, category, description, date FROM expenses";
const ORDER_BY: &str = "ORDER BY date DESC, id ASC";

// ============================================================================
// CLAUSES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Exact, case-sensitive category match
    CategoryIs(String),
    /// Record date equals the day
    DateOn(NaiveDate),
    /// Inclusive on both ends
    DateBetween(NaiveDate, NaiveDate),
}

impl Clause {
    pub fn sql(&self) -> &'static str {
        match self {
            Clause::CategoryIs(_) => "category = ?",
            Clause::DateOn(_) => "date = ?",
            Clause::DateBetween(_, _) => "date BETWEEN ? AND ?",
        }
    }

    pub fn params(&self) -> Vec<Value> {
        match self {
            Clause::CategoryIs(category) => vec![Value::Text(category.clone())],
            Clause::DateOn(day) => vec![date_value(*day)],
            Clause::DateBetween(start, end) => vec![date_value(*start), date_value(*end)],
        }
    }

    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        match self {
            Clause::CategoryIs(category) => &record.category == category,
            Clause::DateOn(day) => record.date == *day,
            Clause::DateBetween(start, end) => *start <= record.date && record.date <= *end,
        }
    }
}

fn date_value(date: NaiveDate) -> Value {
    Value::Text(date.format(ISO_DATE_FORMAT).to_string())
}

// ============================================================================
// SELECTION
// ============================================================================

/// A predicate over the `expenses` table, built from a `Filter`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    clauses: Vec<Clause>,
}

impl Selection {
    pub fn from_filter(filter: &Filter) -> Self {
        let mut clauses = Vec::new();

        if let CategoryFilter::Named(category) = &filter.category {
            clauses.push(Clause::CategoryIs(category.clone()));
        }

        match filter.span {
            DateSpan::Any => {}
            DateSpan::On(day) => clauses.push(Clause::DateOn(day)),
            DateSpan::Between(start, end) => clauses.push(Clause::DateBetween(start, end)),
        }

        Selection { clauses }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// `None` when no clause applies.
    pub fn where_clause(&self) -> Option<String> {
        if self.clauses.is_empty() {
            return None;
        }
        let parts: Vec<&str> = self.clauses.iter().map(Clause::sql).collect();
        Some(parts.join(" AND "))
    }

    /// Full statement, placeholders in the same order as `params()`.
    pub fn sql(&self) -> String {
        match self.where_clause() {
            Some(predicate) => format!("{} WHERE {} {}", SELECT_COLUMNS, predicate, ORDER_BY),
            None => format!("{} {}", SELECT_COLUMNS, ORDER_BY),
        }
    }

    pub fn params(&self) -> Vec<Value> {
        self.clauses.iter().flat_map(Clause::params).collect()
    }

    /// Same predicate, evaluated in memory.
    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }
}

impl From<&Filter> for Selection {
    fn from(filter: &Filter) -> Self {
        Selection::from_filter(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_filter_command;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: i64, category: &str, date: NaiveDate) -> ExpenseRecord {
        ExpenseRecord {
            id,
            amount: 10,
            category: category.to_string(),
            description: "test".to_string(),
            date,
        }
    }

    #[test]
    fn test_everything_has_no_clauses() {
        let selection = Selection::from_filter(&Filter::everything());
        assert!(selection.clauses().is_empty());
        assert_eq!(selection.where_clause(), None);
        assert_eq!(
            selection.sql(),
            "SELECT id, amount, category, description, date FROM expenses ORDER BY date DESC, id ASC"
        );
        assert!(selection.params().is_empty());
        assert!(selection.matches(&record(1, "anything", ymd(1999, 1, 1))));
    }

    #[test]
    fn test_category_and_single_day() {
        let filter = parse_filter_command("food 8/20/2025").unwrap();
        let selection = Selection::from_filter(&filter);

        assert_eq!(selection.where_clause().unwrap(), "category = ? AND date = ?");
        assert_eq!(
            selection.params(),
            vec![
                Value::Text("food".to_string()),
                Value::Text("2025-08-20".to_string())
            ]
        );

        assert!(selection.matches(&record(1, "food", ymd(2025, 8, 20))));
        assert!(!selection.matches(&record(2, "food", ymd(2025, 8, 21))));
        assert!(!selection.matches(&record(3, "Food", ymd(2025, 8, 20))));
    }

    #[test]
    fn test_range_is_inclusive() {
        let filter = parse_filter_command("all 8/20/2025 8/22/2025").unwrap();
        let selection = Selection::from_filter(&filter);

        assert_eq!(selection.where_clause().unwrap(), "date BETWEEN ? AND ?");
        assert_eq!(selection.params().len(), 2);

        assert!(!selection.matches(&record(1, "a", ymd(2025, 8, 19))));
        assert!(selection.matches(&record(2, "a", ymd(2025, 8, 20))));
        assert!(selection.matches(&record(3, "a", ymd(2025, 8, 22))));
        assert!(!selection.matches(&record(4, "a", ymd(2025, 8, 23))));
    }

    #[test]
    fn test_reversed_range_matches_nothing() {
        let filter = parse_filter_command("all 8/22/2025 8/20/2025").unwrap();
        let selection = Selection::from_filter(&filter);
        assert!(!selection.matches(&record(1, "a", ymd(2025, 8, 21))));
    }

    #[test]
    fn test_hostile_category_is_bound_not_spliced() {
        let filter = parse_filter_command("x';DROP all").unwrap();
        let selection = Selection::from_filter(&filter);
        assert!(!selection.sql().contains("DROP"));
        assert_eq!(selection.params(), vec![Value::Text("x';DROP".to_string())]);
    }
}
