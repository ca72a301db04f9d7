use crate::date::parse_entry_date;
use crate::query::Selection;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Stored when an expense is logged without a description
pub const NO_DESCRIPTION: &str = "No description";

/// Expense as persisted. Immutable once stored; there is no update or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRecord {
    /// Store-assigned, unique
    pub id: i64,
    pub amount: i64,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

/// Expense waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub amount: i64,
    pub category: String,
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl NewExpense {
    pub fn new(amount: i64, category: &str, description: Option<&str>, date: NaiveDate) -> Self {
        NewExpense {
            amount,
            category: category.to_string(),
            description: description.map(str::to_string),
            date,
        }
    }

    fn description_or_default(&self) -> &str {
        match self.description.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => NO_DESCRIPTION,
        }
    }
}

/// Row shape of an import file: `amount,category,description,date`
#[derive(Debug, Deserialize)]
struct CsvExpense {
    amount: i64,
    category: String,
    #[serde(default)]
    description: Option<String>,
    date: String,
}

// ============================================================================
// CONNECTION & SCHEMA
// ============================================================================

/// Open (or create) the database file and make sure the schema exists.
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    setup_database(&conn)?;
    info!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount INTEGER NOT NULL,
            category TEXT NOT NULL,
            description TEXT DEFAULT 'No description',
            date TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create expenses table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// WRITES
// ============================================================================

/// Insert one expense in its own transaction. Returns the generated id.
pub fn insert_expense(conn: &Connection, expense: &NewExpense) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    let id = insert_row(&tx, expense)?;
    tx.commit().context("Failed to commit expense")?;

    info!(id, amount = expense.amount, category = %expense.category, "expense logged");
    Ok(id)
}

/// Insert many expenses atomically: either all rows land or none do.
pub fn insert_expenses(conn: &Connection, expenses: &[NewExpense]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    for expense in expenses {
        insert_row(&tx, expense)?;
    }
    tx.commit().context("Failed to commit expenses")?;

    info!(count = expenses.len(), "expenses inserted");
    Ok(expenses.len())
}

fn insert_row(conn: &Connection, expense: &NewExpense) -> Result<i64> {
    conn.execute(
        "INSERT INTO expenses (amount, category, description, date) VALUES (?1, ?2, ?3, ?4)",
        params![
            expense.amount,
            expense.category,
            expense.description_or_default(),
            expense.date,
        ],
    )
    .context("Failed to insert expense")?;

    Ok(conn.last_insert_rowid())
}

// ============================================================================
// READS
// ============================================================================

/// Records matching the selection, most recent date first.
pub fn list_expenses(conn: &Connection, selection: &Selection) -> Result<Vec<ExpenseRecord>> {
    let sql = selection.sql();
    let values = selection.params();
    debug!(sql = %sql, params = values.len(), "selecting expenses");

    let mut stmt = conn.prepare(&sql)?;

    let records = stmt
        .query_map(params_from_iter(values), |row| {
            let description: Option<String> = row.get(3)?;
            Ok(ExpenseRecord {
                id: row.get(0)?,
                amount: row.get(1)?,
                category: row.get(2)?,
                description: description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                date: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to read expenses")?;

    debug_assert!(records.iter().all(|r| selection.matches(r)));

    Ok(records)
}

pub fn count_expenses(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// CSV IMPORT
// ============================================================================

/// Read expenses from a CSV file. Dates use the entry format (`M/D/YYYY`).
///
/// The first bad row aborts the load; nothing is inserted here.
pub fn load_csv(csv_path: &Path) -> Result<Vec<NewExpense>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;

    let mut expenses = Vec::new();

    for (index, result) in rdr.deserialize().enumerate() {
        // Header is line 1
        let line = index + 2;
        let row: CsvExpense =
            result.with_context(|| format!("Failed to deserialize expense on line {}", line))?;

        let date = parse_entry_date(row.date.trim())
            .with_context(|| format!("Bad date on line {}", line))?;

        anyhow::ensure!(
            !row.category.trim().is_empty(),
            "Empty category on line {}",
            line
        );

        expenses.push(NewExpense {
            amount: row.amount,
            category: row.category,
            description: row.description,
            date,
        });
    }

    debug!(rows = expenses.len(), path = %csv_path.display(), "csv loaded");
    Ok(expenses)
}

/// Load a CSV file and insert every row in one transaction.
pub fn import_csv(conn: &Connection, csv_path: &Path) -> Result<usize> {
    let expenses = load_csv(csv_path)?;
    insert_expenses(conn, &expenses)
}
