// Expense Tracker - Core Library
// Date codec, filter parsing, query building, storage and reporting

pub mod date;
pub mod db;
pub mod error;
pub mod filter;
pub mod query;
pub mod report;
pub mod session;

// Only compile the ledger browser when the TUI feature is enabled
#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use date::{format_for_display, parse_entry_date};
pub use db::{
    ExpenseRecord, NewExpense, NO_DESCRIPTION,
    open_database, setup_database, insert_expense, insert_expenses,
    list_expenses, count_expenses, load_csv, import_csv,
};
pub use error::{InputError, InputResult};
pub use filter::{parse_filter_command, CategoryFilter, DateSpan, Filter, WILDCARD};
pub use query::{Clause, Selection};
pub use report::{render_table, summarize, describe, Summary};
pub use session::{MenuChoice, Session, CANCEL_SENTINEL};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
