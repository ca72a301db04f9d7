use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use expense_tracker::{
    import_csv, list_expenses, open_database, parse_filter_command, render_table, summarize,
    Filter, Selection, Session,
};

#[derive(Parser)]
#[command(name = "expense-tracker", version, about = "Log expenses and sum your spending.")]
struct Cli {
    /// SQLite database file (created if missing)
    #[arg(long, env = "EXPENSES_DB", default_value = "expenses.db")]
    db: PathBuf,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Import expenses from a CSV file (amount,category,description,date)
    Import { file: PathBuf },
    /// Print matching expenses: <category> <all|startdate> [enddate]
    List {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        filter: Vec<String>,
    },
    /// Print the total of matching expenses: <category> <all|startdate> [enddate]
    Sum {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        filter: Vec<String>,
    },
    /// Browse matching expenses in a terminal UI (defaults to "all all")
    #[cfg(feature = "tui")]
    Browse { filter: Vec<String> },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Connection lives for the whole process and is closed on drop
    let conn = open_database(&cli.db)?;

    match cli.command {
        None => run_session(&conn),
        Some(Command::Import { file }) => run_import(&conn, &file),
        Some(Command::List { filter }) => {
            let filter = parse_filter_args(&filter)?;
            let records = list_expenses(&conn, &Selection::from_filter(&filter))?;
            print!("{}", render_table(&records));
            Ok(())
        }
        Some(Command::Sum { filter }) => {
            let filter = parse_filter_args(&filter)?;
            let records = list_expenses(&conn, &Selection::from_filter(&filter))?;
            println!("{}", summarize(&records, &filter));
            Ok(())
        }
        #[cfg(feature = "tui")]
        Some(Command::Browse { filter }) => run_browse(&conn, &filter),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stderr keeps prompts and tables on stdout clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_session(conn: &Connection) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(conn, stdin.lock(), stdout.lock()).run()
}

fn run_import(conn: &Connection, file: &Path) -> Result<()> {
    let inserted = import_csv(conn, file)
        .with_context(|| format!("Import of {} failed", file.display()))?;
    info!(inserted, "import finished");
    println!("Imported {} expenses from {}", inserted, file.display());
    Ok(())
}

fn parse_filter_args(words: &[String]) -> Result<Filter> {
    let command = words.join(" ");
    Ok(parse_filter_command(&command)?)
}

#[cfg(feature = "tui")]
fn run_browse(conn: &Connection, words: &[String]) -> Result<()> {
    let filter = if words.is_empty() {
        Filter::everything()
    } else {
        parse_filter_args(words)?
    };

    let records = list_expenses(conn, &Selection::from_filter(&filter))?;
    let summary = summarize(&records, &filter);

    let mut app = expense_tracker::ui::App::new(records, summary);
    expense_tracker::ui::run_ui(&mut app)
}
