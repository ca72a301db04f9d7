// 💬 Interactive session
// Menu loop over any BufRead/Write pair. "4" backs out of any sub-prompt.
//
// Cancellation travels as InputError::Cancelled inside anyhow::Error so `?`
// carries it from the innermost prompt back to the menu. Any other error
// is fatal and ends the session.

use crate::date::parse_entry_date;
use crate::db::{insert_expense, list_expenses, NewExpense};
use crate::error::InputError;
use crate::filter::{parse_filter_command, Filter};
use crate::query::Selection;
use crate::report::{render_table, summarize};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::io::{BufRead, Write};
use tracing::debug;

/// Typed at any sub-prompt to return to the menu.
pub const CANCEL_SENTINEL: &str = "4";

const MENU: &str = "Would you like to (1) View logged expenses, (2) Log a new expense, \
(3) Summarize spending, or (4) quit? Please type the number that corresponds to the option. \
At any point, type 4 to return to this menu.";

const FILTER_PROMPT: &str = "Please specify a category ('all' for all), then a date range \
('all' for all, or enter one date for just that day). Example: food 8/20/2025 8/21/2025. \
Type 4 to return to main menu.";

const FILTER_RETRY: &str = "Please try again. Your response must be in the format \
\"category startdate (enddate)\" or \"category all\" with dates as MM/DD/YYYY. \
Type 4 to return to the main menu.";

const INVALID_CHOICE: &str = "ERROR: Please enter a valid number";
const AMOUNT_RETRY: &str = "Please enter a whole number only";
const CATEGORY_RETRY: &str = "Please enter a category name";
const DATE_RETRY: &str = "Please enter a valid date of the form MM/DD/YYYY.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    List,
    Add,
    Summarize,
    Quit,
}

impl MenuChoice {
    pub fn from_number(number: i64) -> Option<Self> {
        match number {
            1 => Some(MenuChoice::List),
            2 => Some(MenuChoice::Add),
            3 => Some(MenuChoice::Summarize),
            4 => Some(MenuChoice::Quit),
            _ => None,
        }
    }
}

pub fn is_cancelled(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<InputError>(), Some(InputError::Cancelled))
}

pub struct Session<'c, R, W> {
    conn: &'c Connection,
    input: R,
    output: W,
}

impl<'c, R: BufRead, W: Write> Session<'c, R, W> {
    pub fn new(conn: &'c Connection, input: R, output: W) -> Self {
        Session {
            conn,
            input,
            output,
        }
    }

    /// Run until the user quits or input ends.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.say(MENU)?;

            let Some(line) = self.read_line()? else {
                debug!("input closed, leaving session");
                return Ok(());
            };

            let choice = match line.trim().parse::<i64>().ok().and_then(MenuChoice::from_number) {
                Some(choice) => choice,
                None => {
                    self.say(INVALID_CHOICE)?;
                    continue;
                }
            };

            let result = match choice {
                MenuChoice::List => self.view_expenses(),
                MenuChoice::Add => self.log_expense(),
                MenuChoice::Summarize => self.summarize_spending(),
                MenuChoice::Quit => return Ok(()),
            };

            match result {
                Ok(()) => {}
                Err(err) if is_cancelled(&err) => debug!("operation cancelled, back to menu"),
                Err(err) => return Err(err),
            }
        }
    }

    // ========================================================================
    // MENU ACTIONS
    // ========================================================================

    fn view_expenses(&mut self) -> Result<()> {
        let filter = self.prompt_filter()?;
        let records = list_expenses(self.conn, &Selection::from_filter(&filter))?;
        let table = render_table(&records);
        write!(self.output, "{}", table)?;
        self.output.flush()?;
        Ok(())
    }

    fn summarize_spending(&mut self) -> Result<()> {
        let filter = self.prompt_filter()?;
        let records = list_expenses(self.conn, &Selection::from_filter(&filter))?;
        let summary = summarize(&records, &filter);
        self.say(&summary.to_string())
    }

    fn log_expense(&mut self) -> Result<()> {
        self.say("Amount:")?;
        let amount = self.prompt_amount()?;

        self.say("Category:")?;
        let category = self.prompt_category()?;

        self.say("Date:")?;
        let date = self.prompt_date()?;

        self.say("Description:")?;
        let description = self.prompt_line()?;
        let description = Some(description.trim()).filter(|text| !text.is_empty());

        let expense = NewExpense::new(amount, &category, description, date);
        let id = insert_expense(self.conn, &expense)?;
        self.say(&format!("Logged expense #{}", id))
    }

    // ========================================================================
    // PROMPTS
    // ========================================================================

    /// Read filter commands until one parses or the user cancels.
    pub fn prompt_filter(&mut self) -> Result<Filter> {
        self.say(FILTER_PROMPT)?;
        loop {
            let text = self.prompt_line()?;
            match parse_filter_command(&text) {
                Ok(filter) => {
                    debug!(?filter, "filter parsed");
                    return Ok(filter);
                }
                Err(err) => {
                    debug!(%err, "re-prompting for filter");
                    self.say(FILTER_RETRY)?;
                }
            }
        }
    }

    /// "4" is a legitimate amount, so this prompt cannot be cancelled.
    fn prompt_amount(&mut self) -> Result<i64> {
        loop {
            let text = self.read_line()?.ok_or(InputError::Cancelled)?;
            match parse_amount(&text) {
                Ok(amount) => return Ok(amount),
                Err(err) => {
                    debug!(%err, "re-prompting for amount");
                    self.say(AMOUNT_RETRY)?;
                }
            }
        }
    }

    fn prompt_category(&mut self) -> Result<String> {
        loop {
            let text = self.prompt_line()?;
            let category = text.trim();
            if !category.is_empty() {
                return Ok(category.to_string());
            }
            self.say(CATEGORY_RETRY)?;
        }
    }

    fn prompt_date(&mut self) -> Result<chrono::NaiveDate> {
        loop {
            let text = self.prompt_line()?;
            match parse_entry_date(text.trim()) {
                Ok(date) => return Ok(date),
                Err(err) => {
                    debug!(%err, "re-prompting for date");
                    self.say(DATE_RETRY)?;
                }
            }
        }
    }

    /// Next line, with the sentinel and end of input both turned into `Cancelled`.
    fn prompt_line(&mut self) -> Result<String> {
        match self.read_line()? {
            Some(line) if line.trim() != CANCEL_SENTINEL => Ok(line),
            _ => Err(InputError::Cancelled.into()),
        }
    }

    // ========================================================================
    // I/O
    // ========================================================================

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()?;
        Ok(())
    }
}

pub fn parse_amount(text: &str) -> Result<i64, InputError> {
    text.trim()
        .parse()
        .map_err(|_| InputError::InvalidAmount(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_expenses, setup_database, NO_DESCRIPTION};
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    /// Feed `script` to a session and return everything it printed.
    fn run_script(conn: &Connection, script: &str) -> String {
        let mut output = Vec::new();
        Session::new(conn, Cursor::new(script.to_string()), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    fn all_records(conn: &Connection) -> Vec<crate::db::ExpenseRecord> {
        list_expenses(conn, &Selection::from_filter(&Filter::everything())).unwrap()
    }

    #[test]
    fn test_quit_immediately() {
        let conn = test_db();
        let out = run_script(&conn, "4\n");
        assert_eq!(out.matches("Would you like to").count(), 1);
    }

    #[test]
    fn test_end_of_input_ends_session() {
        let conn = test_db();
        let out = run_script(&conn, "");
        assert!(out.contains("Would you like to"));
    }

    #[test]
    fn test_invalid_menu_input() {
        let conn = test_db();
        let out = run_script(&conn, "abc\n9\n4\n");
        assert_eq!(out.matches(INVALID_CHOICE).count(), 2);
    }

    #[test]
    fn test_log_then_list() {
        let conn = test_db();
        let out = run_script(
            &conn,
            "2\n12\nfood\n8/20/2025\nlunch\n1\nfood 8/20/2025\n4\n",
        );

        assert!(out.contains("Logged expense #1"));
        assert!(out.contains("| food     | 2025-08-20 | lunch       |"));

        let records = all_records(&conn);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 12);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2025, 8, 20).unwrap());
    }

    #[test]
    fn test_amount_retries_until_number() {
        let conn = test_db();
        let out = run_script(&conn, "2\nten\n12.5\n4\ngifts\n1/2/2025\n\n4\n");

        assert_eq!(out.matches(AMOUNT_RETRY).count(), 2);
        let records = all_records(&conn);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 4);
        assert_eq!(records[0].description, NO_DESCRIPTION);
    }

    #[test]
    fn test_cancel_at_each_add_prompt() {
        let conn = test_db();
        run_script(&conn, "2\n5\n4\n4\n");
        run_script(&conn, "2\n5\nfood\n4\n4\n");
        run_script(&conn, "2\n5\nfood\nnot a date\n4\n4\n");
        run_script(&conn, "2\n5\nfood\n8/20/2025\n4\n4\n");
        assert_eq!(count_expenses(&conn).unwrap(), 0);
    }

    #[test]
    fn test_date_reprompt() {
        let conn = test_db();
        let out = run_script(&conn, "2\n5\nfood\n13/40/2025\n8/20/2025\nx\n4\n");
        assert_eq!(out.matches(DATE_RETRY).count(), 1);
        assert_eq!(count_expenses(&conn).unwrap(), 1);
    }

    #[test]
    fn test_filter_reprompt_then_summarize() {
        let conn = test_db();
        let out = run_script(
            &conn,
            "2\n10\nfood\n8/20/2025\n\n2\n5\nfood\n8/21/2025\n\n3\nfood\nfood 8/40/2025\nfood 8/20/2025 8/21/2025\n4\n",
        );

        assert_eq!(out.matches(FILTER_RETRY).count(), 2);
        assert!(out.contains("The total for the food category from 08/20/2025 to 08/21/2025 is: 15"));
    }

    #[test]
    fn test_cancel_during_filter_retry() {
        let conn = test_db();
        let out = run_script(&conn, "3\na b c d\n4\n4\n");
        assert_eq!(out.matches(FILTER_RETRY).count(), 1);
        assert!(!out.contains("The total"));
        assert_eq!(out.matches("Would you like to").count(), 2);
    }

    #[test]
    fn test_summarize_past_i64_range() {
        let conn = test_db();
        let out = run_script(
            &conn,
            "2\n9223372036854775807\nbig\n8/20/2025\n\n2\n1\nbig\n8/20/2025\n\n3\nall all\n4\n",
        );
        assert!(out.contains("The total for all categories is: 9223372036854775808"));
    }

    #[test]
    fn test_summarize_empty_store() {
        let conn = test_db();
        let out = run_script(&conn, "3\nall all\n4\n");
        assert!(out.contains("The total for all categories is: 0"));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 42 "), Ok(42));
        assert_eq!(parse_amount("-3"), Ok(-3));
        assert_eq!(
            parse_amount("12.50"),
            Err(InputError::InvalidAmount("12.50".to_string()))
        );
    }
}
