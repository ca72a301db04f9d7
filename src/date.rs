// 📅 Date Codec
// Entry format M/D/YYYY or MM/DD/YYYY <-> NaiveDate

use crate::error::{InputError, InputResult};
use chrono::{Datelike, NaiveDate};

/// Parse a date typed by the user.
///
/// Month and day take one or two digits, the year exactly four.
/// Returns `InvalidDate` for anything else, including dates that do not
/// exist on the calendar (`2/30/2025`).
pub fn parse_entry_date(text: &str) -> InputResult<NaiveDate> {
    let invalid = || InputError::InvalidDate(text.to_string());

    let fields: Vec<&str> = text.split('/').collect();
    // Exactly three fields: trailing extras like "1/2/2025/9" are rejected, not ignored
    if fields.len() != 3 {
        return Err(invalid());
    }

    let month = parse_field(fields[0], 1..=2).ok_or_else(invalid)?;
    let day = parse_field(fields[1], 1..=2).ok_or_else(invalid)?;
    let year = parse_field(fields[2], 4..=4).ok_or_else(invalid)?;

    // Year 0 is not a valid ISO calendar year for entry
    if year == 0 {
        return Err(invalid());
    }

    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(invalid)
}

/// Render a date as `MM/DD/YYYY`.
pub fn format_for_display(date: NaiveDate) -> String {
    format!("{:02}/{:02}/{:04}", date.month(), date.day(), date.year())
}

fn parse_field(field: &str, width: std::ops::RangeInclusive<usize>) -> Option<u32> {
    if !width.contains(&field.len()) || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
