// 🔎 Filter Parser
// "<category> <all|startdate> [enddate]" -> Filter

use crate::date::parse_entry_date;
use crate::error::{InputError, InputResult};
use chrono::NaiveDate;

/// Literal that means "no restriction" in both the category and start slots.
pub const WILDCARD: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Named(String),
}

impl CategoryFilter {
    pub fn from_token(token: &str) -> Self {
        if token == WILDCARD {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(token.to_string())
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Named(name) => Some(name),
        }
    }
}

/// Date constraint of a filter.
///
/// A single date means "exactly that day", not an open-ended range.
/// An end without a start has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpan {
    Any,
    On(NaiveDate),
    Between(NaiveDate, NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub category: CategoryFilter,
    pub span: DateSpan,
}

impl Filter {
    pub fn new(category: CategoryFilter, span: DateSpan) -> Self {
        Filter { category, span }
    }

    /// The `all all` filter.
    pub fn everything() -> Self {
        Filter::new(CategoryFilter::All, DateSpan::Any)
    }

    pub fn start(&self) -> Option<NaiveDate> {
        match self.span {
            DateSpan::Any => None,
            DateSpan::On(day) => Some(day),
            DateSpan::Between(start, _) => Some(start),
        }
    }

    pub fn end(&self) -> Option<NaiveDate> {
        match self.span {
            DateSpan::Between(_, end) => Some(end),
            _ => None,
        }
    }
}

/// Parse a filter command.
///
/// Any failure, including a bad date token, is reported as
/// `MalformedCommand` carrying the whole input.
pub fn parse_filter_command(text: &str) -> InputResult<Filter> {
    let malformed = || InputError::MalformedCommand(text.to_string());

    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 2 || tokens.len() > 3 {
        return Err(malformed());
    }

    let category = CategoryFilter::from_token(tokens[0]);

    let start = if tokens[1] == WILDCARD {
        None
    } else {
        Some(parse_entry_date(tokens[1]).map_err(|_| malformed())?)
    };

    let end = match tokens.get(2) {
        Some(token) => Some(parse_entry_date(token).map_err(|_| malformed())?),
        None => None,
    };

    let span = match (start, end) {
        (None, None) => DateSpan::Any,
        (Some(day), None) => DateSpan::On(day),
        (Some(start), Some(end)) => DateSpan::Between(start, end),
        (None, Some(_)) => return Err(malformed()),
    };

    Ok(Filter::new(category, span))
}

impl std::str::FromStr for Filter {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_filter_command(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_category_with_range() {
        let filter = parse_filter_command("food 8/20/2025 8/21/2025").unwrap();
        assert_eq!(filter.category, CategoryFilter::Named("food".to_string()));
        assert_eq!(filter.start(), Some(ymd(2025, 8, 20)));
        assert_eq!(filter.end(), Some(ymd(2025, 8, 21)));
    }

    #[test]
    fn test_category_all_dates() {
        let filter = parse_filter_command("food all").unwrap();
        assert_eq!(filter.category.name(), Some("food"));
        assert_eq!(filter.span, DateSpan::Any);
        assert_eq!(filter.start(), None);
        assert_eq!(filter.end(), None);
    }

    #[test]
    fn test_single_day() {
        let filter = parse_filter_command("all 08/20/2025").unwrap();
        assert_eq!(filter.category, CategoryFilter::All);
        assert_eq!(filter.span, DateSpan::On(ymd(2025, 8, 20)));
    }

    #[test]
    fn test_everything() {
        assert_eq!(parse_filter_command("all all").unwrap(), Filter::everything());
    }

    #[test]
    fn test_wrong_token_count() {
        for text in ["a b c d", "onlyone", "", "   "] {
            assert_eq!(
                parse_filter_command(text),
                Err(InputError::MalformedCommand(text.to_string()))
            );
        }
    }

    #[test]
    fn test_bad_dates_are_malformed() {
        assert!(matches!(
            parse_filter_command("food 13/1/2025"),
            Err(InputError::MalformedCommand(_))
        ));
        assert!(matches!(
            parse_filter_command("food 8/20/2025 tomorrow"),
            Err(InputError::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_end_without_start_rejected() {
        assert!(matches!(
            parse_filter_command("food all 8/21/2025"),
            Err(InputError::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_category_is_verbatim() {
        let filter = parse_filter_command("Food all").unwrap();
        assert_eq!(filter.category.name(), Some("Food"));
        let filter = parse_filter_command("ALL all").unwrap();
        assert_eq!(filter.category.name(), Some("ALL"));
    }

    #[test]
    fn test_extra_whitespace_tolerated() {
        let filter: Filter = "  food   all ".parse().unwrap();
        assert_eq!(filter.category.name(), Some("food"));
    }
}
