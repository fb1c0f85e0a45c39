//! Modal terminal prompts with validation loops.
//!
//! Invalid input is recovered locally by re-prompting; it never escapes to the
//! caller. Cancelling (Esc or Ctrl-C) surfaces as `Ok(None)` so each call site
//! can abort the current operation. Validation predicates are plain functions,
//! separate from the `inquire` display layer.

use bigdecimal::BigDecimal;
use inquire::{Confirm, InquireError, Select, Text};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, Result};
use crate::money;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email regex")
});

pub fn is_valid_email(input: &str) -> bool {
    EMAIL_RE.is_match(input)
}

/// Parse a whole number no smaller than `min`.
pub fn parse_int_at_least(input: &str, min: i32) -> Option<i32> {
    let value: i32 = input.trim().parse().ok()?;
    (value >= min).then_some(value)
}

fn filter_cancel<T>(result: std::result::Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(AppError::Prompt(err)),
    }
}

/// Show a choice menu; `None` means the user backed out.
pub fn select<'a>(title: &str, options: Vec<&'a str>) -> Result<Option<&'a str>> {
    filter_cancel(Select::new(title, options).prompt())
}

/// Yes/no confirmation, defaulting to "no". Cancelling counts as "no".
pub fn confirm(message: &str) -> Result<bool> {
    let answer = filter_cancel(Confirm::new(message).with_default(false).prompt())?;
    Ok(answer.unwrap_or(false))
}

/// Prompt until a non-empty (trimmed) string is entered, or cancelled.
pub fn read_non_empty(prompt: &str) -> Result<Option<String>> {
    loop {
        let Some(input) = filter_cancel(Text::new(prompt).prompt())? else {
            return Ok(None);
        };
        let input = input.trim().to_string();
        if !input.is_empty() {
            return Ok(Some(input));
        }
        println!("The value cannot be empty.");
    }
}

/// Prompt until a syntactically valid email address is entered, or cancelled.
pub fn read_email(prompt: &str) -> Result<Option<String>> {
    loop {
        let Some(input) = filter_cancel(Text::new(prompt).prompt())? else {
            return Ok(None);
        };
        let input = input.trim().to_string();
        if is_valid_email(&input) {
            return Ok(Some(input));
        }
        println!("Invalid email address.");
    }
}

/// Prompt until a whole number `>= min` is entered, or cancelled.
pub fn read_int(prompt: &str, min: i32) -> Result<Option<i32>> {
    loop {
        let Some(input) = filter_cancel(Text::new(prompt).prompt())? else {
            return Ok(None);
        };
        match parse_int_at_least(&input, min) {
            Some(value) => return Ok(Some(value)),
            None => println!("Enter a whole number of at least {min}."),
        }
    }
}

/// Prompt until a positive two-decimal amount is entered, or cancelled.
pub fn read_money(prompt: &str) -> Result<Option<BigDecimal>> {
    loop {
        let Some(input) = filter_cancel(Text::new(prompt).prompt())? else {
            return Ok(None);
        };
        match money::parse_money(&input) {
            Some(value) => return Ok(Some(value)),
            None => println!("Enter an amount greater than 0 (for example 129.90)."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plausible_emails() {
        assert!(is_valid_email("ana@x.com"));
        assert!(is_valid_email("first.last+tag@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("ana"));
        assert!(!is_valid_email("ana@"));
        assert!(!is_valid_email("ana@x"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("ana@x.c"));
    }

    #[test]
    fn parses_bounded_integers() {
        assert_eq!(parse_int_at_least("3", 1), Some(3));
        assert_eq!(parse_int_at_least(" 0 ", 0), Some(0));
        assert_eq!(parse_int_at_least("0", 1), None);
        assert_eq!(parse_int_at_least("-2", 0), None);
        assert_eq!(parse_int_at_least("2.5", 1), None);
        assert_eq!(parse_int_at_least("abc", 1), None);
    }
}
