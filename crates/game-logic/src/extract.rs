//! Extraction of structured choices from free-text model turns
//!
//! Extractors scan the text case-insensitively and take the first match by
//! position. Text naming several candidate choices is not ranked: whichever
//! token appears first wins.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::choice::{Amount, Role};

/// Parses one turn's content into a choice
pub type ExtractFn<C> = fn(&str, Role) -> Result<C, ChoiceParseError>;

/// Longest excerpt of the offending text kept in the error message
const EXCERPT_LEN: usize = 80;

/// No recognisable choice in the text
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("could not extract {expected} from {excerpt:?}")]
pub struct ChoiceParseError {
    pub expected: String,
    pub excerpt: String,
}

impl ChoiceParseError {
    pub fn new(expected: impl Into<String>, text: &str) -> Self {
        let excerpt = match text.char_indices().nth(EXCERPT_LEN) {
            Some((end, _)) => format!("{}...", &text[..end]),
            None => text.to_string(),
        };
        Self { expected: expected.into(), excerpt }
    }
}

static AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\s*(\d{1,3}(?:,\d{3})+|\d+)(\.\d+)?").expect("amount pattern must compile")
});

/// First dollar amount in the text, e.g. `"$5"`, `"$ 1,250.50"`
pub fn first_amount(text: &str) -> Option<Amount> {
    let captures = AMOUNT.captures(text)?;
    let whole = captures.get(1)?.as_str().replace(',', "");
    let fraction = captures.get(2).map_or("", |m| m.as_str());
    format!("{whole}{fraction}").parse::<f64>().ok().map(Amount::dollars)
}

/// First capture of `pattern` in `text`, lowercased
pub fn first_token(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_amount_variants() {
        assert_eq!(first_amount("I offer $5.00"), Some(Amount::from_cents(500)));
        assert_eq!(first_amount("\"$5\""), Some(Amount::from_cents(500)));
        assert_eq!(first_amount("give $ 2.5 now"), Some(Amount::from_cents(250)));
        assert_eq!(first_amount("$1,250.75 total"), Some(Amount::from_cents(125_075)));
    }

    #[test]
    fn test_first_amount_takes_first_match() {
        assert_eq!(first_amount("$3 then $7"), Some(Amount::from_cents(300)));
    }

    #[test]
    fn test_first_amount_absent() {
        assert_eq!(first_amount("five dollars"), None);
        assert_eq!(first_amount("5.00"), None);
    }

    #[test]
    fn test_parse_error_truncates_long_text() {
        let text = "x".repeat(200);
        let err = ChoiceParseError::new("a project", &text);
        assert_eq!(err.excerpt.len(), EXCERPT_LEN + 3);
        assert!(err.to_string().starts_with("could not extract a project from"));
    }
}
