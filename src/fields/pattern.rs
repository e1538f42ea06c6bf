// src/fields/pattern.rs

//! Value-shape matchers used to classify columns that have no usable header.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const MONTH: &str = r"(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|June?|July?|Aug(?:ust)?|Sept?(?:ember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\.?";

static PLACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,4}\.?$").unwrap());

// `SS.ss`, `M:SS.ss`, `H:MM:SS.s` with an optional qualifier suffix, or a
// colon form without fraction (`4:05`).
static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:\d{1,2}:){0,2}\d{1,2}\.\d{1,3}[A-Za-z#*]?$|^(?:\d{1,2}:){1,2}\d{2}[A-Za-z#*]?$",
    )
    .unwrap()
});

static CLASS_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i:(?:FR|SO|JR|SR|GR)-?\d?|(?:19|20)\d{2})$").unwrap());

static NAMED_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b{} \d{{1,2}}(?:-\d{{1,2}})?,? \d{{4}}\b", MONTH)).unwrap()
});
static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}-\d{1,2}-\d{1,2}\b").unwrap());
static SLASH_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}/\d{4}\b").unwrap());

/// Configured shape of a field's values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuePattern {
    Place,
    Time,
    Date,
    ClassYear,
    Regex(String),
}

/// A compiled [`ValuePattern`].
#[derive(Debug, Clone)]
pub enum Matcher {
    Place,
    Time,
    Date,
    ClassYear,
    Custom(Regex),
}

impl ValuePattern {
    pub fn compile(&self) -> Result<Matcher> {
        Ok(match self {
            ValuePattern::Place => Matcher::Place,
            ValuePattern::Time => Matcher::Time,
            ValuePattern::Date => Matcher::Date,
            ValuePattern::ClassYear => Matcher::ClassYear,
            ValuePattern::Regex(src) => Matcher::Custom(
                Regex::new(src).with_context(|| format!("invalid value pattern `{}`", src))?,
            ),
        })
    }
}

impl Matcher {
    /// True if the (already cleaned) cell has this field's shape.
    pub fn matches(&self, cell: &str) -> bool {
        match self {
            Matcher::Place => PLACE_RE.is_match(cell),
            Matcher::Time => is_time(cell),
            Matcher::Date => is_date(cell),
            Matcher::ClassYear => is_class_year(cell),
            Matcher::Custom(re) => re.is_match(cell),
        }
    }
}

pub fn is_time(s: &str) -> bool {
    TIME_RE.is_match(s)
}

pub fn is_class_year(s: &str) -> bool {
    CLASS_YEAR_RE.is_match(s)
}

/// Whole-cell date check.
pub fn is_date(s: &str) -> bool {
    let s = s.trim();
    [&*NAMED_DATE_RE, &*ISO_DATE_RE, &*SLASH_DATE_RE]
        .iter()
        .any(|re| {
            re.find(s)
                .map_or(false, |m| m.start() == 0 && m.end() == s.len() && valid_date(m.as_str()))
        })
}

/// First date mentioned anywhere in `text`, searched by pattern priority.
pub fn find_date(text: &str) -> Option<String> {
    for re in [&*NAMED_DATE_RE, &*ISO_DATE_RE, &*SLASH_DATE_RE] {
        if let Some(m) = re.find_iter(text).find(|m| valid_date(m.as_str())) {
            return Some(m.as_str().trim().to_string());
        }
    }
    None
}

/// Rejects numeric forms that are not calendar dates (e.g. `13/45/2024`).
fn valid_date(s: &str) -> bool {
    if ISO_DATE_RE.is_match(s) && !s.contains('/') && s.len() <= 10 {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok();
    }
    if s.contains('/') {
        return NaiveDate::parse_from_str(s, "%m/%d/%Y").is_ok()
            || NaiveDate::parse_from_str(s, "%d/%m/%Y").is_ok();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_shapes() {
        for ok in ["21.45", "1:52.34", "10:01.2", "1:02:03.45", "4:05", "21.45q"] {
            assert!(is_time(ok), "{ok} should look like a time");
        }
        for bad in ["1", "John", "2024", "21", "DNF"] {
            assert!(!is_time(bad), "{bad} should not look like a time");
        }
    }

    #[test]
    fn place_and_class_year() {
        let place = ValuePattern::Place.compile().unwrap();
        assert!(place.matches("1"));
        assert!(place.matches("12."));
        assert!(!place.matches("21.45"));
        assert!(is_class_year("SO-2"));
        assert!(is_class_year("fr"));
        assert!(is_class_year("2024"));
        assert!(!is_class_year("Smith"));
    }

    #[test]
    fn whole_cell_dates() {
        assert!(is_date("2024-02-23"));
        assert!(is_date("02/23/2024"));
        assert!(is_date("Feb 23, 2024"));
        assert!(is_date("February 23-24, 2024"));
        assert!(!is_date("2024-13-45"));
        assert!(!is_date("Meet on 2024-02-23"));
        assert!(!is_date("21.45"));
    }

    #[test]
    fn finds_first_date_in_text() {
        let text = "FRIDAY KNIGHT LIGHTS\nOrlando, FL  February 23-24, 2024\nPL NAME";
        assert_eq!(find_date(text).as_deref(), Some("February 23-24, 2024"));
        assert_eq!(find_date("printed 03/01/2024 12:00").as_deref(), Some("03/01/2024"));
        assert_eq!(find_date("no date here 1 2 3"), None);
    }

    #[test]
    fn custom_regex_compiles_or_fails() {
        let m = ValuePattern::Regex(r"^H\d+$".into()).compile().unwrap();
        assert!(m.matches("H3"));
        assert!(ValuePattern::Regex("(".into()).compile().is_err());
    }
}
