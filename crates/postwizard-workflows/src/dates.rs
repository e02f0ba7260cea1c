use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2,4}-\d{1,2}-\d{1,2})").unwrap());

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// How month names are written in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthStyle {
    /// `Aug 13th, 2024`
    Abbreviated,
    /// `August 13th, 2024`
    Full,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseDateError {
    #[error("expected `<month> <day>, <year>`, got {0:?}")]
    Malformed(String),
    #[error("unknown month {0:?}")]
    UnknownMonth(String),
    #[error("{0:?} is not a calendar date")]
    InvalidDate(String),
}

fn month_number(name: &str, style: MonthStyle) -> Option<u32> {
    let name = name.trim_end_matches('.').to_lowercase();
    MONTHS
        .iter()
        .position(|m| match style {
            MonthStyle::Abbreviated => m[..3] == name,
            MonthStyle::Full => *m == name,
        })
        .map(|i| i as u32 + 1)
}

/// Parse partner dates such as `"Aug 13th, 2024"`. Leading zeros and
/// ordinal suffixes on the day are accepted.
pub fn parse_date_to_iso(text: &str, style: MonthStyle) -> Result<NaiveDate, ParseDateError> {
    let malformed = || ParseDateError::Malformed(text.to_string());

    let cleaned = text.replace(',', " ");
    let mut parts = cleaned.split_whitespace();
    let (Some(month), Some(day), Some(year), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };

    let month = month_number(month, style).ok_or_else(|| ParseDateError::UnknownMonth(month.to_string()))?;
    let day: u32 = day
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .map_err(|_| malformed())?;
    let year: i32 = year.parse().map_err(|_| malformed())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| ParseDateError::InvalidDate(text.to_string()))
}

/// First ISO-looking date embedded in `text`.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    ISO_DATE_RE
        .find_iter(text)
        .find_map(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateMatchOptions<'a> {
    pub ignore_case: bool,
    /// Rewrite each hint before matching: split on `.0`, join with `.1`.
    pub join_hints: Option<(&'a str, &'a str)>,
    /// Drop items that carry no date.
    pub strict: bool,
    /// Return the matched items that are not the latest instead.
    pub reverse: bool,
}

/// For every hint, the item(s) containing it with the most recent embedded date.
///
/// `["foo", "bar"]` over `["foo-2024-11-04", "foo-2024-11-02", "bar-2024-10-29"]`
/// gives `["foo-2024-11-04", "bar-2024-10-29"]`. Undated matches are kept only
/// when none of a hint's matches has a date, and never in strict mode.
pub fn match_list_elem_date<'a, H, S>(hints: &[H], items: &'a [S], options: DateMatchOptions<'_>) -> Vec<&'a str>
where
    H: AsRef<str>,
    S: AsRef<str>,
{
    let mut out: Vec<&'a str> = Vec::new();

    for hint in hints {
        let hint = match options.join_hints {
            Some((split, join)) => hint.as_ref().split(split).collect::<Vec<_>>().join(join),
            None => hint.as_ref().to_string(),
        };

        let matched: Vec<(&'a str, Option<NaiveDate>)> =
            crate::strings::match_list_mult(&hint, items, options.ignore_case)
                .into_iter()
                .map(|i| {
                    let item = items[i].as_ref();
                    (item, extract_date(item))
                })
                .collect();

        let latest = matched.iter().filter_map(|(_, d)| *d).max();

        let selected = matched.iter().filter(|(_, date)| match (latest, date) {
            (None, _) => !options.strict && !options.reverse,
            (Some(max), Some(d)) => (*d == max) != options.reverse,
            (Some(_), None) => options.reverse && !options.strict,
        });

        for &(item, _) in selected {
            if !out.contains(&item) {
                out.push(item);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_abbreviated_and_full_months() {
        assert_eq!(parse_date_to_iso("Aug 13th, 2024", MonthStyle::Abbreviated).unwrap(), date(2024, 8, 13));
        assert_eq!(parse_date_to_iso("August 13th, 2024", MonthStyle::Full).unwrap(), date(2024, 8, 13));
        assert_eq!(parse_date_to_iso("Aug 01st, 2024", MonthStyle::Abbreviated).unwrap(), date(2024, 8, 1));
        assert_eq!(parse_date_to_iso("January 31st, 2024", MonthStyle::Full).unwrap(), date(2024, 1, 31));
        assert_eq!(parse_date_to_iso("May 31st, 2017", MonthStyle::Full).unwrap(), date(2017, 5, 31));
        assert_eq!(date(2024, 8, 13).to_string(), "2024-08-13");
    }

    #[test]
    fn rejects_bad_dates() {
        assert_eq!(
            parse_date_to_iso("August 13th, 2024", MonthStyle::Abbreviated),
            Err(ParseDateError::UnknownMonth("August".into()))
        );
        assert!(matches!(
            parse_date_to_iso("Feb 30th, 2024", MonthStyle::Abbreviated),
            Err(ParseDateError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_date_to_iso("yesterday", MonthStyle::Full),
            Err(ParseDateError::Malformed(_))
        ));
    }

    #[test]
    fn latest_item_per_hint() {
        let items = ["foo-2024-11-04", "foo-2024-11-02", "bar-2024-10-29", "bar-2024-09-20"];
        let got = match_list_elem_date(&["foo", "bar"], &items, DateMatchOptions::default());
        assert_eq!(got, vec!["foo-2024-11-04", "bar-2024-10-29"]);
    }

    #[test]
    fn reverse_returns_outdated_items() {
        let items = ["foo-2024-11-04", "foo-2024-11-02", "bar-2024-10-29", "bar-2024-09-20"];
        let options = DateMatchOptions {
            reverse: true,
            ..Default::default()
        };
        let got = match_list_elem_date(&["foo", "bar"], &items, options);
        assert_eq!(got, vec!["foo-2024-11-02", "bar-2024-09-20"]);
    }

    #[test]
    fn undated_items_and_strict_mode() {
        let items = ["wp_posts.json", "wp_posts-old.json"];
        let lenient = match_list_elem_date(&["wp_posts"], &items, DateMatchOptions::default());
        assert_eq!(lenient, vec!["wp_posts.json", "wp_posts-old.json"]);

        let strict = DateMatchOptions {
            strict: true,
            ..Default::default()
        };
        assert!(match_list_elem_date(&["wp_posts"], &items, strict).is_empty());
    }

    #[test]
    fn joined_and_case_insensitive_hints() {
        let items = ["Big-City-2024-01-02.db", "big-city-2024-03-01.db", "other-2024-05-05.db"];
        let options = DateMatchOptions {
            ignore_case: true,
            join_hints: Some((" ", "-")),
            ..Default::default()
        };
        let got = match_list_elem_date(&["big city"], &items, options);
        assert_eq!(got, vec!["big-city-2024-03-01.db"]);
    }
}
