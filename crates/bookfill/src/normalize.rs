//! Cleanup of spreadsheet cells and API strings into catalog values.

use crate::sheet::Cell;

/// Reads a number out of a cell.
///
/// Text cells have every character other than digits, `+`, `-` and `.` removed before the
/// leading number is parsed, so `"12.5 kg"` reads as `12.5`. Empty cells and text with no number
/// in it read as `0`, as does text too long to hold a finite number. With `round_to_ten` the
/// result is rounded to the nearest multiple of ten, halves rounding up.
#[must_use]
pub fn normalize_number(cell: &Cell, round_to_ten: bool) -> f64 {
    let number = match cell {
        Cell::Empty => 0.0,
        Cell::Number(n) if n.is_finite() => *n,
        Cell::Number(_) => 0.0,
        Cell::Text(text) => {
            let cleaned = text
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
                .collect::<String>();
            parse_leading_float(&cleaned)
                .filter(|n| n.is_finite())
                .unwrap_or(0.0)
        }
    };

    if round_to_ten {
        (number / 10.0 + 0.5).floor() * 10.0
    } else {
        number
    }
}

/// Parses the longest prefix of `s` that forms a decimal number: an optional sign, digits and at
/// most one decimal point, with at least one digit.
fn parse_leading_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut seen_digit = false;
    let mut seen_point = false;

    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_point => seen_point = true,
            _ => break,
        }
        end += 1;
    }

    if seen_digit {
        s[..end].parse().ok()
    } else {
        None
    }
}

/// Joins the non-empty strings with `", "`.
pub fn join_non_empty<I, S>(items: Option<I>) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items.map_or_else(String::new, |items| {
        items
            .into_iter()
            .filter(|s| !s.as_ref().trim().is_empty())
            .map(|s| s.as_ref().trim().to_owned())
            .collect::<Vec<_>>()
            .join(", ")
    })
}

/// Title with the subtitle appended as `"{title} - {subtitle}"` when there is one.
#[must_use]
pub fn compose_title(title: Option<&str>, subtitle: Option<&str>) -> String {
    let title = title.unwrap_or_default();
    match subtitle {
        Some(subtitle) if !subtitle.is_empty() => format!("{title} - {subtitle}"),
        _ => title.to_owned(),
    }
}

/// The values of the storefront "Feature" column.
///
/// Each non-blank value renders as `Label:value:position:customized`. The position is fixed per
/// feature, so a missing feature leaves a gap rather than shifting the ones after it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Features<'a> {
    /// Position 1.
    pub authors: &'a str,
    /// Position 2.
    pub publisher: &'a str,
    /// Position 3.
    pub isbn13: &'a str,
    /// Position 4.
    pub isbn10: &'a str,
    /// Page count as text, position 5.
    pub pages: &'a str,
    /// Position 6.
    pub published_date: &'a str,
    /// Position 7.
    pub maturity_rating: &'a str,
}

impl Features<'_> {
    /// Renders the non-blank features joined by `separator`.
    #[must_use]
    pub fn render(&self, separator: &str) -> String {
        let slots: [(&str, &str, u8); 7] = [
            ("Author(s)", self.authors, 1),
            ("Publisher", self.publisher, 0),
            ("ISBN13", self.isbn13, 1),
            ("ISBN10", self.isbn10, 1),
            ("Pages", self.pages, 1),
            ("Published Date", self.published_date, 1),
            ("Maturity Rating", self.maturity_rating, 1),
        ];

        slots
            .iter()
            .enumerate()
            .filter(|(_, (_, value, _))| !value.trim().is_empty())
            .map(|(i, (label, value, customized))| {
                format!("{label}:{}:{}:{customized}", value.trim(), i + 1)
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}
