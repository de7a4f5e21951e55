//! The records that flow through a run: the pricing read from the input sheet, the book metadata
//! found by a source and the merged catalog row that is exported.

use std::fmt;

use serde::Serialize;

/// The metadata source a [`BookRecord`] was resolved from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Source {
    /// Google Books, always queried first.
    #[serde(rename = "Google Books")]
    GoogleBooks,
    /// Open Library, queried only when Google Books has no match.
    #[serde(rename = "Open Library")]
    OpenLibrary,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoogleBooks => f.write_str("Google Books"),
            Self::OpenLibrary => f.write_str("Open Library"),
        }
    }
}

/// One data row of the input sheet after normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceRow {
    /// 1-based row number in the input sheet.
    pub row: usize,
    /// The ISBN used as the lookup key.
    pub identifier: String,
    /// `None` when the cell is blank.
    pub selling_price: Option<f64>,
    /// `None` when the cell is blank.
    pub purchase_price: Option<f64>,
    /// `None` when the cell is blank.
    pub quantity: Option<f64>,
}

/// Book metadata normalized from either source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    /// The source's own key, a volume id or an Open Library work key.
    pub id: String,
    /// Title joined with the subtitle when there is one.
    pub title: String,
    /// Comma separated author names.
    pub authors: String,
    /// Publisher name.
    pub publisher: String,
    /// 10 digit ISBN.
    pub isbn10: Option<String>,
    /// 13 digit ISBN.
    pub isbn13: Option<String>,
    /// Number of pages.
    pub page_count: Option<u32>,
    /// As given by the source, a year or a full date.
    pub published_date: String,
    /// Blurb or synopsis.
    pub description: String,
    /// Comma separated categories.
    pub categories: String,
    /// Google Books maturity rating, blank for Open Library.
    pub maturity_rating: String,
    /// Cover image URL.
    pub image_url: Option<String>,
    /// Which source resolved the record.
    pub source: Source,
}

/// The result of asking a single source about an identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// The first result, normalized.
    Found(BookRecord),
    /// The source returned no results.
    NotFound,
}

impl Lookup {
    /// Whether the source returned at least one result.
    #[must_use]
    pub const fn found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Converts into an [`Option`], dropping the not-found marker.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // can't be const
    pub fn into_record(self) -> Option<BookRecord> {
        match self {
            Self::Found(record) => Some(record),
            Self::NotFound => None,
        }
    }
}

/// Catalog fields that are the same for every exported product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDefaults {
    /// Whether products are enabled on import.
    pub active: bool,
    /// Storefront tax rule applied to the price.
    pub tax_rule_id: u32,
    /// Storefront visibility, one of `both`, `catalog`, `search` or `none`.
    pub visibility: String,
    /// Whether the product can be ordered.
    pub available_for_order: bool,
    /// Whether the price is shown to customers.
    pub show_price: bool,
}

impl Default for CatalogDefaults {
    fn default() -> Self {
        Self {
            active: true,
            tax_rule_id: 1,
            visibility: "both".to_owned(),
            available_for_order: true,
            show_price: true,
        }
    }
}

/// Whether an [`OutputRow`] carries the fields a catalog entry needs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Status {
    /// Title, authors and ISBN-13 are all present.
    Complete,
    /// At least one of title, authors or ISBN-13 is missing.
    Partial,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => f.write_str("Complete"),
            Self::Partial => f.write_str("Partial"),
        }
    }
}

/// A resolved input row, ready for export.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRow {
    /// 1-based row number in the input sheet.
    pub row: usize,
    /// The ISBN as read from the input sheet.
    pub identifier: String,
    /// Metadata from whichever source resolved the row.
    #[serde(flatten)]
    pub book: BookRecord,
    /// `None` when the input cell was blank.
    pub selling_price: Option<f64>,
    /// `None` when the input cell was blank.
    pub purchase_price: Option<f64>,
    /// `None` when the input cell was blank.
    pub quantity: Option<f64>,
    /// Fixed catalog fields.
    #[serde(flatten)]
    pub catalog: CatalogDefaults,
    /// The rendered feature column, see [`crate::normalize::Features`].
    pub features: String,
    /// Whether the row is complete enough for the catalog.
    pub status: Status,
}

impl OutputRow {
    pub(crate) fn status_of(book: &BookRecord) -> Status {
        let has_isbn13 = book.isbn13.as_deref().map_or(false, |s| !s.trim().is_empty());
        if !book.title.trim().is_empty() && !book.authors.trim().is_empty() && has_isbn13 {
            Status::Complete
        } else {
            Status::Partial
        }
    }
}

/// Severity of a [`Diagnostic`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Level {
    /// Neither source found the identifier.
    Warning,
    /// The row could not be processed.
    Error,
}

/// A per-row problem recorded during a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// How serious the problem is.
    pub level: Level,
    /// 1-based row number in the input sheet.
    pub row: usize,
    /// The ISBN of the row, empty when the cell was blank.
    pub identifier: String,
    /// Human readable description.
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn not_found(row: usize, identifier: &str) -> Self {
        Self {
            level: Level::Warning,
            row,
            identifier: identifier.to_owned(),
            message: format!("No book found for ISBN {identifier}"),
        }
    }

    pub(crate) fn failed(row: usize, identifier: &str, err: &dyn std::error::Error) -> Self {
        Self {
            level: Level::Error,
            row,
            identifier: identifier.to_owned(),
            message: format!("Error processing ISBN {identifier}: {err}"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            Level::Warning => "Warning",
            Level::Error => "Error",
        };
        write!(f, "[{level}] row {}: {}", self.row, self.message)
    }
}
