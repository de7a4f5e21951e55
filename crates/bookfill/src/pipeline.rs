//! The enrichment run.
//!
//! A run walks the data rows of an [`InputSheet`] strictly in order. Each row is looked up in
//! Google Books and, when that finds nothing, in Open Library. A resolved row becomes an
//! [`OutputRow`]; an unresolved or failing row becomes a [`Diagnostic`] and the run moves on to the
//! next row. All state of a run lives in a [`RunContext`].

use log::{debug, info, warn};

use crate::{
    api::{google_books, open_library, Client},
    normalize::{normalize_number, Features},
    sheet::{ColumnLayout, InputSheet, RawRow},
    BookRecord, CatalogDefaults, Diagnostic, Error, ErrorKind, Lookup, OutputRow, SourceRow,
};

/// Settings for an [`Enricher`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Where each value sits in an input row.
    pub layout: ColumnLayout,
    /// Google Books API key, requests are anonymous without one.
    pub api_key: Option<String>,
    /// Joins the segments of the feature column.
    pub feature_separator: String,
    /// Fixed storefront values copied onto every output row.
    pub catalog: CatalogDefaults,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            layout: ColumnLayout::default(),
            api_key: None,
            feature_separator: ",".to_owned(),
            catalog: CatalogDefaults::default(),
        }
    }
}

/// Lifecycle of a [`RunContext`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// No run has started.
    Idle,
    /// Rows are being processed.
    Running,
    /// Every row has been processed; results can be exported.
    Completed,
}

/// How far a run has got.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    /// Rows finished, resolved or not.
    pub processed: usize,
    /// Data rows in the sheet.
    pub total: usize,
    /// Whole percent, 0 to 100.
    pub percent: u8,
}

impl Progress {
    /// Progress after `processed` of `total` rows: `round(processed / total * 100)`, held at 99
    /// until the last row is done.
    #[must_use]
    pub fn after(processed: usize, total: usize) -> Self {
        let percent = if total == 0 || processed >= total {
            100
        } else {
            // integer round half up of processed * 100 / total
            let rounded = (processed * 200 + total) / (2 * total);
            u8::try_from(rounded.min(99)).unwrap_or(99)
        };

        Self {
            processed,
            total,
            percent,
        }
    }
}

/// The state of a single enrichment run: resolved rows, diagnostics and progress.
///
/// Starting a run again discards everything the previous run produced.
#[derive(Debug)]
pub struct RunContext {
    state: State,
    rows: Vec<OutputRow>,
    diagnostics: Vec<Diagnostic>,
    progress: Progress,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    /// An idle context with nothing processed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: State::Idle,
            rows: Vec::new(),
            diagnostics: Vec::new(),
            progress: Progress {
                processed: 0,
                total: 0,
                percent: 0,
            },
        }
    }

    /// Where the run is in its lifecycle.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Rows resolved so far, in input order.
    #[must_use]
    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    /// Diagnostics recorded so far, in input order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Progress as of the last processed row.
    #[must_use]
    pub const fn progress(&self) -> Progress {
        self.progress
    }

    /// Moves the context into [`State::Running`] for `input`.
    ///
    /// # Errors
    ///
    /// An `Err` with [`ErrorKind::NoValue`] is returned when no sheet is loaded or the sheet has
    /// no data rows. The context is left untouched.
    pub fn start(&mut self, input: Option<&InputSheet>) -> Result<(), Error> {
        let total = match input {
            Some(sheet) if !sheet.is_empty() => sheet.rows.len(),
            Some(sheet) => {
                return Err(Error::new(
                    ErrorKind::NoValue,
                    format!("No spreadsheet loaded - sheet '{}' has no data rows", sheet.name),
                ))
            }
            None => return Err(Error::new(ErrorKind::NoValue, "No spreadsheet loaded")),
        };

        self.rows.clear();
        self.diagnostics.clear();
        self.progress = Progress {
            processed: 0,
            total,
            percent: 0,
        };
        self.state = State::Running;
        Ok(())
    }

    fn record(&mut self, outcome: Result<OutputRow, Diagnostic>) {
        match outcome {
            Ok(row) => self.rows.push(row),
            Err(diagnostic) => self.diagnostics.push(diagnostic),
        }
        self.progress = Progress::after(self.progress.processed + 1, self.progress.total);
        if self.progress.processed == self.progress.total {
            self.state = State::Completed;
        }
    }

    /// The resolved rows of a finished run, for export.
    ///
    /// # Errors
    ///
    /// An `Err` with [`ErrorKind::State`] is returned unless the run has completed.
    pub fn completed_rows(&self) -> Result<&[OutputRow], Error> {
        if self.state == State::Completed {
            Ok(&self.rows)
        } else {
            Err(Error::new(
                ErrorKind::State,
                "Rows can only be exported once a run has completed",
            ))
        }
    }
}

/// Resolves input rows against the metadata sources.
pub struct Enricher<C> {
    client: C,
    options: Options,
}

impl<C: Client> Enricher<C> {
    /// An enricher sending its lookups through `client`.
    pub const fn new(client: C, options: Options) -> Self {
        Self { client, options }
    }

    /// The settings rows are processed with.
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Processes every data row of `input` into `ctx`, one at a time and in order.
    ///
    /// `on_row` is called after each row with the progress so far and the row's outcome. A row
    /// that fails is recorded as a [`Diagnostic`] and never stops the run.
    ///
    /// # Errors
    ///
    /// An `Err` is returned when the run cannot start, see [`RunContext::start`].
    pub fn run<F>(
        &self,
        ctx: &mut RunContext,
        input: Option<&InputSheet>,
        mut on_row: F,
    ) -> Result<(), Error>
    where
        F: FnMut(Progress, Result<&OutputRow, &Diagnostic>),
    {
        ctx.start(input)?;
        let rows = input.map(|sheet| sheet.rows.as_slice()).unwrap_or_default();
        debug!("Starting run over {} rows", rows.len());

        for row in rows {
            let outcome = self.process_row(row);
            let resolved = outcome.is_ok();
            ctx.record(outcome);

            let progress = ctx.progress();
            if resolved {
                if let Some(output) = ctx.rows().last() {
                    on_row(progress, Ok(output));
                }
            } else if let Some(diagnostic) = ctx.diagnostics().last() {
                on_row(progress, Err(diagnostic));
            }
        }

        info!(
            "Run completed - {} resolved, {} diagnostics",
            ctx.rows().len(),
            ctx.diagnostics().len()
        );
        Ok(())
    }

    /// Resolves a single row into an [`OutputRow`], or the [`Diagnostic`] explaining why not.
    ///
    /// # Errors
    ///
    /// A warning [`Diagnostic`] is returned when neither source knows the ISBN, an error
    /// [`Diagnostic`] when reading the row or calling a source fails.
    pub fn process_row(&self, row: &RawRow) -> Result<OutputRow, Diagnostic> {
        let identifier = row.cell(self.options.layout.identifier).to_text();

        match self.resolve(row, &identifier) {
            Ok(Some(output)) => {
                info!(
                    "Row {}: '{identifier}' resolved using {}",
                    row.number, output.book.source
                );
                Ok(output)
            }
            Ok(None) => {
                let diagnostic = Diagnostic::not_found(row.number, &identifier);
                warn!("Row {}: {}", row.number, diagnostic.message);
                Err(diagnostic)
            }
            Err(err) => {
                let diagnostic = Diagnostic::failed(row.number, &identifier, &err);
                warn!("Row {}: {}", row.number, diagnostic.message);
                Err(diagnostic)
            }
        }
    }

    fn resolve(&self, row: &RawRow, identifier: &str) -> Result<Option<OutputRow>, Error> {
        let source = self.source_row(row, identifier)?;
        let api_key = self.options.api_key.as_deref();

        let record = match google_books::lookup(&self.client, &source.identifier, api_key)? {
            Lookup::Found(record) => record,
            Lookup::NotFound => match open_library::lookup(&self.client, &source.identifier)? {
                Lookup::Found(record) => record,
                Lookup::NotFound => return Ok(None),
            },
        };

        Ok(Some(self.merge(source, record)))
    }

    fn source_row(&self, row: &RawRow, identifier: &str) -> Result<SourceRow, Error> {
        let layout = &self.options.layout;
        if identifier.is_empty() {
            return Err(Error::new(
                ErrorKind::NoValue,
                format!("Row {} has no ISBN", row.number),
            ));
        }

        let number = |column: usize, round: bool| {
            let cell = row.cell(column);
            (!cell.is_empty()).then(|| normalize_number(cell, round))
        };

        Ok(SourceRow {
            row: row.number,
            identifier: identifier.to_owned(),
            selling_price: number(layout.selling_price, layout.round_selling_price),
            purchase_price: number(layout.purchase_price, false),
            quantity: number(layout.quantity, false),
        })
    }

    fn merge(&self, source: SourceRow, book: BookRecord) -> OutputRow {
        let pages = book.page_count.map(|p| p.to_string()).unwrap_or_default();
        let features = Features {
            authors: &book.authors,
            publisher: &book.publisher,
            isbn13: book.isbn13.as_deref().unwrap_or_default(),
            isbn10: book.isbn10.as_deref().unwrap_or_default(),
            pages: &pages,
            published_date: &book.published_date,
            maturity_rating: &book.maturity_rating,
        }
        .render(&self.options.feature_separator);

        let SourceRow {
            row,
            identifier,
            selling_price,
            purchase_price,
            quantity,
        } = source;

        OutputRow {
            row,
            identifier,
            status: OutputRow::status_of(&book),
            book,
            selling_price,
            purchase_price,
            quantity,
            catalog: self.options.catalog.clone(),
            features,
        }
    }
}
