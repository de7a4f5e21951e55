use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use bookfill::{
    api::Client,
    export,
    pipeline::{Enricher, Options, RunContext},
    sheet::{self, ColumnLayout, InputSheet},
    BookRecord, Level, Lookup,
};
use eyre::{eyre, Result, WrapErr};
use log::{info, trace, warn};

use crate::{file, interact};

/// Settings shared by every command.
pub struct Session {
    pub file: Option<PathBuf>,
    pub interact: bool,
    pub layout: ColumnLayout,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Json,
    Both,
}

impl ExportFormat {
    const fn xlsx(self) -> bool {
        matches!(self, Self::Xlsx | Self::Both)
    }

    const fn json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "json" => Ok(Self::Json),
            "both" => Ok(Self::Both),
            _ => Err(format!("'{s}' is not an export format, expected xlsx, json or both")),
        }
    }
}

pub fn load_sheet(file: Option<&Path>) -> Result<InputSheet> {
    let path = file::input_spreadsheet(file)?;
    info!("Reading '{}'", path.display());

    let sheet = sheet::read(&path)
        .wrap_err_with(|| format!("Cannot read the spreadsheet '{}'", path.display()))?;

    trace!("Sheet '{}' has {} data rows", sheet.name, sheet.rows.len());
    Ok(sheet)
}

/// Runs every row of `sheet` through the lookups, logging progress as it goes.
pub fn enrich<C: Client>(client: C, options: Options, sheet: &InputSheet) -> Result<RunContext> {
    let enricher = Enricher::new(client, options);
    let mut ctx = RunContext::new();

    enricher.run(&mut ctx, Some(sheet), |progress, outcome| match outcome {
        Ok(row) => info!(
            "[{:>3}%] row {} '{}' - {}",
            progress.percent, row.row, row.identifier, row.book.title
        ),
        Err(diagnostic) => warn!("[{:>3}%] {diagnostic}", progress.percent),
    })?;

    Ok(ctx)
}

/// Writes the completed rows of `ctx` in `format` to `dir`, returning the files written.
///
/// With `interact` set an existing export is only replaced once the user agrees.
pub fn export(
    ctx: &RunContext,
    format: ExportFormat,
    dir: &Path,
    interact: bool,
) -> Result<Vec<PathBuf>> {
    let rows = ctx.completed_rows()?;
    let mut written = Vec::new();

    if format.xlsx() {
        let path = dir.join(export::xlsx::DEFAULT_FILE);
        if may_write(&path, interact)? {
            export::xlsx::write(rows, &path)?;
            written.push(path);
        }
    }

    if format.json() {
        let path = dir.join(export::json::DEFAULT_FILE);
        if may_write(&path, interact)? {
            export::json::write(rows, &path)?;
            written.push(path);
        }
    }

    Ok(written)
}

fn may_write(path: &Path, interact: bool) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }

    if interact {
        let overwrite = interact::confirm_overwrite(path)?;
        if !overwrite {
            info!("Keeping the existing '{}'", path.display());
        }
        Ok(overwrite)
    } else {
        info!("Overwriting '{}'", path.display());
        Ok(true)
    }
}

/// Run summary followed by one line per diagnostic.
pub fn summary(ctx: &RunContext, written: &[PathBuf]) -> String {
    let diagnostics = ctx.diagnostics();
    let not_found = diagnostics
        .iter()
        .filter(|d| d.level == Level::Warning)
        .count();

    let counts = format!(
        "{} of {} rows resolved, {} not found, {} failed",
        ctx.rows().len(),
        ctx.progress().total,
        not_found,
        diagnostics.len() - not_found
    );

    std::iter::once(counts)
        .chain(diagnostics.iter().map(ToString::to_string))
        .chain(
            written
                .iter()
                .map(|path| format!("Exported to '{}'", path.display())),
        )
        .collect::<Vec<_>>()
        .join("\n")
}

/// The rows `enrich` would look up.
pub fn describe(sheet: &InputSheet, layout: &ColumnLayout) -> String {
    let heading = format!("Sheet '{}' has {} data rows", sheet.name, sheet.rows.len());

    let rows = sheet.rows.iter().map(|row| {
        let isbn = row.cell(layout.identifier).to_text();
        if isbn.is_empty() {
            format!("row {}: no ISBN", row.number)
        } else {
            format!("row {}: {isbn}", row.number)
        }
    });

    std::iter::once(heading)
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn lookup(isbn: &str, api_key: Option<&str>) -> Result<String> {
    let lookup = match bookfill::lookup_primary(isbn, api_key)? {
        Lookup::NotFound => bookfill::lookup_fallback(isbn)?,
        found @ Lookup::Found(_) => found,
    };

    lookup
        .into_record()
        .map(|record| describe_record(&record))
        .ok_or_else(|| eyre!("No book found for ISBN {isbn}"))
}

fn describe_record(record: &BookRecord) -> String {
    let optional = |value: Option<&str>| value.unwrap_or("-").to_owned();
    let fields = [
        ("Title", record.title.clone()),
        ("Author(s)", record.authors.clone()),
        ("Publisher", record.publisher.clone()),
        ("Published", record.published_date.clone()),
        ("ISBN 10", optional(record.isbn10.as_deref())),
        ("ISBN 13", optional(record.isbn13.as_deref())),
        (
            "Pages",
            record.page_count.map_or_else(|| "-".to_owned(), |p| p.to_string()),
        ),
        ("Categories", record.categories.clone()),
        ("Source", record.source.to_string()),
    ];

    fields
        .iter()
        .map(|(name, value)| format!("{name:<10} {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use assert_fs::{
        fixture::{FileWriteStr, PathChild},
        TempDir,
    };
    use bookfill::{
        sheet::{Cell, RawRow},
        Error, ErrorKind,
    };
    use serde::de::DeserializeOwned;

    use super::*;

    /// A client that can't reach anything.
    struct OfflineClient;

    impl Client for OfflineClient {
        fn get_json<T: DeserializeOwned>(&self, _url: &str) -> Result<T, Error> {
            Err(Error::new(ErrorKind::IO, "offline"))
        }
    }

    fn sheet() -> InputSheet {
        InputSheet {
            name: "Stock".to_owned(),
            rows: vec![
                RawRow {
                    number: 2,
                    cells: vec![Cell::from("9780441172719"), Cell::from(12.0)],
                },
                RawRow {
                    number: 3,
                    cells: vec![Cell::Empty, Cell::from(4.0)],
                },
            ],
        }
    }

    #[test]
    fn export_format_parses_case_insensitively() {
        assert_eq!(Ok(ExportFormat::Xlsx), "XLSX".parse::<ExportFormat>());
        assert_eq!(Ok(ExportFormat::Both), "both".parse::<ExportFormat>());
        assert!("csv".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn failing_rows_are_listed_in_summary() {
        let ctx = enrich(OfflineClient, Options::default(), &sheet()).unwrap();
        let message = summary(&ctx, &[]);

        let mut lines = message.lines();
        assert_eq!(Some("0 of 2 rows resolved, 0 not found, 2 failed"), lines.next());
        assert_eq!(
            Some(
                "[Error] row 2: Error processing ISBN 9780441172719: \
                 Request or file access failed: offline"
            ),
            lines.next()
        );
        assert!(lines.next().unwrap().starts_with("[Error] row 3:"));
        assert_eq!(None, lines.next());
    }

    #[test]
    fn written_files_close_the_summary() {
        let ctx = enrich(OfflineClient, Options::default(), &sheet()).unwrap();
        let written = [PathBuf::from("out/book_data.xlsx"), PathBuf::from("out/books.json")];

        let message = summary(&ctx, &written);
        let lines = message.lines().collect::<Vec<_>>();

        assert_eq!(5, lines.len());
        assert_eq!(
            ["Exported to 'out/book_data.xlsx'", "Exported to 'out/books.json'"],
            lines[3..]
        );
    }

    #[test]
    fn empty_sheet_cannot_be_enriched() {
        let err = enrich(OfflineClient, Options::default(), &InputSheet::default()).unwrap_err();
        assert!(err.to_string().contains("No spreadsheet loaded"));
    }

    #[test]
    fn export_writes_requested_formats() {
        let dir = TempDir::new().unwrap();
        let ctx = enrich(OfflineClient, Options::default(), &sheet()).unwrap();

        let written = export(&ctx, ExportFormat::Both, dir.path(), false).unwrap();

        assert_eq!(
            vec![
                dir.child("book_data.xlsx").path().to_path_buf(),
                dir.child("books.json").path().to_path_buf()
            ],
            written
        );
        assert_eq!(
            "[]",
            std::fs::read_to_string(dir.child("books.json").path()).unwrap()
        );
    }

    #[test]
    fn export_replaces_existing_file_without_interact() {
        let dir = TempDir::new().unwrap();
        dir.child("books.json").write_str("stale").unwrap();
        let ctx = enrich(OfflineClient, Options::default(), &sheet()).unwrap();

        export(&ctx, ExportFormat::Json, dir.path(), false).unwrap();

        assert_eq!(
            "[]",
            std::fs::read_to_string(dir.child("books.json").path()).unwrap()
        );
    }

    #[test]
    #[should_panic(expected = "once a run has completed")]
    fn export_needs_a_completed_run() {
        let dir = TempDir::new().unwrap();
        export(&RunContext::new(), ExportFormat::Xlsx, dir.path(), false).unwrap();
    }

    #[test]
    fn describe_lists_isbns_and_blank_rows() {
        assert_eq!(
            "Sheet 'Stock' has 2 data rows\nrow 2: 9780441172719\nrow 3: no ISBN",
            describe(&sheet(), &ColumnLayout::default())
        );
    }
}
