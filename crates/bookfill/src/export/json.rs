//! JSON export, a single array of row objects with camelCase keys.

use std::{fs, path::Path};

use log::info;

use crate::{Error, ErrorKind, OutputRow};

/// File name used when no other is given.
pub const DEFAULT_FILE: &str = "books.json";

/// Renders `rows` as a pretty printed JSON array.
///
/// # Errors
///
/// An `Err` with [`ErrorKind::Deserialize`] is returned when a row cannot be serialized.
pub fn to_string(rows: &[OutputRow]) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(rows)?)
}

/// Writes `rows` to `path` as a JSON array, replacing any existing file.
///
/// # Errors
///
/// An `Err` is returned when the rows cannot be serialized or the file cannot be written.
pub fn write<P: AsRef<Path>>(rows: &[OutputRow], path: P) -> Result<(), Error> {
    let path = path.as_ref();
    let json = to_string(rows)?;

    fs::write(path, json).map_err(|e| {
        Error::wrap_with(
            ErrorKind::IO,
            format!("Failed to save '{}'", path.display()),
            e,
        )
    })?;

    info!("Exported {} rows to '{}'", rows.len(), path.display());
    Ok(())
}
