#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! # bookfill
//!
//! bookfill enriches a spreadsheet of ISBNs with book metadata. Each row is looked up in Google
//! Books, falling back to Open Library, and merged with the row's pricing into a catalog record
//! ready for a storefront product import. Completed runs export to xlsx or JSON.
//!
//! The [`pipeline`] drives a run over an [`sheet::InputSheet`], [`export`] writes the result.

pub mod api;
mod error;
pub mod export;
pub mod normalize;
pub mod pipeline;
mod record;
pub mod sheet;

pub use error::{Error, ErrorKind};
pub use record::{
    BookRecord, CatalogDefaults, Diagnostic, Level, Lookup, OutputRow, Source, SourceRow, Status,
};

use log::trace;

type Client = reqwest::blocking::Client;

/// Looks up `isbn` in Google Books using a default client.
///
/// # Errors
///
/// An [`Err`] is returned when the request fails or the response cannot be parsed.
#[inline]
pub fn lookup_primary(isbn: &str, api_key: Option<&str>) -> Result<Lookup, Error> {
    trace!("Primary lookup of ISBN '{isbn}'");
    api::google_books::lookup::<Client>(&api::http_client()?, isbn, api_key)
}

/// Looks up `isbn` in Open Library using a default client.
///
/// # Errors
///
/// An [`Err`] is returned when the request fails or the response cannot be parsed.
#[inline]
pub fn lookup_fallback(isbn: &str) -> Result<Lookup, Error> {
    trace!("Fallback lookup of ISBN '{isbn}'");
    api::open_library::lookup::<Client>(&api::http_client()?, isbn)
}
