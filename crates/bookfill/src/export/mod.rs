//! Serialization of completed runs.
//!
//! The spreadsheet export follows a storefront product import layout: [`HEADER`] names every
//! column and [`values`] fills them for one [`OutputRow`], leaving columns the run knows nothing
//! about blank.

use std::borrow::Cow;

use crate::OutputRow;

pub mod json;
pub mod xlsx;

/// Column names of the exported catalog sheet, in order.
pub const HEADER: [&str; 60] = [
    "ID",
    "Active (0/1)",
    "Name",
    "Categories (x,y,z...)",
    "Price tax excluded",
    "Tax rule ID",
    "Cost price",
    "On sale (0/1)",
    "Discount amount",
    "Discount percent",
    "Discount from (yyyy-mm-dd)",
    "Discount to (yyyy-mm-dd)",
    "Reference #",
    "Supplier reference #",
    "Supplier",
    "Brand",
    "EAN-13",
    "UPC",
    "MPN",
    "Ecotax",
    "Width",
    "Height",
    "Depth",
    "Weight",
    "Delivery time of in-stock products",
    "Delivery time of out-of-stock products with allowed orders",
    "Quantity",
    "Minimal quantitly",
    "Low stock level",
    "Receive a low stock alert by email",
    "Visibility",
    "Additional shipping cost",
    "Unit for base price",
    "Base price",
    "Summary",
    "Description",
    "Tags (x,y,z...)",
    "Meta title",
    "Meta keywords",
    "Meta description",
    "Rewritten URL",
    "Label when in stock",
    "Label when backorder allowed",
    "Available for order (0 = No, 1 = Yes)",
    "Product availability date",
    "Product creation date",
    "Show price (0 = No, 1 = Yes)",
    "Image URLs (x,y,z...)",
    "Image alt texts (x,y,z...)",
    "Delete existing images (0 = No, 1 = Yes)",
    "Feature(Name:Value:Position:Customized)",
    "Author(s)",
    "Publisher",
    "ISBN 10",
    "ISBN 13",
    "Pages",
    "Published Date",
    "Maturity Rating",
    "Source",
    "Status",
];

/// One exported cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value<'a> {
    /// Nothing is written to the cell.
    Blank,
    /// A numeric cell, also used for the `0`/`1` flag columns.
    Number(f64),
    /// A string cell, never empty.
    Text(Cow<'a, str>),
}

impl<'a> Value<'a> {
    fn text(s: &'a str) -> Self {
        if s.is_empty() {
            Self::Blank
        } else {
            Self::Text(Cow::Borrowed(s))
        }
    }

    fn owned(s: String) -> Self {
        if s.is_empty() {
            Self::Blank
        } else {
            Self::Text(Cow::Owned(s))
        }
    }

    fn number(n: Option<f64>) -> Self {
        n.map_or(Self::Blank, Self::Number)
    }

    fn flag(b: bool) -> Self {
        Self::Number(if b { 1.0 } else { 0.0 })
    }
}

/// The cells of `row`, one per [`HEADER`] column.
#[must_use]
pub fn values(row: &OutputRow) -> [Value<'_>; 60] {
    let book = &row.book;
    let catalog = &row.catalog;
    let isbn10 = book.isbn10.as_deref().unwrap_or_default();
    let isbn13 = book.isbn13.as_deref().unwrap_or_default();
    let image = book.image_url.as_deref().unwrap_or_default();

    let mut cells: [Value<'_>; 60] = std::array::from_fn(|_| Value::Blank);
    let mut set = |column: &str, value| {
        if let Some(i) = HEADER.iter().position(|h| *h == column) {
            cells[i] = value;
        }
    };

    set("ID", Value::text(&book.id));
    set("Active (0/1)", Value::flag(catalog.active));
    set("Name", Value::text(&book.title));
    set("Categories (x,y,z...)", Value::text(&book.categories));
    set("Price tax excluded", Value::number(row.selling_price));
    set("Tax rule ID", Value::Number(f64::from(catalog.tax_rule_id)));
    set("Cost price", Value::number(row.purchase_price));
    set("Reference #", Value::text(&row.identifier));
    set("EAN-13", Value::text(isbn13));
    set("Quantity", Value::number(row.quantity));
    set("Visibility", Value::text(&catalog.visibility));
    set("Description", Value::text(&book.description));
    set("Meta title", Value::text(&book.title));
    set(
        "Available for order (0 = No, 1 = Yes)",
        Value::flag(catalog.available_for_order),
    );
    set("Show price (0 = No, 1 = Yes)", Value::flag(catalog.show_price));
    set("Image URLs (x,y,z...)", Value::text(image));
    if !image.is_empty() {
        set("Image alt texts (x,y,z...)", Value::text(&book.title));
    }
    set("Feature(Name:Value:Position:Customized)", Value::text(&row.features));
    set("Author(s)", Value::text(&book.authors));
    set("Publisher", Value::text(&book.publisher));
    set("ISBN 10", Value::text(isbn10));
    set("ISBN 13", Value::text(isbn13));
    set("Pages", Value::number(book.page_count.map(f64::from)));
    set("Published Date", Value::text(&book.published_date));
    set("Maturity Rating", Value::text(&book.maturity_rating));
    set("Source", Value::owned(book.source.to_string()));
    set("Status", Value::owned(row.status.to_string()));

    cells
}

#[cfg(test)]
pub(crate) fn sample_rows() -> Vec<OutputRow> {
    use crate::{BookRecord, CatalogDefaults, Source, Status};

    vec![
        OutputRow {
            row: 2,
            identifier: "0735619670".to_owned(),
            book: BookRecord {
                id: "QnghAQAAIAAJ".to_owned(),
                title: "Code Complete".to_owned(),
                authors: "Steve McConnell".to_owned(),
                publisher: "DV-Professional".to_owned(),
                isbn10: Some("0735619670".to_owned()),
                isbn13: Some("9780735619678".to_owned()),
                page_count: Some(952),
                published_date: "2004".to_owned(),
                description: "A practical handbook.".to_owned(),
                categories: "Computers".to_owned(),
                maturity_rating: "NOT_MATURE".to_owned(),
                image_url: Some("http://books.google.com/cover.jpg".to_owned()),
                source: Source::GoogleBooks,
            },
            selling_price: Some(499.0),
            purchase_price: Some(350.5),
            quantity: Some(4.0),
            catalog: CatalogDefaults::default(),
            features: "Author(s):Steve McConnell:1:1".to_owned(),
            status: Status::Complete,
        },
        OutputRow {
            row: 4,
            identifier: "0441172717".to_owned(),
            book: BookRecord {
                id: "/works/OL1W".to_owned(),
                title: "Dune".to_owned(),
                authors: String::new(),
                publisher: String::new(),
                isbn10: None,
                isbn13: None,
                page_count: None,
                published_date: "1965".to_owned(),
                description: String::new(),
                categories: String::new(),
                maturity_rating: String::new(),
                image_url: None,
                source: Source::OpenLibrary,
            },
            selling_price: None,
            purchase_price: None,
            quantity: Some(1.0),
            catalog: CatalogDefaults {
                active: false,
                ..CatalogDefaults::default()
            },
            features: "Published Date:1965:6:1".to_owned(),
            status: Status::Partial,
        },
    ]
}
