//! Google Books, the primary metadata source.

use log::{info, trace};
use serde::Deserialize;

use crate::{
    normalize::{compose_title, join_non_empty},
    BookRecord, Error, Lookup, Source,
};

use super::Client;

const GOOGLE_BOOKS_URL: &str = "https://www.googleapis.com/books/v1/volumes?q=isbn:";

/// Looks up `isbn` in Google Books.
///
/// The first volume returned is mapped into a [`BookRecord`]; [`Lookup::NotFound`] when the
/// search has no results. `api_key` is sent as the `key` parameter when given.
///
/// # Errors
///
/// An `Err` is returned when the request fails or the response is not a volumes search result.
pub fn lookup<C: Client>(client: &C, isbn: &str, api_key: Option<&str>) -> Result<Lookup, Error> {
    // remove hypen from ISBN-13 (if applicable)
    let isbn = isbn.replace('-', "");
    info!("Searching for ISBN '{isbn}' using Google Books API");

    let mut url = GOOGLE_BOOKS_URL.to_owned();
    url.push_str(&isbn);
    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        url.push_str("&key=");
        url.push_str(key);
    }

    let VolumesModel { total_items, items } = client.get_json(&url)?;

    trace!("Request was successful - {total_items} volume(s) found");

    if total_items == 0 {
        return Ok(Lookup::NotFound);
    }

    Ok(items
        .into_iter()
        .next()
        .map_or(Lookup::NotFound, |item| Lookup::Found(item.into())))
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct VolumesModel {
    #[serde(rename = "totalItems", default)]
    total_items: u64,
    // absent entirely when nothing matched
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct Item {
    #[serde(default)]
    id: String,
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

/// Volume information from the Google Book API
#[derive(Deserialize, Default)]
#[cfg_attr(test, derive(Debug))]
#[serde(rename_all = "camelCase", default)]
struct VolumeInfo {
    title: Option<String>,
    subtitle: Option<String>,
    authors: Option<Vec<String>>,
    publisher: Option<String>,
    published_date: Option<String>,
    description: Option<String>,
    industry_identifiers: Vec<IndustryIdentifier>,
    page_count: Option<u32>,
    categories: Option<Vec<String>>,
    maturity_rating: Option<String>,
    image_links: Option<ImageLinks>,
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

#[derive(Deserialize, Default)]
#[cfg_attr(test, derive(Debug))]
#[serde(rename_all = "camelCase", default)]
struct ImageLinks {
    extra_large: Option<String>,
    large: Option<String>,
    medium: Option<String>,
}

impl VolumeInfo {
    fn identifier(&self, kind: &str) -> Option<String> {
        self.industry_identifiers
            .iter()
            .find(|id| id.kind == kind)
            .map(|id| id.identifier.clone())
    }
}

impl ImageLinks {
    fn best(self) -> Option<String> {
        self.extra_large.or(self.large).or(self.medium)
    }
}

impl From<Item> for BookRecord {
    fn from(item: Item) -> Self {
        let isbn10 = item.volume_info.identifier("ISBN_10");
        let isbn13 = item.volume_info.identifier("ISBN_13");

        // Deconstruct to take ownership of fields (avoids cloning).
        let Item {
            id,
            volume_info:
                VolumeInfo {
                    title,
                    subtitle,
                    authors,
                    publisher,
                    published_date,
                    description,
                    page_count,
                    categories,
                    maturity_rating,
                    image_links,
                    ..
                },
        } = item;

        Self {
            id,
            title: compose_title(title.as_deref(), subtitle.as_deref()),
            authors: join_non_empty(authors),
            publisher: publisher.unwrap_or_default(),
            isbn10,
            isbn13,
            page_count,
            published_date: published_date.unwrap_or_default(),
            description: description.unwrap_or_default(),
            categories: join_non_empty(categories),
            maturity_rating: maturity_rating.unwrap_or_default(),
            image_url: image_links.and_then(ImageLinks::best),
            source: Source::GoogleBooks,
        }
    }
}
