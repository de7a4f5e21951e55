//! Open Library search, the fallback metadata source.

use log::{info, trace};
use serde::Deserialize;

use crate::{
    normalize::{compose_title, join_non_empty},
    BookRecord, Error, Lookup, Source,
};

use super::Client;

const OPEN_LIBRARY_SEARCH_URL: &str = "https://openlibrary.org/search.json?q=";
const OPEN_LIBRARY_COVER_URL: &str = "https://covers.openlibrary.org/b/id/";

// subjects are user contributed and can run into the hundreds
const MAX_CATEGORIES: usize = 5;

/// Searches Open Library for `identifier`, taking the first document found.
///
/// The search response has no reliable ISBN for the document, so the ISBNs are derived from the
/// identifier itself: a 13 character identifier is taken as the ISBN-13 with its last 10
/// characters as the ISBN-10. Anything else leaves both empty.
///
/// # Errors
///
/// An `Err` is returned when the request fails or the response is not a search result.
pub fn lookup<C: Client>(client: &C, identifier: &str) -> Result<Lookup, Error> {
    info!("Searching for ISBN '{identifier}' using Open Library API");
    let url = format!("{OPEN_LIBRARY_SEARCH_URL}{identifier}&fields=*&limit=1");

    let SearchModel { num_found, docs } = client.get_json(&url)?;

    trace!("Request was successful - {num_found} document(s) found");

    if num_found == 0 {
        return Ok(Lookup::NotFound);
    }

    Ok(docs
        .into_iter()
        .next()
        .map_or(Lookup::NotFound, |doc| Lookup::Found(doc.into_record(identifier))))
}

/// ISBN-13 and ISBN-10 guessed from the length of `identifier`.
fn derive_isbns(identifier: &str) -> (Option<String>, Option<String>) {
    if identifier.chars().count() == 13 {
        let isbn10 = identifier.chars().skip(3).collect();
        (Some(identifier.to_owned()), Some(isbn10))
    } else {
        (None, None)
    }
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct SearchModel {
    #[serde(rename = "numFound", default)]
    num_found: u64,
    #[serde(default)]
    docs: Vec<Doc>,
}

#[derive(Deserialize, Default)]
#[cfg_attr(test, derive(Debug))]
#[serde(default)]
struct Doc {
    key: String,
    title: Option<String>,
    subtitle: Option<String>,
    author_name: Option<Vec<String>>,
    publisher: Vec<String>,
    publish_date: Vec<String>,
    first_publish_year: Option<u32>,
    number_of_pages_median: Option<u32>,
    first_sentence: Vec<String>,
    subject: Option<Vec<String>>,
    cover_i: Option<i64>,
}

impl Doc {
    fn into_record(self, identifier: &str) -> BookRecord {
        let (isbn13, isbn10) = derive_isbns(identifier);

        let Self {
            key,
            title,
            subtitle,
            author_name,
            publisher,
            publish_date,
            first_publish_year,
            number_of_pages_median,
            first_sentence,
            subject,
            cover_i,
        } = self;

        let published_date = first_publish_year
            .map(|year| year.to_string())
            .or_else(|| publish_date.into_iter().next())
            .unwrap_or_default();

        BookRecord {
            id: key,
            title: compose_title(title.as_deref(), subtitle.as_deref()),
            authors: join_non_empty(author_name),
            publisher: publisher.into_iter().next().unwrap_or_default(),
            isbn10,
            isbn13,
            page_count: number_of_pages_median,
            published_date,
            description: first_sentence.into_iter().next().unwrap_or_default(),
            categories: join_non_empty(subject.map(|s| s.into_iter().take(MAX_CATEGORIES))),
            maturity_rating: String::new(),
            // -1 marks a work without a cover
            image_url: cover_i
                .filter(|id| *id > 0)
                .map(|id| format!("{OPEN_LIBRARY_COVER_URL}{id}-L.jpg")),
            source: Source::OpenLibrary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::derive_isbns;
    use crate::{
        api::{assert_url, impl_text_producer, MockClient, NetworkErrorProducer},
        ErrorKind, Lookup, Source,
    };

    const OPEN_LIBRARY_JSON: &str = include_str!("../../../../tests/data/open_library_search.json");

    impl_text_producer! {
        ValidJsonProducer => Ok(OPEN_LIBRARY_JSON.to_owned()),
        NothingFoundProducer => Ok(
            r#"{
                "numFound": 0,
                "start": 0,
                "docs": []
            }"#.to_owned()
        ),
        BareDocProducer => Ok(
            r#"{
                "numFound": 1,
                "docs": [{ "key": "/works/OL1W", "title": "Untitled", "publish_date": ["May 2001"] }]
            }"#.to_owned()
        ),
    }

    #[test]
    fn search_url_is_format_is_correct() {
        assert!(super::lookup(&MockClient::<ValidJsonProducer>::default(), "9780441172719").is_ok());
        assert_url!("https://openlibrary.org/search.json?q=9780441172719&fields=*&limit=1");
    }

    #[test]
    fn valid_json_maps_first_doc_into_record() {
        let client = MockClient::<ValidJsonProducer>::default();
        let record = super::lookup(&client, "9780441172719")
            .unwrap()
            .into_record()
            .expect("Document should be found");

        assert_eq!("/works/OL893415W", record.id);
        assert_eq!("Dune", record.title);
        assert_eq!("Frank Herbert", record.authors);
        assert_eq!("Ace Books", record.publisher);
        assert_eq!(Some("9780441172719"), record.isbn13.as_deref());
        assert_eq!(Some("0441172719"), record.isbn10.as_deref());
        assert_eq!(Some(604), record.page_count);
        assert_eq!("1965", record.published_date);
        assert!(record.description.starts_with("In the week before their departure"));
        assert_eq!(
            "Science fiction, Dune (Imaginary place), Fiction, Life on other planets, Desert ecology",
            record.categories
        );
        assert_eq!("", record.maturity_rating);
        assert_eq!(
            Some("https://covers.openlibrary.org/b/id/11481354-L.jpg"),
            record.image_url.as_deref()
        );
        assert_eq!(Source::OpenLibrary, record.source);
    }

    #[test]
    fn zero_found_is_not_found() {
        let client = MockClient::<NothingFoundProducer>::default();
        assert_eq!(Lookup::NotFound, super::lookup(&client, "9780000000002").unwrap());
    }

    #[test]
    fn bare_doc_falls_back_to_publish_date_and_has_no_isbns_for_short_identifier() {
        let client = MockClient::<BareDocProducer>::default();
        let record = super::lookup(&client, "0441172717")
            .unwrap()
            .into_record()
            .unwrap();

        assert_eq!("May 2001", record.published_date);
        assert_eq!(None, record.isbn10);
        assert_eq!(None, record.isbn13);
        assert_eq!(None, record.image_url);
        assert_eq!("", record.authors);
    }

    #[test]
    fn network_error_propagates() {
        let client = MockClient::<NetworkErrorProducer>::default();
        assert_eq!(
            ErrorKind::IO,
            super::lookup(&client, "9780441172719").unwrap_err().kind()
        );
    }

    #[test]
    fn isbns_are_sliced_not_validated() {
        assert_eq!(
            (Some("9780000000002".to_owned()), Some("0000000002".to_owned())),
            derive_isbns("9780000000002")
        );
        // any 13 characters count, checksums are not checked
        assert_eq!(
            (Some("978-123456789".to_owned()), Some("-123456789".to_owned())),
            derive_isbns("978-123456789")
        );
        assert_eq!((None, None), derive_isbns("0441172717"));
        assert_eq!((None, None), derive_isbns(""));
    }
}
