//! Metadata sources and the HTTP client they share.

use std::time::Duration;

use serde::de::DeserializeOwned;

pub mod google_books;
pub mod open_library;

use crate::Error;

/// The HTTP seam the metadata sources are called through.
pub trait Client {
    /// GET `url` and deserialize the JSON body.
    ///
    /// # Errors
    ///
    /// An `Err` is returned when the request fails or the body is not the expected JSON.
    fn get_json<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned;
}

impl Client for reqwest::blocking::Client {
    fn get_json<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let response = self.get(url).send()?.error_for_status()?;
        Ok(response.json()?)
    }
}

/// Builds the blocking client used for both sources.
///
/// Open Library asks callers to identify themselves, so the crate name and version are sent as
/// the user agent.
///
/// # Errors
///
/// An `Err` is returned when the TLS backend cannot be initialised.
pub fn http_client() -> Result<reqwest::blocking::Client, Error> {
    reqwest::blocking::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(Error::from)
}

#[cfg(test)]
pub(crate) use test::{
    assert_url, impl_text_producer, MockClient, NetworkErrorProducer, Producer, URL_SINK,
};
