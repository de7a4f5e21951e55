use std::fmt;

pub(crate) type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Why a bookfill operation failed.
///
/// Every failure carries an [`ErrorKind`], usually a message naming the file, sheet or ISBN
/// involved, and the lower level error when there was one.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    source: Option<DynError>,
}

/// Broad category of an [`Error`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A request, file read or file write failed.
    IO,
    /// A response, spreadsheet or column name could not be understood.
    Deserialize,
    /// There was nothing to work on, such as a missing or empty sheet.
    NoValue,
    /// Results were asked for before a run had completed.
    State,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::IO => "Request or file access failed",
            Self::Deserialize => "Unreadable data",
            Self::NoValue => "Nothing to process",
            Self::State => "Run not completed",
        })
    }
}

impl Error {
    /// Creates a new [`Error`] of `kind` described by `message`.
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: Some(message.into()),
            source: None,
        }
    }

    /// Wraps `source` as an [`Error`] of `kind`.
    pub fn wrap<E>(kind: ErrorKind, source: E) -> Self
    where
        E: Into<DynError>,
    {
        Self {
            kind,
            message: None,
            source: Some(source.into()),
        }
    }

    /// Wraps `source` as an [`Error`] of `kind`, with `message` saying what was being attempted.
    pub fn wrap_with<E, S>(kind: ErrorKind, message: S, source: E) -> Self
    where
        E: Into<DynError>,
        S: Into<String>,
    {
        Self {
            message: Some(message.into()),
            ..Self::wrap(kind, source)
        }
    }

    /// The category of the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The context message, without the kind or cause.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }

        if let Some(cause) = &self.source {
            write!(f, " ({cause})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| &**e as _)
    }
}

// a body that arrives but does not decode is bad data, anything else is the transport
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_decode() {
            ErrorKind::Deserialize
        } else {
            ErrorKind::IO
        };
        Self::wrap(kind, e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        let kind = if e.is_io() {
            ErrorKind::IO
        } else {
            ErrorKind::Deserialize
        };
        Self::wrap(kind, e)
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[test]
    fn display_includes_kind_message_and_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::wrap_with(ErrorKind::IO, "Failed to save 'books.json'", cause);

        assert_eq!(
            "Request or file access failed: Failed to save 'books.json' (gone)",
            err.to_string()
        );
        assert_eq!(ErrorKind::IO, err.kind());
        assert_eq!(Some("Failed to save 'books.json'"), err.message());
    }

    #[test]
    fn message_only_error_has_no_source() {
        use std::error::Error as _;

        let err = Error::new(ErrorKind::NoValue, "No spreadsheet loaded");

        assert_eq!("Nothing to process: No spreadsheet loaded", err.to_string());
        assert!(err.source().is_none());
    }

    #[test]
    fn malformed_json_is_unreadable_data() {
        let err = Error::from(serde_json::from_str::<u32>("{").unwrap_err());

        assert_eq!(ErrorKind::Deserialize, err.kind());
        assert!(err.message().is_none());
        assert!(err.to_string().starts_with("Unreadable data ("));
    }
}
