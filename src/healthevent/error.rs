use std::error::Error as StandardError;
use std::fmt;

use serde_json::error::Category;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeErrorKind {
    Syntax,
    SchemaMismatch,
    MalformedTimestamp,
}

/// Why a health event detail could not be decoded.
#[derive(Debug)]
pub enum DecodeError {
    /// The bytes are not well-formed JSON, including truncated input.
    Syntax(serde_json::Error),
    /// Well-formed JSON whose values do not fit the detail schema.
    SchemaMismatch(serde_json::Error),
    /// A timestamp string outside the provider grammar or zone table.
    MalformedTimestamp {
        field: String,
        value: String,
        source: Option<chrono::ParseError>,
    },
}

impl DecodeError {
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::Syntax(_) => DecodeErrorKind::Syntax,
            DecodeError::SchemaMismatch(_) => DecodeErrorKind::SchemaMismatch,
            DecodeError::MalformedTimestamp { .. } => DecodeErrorKind::MalformedTimestamp,
        }
    }

    pub(crate) fn malformed_timestamp(field: &str, value: &str) -> Self {
        DecodeError::MalformedTimestamp {
            field: field.to_owned(),
            value: value.to_owned(),
            source: None,
        }
    }

    pub(crate) fn with_parse_error(self, err: chrono::ParseError) -> Self {
        match self {
            DecodeError::MalformedTimestamp { field, value, .. } => {
                DecodeError::MalformedTimestamp {
                    field,
                    value,
                    source: Some(err),
                }
            }
            other => other,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Syntax(err) => write!(f, "detail is not valid json: {}", err),
            DecodeError::SchemaMismatch(err) => {
                write!(f, "detail does not match the health event schema: {}", err)
            }
            DecodeError::MalformedTimestamp { field, value, .. } => {
                write!(f, "malformed timestamp in `{}`: {:?}", field, value)
            }
        }
    }
}

impl StandardError for DecodeError {
    fn source(&self) -> Option<&(dyn StandardError + 'static)> {
        match self {
            DecodeError::Syntax(err) | DecodeError::SchemaMismatch(err) => Some(err),
            DecodeError::MalformedTimestamp { source, .. } => source
                .as_ref()
                .map(|err| err as &(dyn StandardError + 'static)),
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Syntax | Category::Eof => DecodeError::Syntax(err),
            Category::Data | Category::Io => DecodeError::SchemaMismatch(err),
        }
    }
}
