//! Error types for the dictionary codec.

use thiserror::Error;

/// Errors produced while parsing or serializing a level dictionary.
#[derive(Debug, Error)]
pub enum DictError {
    /// The underlying XML reader or writer failed.
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An escape sequence in text content could not be resolved.
    #[error("invalid escape sequence: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// An entity reference is not one of the predefined XML entities.
    #[error("unknown entity reference '&{0};'")]
    UnknownEntity(String),

    /// Writing the serialized document failed.
    #[error("failed to write dictionary: {0}")]
    Write(#[from] std::io::Error),

    /// The document ended before a `plist` root dictionary was found.
    #[error("missing plist root dictionary")]
    MissingRoot,

    /// An element appeared where the grammar does not allow it.
    #[error("unexpected element <{found}> in {context}")]
    UnexpectedElement { found: String, context: &'static str },

    /// The document ended in the middle of a dictionary.
    #[error("unexpected end of document in {context}")]
    UnexpectedEof { context: &'static str },

    /// A numeric value did not parse.
    #[error("invalid {kind} value '{value}' for key '{key}'")]
    InvalidNumber {
        key: String,
        kind: &'static str,
        value: String,
    },

    /// The serialized document was not valid UTF-8.
    #[error("serialized dictionary is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type alias for dictionary operations.
pub type Result<T> = std::result::Result<T, DictError>;

impl DictError {
    /// Create an UnexpectedElement error.
    pub fn unexpected(found: impl Into<String>, context: &'static str) -> Self {
        Self::UnexpectedElement {
            found: found.into(),
            context,
        }
    }

    /// Create an InvalidNumber error.
    pub fn invalid_number(
        key: impl Into<String>,
        kind: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidNumber {
            key: key.into(),
            kind,
            value: value.into(),
        }
    }
}
