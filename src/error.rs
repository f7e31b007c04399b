//! Error and result types shared by every subsystem in this crate.

use std::fmt;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// An error encountered by the tree model, sizer, encoder, or decoder.
///
/// Carries a [`ErrorKind`] plus optional context (a human-readable message,
/// the key or array index the failure occurred at) so that a `Display`
/// rendering of the error can point at exactly where things went wrong.
#[derive(Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    key: Option<String>,
    index: Option<usize>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            key: None,
            index: None,
        }
    }

    /// The kind of error that occurred.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Attach a key to this error, describing where in a document it occurred.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attach an array index to this error.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Attach a human-readable message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub(crate) fn malformed_bytes(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedBytes).with_message(message)
    }

    pub(crate) fn unsupported_element(tag: u8) -> Self {
        Self::new(ErrorKind::UnsupportedElement { tag })
    }

    pub(crate) fn not_a_container() -> Self {
        Self::new(ErrorKind::NotAContainer)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.kind)?;
        if let Some(ref key) = self.key {
            write!(fmt, " at key \"{key}\"")?;
        }
        if let Some(index) = self.index {
            write!(fmt, " at index {index}")?;
        }
        if let Some(ref message) = self.message {
            write!(fmt, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

/// The classes of failure this crate's codec and tree model can produce.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The input bytes did not form a well-formed BSON document: a bad type
    /// byte, a length header that didn't match the actual slice length, a
    /// truncated payload, invalid UTF-8, or a boolean byte other than 0/1.
    #[error("malformed BSON bytes")]
    MalformedBytes,

    /// A recognized-but-unsupported BSON element type was encountered while
    /// decoding (`ObjectId`, `DBPointer`, or `JS-code-with-scope`).
    #[error("unsupported BSON element type 0x{tag:02x}")]
    UnsupportedElement {
        /// The BSON type tag byte that was refused.
        tag: u8,
    },

    /// An operation that requires an `Array`/`Object` node was given a leaf.
    #[error("expected an array or object node")]
    NotAContainer,
}
