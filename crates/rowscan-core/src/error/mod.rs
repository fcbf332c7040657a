//! Tagged errors with source chains.
use crate::SharedString;
use std::{error, fmt};

mod chain;

pub use chain::Chain;

/// Kinds of errors raised while scanning rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The destination is absent or not mutably accessible.
    InvalidDestination,
    /// The row source failed to produce the next row.
    Source,
    /// A row could not be decoded into the destination type.
    Decode,
    /// A scalar fetch received more than one row.
    Cardinality,
    /// A scalar fetch received no rows.
    NotFound,
    /// A read-write transaction failed.
    Transaction,
}

impl ErrorKind {
    /// Returns the kind as a static string.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidDestination => "invalid destination",
            Self::Source => "source error",
            Self::Decode => "decode error",
            Self::Cardinality => "cardinality error",
            Self::NotFound => "not found",
            Self::Transaction => "transaction error",
        }
    }
}

impl fmt::Display for ErrorKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error type backed by an allocation-optimized string.
#[derive(Debug)]
pub struct Error {
    /// Error kind.
    kind: ErrorKind,
    /// Error message.
    message: SharedString,
    /// Error source.
    source: Option<Box<Error>>,
}

impl Error {
    /// Creates a new instance with the supplied kind and message.
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<SharedString>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new instance with the supplied kind, message and the error source.
    #[inline]
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<SharedString>,
        source: impl Into<Error>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source.into())),
        }
    }

    /// Creates an [`ErrorKind::InvalidDestination`] error.
    #[inline]
    pub fn invalid_destination(message: impl Into<SharedString>) -> Self {
        Self::new(ErrorKind::InvalidDestination, message)
    }

    /// Creates an [`ErrorKind::Decode`] error.
    #[inline]
    pub fn decode(message: impl Into<SharedString>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    /// Creates an [`ErrorKind::Cardinality`] error.
    #[inline]
    pub fn cardinality(message: impl Into<SharedString>) -> Self {
        Self::new(ErrorKind::Cardinality, message)
    }

    /// Creates the [`ErrorKind::NotFound`] error returned when no row was found.
    #[inline]
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound, "no row was found")
    }

    /// Returns a new instance with the supplied message and `self` as the error source.
    /// The kind is kept unchanged.
    #[inline]
    pub fn wrap(self, message: impl Into<SharedString>) -> Self {
        Self {
            kind: self.kind,
            message: message.into(),
            source: Some(Box::new(self)),
        }
    }

    /// Returns a new instance with the supplied kind and message,
    /// and `self` as the error source.
    #[inline]
    pub fn wrap_as(self, kind: ErrorKind, message: impl Into<SharedString>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(self)),
        }
    }

    /// Returns the kind of the outermost error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    /// Returns the source.
    #[inline]
    pub fn source(&self) -> Option<&Error> {
        self.source.as_deref()
    }

    /// Returns the lowest level source of `self`.
    #[inline]
    pub fn root_source(&self) -> &Error {
        self.chain().last().unwrap_or(self)
    }

    /// Returns an iterator of `self` followed by its source errors.
    #[inline]
    pub fn chain(&self) -> Chain<'_> {
        Chain::new(self)
    }

    /// Returns `true` if any error in the chain has the kind.
    #[inline]
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.chain().any(|err| err.kind == kind)
    }

    /// Returns `true` if a scalar fetch found no rows.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.is(ErrorKind::NotFound)
    }

    /// Returns `true` if a scalar fetch found more than one row.
    #[inline]
    pub fn is_cardinality(&self) -> bool {
        self.is(ErrorKind::Cardinality)
    }

    /// Returns `true` if the destination was rejected before any row was fetched.
    #[inline]
    pub fn is_invalid_destination(&self) -> bool {
        self.is(ErrorKind::InvalidDestination)
    }

    /// Returns `true` if a row could not be decoded.
    #[inline]
    pub fn is_decode(&self) -> bool {
        self.is(ErrorKind::Decode)
    }

    /// Returns `true` if the row source failed.
    #[inline]
    pub fn is_source(&self) -> bool {
        self.is(ErrorKind::Source)
    }

    /// Returns `true` if a read-write transaction failed.
    #[inline]
    pub fn is_transaction(&self) -> bool {
        self.is(ErrorKind::Transaction)
    }
}

impl<E: error::Error + 'static> From<E> for Error {
    #[inline]
    fn from(err: E) -> Self {
        Self {
            kind: ErrorKind::Source,
            message: err.to_string().into(),
            source: err
                .source()
                .map(|err| Box::new(Self::new(ErrorKind::Source, err.to_string()))),
        }
    }
}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = &self.message;
        if let Some(source) = &self.source {
            write!(f, "{message}: {source}")
        } else {
            write!(f, "{message}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[test]
    fn it_keeps_kind_when_wrapping() {
        let err = Error::not_found().wrap("scanning one");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "scanning one: no row was found");
        assert_eq!(err.root_source().message(), "no row was found");
    }

    #[test]
    fn it_finds_kinds_through_the_chain() {
        let err = Error::not_found()
            .wrap("scanning one")
            .wrap_as(ErrorKind::Transaction, "fail to run the read-write transaction");
        assert_eq!(err.kind(), ErrorKind::Transaction);
        assert!(err.is_transaction());
        assert!(err.is_not_found());
        assert!(!err.is_cardinality());
        assert_eq!(err.chain().count(), 3);
    }

    #[test]
    fn it_converts_std_errors_into_source_errors() {
        let err = Error::from(std::io::Error::other("connection reset"));
        assert_eq!(err.kind(), ErrorKind::Source);
        assert_eq!(err.message(), "connection reset");
        assert!(err.source().is_none());
    }
}
