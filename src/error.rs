//! Error types.

use std::error::Error as StdError;

/// Error returned when a UUID could not be generated.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// The underlying random source failed to supply bytes.
    ///
    /// The generator has no fallback entropy source; the failed call produces no identifier.
    #[error("uuid: could not read from random source: {0}")]
    RandSource(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

impl GenerateError {
    /// Wraps an arbitrary random source failure.
    pub fn rand_source<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self::RandSource(err.into())
    }
}

/// Error parsing an invalid textual or binary representation of UUID.
#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The text is not 32, 34, 36, 38, 41, or 45 characters long.
    #[error("uuid: invalid length {0} in string representation")]
    InvalidLength(usize),

    /// The text carries a malformed `{...}` or `urn:uuid:` wrapper.
    #[error("uuid: incorrect brace or URN wrapping")]
    InvalidWrapping,

    /// A hyphen was expected at the position (relative to the unwrapped 36-char form).
    #[error("uuid: missing hyphen at position {0}")]
    MissingHyphen(usize),

    /// A non-hexadecimal byte was found at the position.
    #[error("uuid: invalid hex digit {byte:#04x} at position {index}")]
    InvalidDigit {
        /// Position relative to the unwrapped form.
        index: usize,
        /// The offending byte.
        byte: u8,
    },

    /// A binary representation was not exactly 16 bytes long.
    #[error("uuid: UUID must be exactly 16 bytes long, got {0} bytes")]
    InvalidByteLength(usize),

    /// A database NULL was scanned into a non-nullable UUID.
    #[error("uuid: cannot scan NULL into UUID")]
    UnexpectedNull,
}
