//! Database value bindings for [`Uuid`] and its nullable wrapper [`NullUuid`].
//!
//! Drivers hand column values over as [`SqlValue`]s. A UUID is stored as its canonical text and
//! can be scanned back from a 16-byte binary column, any textual column, or a NULL (only into
//! [`NullUuid`]).

use crate::{ParseError, Uuid};

/// A column value as seen by a database driver.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SqlValue<'a> {
    /// SQL NULL.
    Null,
    /// A binary column: 16 bytes are taken as the raw UUID, anything else as text.
    Bytes(&'a [u8]),
    /// A textual column.
    Text(&'a str),
    /// A value the driver has already decoded.
    Uuid(Uuid),
}

impl Uuid {
    /// Returns the value to bind for this UUID: its canonical text.
    pub fn to_sql_value(&self) -> String {
        self.to_string()
    }

    /// Decodes a column value.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnexpectedNull`] for NULL and a parse error for malformed input.
    pub fn scan(src: SqlValue<'_>) -> Result<Self, ParseError> {
        match src {
            SqlValue::Null => Err(ParseError::UnexpectedNull),
            SqlValue::Bytes(bytes) if bytes.len() == 16 => Self::try_from(bytes),
            SqlValue::Bytes(bytes) => Self::parse_ascii(bytes),
            SqlValue::Text(text) => Self::parse_str(text),
            SqlValue::Uuid(uuid) => Ok(uuid),
        }
    }
}

/// A UUID that may be NULL in the database.
///
/// With the `serde` feature, this serializes as `null` or as the nested UUID.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NullUuid(pub Option<Uuid>);

impl NullUuid {
    /// Returns true if the value is not NULL.
    pub const fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    /// Returns the value to bind: `None` for NULL, or the canonical text.
    pub fn to_sql_value(&self) -> Option<String> {
        self.0.as_ref().map(Uuid::to_sql_value)
    }

    /// Decodes a possibly NULL column value.
    pub fn scan(src: SqlValue<'_>) -> Result<Self, ParseError> {
        match src {
            SqlValue::Null => Ok(Self(None)),
            other => Uuid::scan(other).map(|e| Self(Some(e))),
        }
    }
}

impl From<Uuid> for NullUuid {
    fn from(src: Uuid) -> Self {
        Self(Some(src))
    }
}

impl From<Option<Uuid>> for NullUuid {
    fn from(src: Option<Uuid>) -> Self {
        Self(src)
    }
}

impl From<NullUuid> for Option<Uuid> {
    fn from(src: NullUuid) -> Self {
        src.0
    }
}
