use std::{fmt, str};

use fstr::FStr;

use crate::ParseError;

/// Represents a Universally Unique IDentifier.
///
/// The derived ordering compares the 16 bytes from index 0, which is equivalent to comparing
/// the identifiers as unsigned big-endian 128-bit integers.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Uuid([u8; 16]);

/// Layout variant of a UUID, as indicated by the most significant bits of byte 8.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Variant {
    /// `0xxx`: reserved for NCS backward compatibility (includes the Nil UUID).
    Ncs,
    /// `10xx`: the variant specified by RFC 9562.
    Rfc9562,
    /// `110x`: reserved for Microsoft backward compatibility.
    Microsoft,
    /// `111x`: reserved for future definition (includes the Max UUID).
    Future,
}

const DIGITS: &[u8; 16] = b"0123456789abcdef";
const DIGITS_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Offsets of each byte's first hex digit within the 8-4-4-4-12 form.
const CANONICAL_OFFSETS: [usize; 16] = [0, 2, 4, 6, 9, 11, 14, 16, 19, 21, 24, 26, 28, 30, 32, 34];
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];
const URN_PREFIX: &[u8; 9] = b"urn:uuid:";

impl Uuid {
    /// Nil UUID (00000000-0000-0000-0000-000000000000)
    pub const NIL: Self = Self([0x00; 16]);

    /// Max UUID (ffffffff-ffff-ffff-ffff-ffffffffffff)
    pub const MAX: Self = Self([0xff; 16]);

    /// Creates a UUID from a 16-byte big-endian array.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Consumes the UUID and returns the underlying byte array.
    pub const fn into_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Returns a newly allocated copy of the bytes. Modifying it does not affect the UUID.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Creates a UUID byte array from UUIDv7 field values.
    ///
    /// `counter` fills the 12-bit `rand_a` field and `rand_b` the 62 bits after the variant.
    ///
    /// # Panics
    ///
    /// Panics if `unix_ts_ms` exceeds 48 bits, `counter` 12 bits, or `rand_b` 62 bits.
    pub const fn from_fields_v7(unix_ts_ms: u64, counter: u16, rand_b: u64) -> Self {
        if unix_ts_ms >= 1 << 48 || counter >= 1 << 12 || rand_b >= 1 << 62 {
            panic!("invalid field value");
        }

        Self([
            (unix_ts_ms >> 40) as u8,
            (unix_ts_ms >> 32) as u8,
            (unix_ts_ms >> 24) as u8,
            (unix_ts_ms >> 16) as u8,
            (unix_ts_ms >> 8) as u8,
            unix_ts_ms as u8,
            0x70 | (counter >> 8) as u8,
            counter as u8,
            0x80 | (rand_b >> 56) as u8,
            (rand_b >> 48) as u8,
            (rand_b >> 40) as u8,
            (rand_b >> 32) as u8,
            (rand_b >> 24) as u8,
            (rand_b >> 16) as u8,
            (rand_b >> 8) as u8,
            rand_b as u8,
        ])
    }

    /// Returns the version field (the high nibble of byte 6).
    ///
    /// This is a plain bit read: no check is made that the UUID is otherwise well formed.
    pub const fn version(&self) -> u8 {
        self.0[6] >> 4
    }

    /// Returns the layout variant encoded in the high bits of byte 8.
    pub const fn variant(&self) -> Variant {
        let b = self.0[8];
        if b >> 7 == 0b0 {
            Variant::Ncs
        } else if b >> 6 == 0b10 {
            Variant::Rfc9562
        } else if b >> 5 == 0b110 {
            Variant::Microsoft
        } else {
            Variant::Future
        }
    }

    /// Overwrites the version field, keeping the low nibble of byte 6.
    pub fn set_version(&mut self, version: u8) {
        self.0[6] = (self.0[6] & 0x0f) | (version << 4);
    }

    /// Overwrites the variant bits of byte 8, keeping the bits below them.
    pub fn set_variant(&mut self, variant: Variant) {
        let b = &mut self.0[8];
        *b = match variant {
            Variant::Ncs => *b & 0x7f,
            Variant::Rfc9562 => (*b & 0x3f) | 0x80,
            Variant::Microsoft => (*b & 0x1f) | 0xc0,
            Variant::Future => (*b & 0x1f) | 0xe0,
        };
    }

    /// Returns the 48-bit Unix timestamp in milliseconds if this is a UUIDv7.
    pub fn unix_ts_ms(&self) -> Option<u64> {
        if self.version() != 7 {
            return None;
        }
        let mut ts = [0u8; 8];
        ts[2..].copy_from_slice(&self.0[..6]);
        Some(u64::from_be_bytes(ts))
    }

    /// Returns true if this is the Nil UUID.
    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }

    /// Returns the 8-4-4-4-12 hexadecimal string representation stored in a stack-allocated
    /// string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuid_pool::Uuid;
    ///
    /// let x = "01809424-3e59-7c05-9219-566f82fff672".parse::<Uuid>()?;
    /// let y = x.encode();
    /// assert_eq!(y.as_str(), "01809424-3e59-7c05-9219-566f82fff672");
    /// assert_eq!(format!("{}", y), "01809424-3e59-7c05-9219-566f82fff672");
    /// # Ok::<(), uuid_pool::ParseError>(())
    /// ```
    pub fn encode(&self) -> FStr<36> {
        let mut buffer = [b'-'; 36];
        write_canonical(&mut buffer, &self.0);
        into_fstr(buffer)
    }

    /// Returns the 32-digit hexadecimal representation without hyphens.
    pub fn encode_simple(&self) -> FStr<32> {
        let mut buffer = [0u8; 32];
        write_simple(&mut buffer, &self.0, DIGITS);
        into_fstr(buffer)
    }

    /// Returns the `{8-4-4-4-12}` braced representation.
    pub fn encode_braced(&self) -> FStr<38> {
        let mut buffer = [b'-'; 38];
        buffer[0] = b'{';
        buffer[37] = b'}';
        write_canonical(&mut buffer[1..37], &self.0);
        into_fstr(buffer)
    }

    /// Returns the `urn:uuid:` prefixed representation.
    pub fn encode_urn(&self) -> FStr<45> {
        let mut buffer = [b'-'; 45];
        buffer[..9].copy_from_slice(URN_PREFIX);
        write_canonical(&mut buffer[9..], &self.0);
        into_fstr(buffer)
    }

    /// Parses any of the supported text representations.
    ///
    /// ```text
    /// 6ba7b810-9dad-11d1-80b4-00c04fd430c8
    /// {6ba7b810-9dad-11d1-80b4-00c04fd430c8}
    /// urn:uuid:6ba7b810-9dad-11d1-80b4-00c04fd430c8
    /// 6ba7b8109dad11d180b400c04fd430c8
    /// {6ba7b8109dad11d180b400c04fd430c8}
    /// urn:uuid:6ba7b8109dad11d180b400c04fd430c8
    /// ```
    ///
    /// Hex digits are accepted in either case.
    pub fn parse_str(src: &str) -> Result<Self, ParseError> {
        Self::parse_ascii(src.as_bytes())
    }

    /// Byte-slice counterpart of [`Uuid::parse_str`].
    pub fn parse_ascii(src: &[u8]) -> Result<Self, ParseError> {
        let body = match src.len() {
            32 | 36 => src,
            len @ (34 | 38) => {
                if src[0] != b'{' || src[len - 1] != b'}' {
                    return Err(ParseError::InvalidWrapping);
                }
                &src[1..len - 1]
            }
            41 | 45 => {
                if &src[..9] != URN_PREFIX {
                    return Err(ParseError::InvalidWrapping);
                }
                &src[9..]
            }
            len => return Err(ParseError::InvalidLength(len)),
        };

        let mut dst = [0u8; 16];
        if body.len() == 36 {
            if let Some(&pos) = HYPHEN_POSITIONS.iter().find(|&&pos| body[pos] != b'-') {
                return Err(ParseError::MissingHyphen(pos));
            }
            for (e, &offset) in dst.iter_mut().zip(CANONICAL_OFFSETS.iter()) {
                *e = decode_hex_pair(body, offset)?;
            }
        } else {
            for (i, e) in dst.iter_mut().enumerate() {
                *e = decode_hex_pair(body, i * 2)?;
            }
        }
        Ok(Self(dst))
    }
}

fn write_canonical(dst: &mut [u8], bytes: &[u8; 16]) {
    for (&e, &offset) in bytes.iter().zip(CANONICAL_OFFSETS.iter()) {
        dst[offset] = DIGITS[(e >> 4) as usize];
        dst[offset + 1] = DIGITS[(e & 15) as usize];
    }
}

fn write_simple(dst: &mut [u8; 32], bytes: &[u8; 16], digits: &[u8; 16]) {
    for (i, &e) in bytes.iter().enumerate() {
        dst[i * 2] = digits[(e >> 4) as usize];
        dst[i * 2 + 1] = digits[(e & 15) as usize];
    }
}

fn into_fstr<const N: usize>(buffer: [u8; N]) -> FStr<N> {
    debug_assert!(buffer.is_ascii());
    // SAFETY: every writer above only emits ASCII hex digits, hyphens, braces, and the URN prefix
    unsafe { FStr::from_inner_unchecked(buffer) }
}

fn decode_hex_pair(src: &[u8], index: usize) -> Result<u8, ParseError> {
    let digit = |index: usize| {
        let byte = src[index];
        (byte as char)
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or(ParseError::InvalidDigit { index, byte })
    };
    Ok((digit(index)? << 4) | digit(index + 1)?)
}

impl fmt::Display for Uuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::LowerHex for Uuid {
    /// Returns the 32 lowercase hex digits without hyphens.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode_simple())
    }
}

impl fmt::UpperHex for Uuid {
    /// Returns the 32 uppercase hex digits without hyphens.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = [0u8; 32];
        write_simple(&mut buffer, &self.0, DIGITS_UPPER);
        f.write_str(&into_fstr(buffer))
    }
}

impl str::FromStr for Uuid {
    type Err = ParseError;

    /// Creates an object from any of the supported text representations.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Self::parse_str(src)
    }
}

impl From<Uuid> for [u8; 16] {
    fn from(src: Uuid) -> Self {
        src.0
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}

impl TryFrom<&[u8]> for Uuid {
    type Error = ParseError;

    /// Creates an object from a binary representation that must be exactly 16 bytes long.
    fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
        <[u8; 16]>::try_from(src)
            .map(Self)
            .map_err(|_| ParseError::InvalidByteLength(src.len()))
    }
}

impl TryFrom<&str> for Uuid {
    type Error = ParseError;

    fn try_from(src: &str) -> Result<Self, Self::Error> {
        Self::parse_str(src)
    }
}

impl TryFrom<String> for Uuid {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        Self::parse_str(&src)
    }
}

impl From<Uuid> for String {
    fn from(src: Uuid) -> Self {
        src.to_string()
    }
}

impl AsRef<[u8]> for Uuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Uuid> for u128 {
    fn from(src: Uuid) -> Self {
        Self::from_be_bytes(src.0)
    }
}

impl From<u128> for Uuid {
    fn from(src: u128) -> Self {
        Self(src.to_be_bytes())
    }
}

#[cfg(feature = "uuid")]
#[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
mod uuid_support {
    use super::Uuid;

    impl From<Uuid> for uuid::Uuid {
        fn from(src: Uuid) -> Self {
            uuid::Uuid::from_bytes(src.0)
        }
    }

    impl From<uuid::Uuid> for Uuid {
        fn from(src: uuid::Uuid) -> Self {
            Self(src.into_bytes())
        }
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, Uuid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Uuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Uuid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(UuidVisitor)
            } else {
                deserializer.deserialize_bytes(UuidVisitor)
            }
        }
    }

    struct UuidVisitor;

    impl<'de> de::Visitor<'de> for UuidVisitor {
        type Value = Uuid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a UUID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Uuid::parse_str(value).map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            Uuid::try_from(value).map_err(de::Error::custom)
        }
    }

}
