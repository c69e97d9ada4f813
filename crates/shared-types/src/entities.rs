//! # Registry Entities
//!
//! The two fixed-width values every registry record is made of.
//!
//! - [`Name`]: 44 opaque bytes chosen by the registrant (88 hex characters)
//! - [`ContentHash`]: 32-byte content address, typically SHA-256 (64 hex characters)
//!
//! Both travel as lowercase hex outside the process. Parsing accepts either
//! case and normalizes, so `ABCD..` and `abcd..` address the same record.

use crate::errors::InputError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Length of a registered name in bytes.
pub const NAME_LEN: usize = 44;

/// Length of a content hash in bytes.
pub const CONTENT_HASH_LEN: usize = 32;

/// A registry name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name([u8; NAME_LEN]);

impl Name {
    /// Wrap raw name bytes.
    pub const fn new(bytes: [u8; NAME_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse an 88-character hex string.
    pub fn from_hex(input: &str) -> Result<Self, InputError> {
        if input.len() != NAME_LEN * 2 || !is_hex(input) {
            return Err(InputError::InvalidName {
                length: input.len(),
            });
        }
        let mut bytes = [0u8; NAME_LEN];
        hex::decode_to_slice(input, &mut bytes).map_err(|_| InputError::InvalidName {
            length: input.len(),
        })?;
        Ok(Self(bytes))
    }

    /// Lowercase hex form, as used in store keys.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; NAME_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Name {
    type Error = InputError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; NAME_LEN] = bytes.try_into().map_err(|_| InputError::InvalidName {
            length: bytes.len() * 2,
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({}..)", &self.to_hex()[..16])
    }
}

/// A content-addressing hash stored against a name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; CONTENT_HASH_LEN]);

impl ContentHash {
    pub const fn new(bytes: [u8; CONTENT_HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(input: &str) -> Result<Self, InputError> {
        if input.len() != CONTENT_HASH_LEN * 2 || !is_hex(input) {
            return Err(InputError::InvalidContentHash {
                length: input.len(),
            });
        }
        let mut bytes = [0u8; CONTENT_HASH_LEN];
        hex::decode_to_slice(input, &mut bytes).map_err(|_| InputError::InvalidContentHash {
            length: input.len(),
        })?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; CONTENT_HASH_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for ContentHash {
    type Error = InputError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; CONTENT_HASH_LEN] =
            bytes
                .try_into()
                .map_err(|_| InputError::InvalidContentHash {
                    length: bytes.len() * 2,
                })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({}..)", &self.to_hex()[..16])
    }
}

/// Non-empty and every character in `[0-9a-fA-F]`.
pub fn is_hex(input: &str) -> bool {
    !input.is_empty() && input.bytes().all(|b| b.is_ascii_hexdigit())
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Name::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ContentHash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
