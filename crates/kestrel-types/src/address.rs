//! Account addresses.
//!
//! An address is the lowercase hex encoding of a 20-byte account identifier.
//! Module pool accounts are derived deterministically from their name via
//! `BLAKE3("kestrel/acct/" || name)`, truncated to 20 bytes.

use serde::{Deserialize, Serialize};

use crate::{Result, TypesError};

/// Length of the raw account identifier in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Domain-separation prefix for module account derivation.
const MODULE_ACCOUNT_CONTEXT: &str = "kestrel/acct/";

/// A validated account address.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse and validate an address string.
    ///
    /// # Errors
    ///
    /// - [`TypesError::InvalidAddress`] if the string is not lowercase hex
    ///   decoding to exactly [`ADDRESS_LEN`] bytes
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|_| TypesError::InvalidAddress(s.to_string()))?;
        if bytes.len() != ADDRESS_LEN {
            return Err(TypesError::InvalidAddress(s.to_string()));
        }
        if s.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(TypesError::InvalidAddress(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Derive the fixed address of a named module account.
    pub fn derive_module(name: &str) -> Self {
        let mut input = Vec::with_capacity(MODULE_ACCOUNT_CONTEXT.len() + name.len());
        input.extend_from_slice(MODULE_ACCOUNT_CONTEXT.as_bytes());
        input.extend_from_slice(name.as_bytes());
        let digest = blake3::hash(&input);
        Self(hex::encode(&digest.as_bytes()[..ADDRESS_LEN]))
    }

    /// The address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
