use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for address parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Addresses can not be blank.
    #[error("Address must not be empty.")]
    Empty,
}

/// The identity of a participant: a buyer, a seller, the owner or the
/// exchange itself. Two addresses are the same account if their text is
/// identical once surrounding whitespace is removed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Create an address from any non blank text.
    ///
    /// ```
    /// use token_vendor::model::{Address, AddressError};
    ///
    /// let alice = Address::parse(" alice ").unwrap();
    /// assert_eq!(alice.as_str(), "alice");
    ///
    /// let error = Address::parse("   ").unwrap_err();
    /// assert_eq!(error, AddressError::Empty);
    /// ```
    pub fn parse(value: impl AsRef<str>) -> Result<Self, AddressError> {
        let value = value.as_ref().trim();

        if value.is_empty() {
            return Err(AddressError::Empty);
        }

        Ok(Self(value.to_string()))
    }

    /// Build an address from text known to be non blank.
    pub(crate) fn unchecked(value: &str) -> Self {
        Self(value.to_string())
    }

    /// The textual form of the address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Address {
    type Error = AddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
