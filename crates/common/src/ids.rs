//! Identifier value objects for CurlARC
//!
//! Users, teams and records are identified by opaque strings. Each namespace
//! gets its own newtype so a `TeamId` can never be passed where a `UserId`
//! is expected. Two identifiers are equal iff their underlying strings are.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identifier of a user (stable uid issued by the identity provider)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Identifier of a team
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

/// Identifier of a match record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

macro_rules! impl_string_id {
    ($t:ident, $label:literal) => {
        impl $t {
            /// Wrap a raw identifier without validation
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a fresh random identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Parse an identifier supplied from outside the core, rejecting blanks
            pub fn parse(value: &str) -> Result<Self> {
                if value.trim().is_empty() {
                    return Err(Error::Validation(format!(
                        "{} must not be empty",
                        $label
                    )));
                }
                Ok(Self(value.to_string()))
            }

            /// Get the raw identifier string
            pub fn value(&self) -> &str {
                &self.0
            }

            /// Value comparison
            pub fn equals(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_id!(UserId, "user id");
impl_string_id!(TeamId, "team id");
impl_string_id!(RecordId, "record id");
