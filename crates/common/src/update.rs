//! Partial-update field type
//!
//! `FieldUpdate::Unset` means "leave the stored value alone". It is distinct
//! from setting a field to an empty string, so a legitimate empty value can
//! never be mistaken for "no change".

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    Unset,
    Set(T),
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> FieldUpdate<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    pub fn as_ref(&self) -> FieldUpdate<&T> {
        match self {
            Self::Unset => FieldUpdate::Unset,
            Self::Set(value) => FieldUpdate::Set(value),
        }
    }

    /// Consume into an `Option`, `None` meaning "unchanged"
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Unset => None,
            Self::Set(value) => Some(value),
        }
    }

    /// Write the new value into `target` if one was supplied
    pub fn apply_to(self, target: &mut T) {
        if let Self::Set(value) = self {
            *target = value;
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Set(v),
            None => Self::Unset,
        }
    }
}

/// A present field deserializes to `Set`; pair with `#[serde(default)]` so an
/// absent field becomes `Unset`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldUpdate<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(FieldUpdate::Set)
    }
}
