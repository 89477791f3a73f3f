//! Three-state field updates.
//!
//! A partial update must tell "leave this field alone" apart from "clear this
//! field". When deserialised from JSON, a missing key is [`Patch::Keep`], an
//! explicit `null` is [`Patch::Clear`], and any other value is
//! [`Patch::Set`]. Struct fields of this type need `#[serde(default)]` for
//! the missing-key case.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
  /// Leave the stored value unchanged.
  Keep,
  /// Replace the stored value with "no value".
  Clear,
  /// Replace the stored value.
  Set(T),
}

impl<T> Default for Patch<T> {
  fn default() -> Self { Self::Keep }
}

impl<T> Patch<T> {
  pub fn is_keep(&self) -> bool { matches!(self, Self::Keep) }

  /// Write this update into `slot`.
  pub fn apply_to(self, slot: &mut Option<T>) {
    match self {
      Self::Keep => {}
      Self::Clear => *slot = None,
      Self::Set(value) => *slot = Some(value),
    }
  }
}

impl<T> From<Option<T>> for Patch<T> {
  /// `None` means "not supplied"; use [`Patch::Clear`] to erase a value.
  fn from(value: Option<T>) -> Self {
    match value {
      Some(v) => Self::Set(v),
      None => Self::Keep,
    }
  }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Option::<T>::deserialize(deserializer)? {
      Some(v) => Self::Set(v),
      None => Self::Clear,
    })
  }
}

/// Overwrite a required field when a replacement was supplied.
pub(crate) fn replace<T>(slot: &mut T, value: Option<T>) {
  if let Some(v) = value {
    *slot = v;
  }
}
