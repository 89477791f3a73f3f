//! Entities — the typed nodes of the family graph.
//!
//! Every entity is stored as a [`Node`]: a store-assigned integer identity
//! plus the entity's property record. Identity is allocated per
//! [`EntityKind`], grows monotonically, and is never reused.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::{Display, EnumString};

/// Store-assigned identity of a node. Unique within its [`EntityKind`].
pub type Id = i64;

/// The kind of node; fixes which table of identities an [`Id`] belongs to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
  Person,
  Place,
  Organization,
  Event,
  Occupation,
  Media,
}

/// A property record that can be stored as a node.
///
/// Optional fields are `Option`s; an absent value is kept as an explicit
/// "no value", never collapsed into an empty string.
pub trait Entity:
  Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
  /// The node kind this record is stored under.
  const KIND: EntityKind;

  /// Partial-update input accepted by [`Entity::apply`].
  type Patch: Send + 'static;

  /// Overwrite the fields supplied in `patch`, leaving the rest unchanged.
  fn apply(&mut self, patch: Self::Patch);
}

/// A stored entity: identity plus properties, serialised flat
/// (`{"id": 3, "name": "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node<E> {
  pub id:    Id,
  #[serde(flatten)]
  pub props: E,
}
