//! Relationships — the typed, directed edges of the family graph.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::entity::{EntityKind, Id};

// ─── Edge kinds ──────────────────────────────────────────────────────────────

/// The category of a directed edge. Each kind connects a fixed pair of
/// entity kinds.
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
  EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
  /// Biological parent → child.
  ParentOf,
  /// Adoptive parent → child. Mutually exclusive with `ParentOf` for the same
  /// ordered pair.
  AdoptedBy,
  /// Spouse → spouse. Stored directed; queried in either direction.
  MarriedTo,
  ParticipatedIn,
  LivedAt,
  HasMedia,
  WorkedAs,
  EmployedBy,
}

impl EdgeKind {
  /// Entity kind at the source end.
  pub fn source(self) -> EntityKind {
    match self {
      Self::EmployedBy => EntityKind::Occupation,
      _ => EntityKind::Person,
    }
  }

  /// Entity kind at the target end.
  pub fn target(self) -> EntityKind {
    match self {
      Self::ParentOf | Self::AdoptedBy | Self::MarriedTo => EntityKind::Person,
      Self::ParticipatedIn => EntityKind::Event,
      Self::LivedAt => EntityKind::Place,
      Self::HasMedia => EntityKind::Media,
      Self::WorkedAs => EntityKind::Occupation,
      Self::EmployedBy => EntityKind::Organization,
    }
  }

  /// Whether an edge of this kind may start and end at the same node.
  pub fn allows_self_loop(self) -> bool {
    !matches!(self, Self::ParentOf | Self::AdoptedBy | Self::MarriedTo)
  }

  /// The kind that may not coexist with this one on the same ordered pair.
  pub fn exclusive_with(self) -> Option<Self> {
    match self {
      Self::ParentOf => Some(Self::AdoptedBy),
      Self::AdoptedBy => Some(Self::ParentOf),
      _ => None,
    }
  }
}

// ─── Parentage ───────────────────────────────────────────────────────────────

/// How a parent/child edge came to be; selects between `PARENT_OF` and
/// `ADOPTED_BY`.
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
pub enum ParentKind {
  Biological,
  Adopted,
}

impl ParentKind {
  pub fn edge_kind(self) -> EdgeKind {
    match self {
      Self::Biological => EdgeKind::ParentOf,
      Self::Adopted => EdgeKind::AdoptedBy,
    }
  }

  pub fn from_edge_kind(kind: EdgeKind) -> Option<Self> {
    match kind {
      EdgeKind::ParentOf => Some(Self::Biological),
      EdgeKind::AdoptedBy => Some(Self::Adopted),
      _ => None,
    }
  }
}

// ─── Properties ──────────────────────────────────────────────────────────────

/// Optional edge properties. Which fields are meaningful depends on the kind:
///
/// | Kind | Fields |
/// |------|--------|
/// | `ADOPTED_BY` | `adoption_date` |
/// | `MARRIED_TO` | `start_date`, `end_date` |
/// | `PARTICIPATED_IN` | `role` |
/// | `LIVED_AT` | `start_date`, `end_date`, `residence_type` |
///
/// Unset fields are omitted from the stored payload rather than written as
/// null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeProps {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub start_date:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_date:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub adoption_date:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub residence_type: Option<String>,
}

impl EdgeProps {
  pub fn none() -> Self { Self::default() }

  pub fn adoption(adoption_date: Option<String>) -> Self {
    Self { adoption_date, ..Self::default() }
  }

  pub fn marriage(start_date: Option<String>, end_date: Option<String>) -> Self {
    Self { start_date, end_date, ..Self::default() }
  }

  pub fn role(role: Option<String>) -> Self {
    Self { role, ..Self::default() }
  }

  pub fn residence(
    start_date: Option<String>,
    end_date: Option<String>,
    residence_type: Option<String>,
  ) -> Self {
    Self { start_date, end_date, residence_type, ..Self::default() }
  }
}

// ─── Edge ────────────────────────────────────────────────────────────────────

/// A stored edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
  pub edge_id: Id,
  pub kind:    EdgeKind,
  pub from:    Id,
  pub to:      Id,
  pub props:   EdgeProps,
}

impl Edge {
  /// The endpoint opposite `id`; `None` when `id` is not an endpoint.
  pub fn other_end(&self, id: Id) -> Option<Id> {
    if self.from == id {
      Some(self.to)
    } else if self.to == id {
      Some(self.from)
    } else {
      None
    }
  }
}
