//! Read models returned by queries — never stored, always derived from nodes
//! and edges at query time. All of them serialise to plain JSON records.

use serde::{Deserialize, Serialize};

use crate::{
  edge::{EdgeKind, ParentKind},
  entity::{Id, Node},
  model::{Event, Occupation, Organization, Person, Place},
};

// ─── People ──────────────────────────────────────────────────────────────────

/// The subset of a person carried in relationship listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
  pub id:         Id,
  pub name:       String,
  pub gender:     Option<String>,
  pub birth_date: Option<String>,
  pub death_date: Option<String>,
  pub bio:        Option<String>,
}

impl From<Node<Person>> for PersonSummary {
  fn from(node: Node<Person>) -> Self {
    let Node { id, props } = node;
    Self {
      id,
      name: props.name,
      gender: props.gender,
      birth_date: props.birth_date,
      death_date: props.death_date,
      bio: props.bio,
    }
  }
}

/// A parent or child of the queried person, tagged with how the link was
/// made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentageLink {
  #[serde(flatten)]
  pub person:            PersonSummary,
  pub relationship_type: ParentKind,
  /// Only ever set for [`ParentKind::Adopted`].
  pub adoption_date:     Option<String>,
}

/// A spouse of the queried person. A couple married more than once appears
/// once per marriage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpouseLink {
  #[serde(flatten)]
  pub person:     PersonSummary,
  pub start_date: Option<String>,
  pub end_date:   Option<String>,
}

/// Everyone directly related to a person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationships {
  pub parents:  Vec<ParentageLink>,
  pub children: Vec<ParentageLink>,
  pub spouses:  Vec<SpouseLink>,
  /// Derived: people sharing at least one parent.
  pub siblings: Vec<PersonSummary>,
}

/// A member of an ancestor or descendant closure. Generation 1 is a parent
/// (or child), 2 a grandparent (or grandchild), and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kin {
  pub generation: usize,
  #[serde(flatten)]
  pub person:     PersonSummary,
}

// ─── Whole-graph export ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
  pub id:         Id,
  pub name:       String,
  pub gender:     Option<String>,
  pub birth_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
  pub source: Id,
  pub target: Id,
  #[serde(rename = "type")]
  pub kind:   EdgeKind,
}

/// A flat dump of people and their family edges, for visualisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
  pub nodes: Vec<GraphNode>,
  pub edges: Vec<GraphEdge>,
}

// ─── Person-centred listings ─────────────────────────────────────────────────

/// An event the person took part in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonEvent {
  #[serde(flatten)]
  pub event: Node<Event>,
  pub role:  Option<String>,
}

/// A place the person lived at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Residence {
  pub place:          Node<Place>,
  pub start_date:     Option<String>,
  pub end_date:       Option<String>,
  pub residence_type: Option<String>,
}

/// An occupation with its employer, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupationRecord {
  #[serde(flatten)]
  pub occupation:   Node<Occupation>,
  pub organization: Option<Node<Organization>>,
}

// ─── Entity detail views ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
  pub id:   Id,
  pub name: String,
  pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetail {
  #[serde(flatten)]
  pub event:        Node<Event>,
  pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
  pub id:             Id,
  pub name:           String,
  pub start_date:     Option<String>,
  pub end_date:       Option<String>,
  pub residence_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetail {
  #[serde(flatten)]
  pub place:     Node<Place>,
  pub residents: Vec<Resident>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
  pub person_id:     Id,
  pub name:          String,
  pub occupation_id: Id,
  pub title:         String,
  pub start_date:    Option<String>,
  pub end_date:      Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationDetail {
  #[serde(flatten)]
  pub organization: Node<Organization>,
  pub employees:    Vec<Employee>,
}

/// Sort newest-first by an opaque date string; undated entries go last.
pub(crate) fn newest_first<T>(
  items: &mut [T],
  date: impl Fn(&T) -> Option<&str>,
) {
  items.sort_by(|a, b| date(b).cmp(&date(a)));
}
