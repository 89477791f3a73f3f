//! Entity property records and their partial-update counterparts.
//!
//! Dates throughout are opaque strings ("1890", "circa 1890", "1890-04-02");
//! they are compared lexically for ordering and never parsed.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{
  entity::{Entity, EntityKind},
  patch::{Patch, replace},
};

// ─── Person ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Person {
  pub name:        String,
  pub gender:      Option<String>,
  pub birth_date:  Option<String>,
  pub birth_place: Option<String>,
  pub death_date:  Option<String>,
  pub death_place: Option<String>,
  pub maiden_name: Option<String>,
  pub bio:         Option<String>,
}

impl Person {
  /// Convenience constructor with every optional field absent.
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonPatch {
  pub name:        Option<String>,
  pub gender:      Patch<String>,
  pub birth_date:  Patch<String>,
  pub birth_place: Patch<String>,
  pub death_date:  Patch<String>,
  pub death_place: Patch<String>,
  pub maiden_name: Patch<String>,
  pub bio:         Patch<String>,
}

impl Entity for Person {
  const KIND: EntityKind = EntityKind::Person;
  type Patch = PersonPatch;

  fn apply(&mut self, patch: PersonPatch) {
    replace(&mut self.name, patch.name);
    patch.gender.apply_to(&mut self.gender);
    patch.birth_date.apply_to(&mut self.birth_date);
    patch.birth_place.apply_to(&mut self.birth_place);
    patch.death_date.apply_to(&mut self.death_date);
    patch.death_place.apply_to(&mut self.death_place);
    patch.maiden_name.apply_to(&mut self.maiden_name);
    patch.bio.apply_to(&mut self.bio);
  }
}

// ─── Place ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Place {
  pub name:    String,
  pub street:  Option<String>,
  pub city:    Option<String>,
  pub state:   Option<String>,
  pub country: Option<String>,
  pub geo_lat: Option<f64>,
  pub geo_lng: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlacePatch {
  pub name:    Option<String>,
  pub street:  Patch<String>,
  pub city:    Patch<String>,
  pub state:   Patch<String>,
  pub country: Patch<String>,
  pub geo_lat: Patch<f64>,
  pub geo_lng: Patch<f64>,
}

impl Entity for Place {
  const KIND: EntityKind = EntityKind::Place;
  type Patch = PlacePatch;

  fn apply(&mut self, patch: PlacePatch) {
    replace(&mut self.name, patch.name);
    patch.street.apply_to(&mut self.street);
    patch.city.apply_to(&mut self.city);
    patch.state.apply_to(&mut self.state);
    patch.country.apply_to(&mut self.country);
    patch.geo_lat.apply_to(&mut self.geo_lat);
    patch.geo_lng.apply_to(&mut self.geo_lng);
  }
}

// ─── Organization ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Organization {
  pub name:     String,
  /// Free text such as "company", "military", "school".
  pub category: Option<String>,
  pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrganizationPatch {
  pub name:     Option<String>,
  pub category: Patch<String>,
  pub location: Patch<String>,
}

impl Entity for Organization {
  const KIND: EntityKind = EntityKind::Organization;
  type Patch = OrganizationPatch;

  fn apply(&mut self, patch: OrganizationPatch) {
    replace(&mut self.name, patch.name);
    patch.category.apply_to(&mut self.category);
    patch.location.apply_to(&mut self.location);
  }
}

// ─── Event ───────────────────────────────────────────────────────────────────

/// Life events that are not already captured by person fields (birth, death)
/// or relationship dates (marriage).
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
pub enum EventType {
  Graduation,
  MilitaryService,
  Award,
  Immigration,
  Retirement,
  Other,
}

impl EventType {
  pub fn all() -> Vec<Self> { Self::iter().collect() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  #[serde(rename = "type")]
  pub event_type:  EventType,
  pub event_date:  Option<String>,
  pub description: Option<String>,
  pub location:    Option<String>,
}

impl Event {
  pub fn new(event_type: EventType) -> Self {
    Self {
      event_type,
      event_date: None,
      description: None,
      location: None,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventPatch {
  #[serde(rename = "type")]
  pub event_type:  Option<EventType>,
  pub event_date:  Patch<String>,
  pub description: Patch<String>,
  pub location:    Patch<String>,
}

impl Entity for Event {
  const KIND: EntityKind = EntityKind::Event;
  type Patch = EventPatch;

  fn apply(&mut self, patch: EventPatch) {
    replace(&mut self.event_type, patch.event_type);
    patch.event_date.apply_to(&mut self.event_date);
    patch.description.apply_to(&mut self.description);
    patch.location.apply_to(&mut self.location);
  }
}

// ─── Occupation ──────────────────────────────────────────────────────────────

/// A job held by exactly one person (linked by `WORKED_AS`), optionally at
/// one organization (linked by `EMPLOYED_BY`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Occupation {
  pub title:       String,
  pub description: Option<String>,
  pub start_date:  Option<String>,
  pub end_date:    Option<String>,
  pub location:    Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OccupationPatch {
  pub title:       Option<String>,
  pub description: Patch<String>,
  pub start_date:  Patch<String>,
  pub end_date:    Patch<String>,
  pub location:    Patch<String>,
}

impl Entity for Occupation {
  const KIND: EntityKind = EntityKind::Occupation;
  type Patch = OccupationPatch;

  fn apply(&mut self, patch: OccupationPatch) {
    replace(&mut self.title, patch.title);
    patch.description.apply_to(&mut self.description);
    patch.start_date.apply_to(&mut self.start_date);
    patch.end_date.apply_to(&mut self.end_date);
    patch.location.apply_to(&mut self.location);
  }
}

// ─── Media ───────────────────────────────────────────────────────────────────

/// Coarse media category derived from the uploaded MIME type.
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
pub enum MediaCategory {
  Image,
  Video,
  Document,
  Other,
}

impl MediaCategory {
  /// Classify a MIME type such as `image/jpeg`.
  pub fn from_mime(content_type: &str) -> Self {
    let mime = content_type.trim().to_ascii_lowercase();
    if mime.starts_with("image/") {
      Self::Image
    } else if mime.starts_with("video/") {
      Self::Video
    } else if mime == "application/pdf" {
      Self::Document
    } else {
      Self::Other
    }
  }
}

/// Metadata for a stored media file. The binary lives outside the graph at
/// `file_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
  pub filename:    String,
  pub file_path:   String,
  #[serde(rename = "file_type")]
  pub category:    MediaCategory,
  pub caption:     Option<String>,
  /// `YYYY-MM-DD`, set when the record is created.
  pub upload_date: String,
}

/// Input to [`crate::FamilyTree::create_media`]; the category and upload
/// date are derived, not supplied.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMedia {
  pub filename:     String,
  pub file_path:    String,
  pub content_type: String,
  pub caption:      Option<String>,
}

impl NewMedia {
  pub fn into_media(self, upload_date: String) -> Media {
    Media {
      category: MediaCategory::from_mime(&self.content_type),
      filename: self.filename,
      file_path: self.file_path,
      caption: self.caption,
      upload_date,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaPatch {
  pub filename: Option<String>,
  pub caption:  Patch<String>,
}

impl Entity for Media {
  const KIND: EntityKind = EntityKind::Media;
  type Patch = MediaPatch;

  fn apply(&mut self, patch: MediaPatch) {
    replace(&mut self.filename, patch.filename);
    patch.caption.apply_to(&mut self.caption);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mime_classification() {
    assert_eq!(MediaCategory::from_mime("image/png"), MediaCategory::Image);
    assert_eq!(MediaCategory::from_mime("Video/MP4"), MediaCategory::Video);
    assert_eq!(
      MediaCategory::from_mime("application/pdf"),
      MediaCategory::Document
    );
    assert_eq!(MediaCategory::from_mime("text/plain"), MediaCategory::Other);
  }

  #[test]
  fn event_type_wire_names() {
    let parsed: EventType = "MILITARY_SERVICE".parse().unwrap();
    assert_eq!(parsed, EventType::MilitaryService);
    assert_eq!(
      serde_json::to_value(EventType::Immigration).unwrap(),
      serde_json::json!("IMMIGRATION")
    );
    assert!("BIRTH".parse::<EventType>().is_err());
    assert_eq!(EventType::all().len(), 6);
  }

  #[test]
  fn absent_fields_serialise_as_null() {
    let json = serde_json::to_value(Person::named("Ada")).unwrap();
    assert_eq!(json["name"], "Ada");
    assert!(json["bio"].is_null());
    assert!(json.as_object().unwrap().contains_key("bio"));
  }

  #[test]
  fn person_patch_is_partial() {
    let mut p = Person {
      birth_date: Some("1890".into()),
      bio: Some("farmer".into()),
      ..Person::named("Ada")
    };
    let patch: PersonPatch =
      serde_json::from_str(r#"{"birth_date": "circa 1890", "bio": null}"#)
        .unwrap();
    p.apply(patch);
    assert_eq!(p.name, "Ada");
    assert_eq!(p.birth_date.as_deref(), Some("circa 1890"));
    assert_eq!(p.bio, None);
  }
}
