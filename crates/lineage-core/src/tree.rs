//! [`FamilyTree`] — the command/query surface offered to callers.
//!
//! Each method acquires its own exclusive session from the shared store,
//! runs to completion, and releases the session on return. Commands made of
//! several store writes (creating an event and linking its participants,
//! creating an occupation and its links) are not transactional: a failure
//! part-way leaves the earlier writes in place and is reported to the
//! caller.

use tracing::{debug, info};

use crate::{
  Result,
  edge::{EdgeKind, ParentKind},
  entity::{Entity, EntityKind, Id, Node},
  model::{
    Event, EventType, Media, MediaCategory, NewMedia, Occupation, Organization,
    Person, PersonPatch, Place,
  },
  patch::Patch,
  rules,
  store::{Condition, GraphSession, GraphStore, NodeQuery},
  traverse::{self, DEFAULT_MAX_DEPTH},
  view::{
    EventDetail, GraphExport, Kin, OccupationRecord, OrganizationDetail,
    ParentageLink, PersonEvent, PersonSummary, PlaceDetail, Relationships,
    Residence, SpouseLink, newest_first,
  },
};

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Filters for [`FamilyTree::list_people`]. All supplied filters must match.
#[derive(Debug, Clone, Default)]
pub struct PersonFilter {
  /// Substring of the name.
  pub name:       Option<String>,
  /// Substring of the (free-text) birth date, e.g. `"189"`.
  pub birth_year: Option<String>,
  /// Substring of the birth or death place.
  pub location:   Option<String>,
  /// `true`: no death date recorded; `false`: a death date is recorded.
  pub alive:      Option<bool>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}

impl PersonFilter {
  fn into_query(self, default_limit: usize) -> NodeQuery {
    let mut query = NodeQuery {
      limit: Some(self.limit.unwrap_or(default_limit)),
      offset: self.offset,
      ..NodeQuery::default()
    };
    if let Some(needle) = self.name {
      query = query.with(Condition::Contains { fields: vec!["name"], needle });
    }
    if let Some(needle) = self.birth_year {
      query = query.with(Condition::Contains { fields: vec!["birth_date"], needle });
    }
    if let Some(needle) = self.location {
      query = query.with(Condition::Contains {
        fields: vec!["birth_place", "death_place"],
        needle,
      });
    }
    match self.alive {
      Some(true) => query.with(Condition::IsNull("death_date")),
      Some(false) => query.with(Condition::IsNotNull("death_date")),
      None => query,
    }
  }
}

// ─── Facade ──────────────────────────────────────────────────────────────────

/// The family graph, backed by any [`GraphStore`].
///
/// Cloning is as cheap as cloning the store.
#[derive(Debug, Clone)]
pub struct FamilyTree<S> {
  store:      S,
  max_depth:  usize,
  list_limit: usize,
}

impl<S: GraphStore> FamilyTree<S> {
  pub fn new(store: S) -> Self {
    Self { store, max_depth: DEFAULT_MAX_DEPTH, list_limit: 50 }
  }

  /// Cap ancestor/descendant walks at `max_depth` generations.
  pub fn with_max_depth(mut self, max_depth: usize) -> Self {
    self.max_depth = max_depth;
    self
  }

  /// Default page size for [`FamilyTree::list_people`].
  pub fn with_list_limit(mut self, list_limit: usize) -> Self {
    self.list_limit = list_limit;
    self
  }

  pub fn store(&self) -> &S { &self.store }

  async fn session(&self) -> Result<S::Session> { self.store.session().await }

  // ── Generic entity commands ───────────────────────────────────────────

  /// Create any entity. Use the dedicated constructors for occupations,
  /// events with participants, and media.
  pub async fn create<E: Entity>(&self, props: E) -> Result<Node<E>> {
    let node = self.session().await?.create(props).await?;
    info!(kind = %E::KIND, id = node.id, "created");
    Ok(node)
  }

  /// Fetch an entity; [`crate::Error::NotFound`] if absent.
  pub async fn get<E: Entity>(&self, id: Id) -> Result<Node<E>> {
    self.session().await?.require::<E>(id).await
  }

  /// Partially update an entity; only supplied fields change.
  pub async fn update<E: Entity>(&self, id: Id, patch: E::Patch) -> Result<Node<E>> {
    let node = self.session().await?.update::<E>(id, patch).await?;
    info!(kind = %E::KIND, id, "updated");
    Ok(node)
  }

  /// Delete an entity together with every edge touching it.
  pub async fn delete<E: Entity>(&self, id: Id) -> Result<()> {
    rules::delete_entity::<E, _>(&mut self.session().await?, id).await?;
    info!(kind = %E::KIND, id, "deleted");
    Ok(())
  }

  /// List entities of one kind.
  pub async fn list<E: Entity>(&self, query: NodeQuery) -> Result<Vec<Node<E>>> {
    self.session().await?.list::<E>(&query).await
  }

  // ── People ────────────────────────────────────────────────────────────

  pub async fn create_person(&self, person: Person) -> Result<Node<Person>> {
    self.create(person).await
  }

  pub async fn get_person(&self, id: Id) -> Result<Node<Person>> { self.get(id).await }

  pub async fn update_person(&self, id: Id, patch: PersonPatch) -> Result<Node<Person>> {
    self.update::<Person>(id, patch).await
  }

  pub async fn delete_person(&self, id: Id) -> Result<()> {
    self.delete::<Person>(id).await
  }

  pub async fn list_people(&self, filter: PersonFilter) -> Result<Vec<Node<Person>>> {
    self.list(filter.into_query(self.list_limit)).await
  }

  // ── Parentage ─────────────────────────────────────────────────────────

  pub async fn add_parent_child(
    &self,
    parent: Id,
    child: Id,
    kind: ParentKind,
    adoption_date: Option<String>,
  ) -> Result<()> {
    let mut s = self.session().await?;
    rules::add_parent_child(&mut s, parent, child, kind, adoption_date).await
  }

  pub async fn change_parent_child_kind(
    &self,
    parent: Id,
    child: Id,
    kind: ParentKind,
    adoption_date: Option<String>,
  ) -> Result<()> {
    let mut s = self.session().await?;
    rules::change_parent_child_kind(&mut s, parent, child, kind, adoption_date).await
  }

  pub async fn remove_parent_child(&self, parent: Id, child: Id) -> Result<()> {
    rules::remove_parent_child(&mut self.session().await?, parent, child).await
  }

  // ── Marriage ──────────────────────────────────────────────────────────

  pub async fn add_spouse(
    &self,
    a: Id,
    b: Id,
    start_date: Option<String>,
    end_date: Option<String>,
  ) -> Result<()> {
    let mut s = self.session().await?;
    rules::add_spouse(&mut s, a, b, start_date, end_date).await?;
    Ok(())
  }

  pub async fn update_spouse(
    &self,
    a: Id,
    b: Id,
    start_date: Patch<String>,
    end_date: Patch<String>,
  ) -> Result<()> {
    let mut s = self.session().await?;
    rules::update_spouse(&mut s, a, b, start_date, end_date).await?;
    Ok(())
  }

  pub async fn remove_spouse(&self, a: Id, b: Id) -> Result<()> {
    rules::remove_spouse(&mut self.session().await?, a, b).await
  }

  // ── Relationship queries ──────────────────────────────────────────────

  pub async fn person_relationships(&self, person: Id) -> Result<Relationships> {
    traverse::relationships_of(&mut self.session().await?, person).await
  }

  pub async fn parents_of(&self, person: Id) -> Result<Vec<ParentageLink>> {
    traverse::parents_of(&mut self.session().await?, person).await
  }

  pub async fn children_of(&self, person: Id) -> Result<Vec<ParentageLink>> {
    traverse::children_of(&mut self.session().await?, person).await
  }

  pub async fn spouses_of(&self, person: Id) -> Result<Vec<SpouseLink>> {
    traverse::spouses_of(&mut self.session().await?, person).await
  }

  pub async fn siblings_of(&self, person: Id) -> Result<Vec<PersonSummary>> {
    traverse::siblings_of(&mut self.session().await?, person).await
  }

  /// Ancestors up to `max_depth` generations, never beyond the configured
  /// cap.
  pub async fn ancestors_of(&self, person: Id, max_depth: Option<usize>) -> Result<Vec<Kin>> {
    let depth = self.clamp_depth(max_depth);
    traverse::ancestors_of(&mut self.session().await?, person, Some(depth)).await
  }

  pub async fn descendants_of(
    &self,
    person: Id,
    max_depth: Option<usize>,
  ) -> Result<Vec<Kin>> {
    let depth = self.clamp_depth(max_depth);
    traverse::descendants_of(&mut self.session().await?, person, Some(depth)).await
  }

  fn clamp_depth(&self, requested: Option<usize>) -> usize {
    requested.map_or(self.max_depth, |d| d.min(self.max_depth))
  }

  pub async fn whole_graph(&self) -> Result<GraphExport> {
    traverse::whole_graph(&mut self.session().await?).await
  }

  pub async fn person_events(&self, person: Id) -> Result<Vec<PersonEvent>> {
    traverse::events_of(&mut self.session().await?, person).await
  }

  pub async fn person_residences(&self, person: Id) -> Result<Vec<Residence>> {
    traverse::residences_of(&mut self.session().await?, person).await
  }

  pub async fn person_occupations(&self, person: Id) -> Result<Vec<OccupationRecord>> {
    traverse::occupations_of(&mut self.session().await?, person).await
  }

  pub async fn person_media(&self, person: Id) -> Result<Vec<Node<Media>>> {
    traverse::media_of(&mut self.session().await?, person).await
  }

  // ── Places ────────────────────────────────────────────────────────────

  /// Places whose name, city or state contains `search`, by name.
  pub async fn list_places(&self, search: Option<String>) -> Result<Vec<Node<Place>>> {
    let query = match search {
      Some(needle) => NodeQuery::all().with(Condition::Contains {
        fields: vec!["name", "city", "state"],
        needle,
      }),
      None => NodeQuery::all(),
    };
    self.list(query.ordered_by("name")).await
  }

  pub async fn place_detail(&self, place: Id) -> Result<PlaceDetail> {
    let mut s = self.session().await?;
    let place = s.require::<Place>(place).await?;
    let residents = traverse::residents_of(&mut s, place.id).await?;
    Ok(PlaceDetail { place, residents })
  }

  pub async fn add_residence(
    &self,
    place: Id,
    person: Id,
    start_date: Option<String>,
    end_date: Option<String>,
    residence_type: Option<String>,
  ) -> Result<()> {
    let mut s = self.session().await?;
    rules::add_residence(&mut s, place, person, start_date, end_date, residence_type)
      .await?;
    Ok(())
  }

  pub async fn remove_residence(&self, place: Id, person: Id) -> Result<()> {
    self.session().await?.unlink(EdgeKind::LivedAt, person, place).await?;
    Ok(())
  }

  // ── Organizations ─────────────────────────────────────────────────────

  pub async fn list_organizations(
    &self,
    search: Option<String>,
  ) -> Result<Vec<Node<Organization>>> {
    let query = match search {
      Some(needle) => {
        NodeQuery::all().with(Condition::Contains { fields: vec!["name"], needle })
      }
      None => NodeQuery::all(),
    };
    self.list(query.ordered_by("name")).await
  }

  pub async fn organization_detail(&self, organization: Id) -> Result<OrganizationDetail> {
    let mut s = self.session().await?;
    let organization = s.require::<Organization>(organization).await?;
    let employees = traverse::employees_of(&mut s, organization.id).await?;
    Ok(OrganizationDetail { organization, employees })
  }

  // ── Events ────────────────────────────────────────────────────────────

  pub fn event_types(&self) -> Vec<EventType> { EventType::all() }

  /// Create an event, then link each participant in order. A failing link
  /// stops the command; the event and earlier links remain.
  pub async fn create_event(&self, event: Event, participants: &[Id]) -> Result<Node<Event>> {
    let mut s = self.session().await?;
    let node = s.create(event).await?;
    info!(id = node.id, participants = participants.len(), "event created");
    for &person in participants {
      rules::add_participant(&mut s, node.id, person, None).await?;
    }
    Ok(node)
  }

  /// Events, optionally of one type, latest first.
  pub async fn list_events(&self, event_type: Option<EventType>) -> Result<Vec<Node<Event>>> {
    let query = match event_type {
      Some(t) => NodeQuery::all().with(Condition::Equals {
        field: "type",
        value: t.to_string(),
      }),
      None => NodeQuery::all(),
    };
    let mut events = self.list::<Event>(query).await?;
    newest_first(&mut events, |e| e.props.event_date.as_deref());
    Ok(events)
  }

  pub async fn event_detail(&self, event: Id) -> Result<EventDetail> {
    let mut s = self.session().await?;
    let event = s.require::<Event>(event).await?;
    let participants = traverse::participants_of(&mut s, event.id).await?;
    Ok(EventDetail { event, participants })
  }

  pub async fn add_participant(&self, event: Id, person: Id, role: Option<String>) -> Result<()> {
    rules::add_participant(&mut self.session().await?, event, person, role).await
  }

  pub async fn remove_participant(&self, event: Id, person: Id) -> Result<()> {
    self.session().await?.unlink(EdgeKind::ParticipatedIn, person, event).await?;
    Ok(())
  }

  // ── Occupations ───────────────────────────────────────────────────────

  /// Create an occupation held by `person`, optionally at `organization`.
  ///
  /// The person must exist before anything is written. A missing
  /// organization is reported after the occupation and its `WORKED_AS` link
  /// are already stored.
  pub async fn create_occupation(
    &self,
    person: Id,
    occupation: Occupation,
    organization: Option<Id>,
  ) -> Result<Node<Occupation>> {
    let mut s = self.session().await?;
    rules::ensure_exists(&mut s, EntityKind::Person, person).await?;
    let node = s.create(occupation).await?;
    rules::link_once(&mut s, EdgeKind::WorkedAs, person, node.id).await?;
    if let Some(org) = organization {
      rules::link_employer(&mut s, node.id, org).await?;
    }
    info!(id = node.id, person, ?organization, "occupation created");
    Ok(node)
  }

  pub async fn occupation_detail(&self, occupation: Id) -> Result<OccupationRecord> {
    let mut s = self.session().await?;
    let occupation = s.require::<Occupation>(occupation).await?;
    let organization = traverse::employer_of(&mut s, occupation.id).await?;
    Ok(OccupationRecord { occupation, organization })
  }

  /// Every occupation, latest first.
  pub async fn list_occupations(&self) -> Result<Vec<Node<Occupation>>> {
    let mut all = self.list::<Occupation>(NodeQuery::all()).await?;
    newest_first(&mut all, |o| o.props.start_date.as_deref());
    Ok(all)
  }

  pub async fn link_occupation_organization(&self, occupation: Id, organization: Id) -> Result<()> {
    rules::link_employer(&mut self.session().await?, occupation, organization).await
  }

  pub async fn unlink_occupation_organization(
    &self,
    occupation: Id,
    organization: Id,
  ) -> Result<()> {
    let removed = self
      .session()
      .await?
      .unlink(EdgeKind::EmployedBy, occupation, organization)
      .await?;
    debug!(occupation, organization, removed, "employer unlinked");
    Ok(())
  }

  // ── Media ─────────────────────────────────────────────────────────────

  /// Record media metadata; the category comes from the MIME type and the
  /// upload date is today's local date.
  pub async fn create_media(&self, input: NewMedia) -> Result<Node<Media>> {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    self.create(input.into_media(today)).await
  }

  pub async fn list_media(&self, category: Option<MediaCategory>) -> Result<Vec<Node<Media>>> {
    let query = match category {
      Some(c) => NodeQuery::all().with(Condition::Equals {
        field: "file_type",
        value: c.to_string(),
      }),
      None => NodeQuery::all(),
    };
    let mut media = self.list::<Media>(query).await?;
    newest_first(&mut media, |m| Some(m.props.upload_date.as_str()));
    Ok(media)
  }

  /// Attach media to a person; attaching twice is a no-op.
  pub async fn link_media_person(&self, media: Id, person: Id) -> Result<()> {
    rules::link_once(&mut self.session().await?, EdgeKind::HasMedia, person, media).await
  }

  pub async fn unlink_media_person(&self, media: Id, person: Id) -> Result<()> {
    self.session().await?.unlink(EdgeKind::HasMedia, person, media).await?;
    Ok(())
  }
}
