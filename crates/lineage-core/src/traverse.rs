//! Genealogical queries composed from edge lookups.
//!
//! Nothing here is stored: parents, children and spouses are read straight
//! off edges, siblings are derived from shared parents, and ancestor or
//! descendant closures are walked breadth-first. Every query re-reads the
//! store. Queries about an unknown person return empty results rather than
//! failing.

use std::collections::HashSet;

use tracing::warn;

use crate::{
  Result,
  edge::{EdgeKind, ParentKind},
  entity::{Entity, Id, Node},
  model::{Event, Media, Occupation, Organization, Person, Place},
  store::{GraphSession, NodeQuery},
  view::{
    Employee, GraphEdge, GraphExport, GraphNode, Kin, OccupationRecord,
    Participant, ParentageLink, PersonEvent, PersonSummary, Relationships,
    Residence, Resident, SpouseLink, newest_first,
  },
};

/// Depth cap applied to ancestor/descendant walks when none is given. The
/// store does not forbid cycles in parent data, so the walk always carries
/// both a visited set and this cap.
pub const DEFAULT_MAX_DEPTH: usize = 64;

const PARENT_KINDS: [ParentKind; 2] = [ParentKind::Biological, ParentKind::Adopted];

/// Load the node at the far end of an edge. Endpoints should never be
/// missing (deletes cascade), so a miss is logged and skipped.
async fn endpoint<E: Entity, S: GraphSession>(
  session: &mut S,
  id: Id,
) -> Result<Option<Node<E>>> {
  let node = session.get::<E>(id).await?;
  if node.is_none() {
    warn!(kind = %E::KIND, id, "edge points at a missing node");
  }
  Ok(node)
}

async fn summary<S: GraphSession>(
  session: &mut S,
  id: Id,
) -> Result<Option<PersonSummary>> {
  Ok(endpoint::<Person, _>(session, id).await?.map(PersonSummary::from))
}

// ─── Direct relations ────────────────────────────────────────────────────────

/// Parents of `person`, biological first, each tagged with its kind.
pub async fn parents_of<S: GraphSession>(
  session: &mut S,
  person: Id,
) -> Result<Vec<ParentageLink>> {
  let mut out = Vec::new();
  for kind in PARENT_KINDS {
    for edge in session.edges_to(kind.edge_kind(), person).await? {
      if let Some(p) = summary(session, edge.from).await? {
        out.push(ParentageLink {
          person:            p,
          relationship_type: kind,
          adoption_date:     edge.props.adoption_date,
        });
      }
    }
  }
  Ok(out)
}

/// Children of `person`, biological first, each tagged with its kind.
pub async fn children_of<S: GraphSession>(
  session: &mut S,
  person: Id,
) -> Result<Vec<ParentageLink>> {
  let mut out = Vec::new();
  for kind in PARENT_KINDS {
    for edge in session.edges_from(kind.edge_kind(), person).await? {
      if let Some(p) = summary(session, edge.to).await? {
        out.push(ParentageLink {
          person:            p,
          relationship_type: kind,
          adoption_date:     edge.props.adoption_date,
        });
      }
    }
  }
  Ok(out)
}

/// Spouses of `person`, whichever direction each marriage was stored in.
pub async fn spouses_of<S: GraphSession>(
  session: &mut S,
  person: Id,
) -> Result<Vec<SpouseLink>> {
  let mut edges = session.edges_from(EdgeKind::MarriedTo, person).await?;
  edges.extend(session.edges_to(EdgeKind::MarriedTo, person).await?);
  edges.sort_by_key(|e| e.edge_id);

  let mut out = Vec::with_capacity(edges.len());
  for edge in edges {
    let Some(other) = edge.other_end(person) else { continue };
    if let Some(p) = summary(session, other).await? {
      out.push(SpouseLink {
        person:     p,
        start_date: edge.props.start_date,
        end_date:   edge.props.end_date,
      });
    }
  }
  Ok(out)
}

/// People sharing at least one parent with `person`, each listed once.
pub async fn siblings_of<S: GraphSession>(
  session: &mut S,
  person: Id,
) -> Result<Vec<PersonSummary>> {
  let mut seen = HashSet::from([person]);
  let mut out = Vec::new();
  for parent in parent_ids(session, person).await? {
    for child in child_ids(session, parent).await? {
      if seen.insert(child)
        && let Some(p) = summary(session, child).await?
      {
        out.push(p);
      }
    }
  }
  Ok(out)
}

/// Parents, children, spouses and siblings in one record.
pub async fn relationships_of<S: GraphSession>(
  session: &mut S,
  person: Id,
) -> Result<Relationships> {
  Ok(Relationships {
    parents:  parents_of(session, person).await?,
    children: children_of(session, person).await?,
    spouses:  spouses_of(session, person).await?,
    siblings: siblings_of(session, person).await?,
  })
}

// ─── Closures ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Direction {
  Up,
  Down,
}

async fn parent_ids<S: GraphSession>(session: &mut S, id: Id) -> Result<Vec<Id>> {
  let mut ids = Vec::new();
  for kind in PARENT_KINDS {
    ids.extend(
      session
        .edges_to(kind.edge_kind(), id)
        .await?
        .into_iter()
        .map(|e| e.from),
    );
  }
  Ok(ids)
}

async fn child_ids<S: GraphSession>(session: &mut S, id: Id) -> Result<Vec<Id>> {
  let mut ids = Vec::new();
  for kind in PARENT_KINDS {
    ids.extend(
      session
        .edges_from(kind.edge_kind(), id)
        .await?
        .into_iter()
        .map(|e| e.to),
    );
  }
  Ok(ids)
}

async fn lineal<S: GraphSession>(
  session: &mut S,
  root: Id,
  direction: Direction,
  max_depth: usize,
) -> Result<Vec<Kin>> {
  let mut seen = HashSet::from([root]);
  let mut frontier = vec![root];
  let mut out = Vec::new();
  let mut generation = 0;

  while !frontier.is_empty() {
    let mut next = Vec::new();
    for id in frontier {
      let related = match direction {
        Direction::Up => parent_ids(session, id).await?,
        Direction::Down => child_ids(session, id).await?,
      };
      next.extend(related.into_iter().filter(|r| seen.insert(*r)));
    }

    if generation == max_depth {
      if !next.is_empty() {
        warn!(root, max_depth, ?direction, "lineage walk stopped at depth cap");
      }
      break;
    }
    generation += 1;

    for &id in &next {
      if let Some(person) = summary(session, id).await? {
        out.push(Kin { generation, person });
      }
    }
    frontier = next;
  }
  Ok(out)
}

/// Every ancestor of `person` up to `max_depth` generations
/// ([`DEFAULT_MAX_DEPTH`] when `None`), nearest first. Each ancestor is
/// listed once, at the generation where it is first reached. Terminates on
/// cyclic data.
pub async fn ancestors_of<S: GraphSession>(
  session: &mut S,
  person: Id,
  max_depth: Option<usize>,
) -> Result<Vec<Kin>> {
  lineal(session, person, Direction::Up, max_depth.unwrap_or(DEFAULT_MAX_DEPTH)).await
}

/// Every descendant of `person`; the mirror image of [`ancestors_of`].
pub async fn descendants_of<S: GraphSession>(
  session: &mut S,
  person: Id,
  max_depth: Option<usize>,
) -> Result<Vec<Kin>> {
  lineal(session, person, Direction::Down, max_depth.unwrap_or(DEFAULT_MAX_DEPTH))
    .await
}

// ─── Whole graph ─────────────────────────────────────────────────────────────

/// Every person and every parentage or marriage edge, flat. Derived sibling
/// relations are not included.
pub async fn whole_graph<S: GraphSession>(session: &mut S) -> Result<GraphExport> {
  let nodes = session
    .list::<Person>(&NodeQuery::all())
    .await?
    .into_iter()
    .map(|n| GraphNode {
      id:         n.id,
      name:       n.props.name,
      gender:     n.props.gender,
      birth_date: n.props.birth_date,
    })
    .collect();

  let mut edges = Vec::new();
  for kind in [EdgeKind::ParentOf, EdgeKind::AdoptedBy, EdgeKind::MarriedTo] {
    edges.extend(session.edges(kind).await?.into_iter().map(|e| GraphEdge {
      source: e.from,
      target: e.to,
      kind:   e.kind,
    }));
  }

  Ok(GraphExport { nodes, edges })
}

// ─── Person-centred listings ─────────────────────────────────────────────────

/// Events `person` took part in, latest first.
pub async fn events_of<S: GraphSession>(
  session: &mut S,
  person: Id,
) -> Result<Vec<PersonEvent>> {
  let mut out = Vec::new();
  for edge in session.edges_from(EdgeKind::ParticipatedIn, person).await? {
    if let Some(event) = endpoint::<Event, _>(session, edge.to).await? {
      out.push(PersonEvent { event, role: edge.props.role });
    }
  }
  newest_first(&mut out, |e| e.event.props.event_date.as_deref());
  Ok(out)
}

/// Places `person` lived at, most recent first.
pub async fn residences_of<S: GraphSession>(
  session: &mut S,
  person: Id,
) -> Result<Vec<Residence>> {
  let mut out = Vec::new();
  for edge in session.edges_from(EdgeKind::LivedAt, person).await? {
    if let Some(place) = endpoint::<Place, _>(session, edge.to).await? {
      out.push(Residence {
        place,
        start_date: edge.props.start_date,
        end_date: edge.props.end_date,
        residence_type: edge.props.residence_type,
      });
    }
  }
  newest_first(&mut out, |r| r.start_date.as_deref());
  Ok(out)
}

/// The employer of an occupation, if linked.
pub async fn employer_of<S: GraphSession>(
  session: &mut S,
  occupation: Id,
) -> Result<Option<Node<Organization>>> {
  match session.edges_from(EdgeKind::EmployedBy, occupation).await?.first() {
    Some(edge) => endpoint::<Organization, _>(session, edge.to).await,
    None => Ok(None),
  }
}

/// Occupations held by `person` with their employers, latest first.
pub async fn occupations_of<S: GraphSession>(
  session: &mut S,
  person: Id,
) -> Result<Vec<OccupationRecord>> {
  let mut out = Vec::new();
  for edge in session.edges_from(EdgeKind::WorkedAs, person).await? {
    if let Some(occupation) = endpoint::<Occupation, _>(session, edge.to).await? {
      let organization = employer_of(session, occupation.id).await?;
      out.push(OccupationRecord { occupation, organization });
    }
  }
  newest_first(&mut out, |o| o.occupation.props.start_date.as_deref());
  Ok(out)
}

/// Media attached to `person`, newest upload first.
pub async fn media_of<S: GraphSession>(
  session: &mut S,
  person: Id,
) -> Result<Vec<Node<Media>>> {
  let mut out = Vec::new();
  for edge in session.edges_from(EdgeKind::HasMedia, person).await? {
    if let Some(media) = endpoint::<Media, _>(session, edge.to).await? {
      out.push(media);
    }
  }
  newest_first(&mut out, |m| Some(m.props.upload_date.as_str()));
  Ok(out)
}

// ─── Entity-centred listings ─────────────────────────────────────────────────

/// People who took part in `event`, in the order they were linked.
pub async fn participants_of<S: GraphSession>(
  session: &mut S,
  event: Id,
) -> Result<Vec<Participant>> {
  let mut out = Vec::new();
  for edge in session.edges_to(EdgeKind::ParticipatedIn, event).await? {
    if let Some(p) = endpoint::<Person, _>(session, edge.from).await? {
      out.push(Participant { id: p.id, name: p.props.name, role: edge.props.role });
    }
  }
  Ok(out)
}

/// People who lived at `place`, most recent first.
pub async fn residents_of<S: GraphSession>(
  session: &mut S,
  place: Id,
) -> Result<Vec<Resident>> {
  let mut out = Vec::new();
  for edge in session.edges_to(EdgeKind::LivedAt, place).await? {
    if let Some(p) = endpoint::<Person, _>(session, edge.from).await? {
      out.push(Resident {
        id:             p.id,
        name:           p.props.name,
        start_date:     edge.props.start_date,
        end_date:       edge.props.end_date,
        residence_type: edge.props.residence_type,
      });
    }
  }
  newest_first(&mut out, |r| r.start_date.as_deref());
  Ok(out)
}

/// People employed by `organization`, reached through their occupations,
/// latest first.
pub async fn employees_of<S: GraphSession>(
  session: &mut S,
  organization: Id,
) -> Result<Vec<Employee>> {
  let mut out = Vec::new();
  for job in session.edges_to(EdgeKind::EmployedBy, organization).await? {
    let Some(occupation) = endpoint::<Occupation, _>(session, job.from).await? else {
      continue;
    };
    for holder in session.edges_to(EdgeKind::WorkedAs, occupation.id).await? {
      if let Some(p) = endpoint::<Person, _>(session, holder.from).await? {
        out.push(Employee {
          person_id:     p.id,
          name:          p.props.name,
          occupation_id: occupation.id,
          title:         occupation.props.title.clone(),
          start_date:    occupation.props.start_date.clone(),
          end_date:      occupation.props.end_date.clone(),
        });
      }
    }
  }
  newest_first(&mut out, |e| e.start_date.as_deref());
  Ok(out)
}
