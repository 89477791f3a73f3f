//! Consistency rules — domain policy applied to writes before they reach
//! storage.
//!
//! The relationship store only guarantees the structural invariants (both
//! endpoints exist, no person-to-self edges, never `PARENT_OF` alongside
//! `ADOPTED_BY` for one pair). The rules here add the rest: idempotent link
//! creation, the parent/child state machine, undirected spouse handling, and
//! detach-delete routing.
//!
//! A parent/child pair is always in exactly one of three states:
//!
//! ```text
//!             add_parent_child                change_parent_child_kind
//!   absent ───────────────────► biological ◄──────────────────────────► adopted
//!      ▲                            │                                     │
//!      └──────── remove_parent_child ┴─────────────────────────────────────┘
//! ```

use tracing::debug;

use crate::{
  Error, Result,
  edge::{Edge, EdgeKind, EdgeProps, ParentKind},
  entity::{Entity, EntityKind, Id},
  patch::Patch,
  store::GraphSession,
};

// ─── Parentage ───────────────────────────────────────────────────────────────

/// The parent edge currently linking `parent` to `child`, if any.
pub async fn parent_edge<S: GraphSession>(
  session: &mut S,
  parent: Id,
  child: Id,
) -> Result<Option<(ParentKind, Edge)>> {
  for kind in [ParentKind::Biological, ParentKind::Adopted] {
    let edge = session
      .edges_from(kind.edge_kind(), parent)
      .await?
      .into_iter()
      .find(|e| e.to == child);
    if let Some(edge) = edge {
      return Ok(Some((kind, edge)));
    }
  }
  Ok(None)
}

fn parent_props(kind: ParentKind, adoption_date: Option<String>) -> EdgeProps {
  match kind {
    ParentKind::Biological => EdgeProps::none(),
    ParentKind::Adopted => EdgeProps::adoption(adoption_date),
  }
}

/// Record that `parent` is a parent of `child`.
///
/// Re-adding the same kind is a no-op. Adding the other kind fails with
/// [`Error::Conflict`]; use [`change_parent_child_kind`] instead. The
/// adoption date is ignored for biological links.
pub async fn add_parent_child<S: GraphSession>(
  session: &mut S,
  parent: Id,
  child: Id,
  kind: ParentKind,
  adoption_date: Option<String>,
) -> Result<()> {
  if parent == child {
    return Err(Error::SelfReference { kind: kind.edge_kind(), id: parent });
  }

  match parent_edge(session, parent, child).await? {
    Some((existing, _)) if existing == kind => {
      debug!(parent, child, %kind, "parent link already present");
      Ok(())
    }
    Some((existing, _)) => Err(Error::Conflict(format!(
      "person {parent} is already a {existing} parent of {child}"
    ))),
    None => {
      session
        .link(kind.edge_kind(), parent, child, parent_props(kind, adoption_date))
        .await?;
      debug!(parent, child, %kind, "parent link added");
      Ok(())
    }
  }
}

/// Switch an existing parent/child link between biological and adopted.
///
/// Changing kind deletes the old edge and creates a new one, so properties
/// of the old edge are not carried over. Keeping the kind updates the
/// adoption date in place. Fails with [`Error::EdgeNotFound`] when the pair
/// has no parent link.
pub async fn change_parent_child_kind<S: GraphSession>(
  session: &mut S,
  parent: Id,
  child: Id,
  new_kind: ParentKind,
  adoption_date: Option<String>,
) -> Result<()> {
  let Some((current, edge)) = parent_edge(session, parent, child).await? else {
    return Err(Error::EdgeNotFound {
      kind: new_kind.edge_kind(),
      from: parent,
      to:   child,
    });
  };

  let props = parent_props(new_kind, adoption_date);
  if current == new_kind {
    session.update_edge(edge.edge_id, props).await?;
    debug!(parent, child, kind = %new_kind, "parent link updated in place");
  } else {
    session.unlink(current.edge_kind(), parent, child).await?;
    session.link(new_kind.edge_kind(), parent, child, props).await?;
    debug!(parent, child, from = %current, to = %new_kind, "parent link kind changed");
  }
  Ok(())
}

/// Remove whichever parent link exists between the pair. Removing an absent
/// link succeeds.
pub async fn remove_parent_child<S: GraphSession>(
  session: &mut S,
  parent: Id,
  child: Id,
) -> Result<()> {
  let mut removed = 0;
  for kind in [EdgeKind::ParentOf, EdgeKind::AdoptedBy] {
    removed += session.unlink(kind, parent, child).await?;
  }
  debug!(parent, child, removed, "parent link removed");
  Ok(())
}

// ─── Marriage ────────────────────────────────────────────────────────────────

/// Every marriage edge between the pair, in either direction, oldest first.
pub async fn marriages_between<S: GraphSession>(
  session: &mut S,
  a: Id,
  b: Id,
) -> Result<Vec<Edge>> {
  let mut edges: Vec<Edge> = session
    .edges_from(EdgeKind::MarriedTo, a)
    .await?
    .into_iter()
    .filter(|e| e.to == b)
    .collect();
  edges.extend(
    session
      .edges_from(EdgeKind::MarriedTo, b)
      .await?
      .into_iter()
      .filter(|e| e.to == a),
  );
  edges.sort_by_key(|e| e.edge_id);
  Ok(edges)
}

/// Record a marriage. Only the supplied dates are written. Marrying the same
/// person again adds a separate marriage rather than overwriting the first.
pub async fn add_spouse<S: GraphSession>(
  session: &mut S,
  a: Id,
  b: Id,
  start_date: Option<String>,
  end_date: Option<String>,
) -> Result<Edge> {
  if a == b {
    return Err(Error::SelfReference { kind: EdgeKind::MarriedTo, id: a });
  }
  let edge = session
    .link(EdgeKind::MarriedTo, a, b, EdgeProps::marriage(start_date, end_date))
    .await?;
  debug!(a, b, edge_id = edge.edge_id, "marriage added");
  Ok(edge)
}

/// Update the dates of the most recent marriage between the pair, matched in
/// either direction.
pub async fn update_spouse<S: GraphSession>(
  session: &mut S,
  a: Id,
  b: Id,
  start_date: Patch<String>,
  end_date: Patch<String>,
) -> Result<Edge> {
  let latest = marriages_between(session, a, b).await?.pop();
  let Some(edge) = latest else {
    return Err(Error::EdgeNotFound { kind: EdgeKind::MarriedTo, from: a, to: b });
  };

  let mut props = edge.props;
  start_date.apply_to(&mut props.start_date);
  end_date.apply_to(&mut props.end_date);

  session
    .update_edge(edge.edge_id, props)
    .await?
    .ok_or(Error::EdgeNotFound { kind: EdgeKind::MarriedTo, from: a, to: b })
}

/// Remove every marriage between the pair, whichever way it was stored.
pub async fn remove_spouse<S: GraphSession>(
  session: &mut S,
  a: Id,
  b: Id,
) -> Result<()> {
  let removed = session.unlink(EdgeKind::MarriedTo, a, b).await?
    + session.unlink(EdgeKind::MarriedTo, b, a).await?;
  debug!(a, b, removed, "marriage removed");
  Ok(())
}

// ─── Other links ─────────────────────────────────────────────────────────────

/// Add `person` to an event. A second participation by the same person is a
/// [`Error::Conflict`].
pub async fn add_participant<S: GraphSession>(
  session: &mut S,
  event: Id,
  person: Id,
  role: Option<String>,
) -> Result<()> {
  let already = session
    .edges_to(EdgeKind::ParticipatedIn, event)
    .await?
    .iter()
    .any(|e| e.from == person);
  if already {
    return Err(Error::Conflict(format!(
      "person {person} already participates in event {event}"
    )));
  }
  session
    .link(EdgeKind::ParticipatedIn, person, event, EdgeProps::role(role))
    .await?;
  Ok(())
}

/// Link `person` to a place. Repeated residences at one place are allowed;
/// each carries its own date range.
pub async fn add_residence<S: GraphSession>(
  session: &mut S,
  place: Id,
  person: Id,
  start_date: Option<String>,
  end_date: Option<String>,
  residence_type: Option<String>,
) -> Result<Edge> {
  let props = EdgeProps::residence(start_date, end_date, residence_type);
  session.link(EdgeKind::LivedAt, person, place, props).await
}

/// Create a link only if an identical one does not already exist.
pub async fn link_once<S: GraphSession>(
  session: &mut S,
  kind: EdgeKind,
  from: Id,
  to: Id,
) -> Result<()> {
  let present = session
    .edges_from(kind, from)
    .await?
    .iter()
    .any(|e| e.to == to);
  if !present {
    session.link(kind, from, to, EdgeProps::none()).await?;
  }
  Ok(())
}

/// Attach an occupation to its employer. The same link again is a no-op; a
/// different employer is a [`Error::Conflict`], as an occupation has at most
/// one.
pub async fn link_employer<S: GraphSession>(
  session: &mut S,
  occupation: Id,
  organization: Id,
) -> Result<()> {
  let current = session.edges_from(EdgeKind::EmployedBy, occupation).await?;
  match current.first() {
    Some(e) if e.to == organization => Ok(()),
    Some(e) => Err(Error::Conflict(format!(
      "occupation {occupation} is already linked to organization {}",
      e.to
    ))),
    None => {
      session
        .link(EdgeKind::EmployedBy, occupation, organization, EdgeProps::none())
        .await?;
      Ok(())
    }
  }
}

// ─── Deletion ────────────────────────────────────────────────────────────────

/// Detach-delete an entity. Deleting an absent entity succeeds.
pub async fn delete_entity<E: Entity, S: GraphSession>(
  session: &mut S,
  id: Id,
) -> Result<()> {
  let existed = session.delete::<E>(id).await?;
  debug!(kind = %E::KIND, id, existed, "entity deleted");
  Ok(())
}

/// Fail with [`Error::EndpointNotFound`] unless the node exists.
pub async fn ensure_exists<S: GraphSession>(
  session: &mut S,
  kind: EntityKind,
  id: Id,
) -> Result<()> {
  if session.exists(kind, id).await? {
    Ok(())
  } else {
    Err(Error::EndpointNotFound { kind, id })
  }
}
