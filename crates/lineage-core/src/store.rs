//! The storage traits and supporting query types.
//!
//! [`GraphStore`] is the shared, process-wide storage instance; it hands out
//! [`GraphSession`]s, each an exclusive handle held for one unit of work.
//! Storage backends (e.g. `lineage-store-sqlite`) implement both. The rules
//! and traversal engines are written against [`GraphSession`] only.

use std::future::Future;

use crate::{
  Error, Result,
  edge::{Edge, EdgeKind, EdgeProps},
  entity::{Entity, EntityKind, Id, Node},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// A predicate over one or more top-level properties of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
  /// Any of `fields` contains `needle` (ASCII case-insensitive).
  Contains {
    fields: Vec<&'static str>,
    needle: String,
  },
  /// `field` equals `value` exactly.
  Equals { field: &'static str, value: String },
  /// `field` has no value.
  IsNull(&'static str),
  /// `field` has a value.
  IsNotNull(&'static str),
}

/// Parameters for [`GraphSession::list`]. Conditions are combined with AND;
/// results are ordered by `order_by` when set, then by identity.
#[derive(Debug, Clone, Default)]
pub struct NodeQuery {
  pub conditions: Vec<Condition>,
  pub order_by:   Option<&'static str>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}

impl NodeQuery {
  pub fn all() -> Self { Self::default() }

  pub fn with(mut self, condition: Condition) -> Self {
    self.conditions.push(condition);
    self
  }

  pub fn ordered_by(mut self, field: &'static str) -> Self {
    self.order_by = Some(field);
    self
  }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// A shared storage instance from which exclusive sessions are acquired.
pub trait GraphStore: Send + Sync {
  type Session: GraphSession;

  /// Acquire an exclusive session. Waits while another caller holds one;
  /// the session is released when dropped.
  fn session(
    &self,
  ) -> impl Future<Output = Result<Self::Session>> + Send + '_;
}

/// One exclusive handle to the entity and relationship stores.
///
/// Every call runs to completion against durable storage; nothing is cached
/// between calls.
pub trait GraphSession: Send {
  // ── Entity store ──────────────────────────────────────────────────────

  /// Persist a new entity, assigning the next identity for its kind.
  fn create<E: Entity>(
    &mut self,
    props: E,
  ) -> impl Future<Output = Result<Node<E>>> + Send + '_;

  /// Retrieve an entity. Returns `None` if not found.
  fn get<E: Entity>(
    &mut self,
    id: Id,
  ) -> impl Future<Output = Result<Option<Node<E>>>> + Send + '_;

  /// Apply a partial update and return the updated entity.
  ///
  /// Fails with [`Error::NotFound`] if the entity does not exist.
  fn update<E: Entity>(
    &mut self,
    id: Id,
    patch: E::Patch,
  ) -> impl Future<Output = Result<Node<E>>> + Send + '_;

  /// Detach-delete an entity: every incident edge is removed, as by
  /// [`GraphSession::cascade_delete_for`], together with the node itself.
  ///
  /// Returns whether the entity existed.
  fn delete<E: Entity>(
    &mut self,
    id: Id,
  ) -> impl Future<Output = Result<bool>> + Send + '_;

  /// List entities of one kind matching `query`.
  fn list<'a, E: Entity>(
    &'a mut self,
    query: &'a NodeQuery,
  ) -> impl Future<Output = Result<Vec<Node<E>>>> + Send + 'a;

  /// Whether a node of `kind` with identity `id` exists.
  fn exists(
    &mut self,
    kind: EntityKind,
    id: Id,
  ) -> impl Future<Output = Result<bool>> + Send + '_;

  // ── Relationship store ────────────────────────────────────────────────

  /// Create an edge.
  ///
  /// Fails with [`Error::EndpointNotFound`] if either endpoint is missing,
  /// [`Error::SelfReference`] if `from == to` on a kind that forbids self
  /// loops, and [`Error::Conflict`] if the pair already carries the kind's
  /// exclusive counterpart (`PARENT_OF` vs `ADOPTED_BY`). Duplicate edges of
  /// the same kind are otherwise permitted.
  fn link(
    &mut self,
    kind: EdgeKind,
    from: Id,
    to: Id,
    props: EdgeProps,
  ) -> impl Future<Output = Result<Edge>> + Send + '_;

  /// Remove every `kind` edge from `from` to `to`. Returns how many were
  /// removed; removing nothing is not an error.
  fn unlink(
    &mut self,
    kind: EdgeKind,
    from: Id,
    to: Id,
  ) -> impl Future<Output = Result<usize>> + Send + '_;

  /// Replace the properties of an existing edge. Returns `None` if no edge
  /// has that identity.
  fn update_edge(
    &mut self,
    edge_id: Id,
    props: EdgeProps,
  ) -> impl Future<Output = Result<Option<Edge>>> + Send + '_;

  /// All `kind` edges leaving `from`, oldest first.
  fn edges_from(
    &mut self,
    kind: EdgeKind,
    from: Id,
  ) -> impl Future<Output = Result<Vec<Edge>>> + Send + '_;

  /// All `kind` edges arriving at `to`, oldest first.
  fn edges_to(
    &mut self,
    kind: EdgeKind,
    to: Id,
  ) -> impl Future<Output = Result<Vec<Edge>>> + Send + '_;

  /// Every edge of `kind`, oldest first.
  fn edges(
    &mut self,
    kind: EdgeKind,
  ) -> impl Future<Output = Result<Vec<Edge>>> + Send + '_;

  /// Remove every edge, of any kind, that has the given node as source or
  /// target. Returns how many were removed.
  fn cascade_delete_for(
    &mut self,
    kind: EntityKind,
    id: Id,
  ) -> impl Future<Output = Result<usize>> + Send + '_;

  // ── Provided ──────────────────────────────────────────────────────────

  /// Like [`GraphSession::get`], but a missing entity is
  /// [`Error::NotFound`].
  fn require<E: Entity>(
    &mut self,
    id: Id,
  ) -> impl Future<Output = Result<Node<E>>> + Send + '_ {
    async move {
      self
        .get::<E>(id)
        .await?
        .ok_or(Error::NotFound { kind: E::KIND, id })
    }
  }
}
