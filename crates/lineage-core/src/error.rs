//! Error types for `lineage-core`.

use thiserror::Error;

use crate::{
  edge::EdgeKind,
  entity::{EntityKind, Id},
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("{kind} {id} not found")]
  NotFound { kind: EntityKind, id: Id },

  #[error("no {kind} relationship between {from} and {to}")]
  EdgeNotFound { kind: EdgeKind, from: Id, to: Id },

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("{kind} cannot link person {id} to itself")]
  SelfReference { kind: EdgeKind, id: Id },

  #[error("cannot link to missing {kind} {id}")]
  EndpointNotFound { kind: EntityKind, id: Id },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// The storage engine failed; fatal to the current operation only.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// True for both a missing entity and a missing edge.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound { .. } | Self::EdgeNotFound { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
