//! [`SqliteStore`] — the SQLite implementation of [`GraphStore`].

use std::{path::Path, sync::Arc};

use rusqlite::OptionalExtension as _;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use lineage_core::{
  edge::{Edge, EdgeKind, EdgeProps},
  entity::{Entity, EntityKind, Id, Node},
  store::{GraphSession, GraphStore, NodeQuery},
};

use crate::{
  Result,
  encode::{
    EDGE_COLUMNS, RawEdge, RawNode, encode_edge_props, encode_props, encode_query,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A family graph backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection and session lock are
/// reference-counted, and every clone shares them.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
  lock: Arc<Mutex<()>>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, lock: Arc::new(Mutex::new(())) })
  }
}

impl GraphStore for SqliteStore {
  type Session = SqliteSession;

  async fn session(&self) -> lineage_core::Result<SqliteSession> {
    let guard = Arc::clone(&self.lock).lock_owned().await;
    Ok(SqliteSession { conn: self.conn.clone(), _guard: guard })
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Exclusive access to a [`SqliteStore`]. Other callers wait in
/// [`GraphStore::session`] until this is dropped.
pub struct SqliteSession {
  conn:   tokio_rusqlite::Connection,
  _guard: OwnedMutexGuard<()>,
}

fn node_exists(
  conn: &rusqlite::Connection,
  kind: EntityKind,
  id: Id,
) -> rusqlite::Result<bool> {
  conn.query_row(
    "SELECT EXISTS(SELECT 1 FROM nodes WHERE kind = ?1 AND node_id = ?2)",
    rusqlite::params![kind.to_string(), id],
    |row| row.get(0),
  )
}

fn delete_incident_edges(
  conn: &rusqlite::Connection,
  kind: EntityKind,
  id: Id,
) -> rusqlite::Result<usize> {
  conn.execute(
    "DELETE FROM edges
     WHERE (from_kind = ?1 AND from_id = ?2)
        OR (to_kind = ?1 AND to_id = ?2)",
    rusqlite::params![kind.to_string(), id],
  )
}

impl SqliteSession {
  async fn fetch_node(&self, kind: EntityKind, id: Id) -> Result<Option<RawNode>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT node_id, props_json FROM nodes WHERE kind = ?1 AND node_id = ?2",
              rusqlite::params![kind.to_string(), id],
              RawNode::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }

  async fn insert_node<E: Entity>(&self, props: E) -> Result<Node<E>> {
    let props_json = encode_props(&props)?;
    let kind = E::KIND;

    let id: Id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let id: Id = tx.query_row(
          "INSERT INTO id_counters (kind, last_id) VALUES (?1, 1)
           ON CONFLICT(kind) DO UPDATE SET last_id = last_id + 1
           RETURNING last_id",
          rusqlite::params![kind.to_string()],
          |row| row.get(0),
        )?;
        tx.execute(
          "INSERT INTO nodes (kind, node_id, props_json) VALUES (?1, ?2, ?3)",
          rusqlite::params![kind.to_string(), id, props_json],
        )?;
        tx.commit()?;
        Ok(id)
      })
      .await?;

    debug!(%kind, id, "node inserted");
    Ok(Node { id, props })
  }

  async fn patch_node<E: Entity>(&self, id: Id, patch: E::Patch) -> Result<Node<E>> {
    let Some(raw) = self.fetch_node(E::KIND, id).await? else {
      return Err(lineage_core::Error::NotFound { kind: E::KIND, id }.into());
    };
    let mut node = raw.into_node::<E>()?;
    node.props.apply(patch);

    let props_json = encode_props(&node.props)?;
    let kind = E::KIND;
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE nodes SET props_json = ?3 WHERE kind = ?1 AND node_id = ?2",
          rusqlite::params![kind.to_string(), id, props_json],
        )?;
        Ok(())
      })
      .await?;
    Ok(node)
  }

  async fn remove_node(&self, kind: EntityKind, id: Id) -> Result<bool> {
    let (edges, nodes) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let edges = delete_incident_edges(&tx, kind, id)?;
        let nodes = tx.execute(
          "DELETE FROM nodes WHERE kind = ?1 AND node_id = ?2",
          rusqlite::params![kind.to_string(), id],
        )?;
        tx.commit()?;
        Ok((edges, nodes))
      })
      .await?;
    debug!(%kind, id, edges, "node removed");
    Ok(nodes > 0)
  }

  async fn query_nodes<E: Entity>(&self, query: &NodeQuery) -> Result<Vec<Node<E>>> {
    let (tail, params) = encode_query(&E::KIND.to_string(), query);
    let sql = format!("SELECT node_id, props_json FROM nodes {tail}");

    let raws: Vec<RawNode> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawNode::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNode::into_node).collect()
  }

  async fn node_exists(&self, kind: EntityKind, id: Id) -> Result<bool> {
    let exists = self
      .conn
      .call(move |conn| Ok(node_exists(conn, kind, id)?))
      .await?;
    Ok(exists)
  }

  /// Insert an edge after checking the structural invariants, all in one
  /// transaction.
  async fn insert_edge(
    &self,
    kind: EdgeKind,
    from: Id,
    to: Id,
    props: EdgeProps,
  ) -> Result<Edge> {
    let props_json = encode_edge_props(&props)?;

    let outcome: lineage_core::Result<Id> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        for (end, id) in [(kind.source(), from), (kind.target(), to)] {
          if !node_exists(&tx, end, id)? {
            return Ok(Err(lineage_core::Error::EndpointNotFound { kind: end, id }));
          }
        }

        if from == to && !kind.allows_self_loop() {
          return Ok(Err(lineage_core::Error::SelfReference { kind, id: from }));
        }

        if let Some(rival) = kind.exclusive_with() {
          let taken: bool = tx.query_row(
            "SELECT EXISTS(
               SELECT 1 FROM edges WHERE kind = ?1 AND from_id = ?2 AND to_id = ?3
             )",
            rusqlite::params![rival.to_string(), from, to],
            |row| row.get(0),
          )?;
          if taken {
            return Ok(Err(lineage_core::Error::Conflict(format!(
              "{from} -> {to} already linked by {rival}"
            ))));
          }
        }

        tx.execute(
          "INSERT INTO edges (kind, from_kind, from_id, to_kind, to_id, props_json)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            kind.to_string(),
            kind.source().to_string(),
            from,
            kind.target().to_string(),
            to,
            props_json,
          ],
        )?;
        let edge_id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(edge_id))
      })
      .await?;

    let edge_id = outcome?;
    debug!(%kind, from, to, edge_id, "edge inserted");
    Ok(Edge { edge_id, kind, from, to, props })
  }

  async fn delete_edges(&self, kind: EdgeKind, from: Id, to: Id) -> Result<usize> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM edges WHERE kind = ?1 AND from_id = ?2 AND to_id = ?3",
          rusqlite::params![kind.to_string(), from, to],
        )?)
      })
      .await?;
    debug!(%kind, from, to, removed, "edges deleted");
    Ok(removed)
  }

  async fn replace_edge_props(&self, edge_id: Id, props: EdgeProps) -> Result<Option<Edge>> {
    let props_json = encode_edge_props(&props)?;
    let sql = format!("SELECT {EDGE_COLUMNS} FROM edges WHERE edge_id = ?1");

    let raw: Option<RawEdge> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE edges SET props_json = ?2 WHERE edge_id = ?1",
          rusqlite::params![edge_id, props_json],
        )?;
        let raw = tx
          .query_row(&sql, rusqlite::params![edge_id], RawEdge::from_row)
          .optional()?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawEdge::into_edge).transpose()
  }

  /// Select edges of `kind`, optionally restricted to one endpoint column.
  async fn select_edges(
    &self,
    kind: EdgeKind,
    endpoint: Option<(&'static str, Id)>,
  ) -> Result<Vec<Edge>> {
    let raws: Vec<RawEdge> = self
      .conn
      .call(move |conn| {
        let rows = if let Some((column, id)) = endpoint {
          let mut stmt = conn.prepare(&format!(
            "SELECT {EDGE_COLUMNS} FROM edges
             WHERE kind = ?1 AND {column} = ?2
             ORDER BY edge_id"
          ))?;
          stmt
            .query_map(rusqlite::params![kind.to_string(), id], RawEdge::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {EDGE_COLUMNS} FROM edges WHERE kind = ?1 ORDER BY edge_id"
          ))?;
          stmt
            .query_map(rusqlite::params![kind.to_string()], RawEdge::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEdge::into_edge).collect()
  }

  async fn cascade(&self, kind: EntityKind, id: Id) -> Result<usize> {
    let removed = self
      .conn
      .call(move |conn| Ok(delete_incident_edges(conn, kind, id)?))
      .await?;
    debug!(%kind, id, removed, "incident edges removed");
    Ok(removed)
  }
}

// ─── GraphSession impl ───────────────────────────────────────────────────────

impl GraphSession for SqliteSession {
  // ── Entity store ──────────────────────────────────────────────────────────

  async fn create<E: Entity>(&mut self, props: E) -> lineage_core::Result<Node<E>> {
    Ok(self.insert_node(props).await?)
  }

  async fn get<E: Entity>(&mut self, id: Id) -> lineage_core::Result<Option<Node<E>>> {
    let raw = self.fetch_node(E::KIND, id).await?;
    Ok(raw.map(RawNode::into_node::<E>).transpose()?)
  }

  async fn update<E: Entity>(
    &mut self,
    id: Id,
    patch: E::Patch,
  ) -> lineage_core::Result<Node<E>> {
    Ok(self.patch_node::<E>(id, patch).await?)
  }

  async fn delete<E: Entity>(&mut self, id: Id) -> lineage_core::Result<bool> {
    Ok(self.remove_node(E::KIND, id).await?)
  }

  async fn list<'a, E: Entity>(
    &'a mut self,
    query: &'a NodeQuery,
  ) -> lineage_core::Result<Vec<Node<E>>> {
    Ok(self.query_nodes::<E>(query).await?)
  }

  async fn exists(&mut self, kind: EntityKind, id: Id) -> lineage_core::Result<bool> {
    Ok(self.node_exists(kind, id).await?)
  }

  // ── Relationship store ────────────────────────────────────────────────────

  async fn link(
    &mut self,
    kind: EdgeKind,
    from: Id,
    to: Id,
    props: EdgeProps,
  ) -> lineage_core::Result<Edge> {
    Ok(self.insert_edge(kind, from, to, props).await?)
  }

  async fn unlink(&mut self, kind: EdgeKind, from: Id, to: Id) -> lineage_core::Result<usize> {
    Ok(self.delete_edges(kind, from, to).await?)
  }

  async fn update_edge(
    &mut self,
    edge_id: Id,
    props: EdgeProps,
  ) -> lineage_core::Result<Option<Edge>> {
    Ok(self.replace_edge_props(edge_id, props).await?)
  }

  async fn edges_from(&mut self, kind: EdgeKind, from: Id) -> lineage_core::Result<Vec<Edge>> {
    Ok(self.select_edges(kind, Some(("from_id", from))).await?)
  }

  async fn edges_to(&mut self, kind: EdgeKind, to: Id) -> lineage_core::Result<Vec<Edge>> {
    Ok(self.select_edges(kind, Some(("to_id", to))).await?)
  }

  async fn edges(&mut self, kind: EdgeKind) -> lineage_core::Result<Vec<Edge>> {
    Ok(self.select_edges(kind, None).await?)
  }

  async fn cascade_delete_for(
    &mut self,
    kind: EntityKind,
    id: Id,
  ) -> lineage_core::Result<usize> {
    Ok(self.cascade(kind, id).await?)
  }
}
