//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Entity properties and edge properties are stored as compact JSON. Kinds
//! are stored by their wire names (`person`, `PARENT_OF`).

use lineage_core::{
  edge::{Edge, EdgeKind, EdgeProps},
  entity::{Entity, Id, Node},
  store::{Condition, NodeQuery},
};
use rusqlite::types::Value;

use crate::{Error, Result};

// ─── Properties ──────────────────────────────────────────────────────────────

pub fn encode_props<E: Entity>(props: &E) -> Result<String> {
  Ok(serde_json::to_string(props)?)
}

pub fn encode_edge_props(props: &EdgeProps) -> Result<String> {
  Ok(serde_json::to_string(props)?)
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// A row of the `nodes` table before JSON decoding.
pub struct RawNode {
  pub node_id:    Id,
  pub props_json: String,
}

impl RawNode {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { node_id: row.get(0)?, props_json: row.get(1)? })
  }

  pub fn into_node<E: Entity>(self) -> Result<Node<E>> {
    Ok(Node { id: self.node_id, props: serde_json::from_str(&self.props_json)? })
  }
}

/// A row of the `edges` table before decoding.
pub struct RawEdge {
  pub edge_id:    Id,
  pub kind:       String,
  pub from_id:    Id,
  pub to_id:      Id,
  pub props_json: String,
}

/// Columns expected by [`RawEdge::from_row`], in order.
pub const EDGE_COLUMNS: &str = "edge_id, kind, from_id, to_id, props_json";

impl RawEdge {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      edge_id:    row.get(0)?,
      kind:       row.get(1)?,
      from_id:    row.get(2)?,
      to_id:      row.get(3)?,
      props_json: row.get(4)?,
    })
  }

  pub fn into_edge(self) -> Result<Edge> {
    let kind = decode_edge_kind(&self.kind)?;
    Ok(Edge {
      edge_id: self.edge_id,
      kind,
      from: self.from_id,
      to: self.to_id,
      props: serde_json::from_str(&self.props_json)?,
    })
  }
}

pub fn decode_edge_kind(s: &str) -> Result<EdgeKind> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown edge kind: {s:?}")))
}

// ─── Node queries ────────────────────────────────────────────────────────────

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'`
/// pattern.
fn escape_like(needle: &str) -> String {
  let mut out = String::with_capacity(needle.len() + 2);
  for c in needle.chars() {
    if matches!(c, '\\' | '%' | '_') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

fn json_path(field: &str) -> Value { Value::Text(format!("$.{field}")) }

/// Build the `WHERE ... ORDER BY ... LIMIT ... OFFSET ...` tail of a node
/// listing, with positional parameters. The first parameter is always the
/// node kind.
pub fn encode_query(kind: &str, query: &NodeQuery) -> (String, Vec<Value>) {
  let mut clauses = vec!["kind = ?".to_owned()];
  let mut params = vec![Value::Text(kind.to_owned())];

  for condition in &query.conditions {
    match condition {
      Condition::Contains { fields, needle } => {
        let pattern = format!("%{}%", escape_like(needle));
        let alternatives: Vec<&str> = fields
          .iter()
          .map(|field| {
            params.push(json_path(field));
            params.push(Value::Text(pattern.clone()));
            "json_extract(props_json, ?) LIKE ? ESCAPE '\\'"
          })
          .collect();
        clauses.push(format!("({})", alternatives.join(" OR ")));
      }
      Condition::Equals { field, value } => {
        params.push(json_path(field));
        params.push(Value::Text(value.clone()));
        clauses.push("json_extract(props_json, ?) = ?".to_owned());
      }
      Condition::IsNull(field) => {
        params.push(json_path(field));
        clauses.push("json_extract(props_json, ?) IS NULL".to_owned());
      }
      Condition::IsNotNull(field) => {
        params.push(json_path(field));
        clauses.push("json_extract(props_json, ?) IS NOT NULL".to_owned());
      }
    }
  }

  let order = match query.order_by {
    Some(field) => {
      params.push(json_path(field));
      "json_extract(props_json, ?), node_id"
    }
    None => "node_id",
  };

  // SQLite reads a negative LIMIT as "no limit".
  let limit = query.limit.map_or(-1, |l| l as i64);
  let offset = query.offset.unwrap_or(0) as i64;
  params.push(Value::Integer(limit));
  params.push(Value::Integer(offset));

  let sql = format!(
    "WHERE {} ORDER BY {order} LIMIT ? OFFSET ?",
    clauses.join(" AND ")
  );
  (sql, params)
}
