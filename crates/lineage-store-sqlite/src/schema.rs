//! SQL schema for the lineage SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout version for later migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Last identity handed out per entity kind. Identities are never reused,
-- even after the highest one is deleted.
CREATE TABLE IF NOT EXISTS id_counters (
    kind     TEXT PRIMARY KEY,
    last_id  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS nodes (
    kind        TEXT NOT NULL,      -- 'person' | 'place' | 'organization' | ...
    node_id     INTEGER NOT NULL,
    props_json  TEXT NOT NULL,      -- JSON object; absent values are null
    PRIMARY KEY (kind, node_id)
);

CREATE TABLE IF NOT EXISTS edges (
    edge_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    kind        TEXT NOT NULL,      -- 'PARENT_OF' | 'MARRIED_TO' | ...
    from_kind   TEXT NOT NULL,
    from_id     INTEGER NOT NULL,
    to_kind     TEXT NOT NULL,
    to_id       INTEGER NOT NULL,
    props_json  TEXT NOT NULL DEFAULT '{}',
    FOREIGN KEY (from_kind, from_id) REFERENCES nodes(kind, node_id),
    FOREIGN KEY (to_kind, to_id)     REFERENCES nodes(kind, node_id)
);

CREATE INDEX IF NOT EXISTS edges_from_idx ON edges(from_kind, from_id, kind);
CREATE INDEX IF NOT EXISTS edges_to_idx   ON edges(to_kind, to_id, kind);
CREATE INDEX IF NOT EXISTS edges_kind_idx ON edges(kind);

PRAGMA user_version = 1;
";
