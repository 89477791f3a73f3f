//! Integration tests for `SqliteStore` against an in-memory database,
//! driven mostly through [`FamilyTree`].

mod entities;
mod rules;

use lineage_core::{FamilyTree, entity::Id, model::Person};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn tree() -> FamilyTree<SqliteStore> { FamilyTree::new(store().await) }

/// Create a person with only a name and return its id.
async fn person(tree: &FamilyTree<SqliteStore>, name: &str) -> Id {
  tree.create_person(Person::named(name)).await.unwrap().id
}

fn some(s: &str) -> Option<String> { Some(s.to_owned()) }
