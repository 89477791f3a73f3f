//! Core types and trait definitions for the Lineage family-history graph.
//!
//! This crate is deliberately free of database dependencies. It defines the
//! entity and relationship model, the storage traits, and the two engines that
//! sit on top of storage: the consistency rules ([`rules`]) and the
//! genealogical traversals ([`traverse`]). [`FamilyTree`] ties them together
//! into the command/query surface used by callers.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod edge;
pub mod entity;
pub mod error;
pub mod model;
pub mod patch;
pub mod rules;
pub mod store;
pub mod traverse;
pub mod tree;
pub mod view;

pub use error::{Error, Result};
pub use tree::{FamilyTree, PersonFilter};
