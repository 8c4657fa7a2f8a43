//! # odyss-core
//!
//! Core types, traits, and abstractions for the Odyss notes service.
//!
//! This crate provides the domain records (users, vaults, folders, notes,
//! versions), the error taxonomy shared by every other crate, the repository
//! trait seams, and the pure pieces of the link graph: wikilink extraction,
//! title resolution, and graph assembly.

pub mod defaults;
pub mod error;
pub mod graph;
pub mod models;
pub mod traits;
pub mod wikilinks;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use graph::build_graph;
pub use models::*;
pub use traits::*;
pub use wikilinks::{extract_wikilinks, resolve_links, TitleIndex};
