//! HTTP handlers, one module per resource.

pub mod auth;
pub mod folders;
pub mod graph;
pub mod health;
pub mod notes;
pub mod vaults;
pub mod versions;

use serde::Serialize;

/// Plain acknowledgement body, e.g. `{"message": "Note deleted"}`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}
