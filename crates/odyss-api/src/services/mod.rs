//! Services layered over the repositories.

pub mod credentials;

pub use credentials::{CredentialService, Session};
