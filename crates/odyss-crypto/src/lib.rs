//! # odyss-crypto
//!
//! Credential primitives for the Odyss notes service.
//!
//! - **Password hashing**: Argon2id, PHC string output, input truncated to
//!   72 bytes before hashing
//! - **Session tokens**: HS256 JWTs carrying the user id as `sub`, with an
//!   `exp` claim (7 days by default)
//!
//! Verification paths never raise: a malformed hash verifies as `false`, an
//! expired or tampered token resolves to `None`.
//!
//! ## Examples
//!
//! ```rust
//! use odyss_crypto::{hash_password, verify_password, SessionTokens};
//!
//! let hash = hash_password("secret1").unwrap();
//! assert!(verify_password("secret1", &hash));
//!
//! let tokens = SessionTokens::new("signing-key");
//! let token = tokens.issue(42).unwrap();
//! assert_eq!(tokens.resolve(&token), Some(42));
//! ```

pub mod error;
pub mod password;
pub mod token;

pub use error::{CryptoError, CryptoResult};
pub use password::{hash_password, random_secret, verify_password};
pub use token::{Claims, SessionTokens, DEFAULT_TOKEN_TTL_MINUTES};
