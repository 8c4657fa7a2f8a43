//! Centralized default constants for the Odyss notes service.
//!
//! **This module is the single source of truth** for shared limits and
//! defaults. Crates reference these constants instead of defining their own
//! magic numbers. The token lifetime lives with the signing code as
//! `odyss_crypto::DEFAULT_TOKEN_TTL_MINUTES`.

// =============================================================================
// VAULTS
// =============================================================================

/// Maximum number of vaults a single owner may hold.
pub const MAX_VAULTS_PER_OWNER: i64 = 3;

/// Name of the default vault created at registration.
pub const DEFAULT_VAULT_NAME: &str = "My Vault";

/// Name of the default vault created for guest accounts.
pub const GUEST_VAULT_NAME: &str = "Guest Vault";

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Username length bounds at registration.
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;

/// Domain used for generated guest email addresses.
pub const GUEST_EMAIL_DOMAIN: &str = "odyssvault.local";

/// Prefix for generated guest usernames and emails.
pub const GUEST_PREFIX: &str = "guest_";

/// Number of characters of the random identifier used in guest names.
pub const GUEST_ID_LEN: usize = 8;

// =============================================================================
// NOTES AND FOLDERS
// =============================================================================

/// Maximum length of note titles, folder names, and vault names.
pub const NAME_MAX_LEN: usize = 255;

/// File extension used for the derived note filename.
pub const NOTE_FILE_EXTENSION: &str = "od";
