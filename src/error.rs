//! The error taxonomy for ledger operations.
//!
//! Every failure mode that a caller may need to branch on has its own variant.
//! Plumbing failures (disk, permissions, malformed JSON) are wrapped in
//! `Error::Storage` with the full `anyhow` context chain preserved.

use rust_decimal::Decimal;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A record failed validation and cannot be accepted.
    #[error("invalid record: {0}")]
    Validation(String),

    /// Validation stripped every row from a non-empty input. Saving would
    /// destroy the prior ledger, so the operation is aborted. An intentional
    /// clear must go through `LedgerStore::clear` instead.
    #[error("validation removed every row; refusing to overwrite the ledger")]
    EmptyLedger,

    /// A disk or serialization failure. The prior durable state is unchanged.
    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),

    /// The username/secret pair did not match a stored profile.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Registration was attempted with a username that already exists.
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    /// The username does not meet the registration policy.
    #[error("username '{name}' is not valid: {reason}")]
    InvalidUsername { name: String, reason: String },

    /// Daily goals must be zero (unset) or positive.
    #[error("daily goal cannot be negative, got {0}")]
    InvalidGoal(Decimal),

    /// A ledger operation was attempted without an authenticated session.
    #[error("no user is logged in")]
    NotAuthenticated,
}
