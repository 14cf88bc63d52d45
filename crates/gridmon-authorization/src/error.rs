//! Error types for the authorization engine.
//!
//! The error surface is narrow. Unknown roles, missing matrix entries,
//! unassigned principals, and malformed hierarchy data are all ordinary
//! deny/empty outcomes, not errors. The only thing that can fail is the
//! backing storage itself, and that failure propagates so the caller fails
//! the request as authorization-indeterminate instead of guessing.

use thiserror::Error;

/// Errors that can occur during authorization evaluation.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// The backing storage could not be read during a permission or
    /// hierarchy load. The caller must fail the request; there is no
    /// fallback decision.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Convenience Result type for the authorization engine.
pub type Result<T> = std::result::Result<T, AuthorizationError>;
