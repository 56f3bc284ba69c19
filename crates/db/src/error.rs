//! Typed error type for the db crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("row not found")]
    NotFound,

    /// The referenced vehicle does not exist *for this caller*. A vehicle
    /// owned by another user is reported identically to a missing one.
    #[error("vehicle not found for caller")]
    VehicleNotFound,

    #[error("duplicate email")]
    DuplicateEmail,
}
