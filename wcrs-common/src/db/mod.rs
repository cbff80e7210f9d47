//! Database schema, models, and queries

pub mod episodes;
pub mod init;
pub mod models;
pub mod shows;
pub mod users;

pub use init::*;
pub use models::*;

use crate::error::Error;

/// Translate a storage-level uniqueness violation into a named conflict.
///
/// Conflict detection rides on the SQLite constraints, not application
/// pre-checks; the storage-engine text never reaches callers.
pub(crate) fn map_unique_violation(err: sqlx::Error, conflict: Error) -> Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => conflict,
        _ => Error::Database(err),
    }
}
