//! Repository functions — one function per database operation.
//!
//! Every function takes a `&DbPool` plus the calling user's id and returns
//! a `Result<T, DbError>`. Ownership of the chain Resource → Vehicle → User
//! is re-verified with a join on every call, never cached: a resource that
//! exists but belongs to someone else is indistinguishable from one that
//! does not exist.

pub mod users;
pub mod vehicles;
pub mod service_records;
pub mod reminders;


use sqlx::SqliteConnection;

use crate::DbError;

/// Resolve `vehicle_id` to a vehicle owned by `user_id`, or
/// `VehicleNotFound`. Used by child resources before attaching rows to a
/// vehicle; runs inside the caller's transaction.
pub(crate) async fn owned_vehicle(
    conn: &mut SqliteConnection,
    user_id: i64,
    vehicle_id: i64,
) -> Result<(), DbError> {
    let owned: Option<i64> =
        sqlx::query_scalar("SELECT id FROM vehicles WHERE id = ? AND user_id = ?")
            .bind(vehicle_id)
            .bind(user_id)
            .fetch_optional(conn)
            .await?;

    owned.map(|_| ()).ok_or(DbError::VehicleNotFound)
}
