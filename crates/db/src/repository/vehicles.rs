//! Vehicle CRUD operations, scoped to the owning user.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::models::{NewVehicle, VehiclePatch, VehicleRow};
use crate::{DbError, DbPool};

/// Insert a new vehicle owned by `user_id`.
pub async fn create_vehicle(
    pool: &DbPool,
    user_id: i64,
    new: NewVehicle,
) -> Result<VehicleRow, DbError> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO vehicles
            (user_id, nickname, vin, year, make, model, trim, engine, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&new.nickname)
    .bind(&new.vin)
    .bind(new.year)
    .bind(&new.make)
    .bind(&new.model)
    .bind(&new.trim)
    .bind(&new.engine)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_vehicle(pool, user_id, result.last_insert_rowid()).await
}

/// Return all vehicles owned by `user_id`, newest first.
pub async fn list_vehicles(pool: &DbPool, user_id: i64) -> Result<Vec<VehicleRow>, DbError> {
    let rows = sqlx::query_as::<_, VehicleRow>(
        "SELECT * FROM vehicles WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch a single vehicle by id, only if `user_id` owns it.
pub async fn get_vehicle(pool: &DbPool, user_id: i64, vehicle_id: i64) -> Result<VehicleRow, DbError> {
    sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = ? AND user_id = ?")
        .bind(vehicle_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Apply a patch to an owned vehicle. Absent fields are left untouched.
pub async fn update_vehicle(
    pool: &DbPool,
    user_id: i64,
    vehicle_id: i64,
    patch: VehiclePatch,
) -> Result<VehicleRow, DbError> {
    let mut tx = pool.begin().await?;

    let mut row =
        sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = ? AND user_id = ?")
            .bind(vehicle_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound)?;

    if let Some(nickname) = patch.nickname {
        row.nickname = nickname;
    }
    if let Some(vin) = patch.vin {
        row.vin = vin;
    }
    if let Some(year) = patch.year {
        row.year = year;
    }
    if let Some(make) = patch.make {
        row.make = make;
    }
    if let Some(model) = patch.model {
        row.model = model;
    }
    if let Some(trim) = patch.trim {
        row.trim = trim;
    }
    if let Some(engine) = patch.engine {
        row.engine = engine;
    }
    row.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE vehicles
        SET nickname = ?, vin = ?, year = ?, make = ?, model = ?, trim = ?, engine = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&row.nickname)
    .bind(&row.vin)
    .bind(row.year)
    .bind(&row.make)
    .bind(&row.model)
    .bind(&row.trim)
    .bind(&row.engine)
    .bind(row.updated_at)
    .bind(vehicle_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Delete an owned vehicle and its service records and reminders, bottom-up,
/// in one transaction.
pub async fn delete_vehicle(pool: &DbPool, user_id: i64, vehicle_id: i64) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    ensure_owned(&mut tx, user_id, vehicle_id).await?;

    sqlx::query("DELETE FROM service_records WHERE vehicle_id = ?")
        .bind(vehicle_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM reminders WHERE vehicle_id = ?")
        .bind(vehicle_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM vehicles WHERE id = ?")
        .bind(vehicle_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Resolve `vehicle_id` to a vehicle owned by `user_id`, or `NotFound`.
async fn ensure_owned(
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

    owned.map(|_| ()).ok_or(DbError::NotFound)
}
