//! Service record CRUD operations.
//!
//! Every access resolves the ownership chain record → vehicle → user with
//! an explicit join; nothing is derived from a cached owner field.

use chrono::Utc;

use crate::models::{NewServiceRecord, ServiceRecordPatch, ServiceRecordRow};
use crate::repository::owned_vehicle;
use crate::{DbError, DbPool};

/// Insert a new service record under a vehicle owned by `user_id`.
///
/// Returns `VehicleNotFound` if the vehicle does not resolve for this
/// caller — whether it is missing or owned by someone else.
pub async fn create_service_record(
    pool: &DbPool,
    user_id: i64,
    vehicle_id: i64,
    new: NewServiceRecord,
) -> Result<ServiceRecordRow, DbError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    owned_vehicle(&mut tx, user_id, vehicle_id).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO service_records
            (vehicle_id, title, category, service_date, mileage, cost, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(vehicle_id)
    .bind(&new.title)
    .bind(&new.category)
    .bind(new.service_date)
    .bind(new.mileage)
    .bind(new.cost)
    .bind(&new.notes)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let row = sqlx::query_as::<_, ServiceRecordRow>("SELECT * FROM service_records WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(row)
}

/// Return all of the caller's service records, most recent service first.
///
/// `vehicle_id` narrows to one vehicle; a vehicle the caller does not own
/// simply matches nothing.
pub async fn list_service_records(
    pool: &DbPool,
    user_id: i64,
    vehicle_id: Option<i64>,
) -> Result<Vec<ServiceRecordRow>, DbError> {
    let mut sql = String::from(
        r#"
        SELECT r.* FROM service_records r
        JOIN vehicles v ON v.id = r.vehicle_id
        WHERE v.user_id = ?
        "#,
    );
    if vehicle_id.is_some() {
        sql.push_str(" AND r.vehicle_id = ?");
    }
    sql.push_str(" ORDER BY r.service_date DESC");

    let mut query = sqlx::query_as::<_, ServiceRecordRow>(&sql).bind(user_id);
    if let Some(vehicle_id) = vehicle_id {
        query = query.bind(vehicle_id);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

/// Fetch a single service record, only if the caller owns its vehicle.
pub async fn get_service_record(
    pool: &DbPool,
    user_id: i64,
    record_id: i64,
) -> Result<ServiceRecordRow, DbError> {
    sqlx::query_as::<_, ServiceRecordRow>(
        r#"
        SELECT r.* FROM service_records r
        JOIN vehicles v ON v.id = r.vehicle_id
        WHERE r.id = ? AND v.user_id = ?
        "#,
    )
    .bind(record_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Apply a patch to an owned service record. A `vehicle_id` move re-checks
/// ownership of the destination inside the same transaction; on failure the
/// transaction rolls back and the record is untouched.
pub async fn update_service_record(
    pool: &DbPool,
    user_id: i64,
    record_id: i64,
    patch: ServiceRecordPatch,
) -> Result<ServiceRecordRow, DbError> {
    let mut tx = pool.begin().await?;

    let mut row = sqlx::query_as::<_, ServiceRecordRow>(
        r#"
        SELECT r.* FROM service_records r
        JOIN vehicles v ON v.id = r.vehicle_id
        WHERE r.id = ? AND v.user_id = ?
        "#,
    )
    .bind(record_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    if let Some(title) = patch.title {
        row.title = title;
    }
    if let Some(category) = patch.category {
        row.category = category;
    }
    if let Some(service_date) = patch.service_date {
        row.service_date = service_date;
    }
    if let Some(mileage) = patch.mileage {
        row.mileage = mileage;
    }
    if let Some(cost) = patch.cost {
        row.cost = cost;
    }
    if let Some(notes) = patch.notes {
        row.notes = notes;
    }
    if let Some(vehicle_id) = patch.vehicle_id {
        owned_vehicle(&mut tx, user_id, vehicle_id).await?;
        row.vehicle_id = vehicle_id;
    }
    row.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE service_records
        SET vehicle_id = ?, title = ?, category = ?, service_date = ?,
            mileage = ?, cost = ?, notes = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(row.vehicle_id)
    .bind(&row.title)
    .bind(&row.category)
    .bind(row.service_date)
    .bind(row.mileage)
    .bind(row.cost)
    .bind(&row.notes)
    .bind(row.updated_at)
    .bind(record_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Delete an owned service record. Leaf delete, no children.
pub async fn delete_service_record(
    pool: &DbPool,
    user_id: i64,
    record_id: i64,
) -> Result<(), DbError> {
    let result = sqlx::query(
        r#"
        DELETE FROM service_records
        WHERE id = ? AND vehicle_id IN (SELECT id FROM vehicles WHERE user_id = ?)
        "#,
    )
    .bind(record_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
