//! Reminder CRUD operations.
//!
//! Same ownership-chain discipline as service records, plus the
//! `completed` list filter.

use chrono::Utc;

use crate::models::{NewReminder, ReminderFilter, ReminderPatch, ReminderRow};
use crate::repository::owned_vehicle;
use crate::{DbError, DbPool};

/// Insert a new reminder under a vehicle owned by `user_id`.
/// New reminders always start uncompleted.
pub async fn create_reminder(
    pool: &DbPool,
    user_id: i64,
    vehicle_id: i64,
    new: NewReminder,
) -> Result<ReminderRow, DbError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    owned_vehicle(&mut tx, user_id, vehicle_id).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO reminders
            (vehicle_id, title, due_date, due_mileage, is_completed, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, 0, ?, ?, ?)
        "#,
    )
    .bind(vehicle_id)
    .bind(&new.title)
    .bind(new.due_date)
    .bind(new.due_mileage)
    .bind(&new.notes)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let row = sqlx::query_as::<_, ReminderRow>("SELECT * FROM reminders WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(row)
}

/// Return the caller's reminders, newest first. An unowned `vehicle_id`
/// filter matches nothing rather than erroring.
pub async fn list_reminders(
    pool: &DbPool,
    user_id: i64,
    filter: ReminderFilter,
) -> Result<Vec<ReminderRow>, DbError> {
    let mut sql = String::from(
        r#"
        SELECT r.* FROM reminders r
        JOIN vehicles v ON v.id = r.vehicle_id
        WHERE v.user_id = ?
        "#,
    );
    if filter.vehicle_id.is_some() {
        sql.push_str(" AND r.vehicle_id = ?");
    }
    if filter.completed.is_some() {
        sql.push_str(" AND r.is_completed = ?");
    }
    sql.push_str(" ORDER BY r.created_at DESC");

    let mut query = sqlx::query_as::<_, ReminderRow>(&sql).bind(user_id);
    if let Some(vehicle_id) = filter.vehicle_id {
        query = query.bind(vehicle_id);
    }
    if let Some(completed) = filter.completed {
        query = query.bind(completed);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

/// Fetch a single reminder, only if the caller owns its vehicle.
pub async fn get_reminder(pool: &DbPool, user_id: i64, reminder_id: i64) -> Result<ReminderRow, DbError> {
    sqlx::query_as::<_, ReminderRow>(
        r#"
        SELECT r.* FROM reminders r
        JOIN vehicles v ON v.id = r.vehicle_id
        WHERE r.id = ? AND v.user_id = ?
        "#,
    )
    .bind(reminder_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Apply a patch to an owned reminder. A `vehicle_id` move re-checks
/// ownership of the destination; on failure the reminder keeps its
/// original vehicle.
pub async fn update_reminder(
    pool: &DbPool,
    user_id: i64,
    reminder_id: i64,
    patch: ReminderPatch,
) -> Result<ReminderRow, DbError> {
    let mut tx = pool.begin().await?;

    let mut row = sqlx::query_as::<_, ReminderRow>(
        r#"
        SELECT r.* FROM reminders r
        JOIN vehicles v ON v.id = r.vehicle_id
        WHERE r.id = ? AND v.user_id = ?
        "#,
    )
    .bind(reminder_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    if let Some(title) = patch.title {
        row.title = title;
    }
    if let Some(due_date) = patch.due_date {
        row.due_date = due_date;
    }
    if let Some(due_mileage) = patch.due_mileage {
        row.due_mileage = due_mileage;
    }
    if let Some(is_completed) = patch.is_completed {
        row.is_completed = is_completed;
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
        UPDATE reminders
        SET vehicle_id = ?, title = ?, due_date = ?, due_mileage = ?,
            is_completed = ?, notes = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(row.vehicle_id)
    .bind(&row.title)
    .bind(row.due_date)
    .bind(row.due_mileage)
    .bind(row.is_completed)
    .bind(&row.notes)
    .bind(row.updated_at)
    .bind(reminder_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Delete an owned reminder. Leaf delete, no children.
pub async fn delete_reminder(pool: &DbPool, user_id: i64, reminder_id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        r#"
        DELETE FROM reminders
        WHERE id = ? AND vehicle_id IN (SELECT id FROM vehicles WHERE user_id = ?)
        "#,
    )
    .bind(reminder_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
