//! User CRUD operations.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::models::{NewUser, UserPatch, UserRow};
use crate::{DbError, DbPool};

/// Insert a new user. Fails with `DuplicateEmail` if the (lowercased)
/// email is already taken.
pub async fn create_user(pool: &DbPool, new: NewUser) -> Result<UserRow, DbError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    if email_taken(&mut tx, &new.email, None).await? {
        return Err(DbError::DuplicateEmail);
    }

    let result = sqlx::query(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.email)
    .bind(&new.password_hash)
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let row = fetch_user(&mut tx, result.last_insert_rowid()).await?;
    tx.commit().await?;

    Ok(row)
}

/// Fetch a single user by primary key.
pub async fn get_user(pool: &DbPool, user_id: i64) -> Result<UserRow, DbError> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Fetch a user by email (already lowercased by the caller).
pub async fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Apply a profile patch. A changed email is re-checked for uniqueness
/// against every other user inside the same transaction.
pub async fn update_user(pool: &DbPool, user_id: i64, patch: UserPatch) -> Result<UserRow, DbError> {
    let mut tx = pool.begin().await?;

    let mut row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

    if let Some(first_name) = patch.first_name {
        row.first_name = first_name;
    }
    if let Some(last_name) = patch.last_name {
        row.last_name = last_name;
    }
    if let Some(email) = patch.email {
        if email != row.email && email_taken(&mut tx, &email, Some(user_id)).await? {
            return Err(DbError::DuplicateEmail);
        }
        row.email = email;
    }
    if let Some(password_hash) = patch.password_hash {
        row.password_hash = password_hash;
    }
    row.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE users
        SET email = ?, password_hash = ?, first_name = ?, last_name = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&row.email)
    .bind(&row.password_hash)
    .bind(&row.first_name)
    .bind(&row.last_name)
    .bind(row.updated_at)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Delete a user and everything they own. Children are removed bottom-up
/// (records and reminders, then vehicles, then the user) in one transaction.
pub async fn delete_user(pool: &DbPool, user_id: i64) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(DbError::NotFound);
    }

    sqlx::query(
        "DELETE FROM service_records WHERE vehicle_id IN (SELECT id FROM vehicles WHERE user_id = ?)",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "DELETE FROM reminders WHERE vehicle_id IN (SELECT id FROM vehicles WHERE user_id = ?)",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM vehicles WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

async fn fetch_user(conn: &mut SqliteConnection, user_id: i64) -> Result<UserRow, DbError> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(conn)
        .await?
        .ok_or(DbError::NotFound)
}

/// True if `email` belongs to a user other than `exclude`.
async fn email_taken(
    conn: &mut SqliteConnection,
    email: &str,
    exclude: Option<i64>,
) -> Result<bool, DbError> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(conn)
        .await?;

    Ok(match (existing, exclude) {
        (Some(id), Some(own)) => id != own,
        (Some(_), None) => true,
        (None, _) => false,
    })
}
