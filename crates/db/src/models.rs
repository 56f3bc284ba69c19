//! Row structs that map 1-to-1 onto database tables, plus the typed
//! input structs the repository functions accept.
//!
//! Rows are *persistence* models — they carry no request/response shaping.
//! Patch structs use a double `Option`: the outer level records whether the
//! caller supplied the field at all, the inner level is the new value
//! (`Some(None)` clears a nullable column). Plain nullable types alone
//! cannot express "key absent" vs "key present, value null".

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

/// A persisted user row. `password_hash` never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a user. Email must already be lowercased.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Partial profile update.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub first_name: Option<Option<String>>,
    pub last_name: Option<Option<String>>,
    /// Already lowercased; duplicate check happens inside the update.
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

// ---------------------------------------------------------------------------
// vehicles
// ---------------------------------------------------------------------------

/// A persisted vehicle row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VehicleRow {
    pub id: i64,
    pub user_id: i64,
    pub nickname: Option<String>,
    pub vin: Option<String>,
    pub year: Option<i64>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub trim: Option<String>,
    pub engine: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a vehicle. VIN must already be validated.
#[derive(Debug, Clone, Default)]
pub struct NewVehicle {
    pub nickname: Option<String>,
    pub vin: Option<String>,
    pub year: Option<i64>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub trim: Option<String>,
    pub engine: Option<String>,
}

/// Partial vehicle update.
#[derive(Debug, Default)]
pub struct VehiclePatch {
    pub nickname: Option<Option<String>>,
    pub vin: Option<Option<String>>,
    pub year: Option<Option<i64>>,
    pub make: Option<Option<String>>,
    pub model: Option<Option<String>>,
    pub trim: Option<Option<String>>,
    pub engine: Option<Option<String>>,
}

// ---------------------------------------------------------------------------
// service_records
// ---------------------------------------------------------------------------

/// A persisted service record row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceRecordRow {
    pub id: i64,
    pub vehicle_id: i64,
    pub title: String,
    pub category: Option<String>,
    pub service_date: NaiveDate,
    pub mileage: Option<i64>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a service record.
#[derive(Debug, Clone)]
pub struct NewServiceRecord {
    pub title: String,
    pub category: Option<String>,
    pub service_date: NaiveDate,
    pub mileage: Option<i64>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

/// Partial service record update. `vehicle_id` moves the record to another
/// vehicle; ownership of the destination is re-checked by the repository.
#[derive(Debug, Default)]
pub struct ServiceRecordPatch {
    pub title: Option<String>,
    pub category: Option<Option<String>>,
    pub service_date: Option<NaiveDate>,
    pub mileage: Option<Option<i64>>,
    pub cost: Option<Option<f64>>,
    pub notes: Option<Option<String>>,
    pub vehicle_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// reminders
// ---------------------------------------------------------------------------

/// A persisted reminder row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReminderRow {
    pub id: i64,
    pub vehicle_id: i64,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub due_mileage: Option<i64>,
    pub is_completed: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a reminder. At least one of `due_date` /
/// `due_mileage` must be present; callers validate before insert.
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub due_mileage: Option<i64>,
    pub notes: Option<String>,
}

/// Partial reminder update.
#[derive(Debug, Default)]
pub struct ReminderPatch {
    pub title: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub due_mileage: Option<Option<i64>>,
    pub is_completed: Option<bool>,
    pub notes: Option<Option<String>>,
    pub vehicle_id: Option<i64>,
}

/// Filters accepted by `repository::reminders::list_reminders`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReminderFilter {
    pub vehicle_id: Option<i64>,
    pub completed: Option<bool>,
}
