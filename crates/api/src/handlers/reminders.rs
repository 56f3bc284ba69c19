//! Reminder handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use db::models::{NewReminder, ReminderFilter, ReminderPatch};
use db::repository::reminders;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::validate::{double_option, non_empty, non_negative, parse_date};
use crate::AppState;

#[derive(serde::Deserialize)]
pub struct CreateReminderDto {
    pub vehicle_id: Option<i64>,
    pub title: Option<String>,
    pub due_date: Option<String>,
    pub due_mileage: Option<i64>,
    pub notes: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct UpdateReminderDto {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_mileage: Option<Option<i64>>,
    pub is_completed: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    pub vehicle_id: Option<i64>,
}

#[derive(serde::Deserialize)]
pub struct ListQuery {
    pub vehicle_id: Option<i64>,
    pub completed: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateReminderDto>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (vehicle_id, title) = match (payload.vehicle_id, non_empty(payload.title)) {
        (Some(vehicle_id), Some(title)) => (vehicle_id, title),
        _ => return Err(ApiError::validation("vehicle_id and title are required.")),
    };

    let due_date_raw = non_empty(payload.due_date);
    if due_date_raw.is_none() && payload.due_mileage.is_none() {
        return Err(ApiError::validation("Provide due_date or due_mileage."));
    }

    let due_date = due_date_raw
        .as_deref()
        .map(parse_date)
        .transpose()
        .map_err(|_| ApiError::validation("due_date must be YYYY-MM-DD."))?;
    let due_mileage = payload
        .due_mileage
        .map(|m| non_negative(m, "due_mileage"))
        .transpose()?;

    let reminder = reminders::create_reminder(
        &state.pool,
        user_id,
        vehicle_id,
        NewReminder {
            title,
            due_date,
            due_mileage,
            notes: non_empty(payload.notes),
        },
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Reminder not found.", "Vehicle not found."))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Reminder created.",
            "reminder": reminder,
        })),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    // "true"/"false" in any case filter; anything else is ignored.
    let completed = query
        .completed
        .as_deref()
        .and_then(|value| match value.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        });

    let rows = reminders::list_reminders(
        &state.pool,
        user_id,
        ReminderFilter {
            vehicle_id: query.vehicle_id,
            completed,
        },
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Reminder not found.", "Vehicle not found."))?;

    Ok(Json(json!({
        "message": "Reminders retrieved.",
        "reminders": rows,
    })))
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(reminder_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let reminder = reminders::get_reminder(&state.pool, user_id, reminder_id)
        .await
        .map_err(|e| ApiError::from_db(e, "Reminder not found.", "Vehicle not found."))?;

    Ok(Json(json!({
        "message": "Reminder retrieved.",
        "reminder": reminder,
    })))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(reminder_id): Path<i64>,
    Json(payload): Json<UpdateReminderDto>,
) -> Result<Json<Value>, ApiError> {
    let mut patch = ReminderPatch::default();

    if let Some(title) = payload.title {
        let title =
            non_empty(title).ok_or_else(|| ApiError::validation("title cannot be empty."))?;
        patch.title = Some(title);
    }
    if let Some(due_date) = payload.due_date {
        // Optional date: explicit null or blank clears, bad text is rejected.
        let date = non_empty(due_date)
            .as_deref()
            .map(parse_date)
            .transpose()
            .map_err(|_| ApiError::validation("due_date must be YYYY-MM-DD."))?;
        patch.due_date = Some(date);
    }
    if let Some(due_mileage) = payload.due_mileage {
        patch.due_mileage = Some(
            due_mileage
                .map(|m| non_negative(m, "due_mileage"))
                .transpose()?,
        );
    }
    if let Some(is_completed) = payload.is_completed {
        patch.is_completed = Some(is_completed);
    }
    if let Some(notes) = payload.notes {
        patch.notes = Some(non_empty(notes));
    }
    patch.vehicle_id = payload.vehicle_id;

    let reminder = reminders::update_reminder(&state.pool, user_id, reminder_id, patch)
        .await
        .map_err(|e| ApiError::from_db(e, "Reminder not found.", "New vehicle not found."))?;

    Ok(Json(json!({
        "message": "Reminder updated.",
        "reminder": reminder,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(reminder_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    reminders::delete_reminder(&state.pool, user_id, reminder_id)
        .await
        .map_err(|e| ApiError::from_db(e, "Reminder not found.", "Vehicle not found."))?;

    Ok(Json(json!({ "message": "Reminder deleted." })))
}
