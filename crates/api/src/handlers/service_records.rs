//! Service record handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use db::models::{NewServiceRecord, ServiceRecordPatch};
use db::repository::service_records;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::validate::{double_option, non_empty, non_negative, parse_date, round_cost};
use crate::AppState;

#[derive(serde::Deserialize)]
pub struct CreateServiceRecordDto {
    pub vehicle_id: Option<i64>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub service_date: Option<String>,
    pub mileage: Option<i64>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct UpdateServiceRecordDto {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub service_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub mileage: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cost: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    pub vehicle_id: Option<i64>,
}

#[derive(serde::Deserialize)]
pub struct ListQuery {
    pub vehicle_id: Option<i64>,
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateServiceRecordDto>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (vehicle_id, title, service_date) = match (
        payload.vehicle_id,
        non_empty(payload.title),
        non_empty(payload.service_date),
    ) {
        (Some(vehicle_id), Some(title), Some(date)) => (vehicle_id, title, date),
        _ => {
            return Err(ApiError::validation(
                "vehicle_id, title, and service_date are required.",
            ))
        }
    };

    let service_date = parse_date(&service_date)
        .map_err(|_| ApiError::validation("service_date must be YYYY-MM-DD."))?;
    let mileage = payload
        .mileage
        .map(|m| non_negative(m, "mileage"))
        .transpose()?;

    let record = service_records::create_service_record(
        &state.pool,
        user_id,
        vehicle_id,
        NewServiceRecord {
            title,
            category: non_empty(payload.category),
            service_date,
            mileage,
            cost: payload.cost.map(round_cost),
            notes: non_empty(payload.notes),
        },
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Service record not found.", "Vehicle not found."))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Service record created.",
            "service_record": record,
        })),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let rows = service_records::list_service_records(&state.pool, user_id, query.vehicle_id)
        .await
        .map_err(|e| ApiError::from_db(e, "Service record not found.", "Vehicle not found."))?;

    Ok(Json(json!({
        "message": "Service records retrieved.",
        "service_records": rows,
    })))
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(record_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let record = service_records::get_service_record(&state.pool, user_id, record_id)
        .await
        .map_err(|e| ApiError::from_db(e, "Service record not found.", "Vehicle not found."))?;

    Ok(Json(json!({
        "message": "Service record retrieved.",
        "service_record": record,
    })))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(record_id): Path<i64>,
    Json(payload): Json<UpdateServiceRecordDto>,
) -> Result<Json<Value>, ApiError> {
    let mut patch = ServiceRecordPatch::default();

    if let Some(title) = payload.title {
        let title =
            non_empty(title).ok_or_else(|| ApiError::validation("title cannot be empty."))?;
        patch.title = Some(title);
    }
    if let Some(category) = payload.category {
        patch.category = Some(non_empty(category));
    }
    if let Some(service_date) = payload.service_date {
        // Required field: present-but-unparseable (or null) is rejected,
        // never silently cleared.
        let date = non_empty(service_date)
            .as_deref()
            .map(parse_date)
            .transpose()
            .map_err(|_| ApiError::validation("service_date must be YYYY-MM-DD."))?
            .ok_or_else(|| ApiError::validation("service_date must be YYYY-MM-DD."))?;
        patch.service_date = Some(date);
    }
    if let Some(mileage) = payload.mileage {
        patch.mileage = Some(mileage.map(|m| non_negative(m, "mileage")).transpose()?);
    }
    if let Some(cost) = payload.cost {
        patch.cost = Some(cost.map(round_cost));
    }
    if let Some(notes) = payload.notes {
        patch.notes = Some(non_empty(notes));
    }
    patch.vehicle_id = payload.vehicle_id;

    let record = service_records::update_service_record(&state.pool, user_id, record_id, patch)
        .await
        .map_err(|e| ApiError::from_db(e, "Service record not found.", "New vehicle not found."))?;

    Ok(Json(json!({
        "message": "Service record updated.",
        "service_record": record,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(record_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    service_records::delete_service_record(&state.pool, user_id, record_id)
        .await
        .map_err(|e| ApiError::from_db(e, "Service record not found.", "Vehicle not found."))?;

    Ok(Json(json!({ "message": "Service record deleted." })))
}
