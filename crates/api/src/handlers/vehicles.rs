//! Vehicle handlers.
//!
//! VIN decoding is advisory: decoded values only fill fields the caller
//! left blank, and a decoder failure never fails the request.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use db::models::{NewVehicle, VehiclePatch};
use db::repository::vehicles;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::validate::{double_option, non_empty, normalize_vin};
use crate::AppState;

#[derive(serde::Deserialize)]
pub struct CreateVehicleDto {
    pub nickname: Option<String>,
    pub vin: Option<String>,
    pub year: Option<i64>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub trim: Option<String>,
    pub engine: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct UpdateVehicleDto {
    #[serde(default, deserialize_with = "double_option")]
    pub nickname: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub vin: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub year: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub make: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub model: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub trim: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub engine: Option<Option<String>>,
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateVehicleDto>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let vin = match non_empty(payload.vin) {
        Some(raw) => Some(normalize_vin(&raw)?),
        None => None,
    };

    let mut new = NewVehicle {
        nickname: non_empty(payload.nickname),
        vin,
        year: payload.year,
        make: non_empty(payload.make),
        model: non_empty(payload.model),
        trim: non_empty(payload.trim),
        engine: non_empty(payload.engine),
    };

    if let Some(vin) = &new.vin {
        if let Some(decoded) = state.vin.decode(vin).await {
            new.year = new.year.or(decoded.year);
            new.make = new.make.or(decoded.make);
            new.model = new.model.or(decoded.model);
            new.trim = new.trim.or(decoded.trim);
            new.engine = new.engine.or(decoded.engine);
        }
    }

    let vehicle = vehicles::create_vehicle(&state.pool, user_id, new)
        .await
        .map_err(|e| ApiError::from_db(e, "Vehicle not found.", "Vehicle not found."))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Vehicle created.",
            "vehicle": vehicle,
        })),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let rows = vehicles::list_vehicles(&state.pool, user_id)
        .await
        .map_err(|e| ApiError::from_db(e, "Vehicle not found.", "Vehicle not found."))?;

    Ok(Json(json!({
        "message": "Vehicles retrieved.",
        "vehicles": rows,
    })))
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let vehicle = vehicles::get_vehicle(&state.pool, user_id, vehicle_id)
        .await
        .map_err(|e| ApiError::from_db(e, "Vehicle not found.", "Vehicle not found."))?;

    Ok(Json(json!({
        "message": "Vehicle retrieved.",
        "vehicle": vehicle,
    })))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
    Json(payload): Json<UpdateVehicleDto>,
) -> Result<Json<Value>, ApiError> {
    let mut patch = VehiclePatch::default();

    if let Some(vin) = payload.vin {
        patch.vin = Some(match non_empty(vin) {
            Some(raw) => Some(normalize_vin(&raw)?),
            None => None,
        });
    }
    if let Some(nickname) = payload.nickname {
        patch.nickname = Some(non_empty(nickname));
    }
    if let Some(year) = payload.year {
        patch.year = Some(year);
    }
    if let Some(make) = payload.make {
        patch.make = Some(non_empty(make));
    }
    if let Some(model) = payload.model {
        patch.model = Some(non_empty(model));
    }
    if let Some(trim) = payload.trim {
        patch.trim = Some(non_empty(trim));
    }
    if let Some(engine) = payload.engine {
        patch.engine = Some(non_empty(engine));
    }

    // A newly supplied VIN triggers enrichment for the fields this request
    // did not set itself.
    if let Some(Some(vin)) = &patch.vin {
        if let Some(decoded) = state.vin.decode(vin).await {
            if patch.year.is_none() {
                patch.year = decoded.year.map(Some);
            }
            if patch.make.is_none() {
                patch.make = decoded.make.map(Some);
            }
            if patch.model.is_none() {
                patch.model = decoded.model.map(Some);
            }
            if patch.trim.is_none() {
                patch.trim = decoded.trim.map(Some);
            }
            if patch.engine.is_none() {
                patch.engine = decoded.engine.map(Some);
            }
        }
    }

    let vehicle = vehicles::update_vehicle(&state.pool, user_id, vehicle_id, patch)
        .await
        .map_err(|e| ApiError::from_db(e, "Vehicle not found.", "Vehicle not found."))?;

    Ok(Json(json!({
        "message": "Vehicle updated.",
        "vehicle": vehicle,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    vehicles::delete_vehicle(&state.pool, user_id, vehicle_id)
        .await
        .map_err(|e| ApiError::from_db(e, "Vehicle not found.", "Vehicle not found."))?;

    Ok(Json(json!({ "message": "Vehicle deleted." })))
}
