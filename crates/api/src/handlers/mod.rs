//! Request handlers, one module per resource.
//!
//! Handlers are thin translation: decode the DTO, validate, call the
//! repository with the authenticated user's id, shape the JSON response.
//! The ownership check always happens in the repository, never here.

pub mod auth;
pub mod vehicles;
pub mod service_records;
pub mod reminders;

use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "servicetrack" }))
}
