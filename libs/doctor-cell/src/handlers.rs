use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Local;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{AvailabilityQuery, DoctorDayAvailability, DoctorError};
use crate::services::DoctorService;

impl From<DoctorError> for AppError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::ExternalService(msg) => AppError::ExternalService(msg),
        }
    }
}

/// Whether the doctor sees patients on the requested date (default: today).
#[axum::debug_handler]
pub async fn get_doctor_availability_public(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let availability = doctor_service.get_doctor_availability(&doctor_id, None).await?;
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());

    Ok(Json(json!(DoctorDayAvailability::for_date(&availability, date))))
}
