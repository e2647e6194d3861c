// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, BookAppointmentRequest, FreeSlotsQuery, RescheduleAppointmentRequest,
    TimeSlot, ValidateBookingRequest,
};
use crate::services::booking::AppointmentBookingService;

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::Booking(booking) => AppError::BookingRejected {
                code: booking.code().to_string(),
                message: booking.to_string(),
                conflict: booking.is_conflict(),
            },
            AppointmentError::RejectedByServer(detail) => {
                tracing::warn!("Clinic service refused booking: {}", detail);
                AppError::BookingRejected {
                    code: "rejected_by_server".to_string(),
                    message: "The selected slot is no longer available, please pick another slot".to_string(),
                    conflict: true,
                }
            }
            AppointmentError::StatusChangeRejected(detail) => {
                tracing::warn!("Clinic service refused status change: {}", detail);
                AppError::Conflict(
                    "The clinic service refused to change this appointment, please refresh and try again"
                        .to_string(),
                )
            }
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
            AppointmentError::Unauthorized => {
                AppError::Forbidden("Not authorized to manage this appointment".to_string())
            }
            AppointmentError::InvalidStatusTransition(status) => AppError::Conflict(format!(
                "Appointment cannot be modified in current status: {}",
                status
            )),
            AppointmentError::ExternalService(msg) => AppError::ExternalService(msg),
        }
    }
}

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

pub async fn get_slot_catalog() -> Json<Value> {
    Json(json!({
        "slots": TimeSlot::ALL
    }))
}

#[axum::debug_handler]
pub async fn get_free_slots_public(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<FreeSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let response = booking_service
        .free_slots(&doctor_id, query.date, None, None)
        .await?;

    Ok(Json(json!(response)))
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_reschedule_free_slots(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
    Extension(session): Extension<Session>,
    Query(query): Query<FreeSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let response = booking_service
        .reschedule_free_slots(&session, &appointment_id, query.date)
        .await?;

    Ok(Json(json!(response)))
}

#[axum::debug_handler]
pub async fn validate_booking(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
    Json(request): Json<ValidateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let validated = booking_service.validate(&session, &request).await?;

    Ok(Json(json!({
        "valid": true,
        "slot": validated
    })))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.book_appointment(&session, request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
    Extension(session): Extension<Session>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service
        .reschedule_appointment(&session, &appointment_id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment rescheduled successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.cancel_appointment(&session, &appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_my_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service
        .get_patient_appointments(session.user_id(), &session.access_token)
        .await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}
