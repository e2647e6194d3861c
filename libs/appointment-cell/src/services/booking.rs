// libs/appointment-cell/src/services/booking.rs
use chrono::{Local, NaiveDate};
use reqwest::Method;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::{ClinicApiClient, ClinicApiError};
use shared_models::auth::Session;
use doctor_cell::models::{Doctor, DoctorError};
use doctor_cell::services::DoctorService;

use crate::models::{
    format_api_date, AppointmentError, AppointmentSlotRequest, AppointmentStatus,
    BookAppointmentRequest, BookingError, CreateAppointmentPayload, ExistingAppointment,
    FreeSlotsResponse, RescheduleAppointmentRequest, StatusUpdatePayload,
    UpdateAppointmentPayload, ValidateBookingRequest, ValidatedSlot,
};
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::resolver::{
    free_slots_for, has_conflicting_active_appointment, validate_booking_request,
};

pub const APPOINTMENTS_PATH: &str = "/api/appointments";

/// Fetches what the resolver needs from the clinic API, runs it, and submits
/// the writes that pass. Slot decisions are never made here directly.
pub struct AppointmentBookingService {
    client: ClinicApiClient,
    doctor_service: DoctorService,
    lifecycle_service: AppointmentLifecycleService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        let client = ClinicApiClient::new(config);

        Self {
            doctor_service: DoctorService::with_client(client.clone()),
            client,
            lifecycle_service: AppointmentLifecycleService::new(),
        }
    }

    /// Local calendar date; booking rules never look at the time of day.
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    /// Free slots for a doctor on a date, as shown in the booking form.
    pub async fn free_slots(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        exclude_appointment_id: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<FreeSlotsResponse, AppointmentError> {
        debug!("Computing free slots for doctor {} on {}", doctor_id, date);

        let doctor = self.get_doctor(doctor_id, auth_token).await?;
        let availability = doctor.availability();

        if !availability.is_available_on(date) {
            return Ok(FreeSlotsResponse {
                doctor_id: availability.doctor_id,
                date,
                available: false,
                free_slots: Vec::new(),
            });
        }

        let existing = self.get_doctor_appointments_on(doctor_id, date, auth_token).await?;
        let free_slots = free_slots_for(&availability, date, &existing, exclude_appointment_id);

        Ok(FreeSlotsResponse {
            doctor_id: availability.doctor_id,
            date,
            available: true,
            free_slots,
        })
    }

    /// Free slots for moving an appointment the session holds. Its own slot
    /// counts as free.
    pub async fn reschedule_free_slots(
        &self,
        session: &Session,
        appointment_id: &str,
        date: NaiveDate,
    ) -> Result<FreeSlotsResponse, AppointmentError> {
        let token = session.access_token.as_str();
        let current = self.get_movable_appointment(session, appointment_id, token).await?;

        self.free_slots(&current.doctor_id, date, Some(current.id.as_str()), Some(token))
            .await
    }

    /// Dry run of the booking rules. Reserves nothing.
    ///
    /// With an exclusion id this previews a reschedule, so the excluded
    /// appointment must be an active one held by the same patient.
    pub async fn validate(
        &self,
        session: &Session,
        request: &ValidateBookingRequest,
    ) -> Result<ValidatedSlot, AppointmentError> {
        let user_id = self.resolve_user(session, request.user_id.as_deref())?;
        let token = session.access_token.as_str();

        // The patient rule guards new bookings only; a reschedule moves an
        // appointment the patient already holds.
        match request.exclude_appointment_id.as_deref() {
            Some(appointment_id) => {
                let current = self.get_movable_appointment(session, appointment_id, token).await?;
                if current.user_id != user_id {
                    warn!(
                        "Appointment {} does not belong to patient {}",
                        appointment_id, user_id
                    );
                    return Err(AppointmentError::Unauthorized);
                }
            }
            None => self.ensure_no_active_appointment(&user_id, token).await?,
        }

        let slot_request = AppointmentSlotRequest::new(request.appointment_date, request.time_slot.clone());
        let (_, validated) = self
            .validate_slot(
                &request.doctor_id,
                &slot_request,
                request.exclude_appointment_id.as_deref(),
                token,
            )
            .await?;

        Ok(validated)
    }

    pub async fn book_appointment(
        &self,
        session: &Session,
        request: BookAppointmentRequest,
    ) -> Result<ExistingAppointment, AppointmentError> {
        let user_id = self.resolve_user(session, request.user_id.as_deref())?;
        let token = session.access_token.as_str();

        info!("Booking appointment for patient {} with doctor {}", user_id, request.doctor_id);

        self.ensure_no_active_appointment(&user_id, token).await?;

        let slot_request = AppointmentSlotRequest::new(request.appointment_date, request.time_slot);
        let (doctor, validated) = self
            .validate_slot(&request.doctor_id, &slot_request, None, token)
            .await?;

        let payload = CreateAppointmentPayload {
            doctor_id: validated.doctor_id.clone(),
            user_id: user_id.clone(),
            appointment_date: format_api_date(validated.date),
            time_slot: validated.time_slot.to_string(),
            total_amount: request.total_amount.or(doctor.fee).unwrap_or(0.0),
        };

        let body = serde_json::to_value(&payload)
            .map_err(|e| AppointmentError::ExternalService(e.to_string()))?;

        let appointment: ExistingAppointment = self
            .client
            .request(Method::POST, APPOINTMENTS_PATH, Some(token), Some(body))
            .await
            .map_err(|e| self.map_write_error(e))?;

        info!(
            "Appointment {} booked for patient {} with doctor {} on {} ({})",
            appointment.id, user_id, validated.doctor_id, validated.date, validated.time_slot
        );
        Ok(appointment)
    }

    pub async fn reschedule_appointment(
        &self,
        session: &Session,
        appointment_id: &str,
        request: RescheduleAppointmentRequest,
    ) -> Result<ExistingAppointment, AppointmentError> {
        let token = session.access_token.as_str();
        debug!("Rescheduling appointment: {}", appointment_id);

        let current = self.get_movable_appointment(session, appointment_id, token).await?;

        let doctor_id = request.doctor_id.unwrap_or_else(|| current.doctor_id.clone());
        let slot_request = AppointmentSlotRequest::new(request.appointment_date, request.time_slot);
        let (doctor, validated) = self
            .validate_slot(&doctor_id, &slot_request, Some(appointment_id), token)
            .await?;

        let payload = UpdateAppointmentPayload {
            appointment_id: current.id.clone(),
            doctor_id: validated.doctor_id.clone(),
            appointment_date: format_api_date(validated.date),
            time_slot: validated.time_slot.to_string(),
            user_id: current.user_id.clone(),
            total_amount: request
                .total_amount
                .or(current.total_amount)
                .or(doctor.fee)
                .unwrap_or(0.0),
        };

        let body = serde_json::to_value(&payload)
            .map_err(|e| AppointmentError::ExternalService(e.to_string()))?;

        let updated: ExistingAppointment = self
            .client
            .request(Method::PUT, &self.appointment_path(appointment_id), Some(token), Some(body))
            .await
            .map_err(|e| self.map_write_error(e))?;

        info!(
            "Appointment {} rescheduled to {} ({})",
            appointment_id, validated.date, validated.time_slot
        );
        Ok(updated)
    }

    /// Cancelling frees the slot for other patients.
    pub async fn cancel_appointment(
        &self,
        session: &Session,
        appointment_id: &str,
    ) -> Result<ExistingAppointment, AppointmentError> {
        let token = session.access_token.as_str();
        debug!("Cancelling appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id, token).await?;
        if !session.can_act_for(&current.user_id) {
            return Err(AppointmentError::Unauthorized);
        }
        self.lifecycle_service
            .validate_status_transition(&current.status, &AppointmentStatus::Cancelled)?;

        let body = serde_json::to_value(StatusUpdatePayload {
            status: AppointmentStatus::Cancelled,
        })
        .map_err(|e| AppointmentError::ExternalService(e.to_string()))?;

        let cancelled: ExistingAppointment = self
            .client
            .request(Method::PATCH, &self.appointment_path(appointment_id), Some(token), Some(body))
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    warn!("Clinic API refused to cancel appointment {}: {}", appointment_id, e);
                    AppointmentError::StatusChangeRejected(e.to_string())
                } else {
                    self.map_read_error(e)
                }
            })?;

        info!("Appointment {} cancelled", appointment_id);
        Ok(cancelled)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: &str,
        auth_token: &str,
    ) -> Result<ExistingAppointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        self.client
            .request(Method::GET, &self.appointment_path(appointment_id), Some(auth_token), None)
            .await
            .map_err(|e| self.map_read_error(e))
    }

    pub async fn get_patient_appointments(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<ExistingAppointment>, AppointmentError> {
        debug!("Fetching appointments for patient: {}", user_id);

        let path = format!("{}?userId={}", APPOINTMENTS_PATH, urlencoding::encode(user_id));
        let appointments: Vec<ExistingAppointment> = self
            .client
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| self.map_read_error(e))?;

        // The upstream filter is trusted for narrowing only.
        Ok(appointments.into_iter().filter(|apt| apt.user_id == user_id).collect())
    }

    pub async fn get_doctor_appointments_on(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Vec<ExistingAppointment>, AppointmentError> {
        let path = format!(
            "{}?doctorId={}&appointmentDate={}",
            APPOINTMENTS_PATH,
            urlencoding::encode(doctor_id),
            format_api_date(date)
        );

        self.client
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| self.map_read_error(e))
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    fn resolve_user(&self, session: &Session, requested: Option<&str>) -> Result<String, AppointmentError> {
        let user_id = requested.unwrap_or(session.user_id());

        if !session.can_act_for(user_id) {
            warn!("User {} attempted to act for patient {}", session.user_id(), user_id);
            return Err(AppointmentError::Unauthorized);
        }

        Ok(user_id.to_string())
    }

    /// Loads an appointment the session may move: owned (or admin) and still
    /// holding its slot.
    async fn get_movable_appointment(
        &self,
        session: &Session,
        appointment_id: &str,
        auth_token: &str,
    ) -> Result<ExistingAppointment, AppointmentError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;
        if !session.can_act_for(&current.user_id) {
            warn!(
                "User {} attempted to move appointment {} of patient {}",
                session.user_id(),
                appointment_id,
                current.user_id
            );
            return Err(AppointmentError::Unauthorized);
        }
        self.lifecycle_service.validate_reschedulable(&current.status)?;

        Ok(current)
    }

    async fn ensure_no_active_appointment(&self, user_id: &str, auth_token: &str) -> Result<(), AppointmentError> {
        let patient_appointments = self.get_patient_appointments(user_id, auth_token).await?;

        if has_conflicting_active_appointment(user_id, &patient_appointments, self.today()) {
            warn!("Patient {} already holds an active appointment", user_id);
            return Err(BookingError::PatientAlreadyHasActiveAppointment.into());
        }

        Ok(())
    }

    async fn validate_slot(
        &self,
        doctor_id: &str,
        request: &AppointmentSlotRequest,
        exclude_appointment_id: Option<&str>,
        auth_token: &str,
    ) -> Result<(Doctor, ValidatedSlot), AppointmentError> {
        let doctor = self.get_doctor(doctor_id, Some(auth_token)).await?;
        let availability = doctor.availability();

        // Nothing to fetch when the cheaper checks already fail.
        let existing = if request.date >= self.today() && availability.is_available_on(request.date) {
            self.get_doctor_appointments_on(doctor_id, request.date, Some(auth_token)).await?
        } else {
            Vec::new()
        };

        let validated = validate_booking_request(
            request,
            &availability,
            &existing,
            exclude_appointment_id,
            self.today(),
        )
        .map_err(|e| {
            warn!("Booking for doctor {} on {} refused: {}", doctor_id, request.date, e);
            e
        })?;

        Ok((doctor, validated))
    }

    async fn get_doctor(&self, doctor_id: &str, auth_token: Option<&str>) -> Result<Doctor, AppointmentError> {
        self.doctor_service
            .get_doctor(doctor_id, auth_token)
            .await
            .map_err(|e| match e {
                DoctorError::NotFound => AppointmentError::DoctorNotFound,
                DoctorError::ExternalService(msg) => AppointmentError::ExternalService(msg),
            })
    }

    fn appointment_path(&self, appointment_id: &str) -> String {
        format!("{}/{}", APPOINTMENTS_PATH, urlencoding::encode(appointment_id))
    }

    fn map_read_error(&self, e: ClinicApiError) -> AppointmentError {
        if e.is_not_found() {
            AppointmentError::NotFound
        } else if e.is_auth() {
            AppointmentError::Unauthorized
        } else {
            AppointmentError::ExternalService(e.to_string())
        }
    }

    /// Upstream refusals of a write are authoritative; the client reports
    /// them and does not retry.
    fn map_write_error(&self, e: ClinicApiError) -> AppointmentError {
        if e.is_conflict() {
            warn!("Clinic API rejected booking write: {}", e);
            AppointmentError::RejectedByServer(e.to_string())
        } else {
            self.map_read_error(e)
        }
    }
}
