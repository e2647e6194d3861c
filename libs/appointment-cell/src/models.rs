// libs/appointment-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use shared_models::serde_helpers::{calendar_date, opaque_id};

// ==============================================================================
// SLOT CATALOG
// ==============================================================================

/// One of the five fixed two-hour appointment windows in a clinic day.
///
/// Slot identity is the exact display string; existing appointment rows are
/// matched against it by string equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeSlot {
    EightToTen,
    TenToNoon,
    NoonToTwo,
    TwoToFour,
    FourToSix,
}

impl TimeSlot {
    /// The catalog, ordered by start time.
    pub const ALL: [TimeSlot; 5] = [
        TimeSlot::EightToTen,
        TimeSlot::TenToNoon,
        TimeSlot::NoonToTwo,
        TimeSlot::TwoToFour,
        TimeSlot::FourToSix,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::EightToTen => "8:00am - 10:00am",
            TimeSlot::TenToNoon => "10:00am - 12:00pm",
            TimeSlot::NoonToTwo => "12:00pm - 2:00pm",
            TimeSlot::TwoToFour => "2:00pm - 4:00pm",
            TimeSlot::FourToSix => "4:00pm - 6:00pm",
        }
    }

    pub fn start_hour(&self) -> u32 {
        match self {
            TimeSlot::EightToTen => 8,
            TimeSlot::TenToNoon => 10,
            TimeSlot::NoonToTwo => 12,
            TimeSlot::TwoToFour => 14,
            TimeSlot::FourToSix => 16,
        }
    }

    pub fn start_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.start_hour(), 0, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Exact match against the catalog strings.
    pub fn parse(raw: &str) -> Option<TimeSlot> {
        TimeSlot::ALL.into_iter().find(|slot| slot.as_str() == raw)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ==============================================================================
// APPOINTMENT RECORDS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    /// Pending and Confirmed appointments hold their slot.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "Pending"),
            AppointmentStatus::Confirmed => write!(f, "Confirmed"),
            AppointmentStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("unknown appointment status '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for AppointmentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Appointment row owned by the clinic API. Read-only to the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingAppointment {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(deserialize_with = "opaque_id")]
    pub doctor_id: String,
    #[serde(deserialize_with = "opaque_id")]
    pub user_id: String,
    #[serde(deserialize_with = "calendar_date")]
    pub appointment_date: NaiveDate,
    pub time_slot: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub total_amount: Option<f64>,
}

// ==============================================================================
// BOOKING REQUESTS
// ==============================================================================

/// A (date, slot) pair proposed for a single booking attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSlotRequest {
    pub date: NaiveDate,
    pub time_slot: String,
}

impl AppointmentSlotRequest {
    pub fn new(date: NaiveDate, time_slot: impl Into<String>) -> Self {
        Self {
            date,
            time_slot: time_slot.into(),
        }
    }
}

/// Output of successful validation, ready to submit upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedSlot {
    pub doctor_id: String,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: String,
    /// Defaults to the session user; admins may book for someone else.
    pub user_id: Option<String>,
    pub appointment_date: NaiveDate,
    pub time_slot: String,
    pub total_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    /// Defaults to the appointment's current doctor.
    pub doctor_id: Option<String>,
    pub appointment_date: NaiveDate,
    pub time_slot: String,
    pub total_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateBookingRequest {
    pub doctor_id: String,
    pub user_id: Option<String>,
    pub appointment_date: NaiveDate,
    pub time_slot: String,
    pub exclude_appointment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FreeSlotsQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct FreeSlotsResponse {
    pub doctor_id: String,
    pub date: NaiveDate,
    pub available: bool,
    pub free_slots: Vec<TimeSlot>,
}

// ==============================================================================
// CLINIC API PAYLOADS
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentPayload {
    pub doctor_id: String,
    pub user_id: String,
    pub appointment_date: String,
    pub time_slot: String,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentPayload {
    pub appointment_id: String,
    pub doctor_id: String,
    pub appointment_date: String,
    pub time_slot: String,
    pub user_id: String,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdatePayload {
    pub status: AppointmentStatus,
}

pub fn format_api_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

/// Client-side booking refusals. Always recoverable by picking another date
/// or slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("Selected date is in the past")]
    PastDate,

    #[error("Doctor is not available on the selected day")]
    DoctorUnavailableOnDate,

    #[error("Selected time slot is not offered")]
    UnknownSlot,

    #[error("Selected time slot is already booked")]
    SlotAlreadyTaken,

    #[error("Patient already has an active appointment")]
    PatientAlreadyHasActiveAppointment,
}

impl BookingError {
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::PastDate => "past_date",
            BookingError::DoctorUnavailableOnDate => "doctor_unavailable_on_date",
            BookingError::UnknownSlot => "unknown_slot",
            BookingError::SlotAlreadyTaken => "slot_already_taken",
            BookingError::PatientAlreadyHasActiveAppointment => "patient_already_has_active_appointment",
        }
    }

    /// Refusals caused by another appointment rather than by the request itself.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            BookingError::SlotAlreadyTaken | BookingError::PatientAlreadyHasActiveAppointment
        )
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Unauthorized access to appointment")]
    Unauthorized,

    #[error("Booking rejected by clinic service: {0}")]
    RejectedByServer(String),

    #[error("Status change rejected by clinic service: {0}")]
    StatusChangeRejected(String),

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("External service error: {0}")]
    ExternalService(String),
}
