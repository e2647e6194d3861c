// libs/appointment-cell/src/services/resolver.rs
//! Slot availability and booking conflict rules.
//!
//! Every function here is pure: the same inputs always give the same answer,
//! nothing is reserved, and nothing is fetched. Validation is advisory; the
//! clinic API remains the authority on whether a write succeeds.

use std::collections::HashSet;

use chrono::NaiveDate;

use doctor_cell::models::DoctorAvailability;

use crate::models::{
    AppointmentSlotRequest, BookingError, ExistingAppointment, TimeSlot, ValidatedSlot,
};

/// Slot strings held by active appointments of `doctor_id` on `date`.
///
/// The row whose id equals `exclude_appointment_id` is skipped so an
/// appointment being rescheduled does not block its own slot.
pub fn occupied_slots<'a>(
    doctor_id: &str,
    date: NaiveDate,
    existing_appointments: &'a [ExistingAppointment],
    exclude_appointment_id: Option<&str>,
) -> HashSet<&'a str> {
    existing_appointments
        .iter()
        .filter(|apt| apt.doctor_id == doctor_id)
        .filter(|apt| apt.appointment_date == date)
        .filter(|apt| apt.status.is_active())
        .filter(|apt| exclude_appointment_id != Some(apt.id.as_str()))
        .map(|apt| apt.time_slot.as_str())
        .collect()
}

/// Catalog slots still bookable for the doctor on `date`, by start time.
///
/// Empty when the doctor does not work that weekday.
pub fn free_slots_for(
    availability: &DoctorAvailability,
    date: NaiveDate,
    existing_appointments: &[ExistingAppointment],
    exclude_appointment_id: Option<&str>,
) -> Vec<TimeSlot> {
    if !availability.is_available_on(date) {
        return Vec::new();
    }

    let occupied = occupied_slots(
        &availability.doctor_id,
        date,
        existing_appointments,
        exclude_appointment_id,
    );

    let mut free: Vec<TimeSlot> = TimeSlot::ALL
        .into_iter()
        .filter(|slot| !occupied.contains(slot.as_str()))
        .collect();
    free.sort_by_key(TimeSlot::start_time);
    free
}

/// Checks a proposed (date, slot) for the doctor, failing on the first
/// violated rule: past date, unavailable weekday, unknown slot, taken slot.
///
/// `today` is a calendar date, so any slot today passes the date check
/// regardless of the current time.
pub fn validate_booking_request(
    request: &AppointmentSlotRequest,
    availability: &DoctorAvailability,
    existing_appointments: &[ExistingAppointment],
    exclude_appointment_id: Option<&str>,
    today: NaiveDate,
) -> Result<ValidatedSlot, BookingError> {
    if request.date < today {
        return Err(BookingError::PastDate);
    }

    if !availability.is_available_on(request.date) {
        return Err(BookingError::DoctorUnavailableOnDate);
    }

    let slot = TimeSlot::parse(&request.time_slot).ok_or(BookingError::UnknownSlot)?;

    let free = free_slots_for(
        availability,
        request.date,
        existing_appointments,
        exclude_appointment_id,
    );
    if !free.contains(&slot) {
        return Err(BookingError::SlotAlreadyTaken);
    }

    Ok(ValidatedSlot {
        doctor_id: availability.doctor_id.clone(),
        date: request.date,
        time_slot: slot,
    })
}

/// True when the patient holds a Pending or Confirmed appointment dated
/// `as_of` or later, with any doctor.
pub fn has_conflicting_active_appointment(
    user_id: &str,
    existing_appointments: &[ExistingAppointment],
    as_of: NaiveDate,
) -> bool {
    existing_appointments.iter().any(|apt| {
        apt.user_id == user_id && apt.status.is_active() && apt.appointment_date >= as_of
    })
}

/// Full check for a brand new booking: the one-active-appointment rule runs
/// before any slot rule.
pub fn validate_new_booking(
    user_id: &str,
    request: &AppointmentSlotRequest,
    availability: &DoctorAvailability,
    existing_appointments: &[ExistingAppointment],
    today: NaiveDate,
) -> Result<ValidatedSlot, BookingError> {
    if has_conflicting_active_appointment(user_id, existing_appointments, today) {
        return Err(BookingError::PatientAlreadyHasActiveAppointment);
    }

    validate_booking_request(request, availability, existing_appointments, None, today)
}
