pub mod booking;
pub mod lifecycle;
pub mod resolver;

pub use booking::AppointmentBookingService;
pub use lifecycle::AppointmentLifecycleService;
pub use resolver::{
    free_slots_for, has_conflicting_active_appointment, occupied_slots,
    validate_booking_request, validate_new_booking,
};
