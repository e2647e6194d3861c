pub mod availability;
pub mod doctor;

pub use availability::{is_doctor_available_on, parse_available_days, weekday_abbreviation};
pub use doctor::DoctorService;
