use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize, Serializer};

use shared_models::serde_helpers::opaque_id;

use crate::services::availability::{
    is_doctor_available_on, parse_available_days, weekday_abbreviation_of, WEEKDAYS_FROM_SUNDAY,
};

/// Doctor record as returned by the clinic API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    /// Comma separated weekday abbreviations, e.g. `"Mon, Wed, Fri"`.
    #[serde(default)]
    pub available_days: String,
    #[serde(default)]
    pub fee: Option<f64>,
}

impl Doctor {
    pub fn availability(&self) -> DoctorAvailability {
        DoctorAvailability::from_pattern(self.id.clone(), &self.available_days)
    }
}

/// Set of weekdays stored as a bitmask indexed Sun=0..Sat=6.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_sunday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_sunday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in Sun..Sat order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        WEEKDAYS_FROM_SUNDAY.iter().copied().filter(|day| self.contains(*day))
    }

    pub fn abbreviations(&self) -> Vec<&'static str> {
        self.iter().map(weekday_abbreviation_of).collect()
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.abbreviations())
    }
}

/// A doctor's recurring weekly availability pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorAvailability {
    pub doctor_id: String,
    pub available_days: WeekdaySet,
}

impl DoctorAvailability {
    pub fn new(doctor_id: impl Into<String>, available_days: WeekdaySet) -> Self {
        Self {
            doctor_id: doctor_id.into(),
            available_days,
        }
    }

    pub fn from_pattern(doctor_id: impl Into<String>, pattern: &str) -> Self {
        Self::new(doctor_id, parse_available_days(pattern))
    }

    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        is_doctor_available_on(&self.available_days, date)
    }
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorDayAvailability {
    pub doctor_id: String,
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub available: bool,
    pub available_days: WeekdaySet,
}

impl DoctorDayAvailability {
    pub fn for_date(availability: &DoctorAvailability, date: NaiveDate) -> Self {
        Self {
            doctor_id: availability.doctor_id.clone(),
            date,
            weekday: crate::services::availability::weekday_abbreviation(date),
            available: availability.is_available_on(date),
            available_days: availability.available_days,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("External service error: {0}")]
    ExternalService(String),
}
