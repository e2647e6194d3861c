use reqwest::Method;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_database::{ClinicApiClient, ClinicApiError};

use crate::models::{Doctor, DoctorAvailability, DoctorError};

pub const DOCTORS_PATH: &str = "/api/doctors";

pub struct DoctorService {
    client: ClinicApiClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: ClinicApiClient::new(config),
        }
    }

    pub fn with_client(client: ClinicApiClient) -> Self {
        Self { client }
    }

    pub async fn get_doctor(
        &self,
        doctor_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = format!("{}/{}", DOCTORS_PATH, urlencoding::encode(doctor_id));
        self.client
            .request::<Doctor>(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| match e {
                e if e.is_not_found() => DoctorError::NotFound,
                ClinicApiError::Decode(msg) => {
                    error!("Doctor {} has an unexpected shape: {}", doctor_id, msg);
                    DoctorError::ExternalService(format!("Failed to parse doctor: {}", msg))
                }
                other => DoctorError::ExternalService(other.to_string()),
            })
    }

    pub async fn get_doctor_availability(
        &self,
        doctor_id: &str,
        auth_token: Option<&str>,
    ) -> Result<DoctorAvailability, DoctorError> {
        let doctor = self.get_doctor(doctor_id, auth_token).await?;
        let availability = doctor.availability();

        if availability.available_days.is_empty() {
            tracing::warn!(
                "Doctor {} has no recognizable available days in '{}'",
                doctor_id,
                doctor.available_days
            );
        }

        Ok(availability)
    }
}
