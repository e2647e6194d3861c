use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Error, Debug)]
pub enum ClinicApiError {
    #[error("Clinic API is not configured")]
    NotConfigured,

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Request to clinic API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Clinic API error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("Unexpected clinic API payload: {0}")]
    Decode(String),
}

impl ClinicApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClinicApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// The store refused the write, e.g. the slot was taken between
    /// validation and submission.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::CONFLICT) | Some(StatusCode::UNPROCESSABLE_ENTITY)
        )
    }

    pub fn is_auth(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }
}

/// HTTP client for the clinic REST API that owns doctors and appointments.
#[derive(Clone)]
pub struct ClinicApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ClinicApiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.clinic_api_url.trim_end_matches('/').to_string(),
            api_key: config.clinic_api_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap, ClinicApiError> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if !self.api_key.is_empty() {
            headers.insert(
                HeaderName::from_static(API_KEY_HEADER),
                HeaderValue::from_str(&self.api_key)
                    .map_err(|e| ClinicApiError::InvalidHeader(e.to_string()))?,
            );
        }

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| ClinicApiError::InvalidHeader(e.to_string()))?,
            );
        }

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, ClinicApiError>
    where
        T: DeserializeOwned,
    {
        if self.base_url.is_empty() {
            return Err(ClinicApiError::NotConfigured);
        }

        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let headers = self.get_headers(auth_token)?;
        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Clinic API error ({}): {}", status, body);
            return Err(ClinicApiError::Status { status, body });
        }

        let payload: Value = response.json().await?;
        serde_json::from_value(payload).map_err(|e| ClinicApiError::Decode(e.to_string()))
    }
}
