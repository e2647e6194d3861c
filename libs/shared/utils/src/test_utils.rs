use std::sync::Arc;
use chrono::{Duration, NaiveDate, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{JwtClaims, JwtHeader, Role, Session, User};

pub struct TestConfig {
    pub jwt_secret: String,
    pub clinic_api_url: String,
    pub clinic_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            clinic_api_url: "http://localhost:8080".to_string(),
            clinic_api_key: "test-api-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Points the config at a mock clinic API, typically a `wiremock` server uri.
    pub fn with_api_url(url: impl Into<String>) -> Self {
        Self {
            clinic_api_url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            clinic_api_url: self.clinic_api_url.clone(),
            clinic_api_key: self.clinic_api_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            server_port: 3000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            name: None,
            role: Role::from_claim(Some(&self.role)),
            created_at: Some(Utc::now()),
        }
    }

    pub fn to_session(&self, token: &str) -> Session {
        Session::new(self.to_user(), token)
    }
}

/// Signs HS256 tokens the same way the identity provider does, so tests can
/// drive `auth_middleware` end to end.
pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn claims_for(user: &TestUser, exp_hours: Option<i64>) -> JwtClaims {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        JwtClaims {
            sub: user.id.clone(),
            exp: Some(exp.timestamp().max(0) as u64),
            email: Some(user.email.clone()),
            role: Some(user.role.clone()),
            name: None,
            iat: Some(now.timestamp().max(0) as u64),
        }
    }

    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        Self::sign("HS256", &Self::claims_for(user, exp_hours), secret)
    }

    pub fn sign(alg: &str, claims: &JwtClaims, secret: &str) -> String {
        let header = JwtHeader {
            alg: alg.to_string(),
            typ: "JWT".to_string(),
        };

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(json!(header).to_string());
        let claims_encoded = general_purpose::URL_SAFE_NO_PAD.encode(json!(claims).to_string());
        let signing_input = format!("{}.{}", header_encoded, claims_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(signing_input.as_bytes());
        let signature = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", None)
    }

    pub fn create_malformed_token() -> String {
        "not-a-jwt".to_string()
    }
}

/// Canned clinic API payloads in the shapes the upstream service returns.
pub struct MockClinicResponses;

impl MockClinicResponses {
    pub fn doctor_response(doctor_id: &str, available_days: &str) -> serde_json::Value {
        json!({
            "id": doctor_id,
            "name": "Dr. Test",
            "specialization": "General Practice",
            "availableDays": available_days,
            "fee": 1500.0
        })
    }

    pub fn appointment_response(
        appointment_id: &str,
        doctor_id: &str,
        user_id: &str,
        date: NaiveDate,
        time_slot: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": appointment_id,
            "doctorId": doctor_id,
            "userId": user_id,
            "appointmentDate": date.format("%Y-%m-%d").to_string(),
            "timeSlot": time_slot,
            "status": status,
            "totalAmount": 1500.0
        })
    }

    pub fn error_response(message: &str) -> serde_json::Value {
        json!({
            "message": message
        })
    }
}
