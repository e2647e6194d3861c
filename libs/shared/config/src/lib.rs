use std::env;
use tracing::warn;

const DEFAULT_SERVER_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub clinic_api_url: String,
    pub clinic_api_key: String,
    pub jwt_secret: String,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            clinic_api_url: env::var("CLINIC_API_URL")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_API_URL not set, using empty value");
                    String::new()
                }),
            clinic_api_key: env::var("CLINIC_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_API_KEY not set, outbound requests will carry no api key");
                    String::new()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|raw| match raw.parse::<u16>() {
                    Ok(port) => Some(port),
                    Err(_) => {
                        warn!("SERVER_PORT '{}' is not a valid port, using default", raw);
                        None
                    }
                })
                .unwrap_or(DEFAULT_SERVER_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.clinic_api_url.is_empty() && !self.jwt_secret.is_empty()
    }
}
