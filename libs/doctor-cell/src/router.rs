use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/{doctor_id}/availability", get(handlers::get_doctor_availability_public));

    Router::new()
        .merge(public_routes)
        .with_state(state)
}
