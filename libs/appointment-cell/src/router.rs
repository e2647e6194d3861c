// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/slots", get(handlers::get_slot_catalog))
        .route("/doctors/{doctor_id}/free-slots", get(handlers::get_free_slots_public));

    let protected_routes = Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/validate", post(handlers::validate_booking))
        .route("/mine", get(handlers::get_my_appointments))
        .route("/{appointment_id}/free-slots", get(handlers::get_reschedule_free_slots))
        .route("/{appointment_id}/reschedule", put(handlers::reschedule_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
