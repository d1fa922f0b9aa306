use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/view", post(handlers::switch_view))
        .route("/students", post(handlers::submit_student))
        .route("/students/:id/delete", post(handlers::delete_student))
        .route("/refresh", post(handlers::refresh))
        .route("/settings", post(handlers::save_settings))
        .route("/api/status", get(handlers::get_status))
        .route(
            "/api/students",
            get(handlers::list_students).post(handlers::create_student),
        )
        .route("/api/students/:id", axum::routing::delete(handlers::remove_student))
        .route("/api/analytics", get(handlers::get_analytics))
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::put_settings),
        )
        .route("/api/apps-script", get(handlers::apps_script))
        .with_state(state)
}
