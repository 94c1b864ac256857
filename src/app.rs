use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/subjects/new", get(handlers::add_subject_page))
        .route("/subjects", get(handlers::view_subjects).post(handlers::add_subject))
        .route("/sessions/new", get(handlers::add_session_page))
        .route("/sessions", get(handlers::view_sessions).post(handlers::add_session))
        .route("/api/subjects", get(handlers::list_subjects).post(handlers::create_subject))
        .route("/api/sessions", get(handlers::list_sessions).post(handlers::create_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
