use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/admin", get(handlers::admin_page))
        .route("/api/public/records", get(handlers::public_records))
        .route("/api/public/series", get(handlers::public_series))
        .route("/api/public/totals", get(handlers::public_totals))
        .route("/api/login", post(handlers::login))
        .route("/api/session", get(handlers::session_status))
        .route(
            "/api/admin/records",
            get(handlers::admin_records).post(handlers::create_record),
        )
        .route("/api/admin/records/delete", post(handlers::delete_records))
        .route("/api/admin/metrics", get(handlers::admin_metrics))
        .with_state(state)
}
