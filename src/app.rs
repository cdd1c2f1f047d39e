use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", post(handlers::login_form))
        .route("/logout", post(handlers::logout_form))
        .route("/draft/adjust", post(handlers::adjust_draft_form))
        .route("/draft/set", post(handlers::set_draft_form))
        .route("/draft/submit", post(handlers::submit_draft_form))
        .route("/logs/reset", post(handlers::reset_form))
        .route("/insights", post(handlers::insight_form))
        .route(
            "/api/session",
            get(handlers::get_session)
                .post(handlers::login)
                .delete(handlers::logout),
        )
        .route("/api/logs", get(handlers::get_logs))
        .route("/api/logs/bulk", post(handlers::bulk_submit))
        .route("/api/logs/reset", post(handlers::reset_logs))
        .route("/api/draft", get(handlers::get_draft))
        .route("/api/draft/adjust", post(handlers::adjust_draft))
        .route("/api/draft/set", post(handlers::set_draft))
        .route("/api/draft/submit", post(handlers::submit_draft))
        .route("/api/totals", get(handlers::get_totals))
        .route("/api/totals/:source", get(handlers::get_source_totals))
        .route("/api/daily/:source", get(handlers::get_daily))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/export.csv", get(handlers::export_csv))
        .route(
            "/api/insights",
            get(handlers::get_insight).post(handlers::start_insight),
        )
        .with_state(state)
}
