use crate::http::handlers::{analysis, ops};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(ops::health))
        .route("/ops/readiness", get(ops::readiness))
        .route("/ops/liveness", get(ops::liveness))
        .route("/analysis/evaluate", post(analysis::evaluate))
        .route("/analysis/rates", post(analysis::rates))
        .route("/analysis/report", post(analysis::report))
        .route("/analysis/snapshot", post(analysis::snapshot))
        .with_state(state)
}
