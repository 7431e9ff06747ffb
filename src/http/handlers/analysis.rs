use crate::domain::request::{ErrorEnvelope, ErrorPayload, EvaluateRequest, SnapshotRequest};
use crate::experiments::narrative::{render, RenderFormat};
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>,
}

pub async fn evaluate(State(state): State<AppState>, Json(req): Json<EvaluateRequest>) -> impl IntoResponse {
    match state.analysis_service.evaluate(req) {
        Ok(outcome) => (axum::http::StatusCode::OK, Json(outcome)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn rates(State(state): State<AppState>, Json(req): Json<EvaluateRequest>) -> impl IntoResponse {
    match state.analysis_service.rates(req) {
        Ok(rates) => (axum::http::StatusCode::OK, Json(rates)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
    Json(req): Json<EvaluateRequest>,
) -> impl IntoResponse {
    let format = match query.format.as_deref() {
        None => RenderFormat::default(),
        Some(raw) => match RenderFormat::parse(raw) {
            Some(f) => f,
            None => {
                return (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(ErrorEnvelope {
                        error: ErrorPayload {
                            code: "UNSUPPORTED_FORMAT".to_string(),
                            message: "format must be one of text, html, json".to_string(),
                            details: Some(raw.to_string()),
                        },
                    }),
                )
                    .into_response()
            }
        },
    };

    match state.analysis_service.evaluate(req) {
        Ok(outcome) => (
            axum::http::StatusCode::OK,
            [(CONTENT_TYPE, format.content_type())],
            render(&outcome.conclusion, format),
        )
            .into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn snapshot(State(state): State<AppState>, Json(req): Json<SnapshotRequest>) -> impl IntoResponse {
    match state.analysis_service.snapshot(req) {
        Ok(saved) => (axum::http::StatusCode::CREATED, Json(saved)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}
