use crate::domain::analysis::{AnalysisOutcome, RateData};
use crate::domain::request::{ErrorEnvelope, ErrorPayload, EvaluateRequest, SnapshotRequest};
use crate::domain::snapshot::{SavedTest, TestState};
use crate::experiments::analyzer::analyze;
use crate::experiments::rates::all_variant_rates;
use axum::http::StatusCode;
use std::collections::HashSet;

#[derive(Clone)]
pub struct AnalysisService {
    pub default_significance_threshold: f64,
}

impl AnalysisService {
    pub fn new(default_significance_threshold: f64) -> Self {
        Self {
            default_significance_threshold,
        }
    }

    pub fn evaluate(&self, req: EvaluateRequest) -> Result<AnalysisOutcome, (StatusCode, ErrorEnvelope)> {
        let req = self.prepare(req)?;
        let outcome = analyze(&req.variants, &req.control_variant_id, &req.config);

        tracing::info!(
            "analysis variants={} control={} winner={:?} flat={} change={:?}",
            req.variants.len(),
            req.control_variant_id,
            outcome.conclusion.overall_winner_variant_name,
            outcome.conclusion.is_flat_result,
            outcome.conclusion.winning_kpi_performance_change
        );
        Ok(outcome)
    }

    pub fn rates(&self, req: EvaluateRequest) -> Result<Vec<RateData>, (StatusCode, ErrorEnvelope)> {
        let req = self.prepare(req)?;
        Ok(all_variant_rates(&req.variants, &req.control_variant_id, &req.config))
    }

    pub fn snapshot(&self, req: SnapshotRequest) -> Result<SavedTest, (StatusCode, ErrorEnvelope)> {
        let evaluation = self.prepare(req.evaluation)?;
        let outcome = analyze(&evaluation.variants, &evaluation.control_variant_id, &evaluation.config);
        let saved = SavedTest::capture(
            TestState {
                test_name: req.test_name,
                variants: evaluation.variants,
                control_variant_id: evaluation.control_variant_id,
                config: evaluation.config,
            },
            outcome,
        );

        tracing::info!(
            "snapshot id={} test={} winner={:?} flat={}",
            saved.id,
            saved.test_state.test_name,
            saved.winner(),
            saved.is_flat()
        );
        Ok(saved)
    }

    fn prepare(&self, mut req: EvaluateRequest) -> Result<EvaluateRequest, (StatusCode, ErrorEnvelope)> {
        if let Err(e) = validate_request(&req) {
            tracing::warn!("rejected analysis request: {}", e.1.error.message);
            return Err(e);
        }
        if req.config.significance_threshold.is_none() {
            req.config.significance_threshold = Some(self.default_significance_threshold);
        }
        Ok(req)
    }
}

fn validate_request(req: &EvaluateRequest) -> Result<(), (StatusCode, ErrorEnvelope)> {
    if req.variants.len() < 2 {
        return Err((
            StatusCode::BAD_REQUEST,
            err("NOT_ENOUGH_VARIANTS", "at least two variants are required"),
        ));
    }

    let mut seen = HashSet::new();
    for variant in &req.variants {
        if !seen.insert(variant.id.as_str()) {
            return Err((
                StatusCode::BAD_REQUEST,
                err_with_details("DUPLICATE_VARIANT_ID", "variant ids must be unique", &variant.id),
            ));
        }
    }

    if !seen.contains(req.control_variant_id.as_str()) {
        return Err((
            StatusCode::BAD_REQUEST,
            err_with_details(
                "UNKNOWN_CONTROL_VARIANT",
                "control_variant_id does not match any variant",
                &req.control_variant_id,
            ),
        ));
    }

    if let Some(t) = req.config.significance_threshold {
        if !(t > 0.0 && t < 1.0) {
            return Err((
                StatusCode::BAD_REQUEST,
                err("INVALID_SIGNIFICANCE_THRESHOLD", "significance_threshold must be in (0, 1)"),
            ));
        }
    }
    Ok(())
}

fn err(code: &str, message: &str) -> ErrorEnvelope {
    ErrorEnvelope {
        error: ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        },
    }
}

fn err_with_details(code: &str, message: &str, details: &str) -> ErrorEnvelope {
    let mut envelope = err(code, message);
    envelope.error.details = Some(details.to_string());
    envelope
}
