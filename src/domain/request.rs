use crate::domain::variant::{AnalysisConfig, Variant};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EvaluateRequest {
    pub variants: Vec<Variant>,
    pub control_variant_id: String,
    pub config: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapshotRequest {
    pub test_name: String,
    #[serde(flatten)]
    pub evaluation: EvaluateRequest,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}
