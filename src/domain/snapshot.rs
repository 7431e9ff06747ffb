use crate::domain::analysis::{AnalysisOutcome, RateData, TestConclusionData};
use crate::domain::variant::{AnalysisConfig, Variant};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestState {
    pub test_name: String,
    pub variants: Vec<Variant>,
    pub control_variant_id: String,
    pub config: AnalysisConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub all_variant_rates: Vec<RateData>,
    pub test_conclusion: TestConclusionData,
}

/// A named, timestamped capture of one evaluation. Storing it is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTest {
    pub id: Uuid,
    pub saved_at: chrono::DateTime<chrono::Utc>,
    pub test_state: TestState,
    pub test_result: TestResult,
}

impl SavedTest {
    pub fn capture(test_state: TestState, outcome: AnalysisOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            saved_at: chrono::Utc::now(),
            test_state,
            test_result: TestResult {
                all_variant_rates: outcome.rates,
                test_conclusion: outcome.conclusion,
            },
        }
    }

    pub fn winner(&self) -> Option<&str> {
        self.test_result
            .test_conclusion
            .overall_winner_variant_name
            .as_deref()
    }

    pub fn is_flat(&self) -> bool {
        self.test_result.test_conclusion.is_flat_result
    }
}
