use crate::domain::analysis::AnalysisOutcome;
use crate::domain::variant::{AnalysisConfig, Variant};
use crate::experiments::conclusion::synthesize;
use crate::experiments::rates::all_variant_rates;
use crate::experiments::winner::column_winners;

/// Full evaluation: rates for every variant, column winners and the
/// synthesized conclusion. Pure; identical inputs give identical output.
pub fn analyze(variants: &[Variant], control_id: &str, config: &AnalysisConfig) -> AnalysisOutcome {
    let rates = all_variant_rates(variants, control_id, config);
    let column_winners = column_winners(&rates, config);
    let conclusion = synthesize(&rates, control_id, config);

    AnalysisOutcome {
        rates,
        column_winners,
        conclusion,
    }
}
