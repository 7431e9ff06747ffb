use ab_test_analysis::domain::analysis::RateData;
use ab_test_analysis::domain::snapshot::{SavedTest, TestState};
use ab_test_analysis::domain::variant::{AnalysisConfig, CommercialInputs, CommercialMode, Variant};
use ab_test_analysis::experiments::analyzer::analyze;
use ab_test_analysis::experiments::conclusion::synthesize;
use ab_test_analysis::experiments::narrative::{render, RenderFormat};

fn state() -> TestState {
    let variant = |id: &str, clicks: &str, conversions: &str| {
        Variant::new(id, &format!("Variant {}", id.to_uppercase()))
            .with_engagement("10000", Some("2000".into()), Some(clicks.into()))
            .with_commercial(CommercialInputs::CountBased {
                conversions: Some(conversions.into()),
                average_value_per_conversion: Some("35.5".into()),
            })
    };
    TestState {
        test_name: "Spring newsletter subject line".to_string(),
        variants: vec![variant("a", "400", "40"), variant("b", "520", "61")],
        control_variant_id: "a".to_string(),
        config: AnalysisConfig {
            commercial: CommercialMode::CountBased {
                conversion_metric_name: String::new(),
            },
            ..AnalysisConfig::default()
        },
    }
}

fn saved() -> SavedTest {
    let state = state();
    let outcome = analyze(&state.variants, &state.control_variant_id, &state.config);
    SavedTest::capture(state, outcome)
}

#[test]
fn saved_test_survives_json() {
    let original = saved();
    let json = serde_json::to_string(&original).unwrap();
    let restored: SavedTest = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.id, original.id);
    assert_eq!(restored.saved_at, original.saved_at);
    assert_eq!(restored.test_state, original.test_state);
    assert_eq!(restored.winner(), original.winner());
    assert_eq!(restored.is_flat(), original.is_flat());
    assert_eq!(
        render(&restored.test_result.test_conclusion, RenderFormat::Text),
        render(&original.test_result.test_conclusion, RenderFormat::Text)
    );
}

#[test]
fn restored_rates_reproduce_the_conclusion() {
    let original = saved();
    let json = serde_json::to_string(&original.test_result.all_variant_rates).unwrap();
    let rates: Vec<RateData> = serde_json::from_str(&json).unwrap();

    let again = synthesize(&rates, "a", &original.test_state.config);
    let before = &original.test_result.test_conclusion;
    assert_eq!(again.overall_winner_variant_name, before.overall_winner_variant_name);
    assert_eq!(again.is_flat_result, before.is_flat_result);
    assert_eq!(render(&again, RenderFormat::Text), render(before, RenderFormat::Text));
}

#[test]
fn saved_test_json_shape() {
    let value = serde_json::to_value(saved()).unwrap();

    assert_eq!(value["test_state"]["test_name"], "Spring newsletter subject line");
    assert_eq!(value["test_state"]["config"]["commercial"]["mode"], "count_based");
    let rates = value["test_result"]["all_variant_rates"].as_array().unwrap();
    assert_eq!(rates.len(), 2);
    assert_eq!(rates[1]["commercial"]["total_revenue"]["display"], "£2,165.50");
    assert_eq!(rates[0]["click_through_rate"]["status"], "measured");
    assert_eq!(
        value["test_result"]["test_conclusion"]["overall_winner_variant_name"],
        "Variant B"
    );
}
