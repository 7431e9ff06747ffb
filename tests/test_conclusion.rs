use ab_test_analysis::domain::analysis::{EngagementBasis, KpiField, NarrativeSegment, TestConclusionData};
use ab_test_analysis::domain::variant::{
    AnalysisConfig, Channel, CommercialInputs, CommercialMode, PrimaryEngagementMetric, RawInput, Variant,
};
use ab_test_analysis::experiments::analyzer::analyze;
use ab_test_analysis::experiments::narrative::{render, RenderFormat};

fn email(id: &str, sends: &str, opens: &str, clicks: &str) -> Variant {
    Variant::new(id, &format!("Variant {}", id.to_uppercase())).with_engagement(
        sends,
        Some(opens.into()),
        Some(clicks.into()),
    )
}

fn count_based(variant: Variant, conversions: &str, aov: &str) -> Variant {
    variant.with_commercial(CommercialInputs::CountBased {
        conversions: Some(conversions.into()),
        average_value_per_conversion: Some(aov.into()),
    })
}

fn direct(variant: Variant, ipp: Option<&str>, cct: Option<&str>) -> Variant {
    variant.with_commercial(CommercialInputs::DirectInput {
        srr_rate: None,
        mrr_rate: None,
        average_ipp: ipp.map(RawInput::from),
        cct: cct.map(RawInput::from),
    })
}

fn count_config() -> AnalysisConfig {
    AnalysisConfig {
        commercial: CommercialMode::CountBased {
            conversion_metric_name: "Purchases".to_string(),
        },
        ..AnalysisConfig::default()
    }
}

fn conclude(variants: &[Variant], config: &AnalysisConfig) -> TestConclusionData {
    analyze(variants, "a", config).conclusion
}

fn engagement(conclusion: &TestConclusionData) -> (KpiField, EngagementBasis) {
    conclusion
        .summary
        .iter()
        .find_map(|s| match s {
            NarrativeSegment::EngagementSummary { kpi, basis } => Some((kpi.field, *basis)),
            _ => None,
        })
        .unwrap()
}

#[test]
fn clear_open_rate_winner() {
    let variants = vec![
        email("a", "10000", "1000", "500"),
        email("b", "10000", "1500", "500"),
    ];
    let c = conclude(&variants, &AnalysisConfig::default());

    assert_eq!(c.overall_winner_variant_name.as_deref(), Some("Variant B"));
    assert!(!c.is_flat_result);
    assert!((c.winning_kpi_performance_change.unwrap() - 50.0).abs() < 1e-9);
    assert_eq!(engagement(&c), (KpiField::OpenRate, EngagementBasis::MostImpactful));

    let text = render(&c, RenderFormat::Text);
    assert!(text.contains("the most impactful metric, Open Rate (OR)"));
    assert!(text.contains("+50.0% change"));
    assert!(text.contains("statistically significant"));
}

#[test]
fn small_insignificant_uplift_is_flat() {
    let variants = vec![email("a", "10000", "", "500"), email("b", "10000", "", "505")];
    let config = AnalysisConfig {
        channel: Channel::Sms,
        ..AnalysisConfig::default()
    };
    let c = conclude(&variants, &config);

    assert_eq!(c.overall_winner_variant_name.as_deref(), Some("Variant B"));
    assert!(c.is_flat_result);
    assert!((c.winning_kpi_performance_change.unwrap() - 1.0).abs() < 1e-6);
    assert!(matches!(
        c.summary.last(),
        Some(NarrativeSegment::FlatResultNotice { variant_name, .. }) if variant_name == "Variant B"
    ));
    assert!(render(&c, RenderFormat::Text).contains("the test results appear flat"));
}

#[test]
fn direct_input_prefers_ipp_then_cct() {
    let variants = vec![
        direct(email("a", "", "", ""), Some("40"), Some("3")),
        direct(email("b", "", "", ""), Some("45"), Some("2")),
    ];
    let config = AnalysisConfig {
        commercial: CommercialMode::DirectInput,
        ..AnalysisConfig::default()
    };
    let c = conclude(&variants, &config);

    assert_eq!(c.overall_winner_variant_name.as_deref(), Some("Variant B"));
    assert!((c.winning_kpi_performance_change.unwrap() - 12.5).abs() < 1e-9);
    assert!(!c.is_flat_result);
    assert_eq!(c.summary[0], NarrativeSegment::DirectInputHeading);
    assert!(matches!(&c.summary[1], NarrativeSegment::DirectInputMetric { kpi } if kpi.field == KpiField::AverageIpp));
    assert!(matches!(&c.summary[2], NarrativeSegment::DirectInputMetric { kpi } if kpi.winner_is_control));
    assert!(matches!(
        &c.summary[3],
        NarrativeSegment::DirectInputMetricInconclusive { kpi_display_name } if kpi_display_name == "SRR (%)"
    ));
    assert!(c.summary.contains(&NarrativeSegment::EngagementInconclusive));

    let text = render(&c, RenderFormat::Text);
    assert!(text.contains("Average IPP (£): Variant B at £45.00."));
    assert!(text.contains("MRR (%) analysis inconclusive."));
}

#[test]
fn direct_input_without_data_falls_back_to_engagement() {
    let variants = vec![
        direct(email("a", "10000", "", "500"), None, None),
        direct(email("b", "10000", "", "700"), None, None),
    ];
    let config = AnalysisConfig {
        commercial: CommercialMode::DirectInput,
        ..AnalysisConfig::default()
    };
    let c = conclude(&variants, &config);

    assert!(c.summary.contains(&NarrativeSegment::DirectInputAllMissing));
    assert_eq!(c.overall_winner_variant_name.as_deref(), Some("Variant B"));
    assert_eq!(engagement(&c).0, KpiField::ClickThroughRate);
}

#[test]
fn revenue_and_engagement_can_diverge() {
    let variants = vec![
        count_based(email("a", "10000", "", "1000"), "100", "50"),
        count_based(email("b", "10000", "", "800"), "120", "50"),
    ];
    let c = conclude(&variants, &count_config());

    assert_eq!(c.overall_winner_variant_name.as_deref(), Some("Variant B"));
    assert!((c.winning_kpi_performance_change.unwrap() - 20.0).abs() < 1e-9);
    assert!(c.summary.contains(&NarrativeSegment::BiggerPictureDiverged {
        commercial_winner: "Variant B".to_string(),
        commercial_kpi: "Total Revenue (£)".to_string(),
        engagement_winner: "Variant A".to_string(),
        engagement_kpi: "Click-Through Rate (CTR)".to_string(),
    }));

    let text = render(&c, RenderFormat::Text);
    assert!(text.contains("achieving £6,000.00"));
    assert!(text.contains("demonstrated superior total revenue (£)"));
}

#[test]
fn revenue_and_engagement_can_align() {
    let variants = vec![
        count_based(email("a", "10000", "", "500"), "50", "20"),
        count_based(email("b", "10000", "", "700"), "80", "20"),
    ];
    let c = conclude(&variants, &count_config());

    assert!(c.summary.contains(&NarrativeSegment::BiggerPictureAligned {
        variant_name: "Variant B".to_string(),
        significant_improvement: true,
    }));
    assert!(!c.is_flat_result);
}

#[test]
fn conversion_rate_stands_in_for_missing_revenue() {
    let variants = vec![
        count_based(email("a", "10000", "", "1000"), "100", ""),
        count_based(email("b", "10000", "", "1000"), "150", ""),
    ];
    let c = conclude(&variants, &count_config());

    let kpi = c
        .summary
        .iter()
        .find_map(|s| match s {
            NarrativeSegment::CommercialSummary { kpi } => Some(kpi),
            _ => None,
        })
        .unwrap();
    assert_eq!(kpi.field, KpiField::ConversionRate);
    assert_eq!(kpi.kpi_display_name, "Purchases Rate");
    assert!(kpi.is_significant());
}

#[test]
fn explicit_primary_and_fallback_basis() {
    let with_opens = vec![
        email("a", "10000", "1000", "500"),
        email("b", "10000", "1100", "600"),
    ];
    let ctr_primary = AnalysisConfig {
        primary_engagement_metric: PrimaryEngagementMetric::ClickThroughRate,
        ..AnalysisConfig::default()
    };
    assert_eq!(
        engagement(&conclude(&with_opens, &ctr_primary)),
        (KpiField::ClickThroughRate, EngagementBasis::Primary)
    );

    let without_opens = vec![email("a", "10000", "", "500"), email("b", "10000", "", "600")];
    let open_primary = AnalysisConfig {
        primary_engagement_metric: PrimaryEngagementMetric::OpenRate,
        ..AnalysisConfig::default()
    };
    assert_eq!(
        engagement(&conclude(&without_opens, &open_primary)),
        (KpiField::ClickThroughRate, EngagementBasis::Fallback)
    );
}

#[test]
fn sms_ignores_open_counts() {
    let variants = vec![
        email("a", "10000", "1000", "500"),
        email("b", "10000", "3000", "400"),
    ];
    let config = AnalysisConfig {
        channel: Channel::Sms,
        primary_engagement_metric: PrimaryEngagementMetric::OpenRate,
        ..AnalysisConfig::default()
    };
    let outcome = analyze(&variants, "a", &config);

    assert!(outcome.rates.iter().all(|r| r.open_rate.numeric().is_none()));
    assert_eq!(
        engagement(&outcome.conclusion),
        (KpiField::ClickThroughRate, EngagementBasis::Primary)
    );
    assert_eq!(outcome.conclusion.overall_winner_variant_name.as_deref(), Some("Variant A"));
}

#[test]
fn missing_everything_is_inconclusive() {
    let variants = vec![Variant::new("a", "Variant A"), Variant::new("b", "Variant B")];
    let c = conclude(&variants, &count_config());

    assert_eq!(c, TestConclusionData::inconclusive());
    assert_eq!(
        render(&c, RenderFormat::Text),
        "The test analysis is inconclusive due to missing or N/A data across key metrics."
    );
}

#[test]
fn both_significant_picks_the_larger_uplift() {
    let variants = vec![
        email("a", "10000", "1000", "500"),
        email("b", "10000", "1500", "600"),
    ];
    let outcome = analyze(&variants, "a", &AnalysisConfig::default());

    assert!(outcome.rates[1].open_rate_sig.is_significant);
    assert!(outcome.rates[1].click_through_rate_sig.is_significant);
    assert_eq!(
        engagement(&outcome.conclusion),
        (KpiField::OpenRate, EngagementBasis::MostImpactful)
    );
    assert!((outcome.conclusion.winning_kpi_performance_change.unwrap() - 50.0).abs() < 1e-9);
}

#[test]
fn neither_significant_still_picks_the_larger_uplift() {
    let variants = vec![
        email("a", "10000", "1000", "500"),
        email("b", "10000", "1030", "505"),
    ];
    let outcome = analyze(&variants, "a", &AnalysisConfig::default());

    assert!(!outcome.rates[1].open_rate_sig.is_significant);
    assert!(!outcome.rates[1].click_through_rate_sig.is_significant);
    assert_eq!(
        engagement(&outcome.conclusion),
        (KpiField::OpenRate, EngagementBasis::MostImpactful)
    );
    assert!((outcome.conclusion.winning_kpi_performance_change.unwrap() - 3.0).abs() < 1e-9);
    assert!(outcome.conclusion.is_flat_result);
}

#[test]
fn control_holding_on_is_flat() {
    let variants = vec![email("a", "10000", "", "500"), email("b", "10000", "", "450")];
    let config = AnalysisConfig {
        channel: Channel::Sms,
        ..AnalysisConfig::default()
    };
    let c = conclude(&variants, &config);

    assert_eq!(c.overall_winner_variant_name.as_deref(), Some("Variant A"));
    assert_eq!(c.winning_kpi_performance_change, Some(0.0));
    assert!(c.is_flat_result);

    let text = render(&c, RenderFormat::Text);
    assert!(text.contains("The Control variant performed best or was not significantly outperformed"));
    assert!(text.contains("the test results appear flat"));
}

#[test]
fn shared_names_do_not_make_winners_align() {
    let same_name = |id: &str, clicks: &str, conversions: &str| {
        count_based(
            Variant::new(id, "Spring offer").with_engagement("10000", None, Some(clicks.into())),
            conversions,
            "50",
        )
    };
    let variants = vec![same_name("a", "1000", "100"), same_name("b", "800", "120")];
    let c = conclude(&variants, &count_config());

    assert!(c.summary.iter().any(|s| matches!(s, NarrativeSegment::BiggerPictureDiverged { .. })));
    assert!(!c.summary.iter().any(|s| matches!(s, NarrativeSegment::BiggerPictureAligned { .. })));
}
