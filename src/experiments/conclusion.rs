use crate::domain::analysis::{
    EngagementBasis, KpiField, KpiWinnerInfo, NarrativeSegment, RateData, TestConclusionData,
};
use crate::domain::variant::{AnalysisConfig, Channel, CommercialMode, PrimaryEngagementMetric};
use crate::experiments::winner::resolve_winner;

/// Below this absolute uplift (in percent) a result without a usable
/// significance test counts as flat.
pub const FLAT_RESULT_MARGIN_PERCENT: f64 = 2.0;

pub const OPEN_RATE_DISPLAY: &str = "Open Rate (OR)";
pub const CLICK_THROUGH_RATE_DISPLAY: &str = "Click-Through Rate (CTR)";

pub fn synthesize(rates: &[RateData], control_id: &str, config: &AnalysisConfig) -> TestConclusionData {
    let mut summary = Vec::new();
    let symbol = config.currency.symbol();

    let commercial = match &config.commercial {
        CommercialMode::Excluded => None,
        CommercialMode::DirectInput => {
            let attempts = [
                resolve_winner(
                    rates,
                    control_id,
                    KpiField::AverageIpp,
                    &format!("Average IPP ({})", symbol),
                    true,
                ),
                resolve_winner(rates, control_id, KpiField::Cct, "CCT (%)", true),
                resolve_winner(rates, control_id, KpiField::SrrRate, "SRR (%)", true),
                resolve_winner(rates, control_id, KpiField::MrrRate, "MRR (%)", true),
            ];

            summary.push(NarrativeSegment::DirectInputHeading);
            for kpi in &attempts {
                summary.push(if kpi.is_conclusive {
                    NarrativeSegment::DirectInputMetric { kpi: kpi.clone() }
                } else {
                    NarrativeSegment::DirectInputMetricInconclusive {
                        kpi_display_name: kpi.kpi_display_name.clone(),
                    }
                });
            }

            let first = attempts.into_iter().find(|kpi| kpi.is_conclusive);
            if first.is_none() {
                summary.push(NarrativeSegment::DirectInputAllMissing);
            }
            first
        }
        CommercialMode::CountBased { .. } => {
            let revenue = resolve_winner(
                rates,
                control_id,
                KpiField::TotalRevenue,
                &format!("Total Revenue ({})", symbol),
                true,
            );
            let winner = if revenue.is_conclusive {
                Some(revenue)
            } else {
                Some(resolve_winner(
                    rates,
                    control_id,
                    KpiField::ConversionRate,
                    &format!("{} Rate", config.conversion_metric_name()),
                    true,
                ))
                .filter(|kpi| kpi.is_conclusive)
            };

            summary.push(match &winner {
                Some(kpi) => NarrativeSegment::CommercialSummary { kpi: kpi.clone() },
                None => NarrativeSegment::CommercialInconclusive,
            });
            winner
        }
    };

    let engagement = engagement_winner(rates, control_id, config);
    match &engagement {
        Some((kpi, basis)) => summary.push(NarrativeSegment::EngagementSummary {
            kpi: kpi.clone(),
            basis: *basis,
        }),
        None => summary.push(NarrativeSegment::EngagementInconclusive),
    }
    let engagement = engagement.map(|(kpi, _)| kpi);

    let Some(highlight) = commercial.as_ref().or(engagement.as_ref()) else {
        return TestConclusionData::inconclusive();
    };

    let overall = highlight.winner_variant_name.clone();
    let change = highlight.performance_change_percent;
    let is_flat_result = is_flat(highlight, rates, control_id);

    if let (Some(c), Some(e)) = (&commercial, &engagement) {
        if c.winner_variant_id == e.winner_variant_id {
            summary.push(NarrativeSegment::BiggerPictureAligned {
                variant_name: c.winner_variant_name.clone(),
                significant_improvement: !c.winner_is_control && (c.is_significant() || e.is_significant()),
            });
        } else {
            summary.push(NarrativeSegment::BiggerPictureDiverged {
                commercial_winner: c.winner_variant_name.clone(),
                commercial_kpi: c.kpi_display_name.clone(),
                engagement_winner: e.winner_variant_name.clone(),
                engagement_kpi: e.kpi_display_name.clone(),
            });
        }
    }

    if is_flat_result {
        summary.push(NarrativeSegment::FlatResultNotice {
            variant_name: overall.clone(),
            kpi_display_name: highlight.kpi_display_name.clone(),
        });
    }

    TestConclusionData {
        summary,
        overall_winner_variant_name: Some(overall),
        is_flat_result,
        winning_kpi_performance_change: change,
    }
}

fn engagement_winner(
    rates: &[RateData],
    control_id: &str,
    config: &AnalysisConfig,
) -> Option<(KpiWinnerInfo, EngagementBasis)> {
    let ctr = Some(resolve_winner(
        rates,
        control_id,
        KpiField::ClickThroughRate,
        CLICK_THROUGH_RATE_DISPLAY,
        true,
    ))
    .filter(|kpi| kpi.is_conclusive);
    let open = match config.channel {
        Channel::Email => Some(resolve_winner(
            rates,
            control_id,
            KpiField::OpenRate,
            OPEN_RATE_DISPLAY,
            true,
        ))
        .filter(|kpi| kpi.is_conclusive),
        Channel::Sms => None,
    };

    let primary = config.primary_engagement_metric;
    let chosen = match (primary, config.channel) {
        (PrimaryEngagementMetric::Auto, Channel::Email) => most_impactful(open, ctr),
        (PrimaryEngagementMetric::OpenRate, Channel::Email) => open.or(ctr),
        _ => ctr.or(open),
    }?;

    let basis = if primary == PrimaryEngagementMetric::Auto {
        EngagementBasis::MostImpactful
    } else if config.channel == Channel::Sms
        || (primary == PrimaryEngagementMetric::OpenRate && chosen.field == KpiField::OpenRate)
        || (primary == PrimaryEngagementMetric::ClickThroughRate && chosen.field == KpiField::ClickThroughRate)
    {
        EngagementBasis::Primary
    } else {
        EngagementBasis::Fallback
    };

    Some((chosen, basis))
}

/// Significant beats not significant; otherwise the larger absolute uplift
/// wins, click-through rate on ties.
fn most_impactful(open: Option<KpiWinnerInfo>, ctr: Option<KpiWinnerInfo>) -> Option<KpiWinnerInfo> {
    let open_sig = open.as_ref().is_some_and(KpiWinnerInfo::is_significant);
    let ctr_sig = ctr.as_ref().is_some_and(KpiWinnerInfo::is_significant);

    match (open, ctr) {
        (Some(_), Some(c)) if ctr_sig && !open_sig => Some(c),
        (Some(o), Some(_)) if open_sig && !ctr_sig => Some(o),
        (Some(o), Some(c)) => {
            let open_uplift = o.performance_change_percent.unwrap_or(0.0).abs();
            let ctr_uplift = c.performance_change_percent.unwrap_or(0.0).abs();
            if ctr_uplift >= open_uplift {
                Some(c)
            } else {
                Some(o)
            }
        }
        (open, ctr) => ctr.or(open),
    }
}

fn is_flat(highlight: &KpiWinnerInfo, rates: &[RateData], control_id: &str) -> bool {
    let change = highlight.performance_change_percent;
    let negligible = |c: Option<f64>| c.map_or(true, |c| c.abs() < FLAT_RESULT_MARGIN_PERCENT);

    if highlight.winner_is_control {
        let control_value = highlight.control_kpi_value.numeric();
        let challenger_won_significantly = rates.iter().filter(|r| r.id != control_id).any(|r| {
            let significant = r
                .significance(highlight.field)
                .is_some_and(|s| s.is_significant);
            match (r.metric(highlight.field).numeric(), control_value) {
                (Some(v), Some(c)) => significant && v > c,
                _ => false,
            }
        });
        return !challenger_won_significantly && negligible(change);
    }

    match &highlight.significance {
        Some(sig) if highlight.field.is_count_based() => !sig.is_significant,
        _ => change.is_some_and(|c| c.abs() < FLAT_RESULT_MARGIN_PERCENT),
    }
}
