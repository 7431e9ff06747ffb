use crate::domain::analysis::{ColumnWinner, KpiField, KpiWinnerInfo, MetricValue, RateData};
use crate::domain::variant::{AnalysisConfig, Channel, CommercialMode};

/// Best performer on one KPI relative to the control.
///
/// The control starts as the incumbent, so it keeps the win when nobody else
/// has a measured value. A challenger that ties the incumbent control takes
/// the win. Unmeasured values never win and never block.
pub fn resolve_winner(
    rates: &[RateData],
    control_id: &str,
    field: KpiField,
    display_name: &str,
    higher_is_better: bool,
) -> KpiWinnerInfo {
    let Some(control) = rates.iter().find(|r| r.id == control_id) else {
        return KpiWinnerInfo {
            field,
            kpi_display_name: display_name.to_string(),
            winner_variant_id: None,
            winner_variant_name: "N/A".to_string(),
            winner_is_control: false,
            winner_kpi_value: MetricValue::NotAvailable,
            control_kpi_value: MetricValue::NotAvailable,
            performance_change_percent: None,
            is_conclusive: false,
            significance: None,
        };
    };

    let control_value = control.metric(field).numeric();
    let mut winner = control;
    let mut best = control_value;

    for candidate in rates {
        let Some(value) = candidate.metric(field).numeric() else {
            continue;
        };
        match best {
            Some(current) if !is_better(value, current, higher_is_better) => {
                if value == current && candidate.id != control_id && winner.id == control_id {
                    winner = candidate;
                }
            }
            _ => {
                best = Some(value);
                winner = candidate;
            }
        }
    }

    let winner_is_control = winner.id == control_id;
    let winner_value = winner.metric(field).numeric();

    let performance_change_percent = match (control_value, winner_value) {
        (Some(c), Some(w)) if !winner_is_control && c != 0.0 => Some((w - c) / c.abs() * 100.0),
        (Some(c), Some(_)) if winner_is_control => {
            let outperformed = rates
                .iter()
                .filter(|r| r.id != control_id)
                .filter_map(|r| r.metric(field).numeric())
                .any(|v| is_better(v, c, higher_is_better));
            if outperformed {
                None
            } else {
                Some(0.0)
            }
        }
        _ => None,
    };

    let significance = if winner_is_control {
        None
    } else {
        winner.significance(field).cloned()
    };

    KpiWinnerInfo {
        field,
        kpi_display_name: display_name.to_string(),
        winner_variant_id: Some(winner.id.clone()),
        winner_variant_name: winner.name.clone(),
        winner_is_control,
        winner_kpi_value: winner.metric(field).clone(),
        control_kpi_value: control.metric(field).clone(),
        performance_change_percent,
        is_conclusive: winner_value.is_some(),
        significance,
    }
}

fn is_better(value: f64, current: f64, higher_is_better: bool) -> bool {
    if higher_is_better {
        value > current
    } else {
        value < current
    }
}

/// Best measured value per column, first variant wins ties. Columns follow
/// the configuration: open rate only for email, commercial columns per mode.
pub fn column_winners(rates: &[RateData], config: &AnalysisConfig) -> Vec<ColumnWinner> {
    let mut fields = Vec::new();
    if config.channel == Channel::Email {
        fields.push(KpiField::OpenRate);
    }
    fields.push(KpiField::ClickThroughRate);
    match config.commercial {
        CommercialMode::Excluded => {}
        CommercialMode::DirectInput => fields.extend([
            KpiField::SrrRate,
            KpiField::MrrRate,
            KpiField::AverageIpp,
            KpiField::Cct,
        ]),
        CommercialMode::CountBased { .. } => {
            fields.extend([KpiField::ConversionRate, KpiField::TotalRevenue])
        }
    }

    fields
        .into_iter()
        .map(|field| {
            let mut best: Option<(f64, &str)> = None;
            for rate in rates {
                let Some(value) = rate.metric(field).numeric() else {
                    continue;
                };
                if best.map_or(true, |(current, _)| value > current) {
                    best = Some((value, rate.id.as_str()));
                }
            }
            ColumnWinner {
                field,
                variant_id: best.map(|(_, id)| id.to_string()),
            }
        })
        .collect()
}
