use crate::domain::analysis::{CommercialRates, MetricValue, RateData, SignificanceInfo};
use crate::domain::variant::{
    parse_count, parse_signed, AnalysisConfig, Channel, CommercialInputs, CommercialMode, Currency, RawInput,
    Variant,
};
use crate::experiments::significance::{test_proportions_at, ProportionTest};

/// Rates for every variant, in input order, each compared against the control.
pub fn all_variant_rates(variants: &[Variant], control_id: &str, config: &AnalysisConfig) -> Vec<RateData> {
    let control = variants.iter().find(|v| v.id == control_id);
    variants
        .iter()
        .map(|variant| variant_rates(variant, control, config))
        .collect()
}

pub fn variant_rates(variant: &Variant, control: Option<&Variant>, config: &AnalysisConfig) -> RateData {
    let threshold = config.threshold();
    let is_control = control.is_some_and(|c| c.id == variant.id);
    let challenger_of = control.filter(|_| !is_control);

    let sends = parse_count(variant.sends.as_ref());
    let opens = parse_count(variant.unique_opens.as_ref());
    let clicks = parse_count(variant.unique_clicks.as_ref());
    let conversions = parse_count(variant.conversions());

    let control_sends = control.and_then(|c| parse_count(c.sends.as_ref()));
    let control_opens = control.and_then(|c| parse_count(c.unique_opens.as_ref()));
    let control_clicks = control.and_then(|c| parse_count(c.unique_clicks.as_ref()));
    let control_conversions = control.and_then(|c| parse_count(c.conversions()));

    let mut open_rate = MetricValue::NotAvailable;
    let mut open_rate_sig = SignificanceInfo::inconclusive();
    if config.channel == Channel::Email {
        if let (Some(s), Some(o)) = (sends, opens) {
            let baseline = challenger_of.and(control_opens.zip(control_sends));
            let out = compare(baseline, (o, s), threshold);
            open_rate = out.rate2.clone();
            if !is_control {
                open_rate_sig = out.significance();
            }
        }
    }

    let mut click_through_rate = MetricValue::NotAvailable;
    let mut click_through_rate_sig = SignificanceInfo::inconclusive();
    if let (Some(s), Some(c)) = (sends, clicks) {
        let baseline = challenger_of.and(control_clicks.zip(control_sends));
        let out = compare(baseline, (c, s), threshold);
        click_through_rate = out.rate2.clone();
        if !is_control {
            click_through_rate_sig = out.significance();
        }
    }

    let commercial = match &config.commercial {
        CommercialMode::Excluded => CommercialRates::Excluded,
        CommercialMode::DirectInput => direct_input_rates(variant, config.currency),
        CommercialMode::CountBased { .. } => {
            let mut conversion_rate = MetricValue::NotAvailable;
            let mut conversion_rate_sig = SignificanceInfo::inconclusive();
            match (clicks, conversions) {
                (Some(c), Some(conv)) if c > 0.0 => {
                    let baseline = challenger_of
                        .and(control_conversions.zip(control_clicks))
                        .filter(|(_, control_c)| *control_c > 0.0);
                    let out = compare(baseline, (conv, c), threshold);
                    conversion_rate = out.rate2.clone();
                    if !is_control {
                        conversion_rate_sig = out.significance();
                    }
                }
                (Some(c), _) if c == 0.0 => conversion_rate = MetricValue::NoDenominator,
                _ => {}
            }

            let total_revenue = match (
                conversions,
                parse_count(variant.average_value_per_conversion()),
            ) {
                (Some(conv), Some(aov)) => MetricValue::currency(conv * aov, config.currency),
                _ => MetricValue::NotAvailable,
            };

            CommercialRates::CountBased {
                conversion_rate,
                conversion_rate_sig,
                total_revenue,
            }
        }
    };

    RateData {
        id: variant.id.clone(),
        name: variant.name.clone(),
        sends_raw: sends,
        unique_opens_raw: opens,
        unique_clicks_raw: clicks,
        conversions_raw: conversions,
        open_rate,
        open_rate_sig,
        click_through_rate,
        click_through_rate_sig,
        commercial,
    }
}

/// Tests `own` against the control pair, or against itself when there is no
/// distinct control to compare with (defined rate, no real significance).
fn compare(baseline: Option<(f64, f64)>, own: (f64, f64), threshold: f64) -> ProportionTest {
    let (base_successes, base_trials) = baseline.unwrap_or(own);
    test_proportions_at(base_successes, base_trials, own.0, own.1, threshold)
}

fn direct_input_rates(variant: &Variant, currency: Currency) -> CommercialRates {
    let (srr, mrr, ipp, cct) = match &variant.commercial {
        Some(CommercialInputs::DirectInput {
            srr_rate,
            mrr_rate,
            average_ipp,
            cct,
        }) => (
            srr_rate.as_ref(),
            mrr_rate.as_ref(),
            average_ipp.as_ref(),
            cct.as_ref(),
        ),
        _ => (None, None, None, None),
    };

    CommercialRates::DirectInput {
        srr_rate: direct_percentage(srr),
        mrr_rate: direct_percentage(mrr),
        average_ipp: parse_count(ipp)
            .map(|v| MetricValue::currency(v, currency))
            .unwrap_or(MetricValue::NotAvailable),
        cct: direct_percentage(cct),
    }
}

fn direct_percentage(input: Option<&RawInput>) -> MetricValue {
    parse_signed(input)
        .map(MetricValue::percentage)
        .unwrap_or(MetricValue::NotAvailable)
}
