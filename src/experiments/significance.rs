use crate::domain::analysis::{MetricValue, SignificanceInfo};
use crate::domain::variant::DEFAULT_SIGNIFICANCE_THRESHOLD;
use crate::experiments::normal::standard_normal_cdf;
use serde::Serialize;

/// Minimum expected successes and failures per group for the normal
/// approximation to hold.
pub const MIN_EXPECTED_COUNT: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionTest {
    pub rate1: MetricValue,
    pub rate2: MetricValue,
    pub z_score: Option<f64>,
    pub p_value: Option<f64>,
    pub is_significant: bool,
}

impl ProportionTest {
    pub fn significance(&self) -> SignificanceInfo {
        SignificanceInfo {
            p_value: self.p_value,
            is_significant: self.is_significant,
        }
    }
}

pub fn test_proportions(successes1: f64, trials1: f64, successes2: f64, trials2: f64) -> ProportionTest {
    test_proportions_at(
        successes1,
        trials1,
        successes2,
        trials2,
        DEFAULT_SIGNIFICANCE_THRESHOLD,
    )
}

/// Two-proportion pooled Z-test of group 2 (challenger) against group 1 (baseline).
pub fn test_proportions_at(
    successes1: f64,
    trials1: f64,
    successes2: f64,
    trials2: f64,
    threshold: f64,
) -> ProportionTest {
    if trials1 <= 0.0
        || trials2 <= 0.0
        || successes1 < 0.0
        || successes2 < 0.0
        || successes1 > trials1
        || successes2 > trials2
    {
        return ProportionTest {
            rate1: rate_of(successes1, trials1),
            rate2: rate_of(successes2, trials2),
            z_score: None,
            p_value: None,
            is_significant: false,
        };
    }

    let p1 = successes1 / trials1;
    let p2 = successes2 / trials2;
    let rate1 = MetricValue::percentage(p1 * 100.0);
    let rate2 = MetricValue::percentage(p2 * 100.0);
    let untestable = ProportionTest {
        rate1: rate1.clone(),
        rate2: rate2.clone(),
        z_score: None,
        p_value: if p1 == p2 { Some(1.0) } else { None },
        is_significant: false,
    };

    if trials1 * p1 < MIN_EXPECTED_COUNT
        || trials1 * (1.0 - p1) < MIN_EXPECTED_COUNT
        || trials2 * p2 < MIN_EXPECTED_COUNT
        || trials2 * (1.0 - p2) < MIN_EXPECTED_COUNT
        || p1 == p2
    {
        return untestable;
    }

    let pooled = (successes1 + successes2) / (trials1 + trials2);
    if pooled == 0.0 || pooled == 1.0 {
        return untestable;
    }

    let se = (pooled * (1.0 - pooled) * (1.0 / trials1 + 1.0 / trials2)).sqrt();
    if se == 0.0 {
        return ProportionTest {
            rate1,
            rate2,
            z_score: None,
            p_value: Some(if p1 == p2 { 1.0 } else { 0.0 }),
            is_significant: p1 != p2,
        };
    }

    let z = (p2 - p1) / se;
    let p = 2.0 * (1.0 - standard_normal_cdf(z.abs()));
    if p.is_nan() {
        return ProportionTest {
            rate1,
            rate2,
            z_score: Some(z).filter(|z| !z.is_nan()),
            p_value: None,
            is_significant: false,
        };
    }

    ProportionTest {
        rate1,
        rate2,
        z_score: Some(z),
        p_value: Some(p),
        is_significant: p < threshold,
    }
}

fn rate_of(successes: f64, trials: f64) -> MetricValue {
    if trials > 0.0 {
        MetricValue::percentage(successes / trials * 100.0)
    } else {
        MetricValue::NotAvailable
    }
}
