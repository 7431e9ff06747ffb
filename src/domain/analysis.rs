use crate::domain::variant::Currency;
use serde::{Deserialize, Serialize};

pub const NOT_AVAILABLE_DISPLAY: &str = "N/A";
pub const NO_DENOMINATOR_DISPLAY: &str = "N/A (No Clicks)";

static NOT_AVAILABLE: MetricValue = MetricValue::NotAvailable;

/// A rate or amount as shown to the user.
///
/// `value` is what a reader would parse back out of `display` (rounded to two
/// decimals), so every comparison runs on the figures the user actually sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricValue {
    Measured { value: f64, display: String },
    NotAvailable,
    NoDenominator,
}

impl MetricValue {
    pub fn percentage(percent: f64) -> Self {
        if !percent.is_finite() {
            return MetricValue::NotAvailable;
        }
        let display = fixed_two(percent);
        let value = display.parse::<f64>().unwrap_or(percent);
        MetricValue::Measured {
            value,
            display: format!("{}%", display),
        }
    }

    pub fn currency(amount: f64, currency: Currency) -> Self {
        if !amount.is_finite() {
            return MetricValue::NotAvailable;
        }
        let value = fixed_two(amount).parse::<f64>().unwrap_or(amount);
        MetricValue::Measured {
            value,
            display: format_currency(amount, currency),
        }
    }

    pub fn numeric(&self) -> Option<f64> {
        match self {
            MetricValue::Measured { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn display(&self) -> &str {
        match self {
            MetricValue::Measured { display, .. } => display,
            MetricValue::NotAvailable => NOT_AVAILABLE_DISPLAY,
            MetricValue::NoDenominator => NO_DENOMINATOR_DISPLAY,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.display())
    }
}

/// Two-decimal text of `x`, rounding exact midpoints away from zero.
/// Values that only look like midpoints in decimal (1.005 is stored just
/// below) round by their stored value.
pub fn fixed_two(x: f64) -> String {
    let doubled = (x * 200.0).round();
    if doubled % 2.0 != 0.0 && x.mul_add(200.0, -doubled) == 0.0 {
        let hundredths = (doubled + doubled.signum()) / 2.0;
        return format!("{:.2}", hundredths / 100.0);
    }
    format!("{:.2}", x)
}

pub fn format_currency(amount: f64, currency: Currency) -> String {
    let fixed = fixed_two(amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, currency.symbol(), grouped, cents)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceInfo {
    pub p_value: Option<f64>,
    pub is_significant: bool,
}

impl SignificanceInfo {
    pub fn inconclusive() -> Self {
        Self {
            p_value: None,
            is_significant: false,
        }
    }
}

impl Default for SignificanceInfo {
    fn default() -> Self {
        Self::inconclusive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CommercialRates {
    Excluded,
    CountBased {
        conversion_rate: MetricValue,
        conversion_rate_sig: SignificanceInfo,
        total_revenue: MetricValue,
    },
    DirectInput {
        srr_rate: MetricValue,
        mrr_rate: MetricValue,
        average_ipp: MetricValue,
        cct: MetricValue,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateData {
    pub id: String,
    pub name: String,
    pub sends_raw: Option<f64>,
    pub unique_opens_raw: Option<f64>,
    pub unique_clicks_raw: Option<f64>,
    pub conversions_raw: Option<f64>,
    pub open_rate: MetricValue,
    pub open_rate_sig: SignificanceInfo,
    pub click_through_rate: MetricValue,
    pub click_through_rate_sig: SignificanceInfo,
    pub commercial: CommercialRates,
}

impl RateData {
    pub fn metric(&self, field: KpiField) -> &MetricValue {
        match (field, &self.commercial) {
            (KpiField::OpenRate, _) => &self.open_rate,
            (KpiField::ClickThroughRate, _) => &self.click_through_rate,
            (KpiField::ConversionRate, CommercialRates::CountBased { conversion_rate, .. }) => conversion_rate,
            (KpiField::TotalRevenue, CommercialRates::CountBased { total_revenue, .. }) => total_revenue,
            (KpiField::SrrRate, CommercialRates::DirectInput { srr_rate, .. }) => srr_rate,
            (KpiField::MrrRate, CommercialRates::DirectInput { mrr_rate, .. }) => mrr_rate,
            (KpiField::AverageIpp, CommercialRates::DirectInput { average_ipp, .. }) => average_ipp,
            (KpiField::Cct, CommercialRates::DirectInput { cct, .. }) => cct,
            _ => &NOT_AVAILABLE,
        }
    }

    /// Significance against control; only count-based fields carry one.
    pub fn significance(&self, field: KpiField) -> Option<&SignificanceInfo> {
        match (field, &self.commercial) {
            (KpiField::OpenRate, _) => Some(&self.open_rate_sig),
            (KpiField::ClickThroughRate, _) => Some(&self.click_through_rate_sig),
            (
                KpiField::ConversionRate,
                CommercialRates::CountBased {
                    conversion_rate_sig, ..
                },
            ) => Some(conversion_rate_sig),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiField {
    OpenRate,
    ClickThroughRate,
    ConversionRate,
    TotalRevenue,
    SrrRate,
    MrrRate,
    AverageIpp,
    Cct,
}

impl KpiField {
    pub fn is_count_based(&self) -> bool {
        matches!(
            self,
            KpiField::OpenRate | KpiField::ClickThroughRate | KpiField::ConversionRate
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiWinnerInfo {
    pub field: KpiField,
    pub kpi_display_name: String,
    pub winner_variant_id: Option<String>,
    pub winner_variant_name: String,
    pub winner_is_control: bool,
    pub winner_kpi_value: MetricValue,
    pub control_kpi_value: MetricValue,
    pub performance_change_percent: Option<f64>,
    pub is_conclusive: bool,
    pub significance: Option<SignificanceInfo>,
}

impl KpiWinnerInfo {
    pub fn is_significant(&self) -> bool {
        self.significance
            .as_ref()
            .map(|s| s.is_significant)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementBasis {
    MostImpactful,
    Primary,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NarrativeSegment {
    DirectInputHeading,
    DirectInputMetric {
        kpi: KpiWinnerInfo,
    },
    DirectInputMetricInconclusive {
        kpi_display_name: String,
    },
    DirectInputAllMissing,
    CommercialSummary {
        kpi: KpiWinnerInfo,
    },
    CommercialInconclusive,
    EngagementSummary {
        kpi: KpiWinnerInfo,
        basis: EngagementBasis,
    },
    EngagementInconclusive,
    BiggerPictureAligned {
        variant_name: String,
        significant_improvement: bool,
    },
    BiggerPictureDiverged {
        commercial_winner: String,
        commercial_kpi: String,
        engagement_winner: String,
        engagement_kpi: String,
    },
    FlatResultNotice {
        variant_name: String,
        kpi_display_name: String,
    },
    Inconclusive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestConclusionData {
    pub summary: Vec<NarrativeSegment>,
    pub overall_winner_variant_name: Option<String>,
    pub is_flat_result: bool,
    pub winning_kpi_performance_change: Option<f64>,
}

impl TestConclusionData {
    pub fn inconclusive() -> Self {
        Self {
            summary: vec![NarrativeSegment::Inconclusive],
            overall_winner_variant_name: None,
            is_flat_result: false,
            winning_kpi_performance_change: None,
        }
    }
}

/// Best variant id per KPI column, for highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnWinner {
    pub field: KpiField,
    pub variant_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub rates: Vec<RateData>,
    pub column_winners: Vec<ColumnWinner>,
    pub conclusion: TestConclusionData,
}
