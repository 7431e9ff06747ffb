use serde::{Deserialize, Serialize};

pub const DEFAULT_SIGNIFICANCE_THRESHOLD: f64 = 0.05;
pub const DEFAULT_CONVERSION_METRIC_NAME: &str = "Conversions";

/// A numeric field as typed by the user: either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawInput {
    Number(f64),
    Text(String),
}

impl RawInput {
    /// Finite, non-negative value or `None` ("not provided").
    pub fn parse_count(&self) -> Option<f64> {
        self.parse_signed().filter(|v| *v >= 0.0)
    }

    pub fn parse_signed(&self) -> Option<f64> {
        let value = match self {
            RawInput::Number(n) => *n,
            RawInput::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()?
            }
        };
        if value.is_finite() {
            Some(value)
        } else {
            None
        }
    }
}

impl From<&str> for RawInput {
    fn from(s: &str) -> Self {
        RawInput::Text(s.to_string())
    }
}

impl From<f64> for RawInput {
    fn from(n: f64) -> Self {
        RawInput::Number(n)
    }
}

pub fn parse_count(input: Option<&RawInput>) -> Option<f64> {
    input.and_then(RawInput::parse_count)
}

pub fn parse_signed(input: Option<&RawInput>) -> Option<f64> {
    input.and_then(RawInput::parse_signed)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CommercialInputs {
    CountBased {
        #[serde(default)]
        conversions: Option<RawInput>,
        #[serde(default)]
        average_value_per_conversion: Option<RawInput>,
    },
    DirectInput {
        #[serde(default)]
        srr_rate: Option<RawInput>,
        #[serde(default)]
        mrr_rate: Option<RawInput>,
        #[serde(default)]
        average_ipp: Option<RawInput>,
        #[serde(default)]
        cct: Option<RawInput>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sends: Option<RawInput>,
    #[serde(default)]
    pub unique_opens: Option<RawInput>,
    #[serde(default)]
    pub unique_clicks: Option<RawInput>,
    #[serde(default)]
    pub commercial: Option<CommercialInputs>,
}

impl Variant {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            sends: None,
            unique_opens: None,
            unique_clicks: None,
            commercial: None,
        }
    }

    pub fn with_engagement(
        mut self,
        sends: impl Into<RawInput>,
        unique_opens: Option<RawInput>,
        unique_clicks: Option<RawInput>,
    ) -> Self {
        self.sends = Some(sends.into());
        self.unique_opens = unique_opens;
        self.unique_clicks = unique_clicks;
        self
    }

    pub fn with_commercial(mut self, commercial: CommercialInputs) -> Self {
        self.commercial = Some(commercial);
        self
    }

    pub fn conversions(&self) -> Option<&RawInput> {
        match &self.commercial {
            Some(CommercialInputs::CountBased { conversions, .. }) => conversions.as_ref(),
            _ => None,
        }
    }

    pub fn average_value_per_conversion(&self) -> Option<&RawInput> {
        match &self.commercial {
            Some(CommercialInputs::CountBased {
                average_value_per_conversion,
                ..
            }) => average_value_per_conversion.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    Gbp,
    Usd,
    Eur,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Gbp => "£",
            Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryEngagementMetric {
    OpenRate,
    ClickThroughRate,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CommercialMode {
    Excluded,
    CountBased {
        #[serde(default)]
        conversion_metric_name: String,
    },
    DirectInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub channel: Channel,
    pub primary_engagement_metric: PrimaryEngagementMetric,
    pub commercial: CommercialMode,
    pub currency: Currency,
    #[serde(default)]
    pub significance_threshold: Option<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            channel: Channel::Email,
            primary_engagement_metric: PrimaryEngagementMetric::Auto,
            commercial: CommercialMode::Excluded,
            currency: Currency::Gbp,
            significance_threshold: None,
        }
    }
}

impl AnalysisConfig {
    pub fn threshold(&self) -> f64 {
        self.significance_threshold
            .unwrap_or(DEFAULT_SIGNIFICANCE_THRESHOLD)
    }

    pub fn includes_commercial(&self) -> bool {
        !matches!(self.commercial, CommercialMode::Excluded)
    }

    pub fn direct_metrics_mode_active(&self) -> bool {
        matches!(self.commercial, CommercialMode::DirectInput)
    }

    pub fn conversion_metric_name(&self) -> &str {
        match &self.commercial {
            CommercialMode::CountBased {
                conversion_metric_name,
            } if !conversion_metric_name.trim().is_empty() => conversion_metric_name,
            _ => DEFAULT_CONVERSION_METRIC_NAME,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strings_and_numbers() {
        assert_eq!(RawInput::from(" 1200 ").parse_count(), Some(1200.0));
        assert_eq!(RawInput::from(12.5).parse_count(), Some(12.5));
        assert_eq!(RawInput::from("0").parse_count(), Some(0.0));
    }

    #[test]
    fn invalid_inputs_are_not_provided() {
        assert_eq!(RawInput::from("").parse_count(), None);
        assert_eq!(RawInput::from("abc").parse_count(), None);
        assert_eq!(RawInput::from("-3").parse_count(), None);
        assert_eq!(RawInput::from("NaN").parse_count(), None);
        assert_eq!(RawInput::from("-3").parse_signed(), Some(-3.0));
    }

    #[test]
    fn blank_conversion_name_falls_back() {
        let mut cfg = AnalysisConfig {
            commercial: CommercialMode::CountBased {
                conversion_metric_name: "  ".to_string(),
            },
            ..AnalysisConfig::default()
        };
        assert_eq!(cfg.conversion_metric_name(), "Conversions");

        cfg.commercial = CommercialMode::CountBased {
            conversion_metric_name: "Purchases".to_string(),
        };
        assert_eq!(cfg.conversion_metric_name(), "Purchases");
        assert!(cfg.includes_commercial());
        assert!(!cfg.direct_metrics_mode_active());
    }

    #[test]
    fn variant_json_accepts_mixed_inputs() {
        let v: Variant = serde_json::from_str(
            r#"{"id":"a","name":"A","sends":"1000","unique_clicks":50,
                "commercial":{"mode":"count_based","conversions":"5"}}"#,
        )
        .unwrap();
        assert_eq!(parse_count(v.sends.as_ref()), Some(1000.0));
        assert_eq!(parse_count(v.unique_clicks.as_ref()), Some(50.0));
        assert_eq!(parse_count(v.conversions()), Some(5.0));
        assert!(v.unique_opens.is_none());
    }
}
