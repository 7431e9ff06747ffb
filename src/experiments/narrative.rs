use crate::domain::analysis::{
    EngagementBasis, KpiWinnerInfo, NarrativeSegment, SignificanceInfo, TestConclusionData,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    #[default]
    Text,
    Html,
    Json,
}

impl RenderFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Some(Self::Text),
            "html" => Some(Self::Html),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Text => "text/plain; charset=utf-8",
            Self::Html => "text/html; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

/// A piece of narrative text; `strong` marks emphasis for formats that have it.
#[derive(Debug, Clone, PartialEq)]
enum Span {
    Plain(String),
    Strong(String),
}

fn plain(s: impl Into<String>) -> Span {
    Span::Plain(s.into())
}

fn strong(s: impl Into<String>) -> Span {
    Span::Strong(s.into())
}

pub fn render(conclusion: &TestConclusionData, format: RenderFormat) -> String {
    match format {
        RenderFormat::Json => serde_json::to_string_pretty(conclusion).unwrap_or_else(|_| "{}".to_string()),
        RenderFormat::Text => conclusion
            .summary
            .iter()
            .map(|segment| {
                paragraph(segment)
                    .into_iter()
                    .map(|span| match span {
                        Span::Plain(s) | Span::Strong(s) => s,
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n"),
        RenderFormat::Html => conclusion
            .summary
            .iter()
            .map(|segment| {
                let body: String = paragraph(segment)
                    .into_iter()
                    .map(|span| match span {
                        Span::Plain(s) => escape_html(&s),
                        Span::Strong(s) => format!("<strong>{}</strong>", escape_html(&s)),
                    })
                    .collect();
                format!("<p class=\"{}\">{}</p>", css_class(segment), body)
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn css_class(segment: &NarrativeSegment) -> &'static str {
    match segment {
        NarrativeSegment::DirectInputHeading
        | NarrativeSegment::DirectInputMetric { .. }
        | NarrativeSegment::DirectInputMetricInconclusive { .. }
        | NarrativeSegment::DirectInputAllMissing => "direct-input",
        NarrativeSegment::CommercialSummary { .. } | NarrativeSegment::CommercialInconclusive => "commercial",
        NarrativeSegment::EngagementSummary { .. } | NarrativeSegment::EngagementInconclusive => "engagement",
        NarrativeSegment::BiggerPictureAligned { .. } | NarrativeSegment::BiggerPictureDiverged { .. } => {
            "bigger-picture"
        }
        NarrativeSegment::FlatResultNotice { .. } => "flat-result",
        NarrativeSegment::Inconclusive => "inconclusive",
    }
}

fn paragraph(segment: &NarrativeSegment) -> Vec<Span> {
    match segment {
        NarrativeSegment::DirectInputHeading => vec![strong("Direct-input commercial analysis (direct comparison):")],
        NarrativeSegment::DirectInputMetric { kpi } => vec![
            plain(format!("{}: ", kpi.kpi_display_name)),
            strong(kpi.winner_variant_name.clone()),
            plain(format!(" at {}.", kpi.winner_kpi_value)),
        ],
        NarrativeSegment::DirectInputMetricInconclusive { kpi_display_name } => {
            vec![plain(format!("{} analysis inconclusive.", kpi_display_name))]
        }
        NarrativeSegment::DirectInputAllMissing => vec![plain(
            "Overall direct-input commercial analysis inconclusive due to missing data for all key metrics.",
        )],
        NarrativeSegment::CommercialSummary { kpi } => {
            let mut spans = vec![
                plain("For commercial performance, focusing on "),
                strong(kpi.kpi_display_name.clone()),
                plain(", "),
                strong(kpi.winner_variant_name.clone()),
                plain(" was the top performer achieving "),
                strong(kpi.winner_kpi_value.to_string()),
                plain("."),
            ];
            spans.extend(comparison(kpi, "This represented a", "compared to the Control's"));
            spans
        }
        NarrativeSegment::CommercialInconclusive => vec![plain(
            "Commercial performance analysis based on commercial metrics was inconclusive due to missing data.",
        )],
        NarrativeSegment::EngagementSummary { kpi, basis } => {
            let description = match basis {
                EngagementBasis::MostImpactful => "the most impactful metric",
                EngagementBasis::Primary => "the primary metric",
                EngagementBasis::Fallback => "the fallback metric",
            };
            let mut spans = vec![
                plain("For engagement, based on "),
                strong(format!("{}, {}", description, kpi.kpi_display_name)),
                plain(", "),
                strong(kpi.winner_variant_name.clone()),
                plain(" led with "),
                strong(kpi.winner_kpi_value.to_string()),
                plain("."),
            ];
            spans.extend(comparison(kpi, "This was a", "over the Control's"));
            spans
        }
        NarrativeSegment::EngagementInconclusive => vec![plain(
            "Engagement performance analysis based on engagement metrics was inconclusive due to missing data.",
        )],
        NarrativeSegment::BiggerPictureAligned {
            variant_name,
            significant_improvement,
        } => {
            let mut spans = vec![
                plain("This indicates a strong overall performance for "),
                strong(variant_name.clone()),
                plain("."),
            ];
            if *significant_improvement {
                spans.push(plain(
                    " The improvement appears statistically significant for at least one key metric.",
                ));
            }
            spans
        }
        NarrativeSegment::BiggerPictureDiverged {
            commercial_winner,
            commercial_kpi,
            engagement_winner,
            engagement_kpi,
        } => vec![
            strong("Bigger Picture:"),
            plain(" This presents a nuanced picture. While "),
            strong(commercial_winner.clone()),
            plain(format!(" demonstrated superior {}, ", commercial_kpi.to_lowercase())),
            strong(engagement_winner.clone()),
            plain(format!(
                " was more effective at {}. The optimal choice depends on the primary objective of this test \
                 and the statistical significance of these differences (where applicable).",
                engagement_kpi.to_lowercase()
            )),
        ],
        NarrativeSegment::FlatResultNotice {
            variant_name,
            kpi_display_name,
        } => vec![
            plain("Overall, the test results appear flat. While "),
            strong(variant_name.clone()),
            plain(format!(
                " had the best performance on the primary KPI ({}), the difference was not statistically \
                 significant (where applicable) or the margin was negligible.",
                kpi_display_name
            )),
        ],
        NarrativeSegment::Inconclusive => vec![plain(
            "The test analysis is inconclusive due to missing or N/A data across key metrics.",
        )],
    }
}

fn comparison(kpi: &KpiWinnerInfo, lead: &str, against: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    match kpi.performance_change_percent {
        Some(change) if !kpi.winner_is_control => {
            let sign = if change > 0.0 { "+" } else { "" };
            spans.push(plain(format!(" {} ", lead)));
            spans.push(strong(format!("{}{:.1}% change", sign, change)));
            spans.push(plain(format!(" {} {}.", against, kpi.control_kpi_value)));
            if let Some(sentence) = kpi.significance.as_ref().and_then(significance_sentence) {
                spans.push(plain(sentence));
            }
        }
        Some(change) if kpi.winner_is_control && change == 0.0 => spans.push(plain(
            " The Control variant performed best or was not significantly outperformed by any challenger on this KPI.",
        )),
        _ => {}
    }
    spans
}

fn significance_sentence(sig: &SignificanceInfo) -> Option<String> {
    let p = sig.p_value?;
    let confidence = (1.0 - p) * 100.0;
    Some(if sig.is_significant {
        format!(
            " (This difference is statistically significant, with {:.1}% confidence that it's a real effect.)",
            confidence
        )
    } else {
        format!(
            " (This difference is not statistically significant. We only have {:.1}% confidence that it's a \
             real effect, so it could be due to random chance.)",
            confidence
        )
    })
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
