use ab_test_analysis::config::AppConfig;
use ab_test_analysis::domain::analysis::{CommercialRates, RateData};
use ab_test_analysis::domain::request::EvaluateRequest;
use ab_test_analysis::experiments::narrative::{render, RenderFormat};
use ab_test_analysis::service::analysis_service::AnalysisService;
use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: analysis_report <request.json>"))?;
    let format_name = std::env::var("REPORT_FORMAT").unwrap_or_else(|_| "text".to_string());
    let format = RenderFormat::parse(&format_name)
        .ok_or_else(|| anyhow!("unsupported REPORT_FORMAT {}", format_name))?;

    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
    let req: EvaluateRequest =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path))?;

    let cfg = AppConfig::from_env();
    let outcome = AnalysisService::new(cfg.significance_threshold)
        .evaluate(req)
        .map_err(|(status, body)| anyhow!("{} {}: {}", status, body.error.code, body.error.message))?;

    if format != RenderFormat::Json {
        for rate in &outcome.rates {
            println!("{}", table_row(rate));
        }
        println!();
    }
    println!("{}", render(&outcome.conclusion, format));
    Ok(())
}

fn table_row(rate: &RateData) -> String {
    let mut row = format!(
        "{:<20} OR {:>8}  CTR {:>8}",
        rate.name, rate.open_rate, rate.click_through_rate
    );
    match &rate.commercial {
        CommercialRates::Excluded => {}
        CommercialRates::CountBased {
            conversion_rate,
            total_revenue,
            ..
        } => row.push_str(&format!("  CR {:>16}  Revenue {:>14}", conversion_rate, total_revenue)),
        CommercialRates::DirectInput {
            srr_rate,
            mrr_rate,
            average_ipp,
            cct,
        } => row.push_str(&format!(
            "  SRR {:>8}  MRR {:>8}  IPP {:>12}  CCT {:>8}",
            srr_rate, mrr_rate, average_ipp, cct
        )),
    }
    row
}
