use ab_test_analysis::config::AppConfig;
use ab_test_analysis::http::routes::build_router;
use ab_test_analysis::service::analysis_service::AnalysisService;
use ab_test_analysis::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let state = AppState {
        analysis_service: AnalysisService::new(cfg.significance_threshold),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(
        "listening on {} significance_threshold={}",
        cfg.bind_addr,
        cfg.significance_threshold
    );
    axum::serve(listener, app).await?;
    Ok(())
}
