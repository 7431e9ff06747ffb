use crate::domain::variant::DEFAULT_SIGNIFICANCE_THRESHOLD;

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub significance_threshold: f64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            significance_threshold: std::env::var("SIGNIFICANCE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|t| *t > 0.0 && *t < 1.0)
                .unwrap_or(DEFAULT_SIGNIFICANCE_THRESHOLD),
        }
    }
}
