pub mod config;
pub mod domain {
    pub mod analysis;
    pub mod request;
    pub mod snapshot;
    pub mod variant;
}
pub mod experiments {
    pub mod analyzer;
    pub mod conclusion;
    pub mod narrative;
    pub mod normal;
    pub mod rates;
    pub mod significance;
    pub mod winner;
}
pub mod http {
    pub mod handlers {
        pub mod analysis;
        pub mod ops;
    }
    pub mod routes;
}
pub mod service {
    pub mod analysis_service;
}

#[derive(Clone)]
pub struct AppState {
    pub analysis_service: service::analysis_service::AnalysisService,
}
