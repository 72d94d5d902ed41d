use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use emolens_core::Analyzer;

pub type SharedAnalyzer = Arc<Analyzer>;

#[derive(Clone)]
pub struct ServerState {
    pub start_time: Instant,
    pub analyzer: SharedAnalyzer,
}

impl ServerState {
    pub fn new(analyzer: Analyzer) -> ServerState {
        ServerState {
            start_time: Instant::now(),
            analyzer: Arc::new(analyzer),
        }
    }
}

impl FromRef<ServerState> for SharedAnalyzer {
    fn from_ref(input: &ServerState) -> Self {
        input.analyzer.clone()
    }
}
