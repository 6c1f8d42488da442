//! Request and response bodies of the HTTP API

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisOutput, Instance};

/// Body of `POST /analyze`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub instances: Vec<Instance>,
}

/// Successful (or rejected) `POST /analyze` response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalyzeResponse {
    pub outputs: Vec<AnalysisOutput>,
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
