use super::CleanResult;
use serde::{Deserialize, Serialize};

/// Request for POST /api/clean
#[derive(Debug, Serialize, Deserialize)]
pub struct CleanRequest {
    pub text: String,
}

/// Request for POST /api/clean/batch
#[derive(Debug, Serialize, Deserialize)]
pub struct CleanBatchRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CleanBatchResponse {
    pub results: Vec<CleanResult>,
}
