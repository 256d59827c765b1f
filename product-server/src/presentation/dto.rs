use serde::Serialize;
use serde_json::Value;

use crate::presentation::mock::MockProduct;

pub const LIST_FALLBACK_NOTE: &str = "Returning mock data due to database error";

#[derive(Debug, Serialize)]
pub struct ListFallbackResponse {
    pub error: String,
    pub note: &'static str,
    #[serde(rename = "mockData")]
    pub mock_data: Vec<MockProduct>,
}

#[derive(Debug, Serialize)]
pub struct CreateFallbackResponse {
    pub error: String,
    #[serde(rename = "mockResponse")]
    pub mock_response: Value,
}

#[derive(Debug, Serialize)]
pub struct ApiTestResponse {
    pub message: &'static str,
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub datastore: &'static str,
    pub timestamp: String,
}
