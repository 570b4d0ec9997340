use chrono::NaiveDate;
use matching_engine::db_types::{DateChoices, LocationTag};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self { success: true, message: message.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequestParams {
    pub requester_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositParams {
    pub requester_id: String,
    pub amount: i64,
    #[serde(default = "default_deposit_reason")]
    pub reason: String,
}

fn default_deposit_reason() -> String {
    "operator deposit".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalParams {
    pub proposer_id: String,
    pub target_id: String,
}

/// The wire form of a schedule submission. Locations arrive as strings ("Seoul", "Seoul Gangnam")
/// and are parsed into tags server-side so malformed tags fail with a 400 rather than deep inside
/// the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoicesParams {
    pub dates: Vec<NaiveDate>,
    pub locations: Vec<String>,
}

impl ChoicesParams {
    pub fn into_choices(self) -> Result<DateChoices, ServerError> {
        let locations = self
            .locations
            .iter()
            .map(|s| s.parse::<LocationTag>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
        Ok(DateChoices::new(self.dates, locations))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteParams {
    pub requester_id: String,
    pub wants_again: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactParams {
    pub requester_id: String,
    pub contact: String,
}

/// Query parameters for the operator's stuck-pairs view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StuckPairsQuery {
    /// Pairs untouched for at least this many hours are reported.
    #[serde(default = "default_stalled_hours")]
    pub stalled_hours: i64,
}

fn default_stalled_hours() -> i64 {
    24
}
