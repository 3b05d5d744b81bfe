//! Stamp verification endpoint.
//!
//! Verification is structural (prefix + length); a passing stamp gets a
//! mocked provenance record so the dashboard can render a ledger-style
//! detail view. Real ledger anchoring is out of scope.

use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use pb_domain::stamp::verify_stamp;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
    #[serde(default)]
    pub stamp: String,
}

pub async fn verify(State(state): State<AppState>, Json(body): Json<VerifyBody>) -> Response {
    let stamp = body.stamp.trim();

    if !verify_stamp(stamp) {
        return Json(json!({
            "isValid": false,
            "message": "Invalid stamp format",
        }))
        .into_response();
    }

    state.analytics.record_verification();
    tracing::debug!(stamp = %stamp, "stamp verified");

    Json(json!({
        "isValid": true,
        "message": "Stamp verified successfully",
        "source": "PulseBot Official Response",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "blockNumber": mock_block_number(stamp),
    }))
    .into_response()
}

/// Derive a stable, plausible-looking block number from the stamp itself
/// so repeated lookups of the same stamp agree.
fn mock_block_number(stamp: &str) -> u64 {
    let digest = Sha256::digest(stamp.as_bytes());
    let word = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    17_000_000 + u64::from(word % 1_000_000)
}
