//! Supply query handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use supplyindex_core::{ChainSource, SupplyLedger};

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    pub ledger: Arc<SupplyLedger>,
    pub source: Arc<dyn ChainSource>,
    /// Floor substituted when the source reports no estimate (`-1`).
    pub min_estimate_fee: Option<f64>,
}

/// Rendering mode selector: `?format=plaintext` returns the bare decimal
/// string; anything else returns a single-field JSON record.
#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    pub format: Option<String>,
}

impl FormatQuery {
    fn is_plaintext(&self) -> bool {
        self.format.as_deref() == Some("plaintext")
    }
}

#[derive(Debug, Serialize)]
pub struct TotalSupplyResponse {
    pub total_supply: String,
}

#[derive(Debug, Serialize)]
pub struct CirculationSupplyResponse {
    pub circulation_supply: String,
}

/// `GET /supply/total`
pub async fn total_supply(
    State(state): State<ApiState>,
    Query(query): Query<FormatQuery>,
) -> Response {
    let total_supply = state.ledger.snapshot().total_coins();
    if query.is_plaintext() {
        total_supply.into_response()
    } else {
        Json(TotalSupplyResponse { total_supply }).into_response()
    }
}

/// `GET /supply/circulating`
///
/// Zero when no exclusion set was configured at engine construction.
pub async fn circulation_supply(
    State(state): State<ApiState>,
    Query(query): Query<FormatQuery>,
) -> Response {
    let circulation_supply = state.ledger.snapshot().circulating_coins();
    if query.is_plaintext() {
        circulation_supply.into_response()
    } else {
        Json(CirculationSupplyResponse { circulation_supply }).into_response()
    }
}

/// Confirmation-target selector: a comma-separated list of block counts,
/// defaulting to `2`.
#[derive(Debug, Deserialize)]
pub struct FeeQuery {
    #[serde(rename = "nbBlocks")]
    pub nb_blocks: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `GET /utils/estimatefee?nbBlocks=2,4,6`
///
/// Returns a map from each requested confirmation target to the estimated
/// fee rate in coins per kilobyte. Targets with no estimate yet report the
/// configured floor, or `-1` when no floor is set.
pub async fn estimate_fee(
    State(state): State<ApiState>,
    Query(query): Query<FeeQuery>,
) -> Response {
    let raw = query.nb_blocks.as_deref().unwrap_or("2");
    let mut targets = Vec::new();
    for part in raw.split(',') {
        match part.trim().parse::<u32>() {
            Ok(blocks) => targets.push(blocks),
            Err(_) => {
                let body = Json(ErrorResponse {
                    error: format!("invalid block count: {part:?}"),
                });
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
        }
    }

    let mut fees = BTreeMap::new();
    for blocks in targets {
        let fee = match state.source.estimate_fee(blocks).await {
            Ok(fee) => fee,
            Err(err) => {
                tracing::warn!(blocks, %err, "fee estimation failed");
                let body = Json(ErrorResponse {
                    error: err.to_string(),
                });
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };
        let fee = match state.min_estimate_fee {
            Some(floor) if fee < 0.0 => floor,
            _ => fee,
        };
        fees.insert(blocks.to_string(), fee);
    }
    Json(fees).into_response()
}

/// `GET /health`
pub async fn health() -> &'static str {
    "OK"
}
