use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

use crate::error::{internal_error, AppError, AppResult};
use crate::services::decoder::{self, DecodeRequest, DecodeResponse, DeviceMap, SearchBudget};
use crate::services::generator;
use crate::services::simulator::{self, SimulatedSignal};
use crate::state::AppState;

#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub(crate) struct SimulateRequest {
    pub(crate) devices: BTreeMap<String, Vec<i64>>,
    #[serde(default)]
    pub(crate) seed: Option<u64>,
}

fn validate_devices(devices: &DeviceMap) -> Result<(), AppError> {
    let Some(signal_length) = devices.values().next().map(Vec::len) else {
        return Err(AppError::bad_request("At least one device is required."));
    };
    if signal_length == 0 {
        return Err(AppError::bad_request(
            "Signal patterns must contain at least one sample.",
        ));
    }
    for pattern in devices.values() {
        if pattern.len() != signal_length {
            return Err(AppError::bad_request(
                "All signal patterns must have the same length.",
            ));
        }
        if pattern.iter().any(|v| *v < 0) {
            return Err(AppError::bad_request(
                "All signal patterns must contain non negative numbers.",
            ));
        }
    }

    // Any random subset must sum without overflow.
    let mut column_totals = vec![0i64; signal_length];
    for pattern in devices.values() {
        for (total, sample) in column_totals.iter_mut().zip(pattern) {
            *total = total.checked_add(*sample).ok_or_else(|| {
                AppError::bad_request("Combined signal values are too large.")
            })?;
        }
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/signal/simulate",
    tag = "signal",
    request_body = SimulateRequest,
    responses(
        (status = 200, description = "Combined signal of a random device subset", body = SimulatedSignal),
        (status = 400, description = "Invalid device patterns")
    )
)]
pub(crate) async fn simulate_signal(
    Json(request): Json<SimulateRequest>,
) -> AppResult<Json<SimulatedSignal>> {
    validate_devices(&request.devices)?;
    let mut rng = generator::request_rng(request.seed);
    let simulated = simulator::simulate(&request.devices, &mut rng);
    tracing::debug!(
        total_devices = simulated.total_devices,
        active = simulated.active_device_count,
        "simulated signal"
    );
    Ok(Json(simulated))
}

fn search_budget(state: &AppState, cancel: CancellationToken) -> SearchBudget {
    let mut budget = SearchBudget::unbounded().with_cancel(cancel);
    if let Some(timeout) = state.config.decode_timeout {
        budget = budget.with_timeout(timeout);
    }
    if let Some(max) = state.config.max_solutions {
        budget = budget.with_max_solutions(max);
    }
    budget
}

#[utoipa::path(
    post,
    path = "/api/signal/decode",
    tag = "signal",
    request_body = DecodeRequest,
    responses(
        (status = 200, description = "Device subsets explaining the received signal", body = DecodeResponse),
        (status = 400, description = "Malformed devices, signal or tolerance")
    )
)]
pub(crate) async fn decode_signal(
    State(state): State<AppState>,
    Json(request): Json<DecodeRequest>,
) -> AppResult<Json<DecodeResponse>> {
    let decoded = decode_until_dropped(&state, request, CancellationToken::new()).await?;
    Ok(Json(decoded))
}

/// Runs the search on the blocking pool. Dropping the returned future before
/// it resolves (client gone) cancels `cancel`, which stops the search.
async fn decode_until_dropped(
    state: &AppState,
    request: DecodeRequest,
    cancel: CancellationToken,
) -> AppResult<DecodeResponse> {
    let guard = cancel.clone().drop_guard();
    let budget = search_budget(state, cancel);

    let decoded = tokio::task::spawn_blocking(move || decoder::decode(&request, &budget))
        .await
        .map_err(internal_error)?;
    guard.disarm();

    Ok(decoded?)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signal/simulate", post(simulate_signal))
        .route("/signal/decode", post(decode_signal))
}
