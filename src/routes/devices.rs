use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};
use crate::services::generator::{self, GenerateParams};
use crate::state::AppState;

const DEFAULT_COUNT: i64 = 5;
const DEFAULT_SIGNAL_LENGTH: i64 = 4;
const DEFAULT_MAX_STRENGTH: i64 = 9;

#[derive(Debug, Clone, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct GenerateQuery {
    /// Number of devices to generate.
    #[serde(default = "default_count")]
    count: i64,
    /// Samples per device pattern.
    #[serde(default = "default_signal_length")]
    signal_length: i64,
    /// Largest value a single sample may take.
    #[serde(default = "default_max_strength")]
    max_strength: i64,
    /// Makes the output reproducible.
    #[serde(default)]
    seed: Option<u64>,
}

fn default_count() -> i64 {
    DEFAULT_COUNT
}

fn default_signal_length() -> i64 {
    DEFAULT_SIGNAL_LENGTH
}

fn default_max_strength() -> i64 {
    DEFAULT_MAX_STRENGTH
}

#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub(crate) struct DevicesResponse {
    pub(crate) devices: BTreeMap<String, Vec<i64>>,
}

fn bounded(name: &str, value: i64, max: u32) -> Result<u32, AppError> {
    match u32::try_from(value) {
        Ok(value) if (1..=max).contains(&value) => Ok(value),
        _ => Err(AppError::bad_request(format!(
            "Invalid parameter range, {name} must be between 1 and {max}."
        ))),
    }
}

#[utoipa::path(
    get,
    path = "/api/devices/generate",
    tag = "devices",
    params(GenerateQuery),
    responses(
        (status = 200, description = "Randomly generated devices", body = DevicesResponse),
        (status = 400, description = "Parameter out of range")
    )
)]
pub(crate) async fn generate_devices(
    State(state): State<AppState>,
    Query(query): Query<GenerateQuery>,
) -> AppResult<Json<DevicesResponse>> {
    let params = GenerateParams {
        count: bounded("count", query.count, state.config.max_devices)?,
        signal_length: bounded(
            "signal_length",
            query.signal_length,
            state.config.max_signal_length,
        )?,
        max_strength: bounded("max_strength", query.max_strength, state.config.max_strength)?,
    };

    let mut rng = generator::request_rng(query.seed);
    let devices = generator::generate_devices(params, &mut rng);
    tracing::debug!(
        count = params.count,
        signal_length = params.signal_length,
        seeded = query.seed.is_some(),
        "generated devices"
    );
    Ok(Json(DevicesResponse { devices }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/devices/generate", get(generate_devices))
}
