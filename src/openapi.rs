use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::routes::devices::DevicesResponse;
use crate::routes::health::HealthResponse;
use crate::routes::signal::SimulateRequest;
use crate::services::decoder::{DecodeRequest, DecodeResponse, DecodeResult, SearchStatus};
use crate::services::simulator::SimulatedSignal;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Signal Decoder API",
        description = "Generate devices, simulate combined signals and decode them back into device subsets."
    ),
    paths(
        crate::routes::health::healthz_handler,
        crate::routes::devices::generate_devices,
        crate::routes::signal::simulate_signal,
        crate::routes::signal::decode_signal,
    ),
    components(schemas(
        HealthResponse,
        DevicesResponse,
        SimulateRequest,
        SimulatedSignal,
        DecodeRequest,
        DecodeResponse,
        DecodeResult,
        SearchStatus,
    )),
    tags(
        (name = "devices", description = "Random device generation"),
        (name = "signal", description = "Signal simulation and decoding")
    )
)]
struct ApiDoc;

pub fn openapi_json() -> serde_json::Value {
    serde_json::to_value(ApiDoc::openapi()).unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed to serialize openapi document");
        serde_json::Value::Null
    })
}

async fn openapi_handler() -> Json<serde_json::Value> {
    Json(openapi_json())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = openapi_json();
        let paths = doc["paths"].as_object().expect("paths object");
        for path in [
            "/healthz",
            "/api/devices/generate",
            "/api/signal/simulate",
            "/api/signal/decode",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
        assert!(doc["components"]["schemas"]["DecodeResponse"].is_object());
    }
}
