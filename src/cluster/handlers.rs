use axum::{Extension, Json, http::StatusCode};
use std::sync::Arc;

use super::barrier::BarrierCoordinator;
use super::protocol::{BarrierRequest, BarrierResponse};

/// Holds the request open until every worker has arrived at the phase.
pub async fn handle_barrier(
    Extension(coordinator): Extension<Arc<BarrierCoordinator>>,
    Json(req): Json<BarrierRequest>,
) -> (StatusCode, Json<BarrierResponse>) {
    coordinator.arrive(req.phase, req.worker).await;

    (
        StatusCode::OK,
        Json(BarrierResponse {
            phase: req.phase,
            released: true,
        }),
    )
}
