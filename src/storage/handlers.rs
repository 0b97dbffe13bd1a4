use axum::{body::Bytes, extract::Extension, http::StatusCode};

use super::protocol::{TableRequest, TableResponse};
use super::worker::ShardHandle;

/// Receives a `bincode`-encoded `TableRequest` from a peer and hands it to
/// this worker's shard actor.
pub async fn handle_table_request(
    Extension(shard): Extension<ShardHandle>,
    body: Bytes,
) -> (StatusCode, Vec<u8>) {
    let request: TableRequest = match bincode::deserialize(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("Failed to decode table request: {}", e);
            return (StatusCode::BAD_REQUEST, Vec::new());
        }
    };

    let kind = request.kind();
    let response: TableResponse = match shard.call(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Shard {} failed {} request: {}", shard.worker(), kind, e);
            return (StatusCode::SERVICE_UNAVAILABLE, Vec::new());
        }
    };

    match bincode::serialize(&response) {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            tracing::error!("Failed to encode {} response: {}", kind, e);
            (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
        }
    }
}
