//! Messaging Layer
//!
//! A `Transport` delivers a `TableRequest` to the shard actor of another
//! worker and returns its reply. Delivery is assumed reliable; there are no
//! timeouts or retries at this layer.
//!
//! - `LocalTransport`: workers are tasks in one process; the directory of
//!   shard handles is shared and requests travel over channels.
//! - `HttpTransport`: one process per worker; requests are `bincode` bodies
//!   posted to the peer's [`ENDPOINT_TABLE`].

use reqwest::header::CONTENT_TYPE;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use super::error::{Result, TableError};
use super::partitioner::WorkerId;
use super::protocol::{BINCODE_CONTENT_TYPE, ENDPOINT_TABLE, TableRequest, TableResponse};
use super::worker::ShardHandle;

pub trait Transport: Send + Sync {
    fn call(
        &self,
        target: WorkerId,
        request: TableRequest,
    ) -> impl Future<Output = Result<TableResponse>> + Send;
}

/// In-process transport over a `WorkerId -> ShardHandle` directory.
#[derive(Clone)]
pub struct LocalTransport {
    directory: Arc<HashMap<WorkerId, ShardHandle>>,
}

impl LocalTransport {
    pub fn new(directory: HashMap<WorkerId, ShardHandle>) -> Self {
        Self {
            directory: Arc::new(directory),
        }
    }
}

impl Transport for LocalTransport {
    async fn call(&self, target: WorkerId, request: TableRequest) -> Result<TableResponse> {
        let handle = self
            .directory
            .get(&target)
            .ok_or(TableError::UnknownWorker(target))?;
        handle.call(request).await
    }
}

/// Transport between worker processes. `peers[rank]` is the HTTP address of
/// worker `rank`.
#[derive(Clone)]
pub struct HttpTransport {
    peers: Arc<Vec<SocketAddr>>,
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Peers are cluster-internal addresses, so system proxies are bypassed.
    pub fn new(peers: Vec<SocketAddr>) -> Result<Self> {
        Ok(Self {
            peers: Arc::new(peers),
            http_client: reqwest::Client::builder().no_proxy().build()?,
        })
    }

    fn url(&self, target: WorkerId) -> Result<String> {
        let addr = self
            .peers
            .get(target.0)
            .ok_or(TableError::UnknownWorker(target))?;
        Ok(format!("http://{}{}", addr, ENDPOINT_TABLE))
    }
}

impl Transport for HttpTransport {
    async fn call(&self, target: WorkerId, request: TableRequest) -> Result<TableResponse> {
        let url = self.url(target)?;
        let body = bincode::serialize(&request)?;

        let response = self
            .http_client
            .post(url)
            .header(CONTENT_TYPE, BINCODE_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TableError::RemoteStatus {
                worker: target,
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(bincode::deserialize(&bytes)?)
    }
}
