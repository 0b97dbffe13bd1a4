use thiserror::Error;

use super::partitioner::WorkerId;
use crate::genome::codec::Key;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("unknown worker {0}")]
    UnknownWorker(WorkerId),
    #[error("{0} is not accepting requests")]
    WorkerUnavailable(WorkerId),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{worker} answered with status {status}")]
    RemoteStatus { worker: WorkerId, status: u16 },
    #[error("wire codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("{worker} answered a {request} request with the wrong response kind")]
    UnexpectedResponse {
        worker: WorkerId,
        request: &'static str,
    },
    #[error("shard on {worker} is full, cannot insert {key}")]
    ShardFull { worker: WorkerId, key: Key },
}

pub type Result<T> = std::result::Result<T, TableError>;
