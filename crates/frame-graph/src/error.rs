use thiserror::Error;

use crate::resource::ResourceHandle;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("dependency cycle detected among passes: {0:?}")]
    Cycle(Vec<String>),
    #[error("pass {pass:?} references unknown resource handle {handle:?}")]
    UnknownHandle { pass: String, handle: ResourceHandle },
    #[error("queue configuration declares zero queues for every family")]
    EmptyQueueConfig,
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("device reported a lost device")]
    DeviceLost,
    #[error(transparent)]
    Device(#[from] anyhow::Error),
}
