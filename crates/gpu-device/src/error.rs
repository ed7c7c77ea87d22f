use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("swapchain out of date")]
    OutOfDate,
    #[error("swapchain acquire failed: {0}")]
    Failure(String),
}

#[derive(Debug, Clone, Error)]
pub enum PresentError {
    #[error("swapchain out of date")]
    OutOfDate,
    #[error("swapchain suboptimal")]
    Suboptimal,
    #[error("present failed: {0}")]
    Failure(String),
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device lost")]
    DeviceLost,
    #[error(transparent)]
    Acquire(#[from] AcquireError),
    #[error(transparent)]
    Present(#[from] PresentError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
