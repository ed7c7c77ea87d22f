//! Abstract GPU device surface the frame-graph core is built against.
//!
//! This crate exposes only the handle types, synchronization primitives and
//! `Device`/`WorkQueue` traits the core consumes; it owns no concrete
//! backend. A real renderer plugs a Vulkan/D3D12/Metal implementation in
//! behind these traits.

pub mod barrier;
pub mod device;
pub mod error;
pub mod handle;
pub mod mask;
pub mod queue;

pub use barrier::{BufferBarrier, ImageBarrier, PresentImage, PresentInfo, QueueOwnership, SubmitInfo, TimelineOp};
pub use device::{
    AcquiredImage, BufferDesc, BufferUsage, ComputePipelineDesc, Device, ImageDesc, ImageUsage,
    RasterPipelineDesc, SamplerDesc,
};
pub use error::{AcquireError, DeviceError, PresentError};
pub use handle::{
    BinarySemaphoreHandle, BufferHandle, CommandListHandle, FenceHandle, ImageHandle,
    PipelineHandle, PipelineLayoutHandle, SamplerHandle, SurfaceHandle, TimelineSemaphoreHandle,
};
pub use mask::{ImageLayout, MemoryAccess, PipelineStage};
pub use queue::{CullMode, DescriptorBinding, QueueFamily, WorkQueue};
