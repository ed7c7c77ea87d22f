use crate::error::{AcquireError, PresentError};
use crate::handle::{
    BinarySemaphoreHandle, BufferHandle, FenceHandle, ImageHandle, PipelineHandle,
    PipelineLayoutHandle, SamplerHandle, SurfaceHandle, TimelineSemaphoreHandle,
};
use crate::queue::{QueueFamily, WorkQueue};

bitflags::bitflags! {
    #[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
    pub struct BufferUsage: u32 {
        const VERTEX   = 1 << 0;
        const INDEX    = 1 << 1;
        const UNIFORM  = 1 << 2;
        const STORAGE  = 1 << 3;
        const INDIRECT = 1 << 4;
        const TRANSFER_SRC = 1 << 5;
        const TRANSFER_DST = 1 << 6;
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
    pub struct ImageUsage: u32 {
        const SAMPLED          = 1 << 0;
        const STORAGE          = 1 << 1;
        const COLOR_ATTACHMENT = 1 << 2;
        const DEPTH_ATTACHMENT = 1 << 3;
        const TRANSFER_SRC     = 1 << 4;
        const TRANSFER_DST     = 1 << 5;
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BufferDesc {
    pub size: u64,
    pub usage: BufferUsage,
}

#[derive(Clone, Copy, Debug)]
pub struct ImageDesc {
    pub extent: [u32; 2],
    pub usage: ImageUsage,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SamplerDesc {
    pub linear_filter: bool,
    pub repeat: bool,
}

/// Opaque pipeline descriptions. Shader compilation is out of scope here;
/// the device consumes whatever source/bytecode representation it was built
/// with and hands back an opaque handle.
#[derive(Clone, Debug)]
pub struct RasterPipelineDesc {
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct ComputePipelineDesc {
    pub name: String,
}

pub struct AcquiredImage {
    pub image: ImageHandle,
    pub image_index: u32,
    pub acquire_semaphore: BinarySemaphoreHandle,
    pub render_complete_semaphore: BinarySemaphoreHandle,
}

/// The abstract GPU device the frame-graph core is built against. A real
/// backend implements this trait once; the core never reaches past it.
pub trait Device {
    type Queue: WorkQueue;

    fn queue(&self, family: QueueFamily, index: u32) -> &Self::Queue;
    fn queue_count(&self, family: QueueFamily) -> u32;

    fn create_buffer(&self, desc: BufferDesc, name: &str) -> anyhow::Result<BufferHandle>;
    fn destroy_buffer(&self, handle: BufferHandle);

    fn create_image(&self, desc: ImageDesc, name: &str) -> anyhow::Result<ImageHandle>;
    fn destroy_image(&self, handle: ImageHandle);

    fn create_sampler(&self, desc: SamplerDesc) -> anyhow::Result<SamplerHandle>;

    fn create_binary_semaphore(&self) -> anyhow::Result<BinarySemaphoreHandle>;
    fn create_timeline_semaphore(&self, initial_value: u64) -> anyhow::Result<TimelineSemaphoreHandle>;
    fn create_fence(&self, signaled: bool) -> anyhow::Result<FenceHandle>;

    fn create_raster_pipeline(&self, desc: RasterPipelineDesc) -> anyhow::Result<PipelineHandle>;
    fn create_compute_pipeline(&self, desc: ComputePipelineDesc) -> anyhow::Result<PipelineHandle>;
    fn create_pipeline_layout(&self) -> anyhow::Result<PipelineLayoutHandle>;

    fn map_buffer(&self, handle: BufferHandle) -> anyhow::Result<*mut u8>;
    fn unmap_buffer(&self, handle: BufferHandle);
    fn flush_buffer(&self, handle: BufferHandle, offset: u64, size: u64);

    fn wait_fences(&self, fences: &[FenceHandle]) -> anyhow::Result<()>;
    fn reset_fences(&self, fences: &[FenceHandle]) -> anyhow::Result<()>;
    fn reset_command_pool(&self, family: QueueFamily, queue_index: u32) -> anyhow::Result<()>;

    fn acquire_next_image(&self, surface: SurfaceHandle) -> Result<AcquiredImage, AcquireError>;
    fn recreate_surface(&self, surface: SurfaceHandle) -> anyhow::Result<()>;
    fn present(&self, info: crate::barrier::PresentInfo) -> Vec<Result<(), PresentError>>;

    /// Frees any device objects the executor deferred destruction of until
    /// it was safe to do so (e.g. a resource replaced at plan install).
    fn release_resources(&self);
}
