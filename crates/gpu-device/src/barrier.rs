use crate::handle::{BinarySemaphoreHandle, BufferHandle, CommandListHandle, FenceHandle, ImageHandle, SurfaceHandle, TimelineSemaphoreHandle};
use crate::mask::{ImageLayout, MemoryAccess, PipelineStage};
use crate::queue::QueueFamily;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct QueueOwnership {
    pub family: QueueFamily,
    pub queue_index: u32,
}

#[derive(Clone, Debug)]
pub struct ImageBarrier {
    pub image: ImageHandle,
    pub old_layout: ImageLayout,
    pub new_layout: ImageLayout,
    pub src_stages: PipelineStage,
    pub src_access: MemoryAccess,
    pub dst_stages: PipelineStage,
    pub dst_access: MemoryAccess,
    pub src_queue: Option<QueueOwnership>,
    pub dst_queue: Option<QueueOwnership>,
}

#[derive(Clone, Debug)]
pub struct BufferBarrier {
    pub buffer: BufferHandle,
    pub src_stages: PipelineStage,
    pub src_access: MemoryAccess,
    pub dst_stages: PipelineStage,
    pub dst_access: MemoryAccess,
    pub src_queue: Option<QueueOwnership>,
    pub dst_queue: Option<QueueOwnership>,
    pub offset: u64,
    pub size: u64,
}

/// A wait or signal against a specific queue's timeline semaphore.
#[derive(Clone, Copy, Debug)]
pub struct TimelineOp {
    pub semaphore: TimelineSemaphoreHandle,
    pub queue: QueueFamily,
    pub queue_index: u32,
    pub value: u64,
    pub stages: PipelineStage,
}

#[derive(Default)]
pub struct SubmitInfo {
    pub command_lists: Vec<CommandListHandle>,
    pub waits: Vec<TimelineOp>,
    pub signals: Vec<TimelineOp>,
    /// Binary-semaphore waits/signals, used only by the acquire-to-timeline
    /// fan-in and present fan-out submissions: the fan-in waits on swapchain
    /// acquire semaphores, the fan-out signals render-complete semaphores.
    /// Ordinary submissions leave both empty and synchronize via `waits`/`signals`.
    pub binary_waits: Vec<BinarySemaphoreHandle>,
    pub binary_signals: Vec<BinarySemaphoreHandle>,
    pub fence: Option<FenceHandle>,
}

pub struct PresentImage {
    pub surface: SurfaceHandle,
    pub image_index: u32,
}

#[derive(Default)]
pub struct PresentInfo {
    pub images: Vec<PresentImage>,
    pub wait_semaphores: Vec<crate::handle::BinarySemaphoreHandle>,
}
