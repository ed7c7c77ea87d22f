//! Compiler output types: the plan the executor drives each frame.

use gpu_device::{BufferDesc, BufferHandle, ImageDesc, ImageHandle, ImageLayout, MemoryAccess, PipelineStage, QueueFamily, SurfaceHandle};

use crate::access::AccessMode;
use crate::pass::{ExecutionCallable, WorkKind};
use crate::resource::ResourceHandle;

/// How many queues of each family the caller makes available. The compiler
/// never auto-detects this; an empty configuration (all zero) is a compile
/// error since no pass could ever be scheduled.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueueConfiguration {
    pub graphics_queues: u32,
    pub compute_queues: u32,
    pub transfer_queues: u32,
}

impl QueueConfiguration {
    pub(crate) fn queue_count(&self, family: QueueFamily) -> u32 {
        match family {
            QueueFamily::Graphics => self.graphics_queues,
            QueueFamily::Compute => self.compute_queues,
            QueueFamily::Transfer => self.transfer_queues,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.graphics_queues == 0 && self.compute_queues == 0 && self.transfer_queues == 0
    }
}

#[derive(Clone, Debug)]
pub enum PlanResourceOrigin {
    ExternalBuffer(BufferHandle),
    ExternalImage(ImageHandle),
    ExternalSurface(SurfaceHandle),
    InternalBuffer(BufferDesc),
    InternalImage(ImageDesc),
}

#[derive(Clone, Debug)]
pub struct PlanResource {
    pub handle: ResourceHandle,
    pub name: String,
    pub origin: PlanResourceOrigin,
    pub per_frame: bool,
    pub temporal: bool,
    pub render_target: bool,
    pub presentable: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct ScheduledAccess {
    pub handle: ResourceHandle,
    pub mode: AccessMode,
    pub stages: PipelineStage,
    pub access: MemoryAccess,
    pub layout: ImageLayout,
}

#[derive(Debug)]
pub struct ScheduledPass {
    pub name: String,
    pub kind: WorkKind,
    pub accesses: Vec<ScheduledAccess>,
    pub callable: Option<ExecutionCallable>,
}

#[derive(Clone, Copy, Debug)]
pub struct TimelineRef {
    pub queue: QueueFamily,
    pub queue_index: u32,
    pub value: u64,
    pub stages: PipelineStage,
}

/// A queue ownership-transfer descriptor: one half lives on the source
/// submission (a release), the matching half on the destination submission
/// (an acquire). Both sides carry their own stage/access/layout so the
/// barrier performing the layout transition can be split across the two.
#[derive(Clone, Copy, Debug)]
pub struct OwnershipTransfer {
    pub handle: ResourceHandle,
    pub src_queue: QueueFamily,
    pub dst_queue: QueueFamily,
    pub src_stages: PipelineStage,
    pub src_access: MemoryAccess,
    pub dst_stages: PipelineStage,
    pub dst_access: MemoryAccess,
    pub src_layout: ImageLayout,
    pub dst_layout: ImageLayout,
    pub signal_value: u64,
}

#[derive(Debug)]
pub struct Submission {
    pub queue: QueueFamily,
    pub queue_index: u32,
    pub passes: Vec<ScheduledPass>,
    pub waits: Vec<TimelineRef>,
    pub signals: Vec<TimelineRef>,
    pub released_resources: Vec<OwnershipTransfer>,
    pub acquired_resources: Vec<OwnershipTransfer>,
}

#[derive(Debug)]
pub struct CompiledPlan {
    pub resources: Vec<PlanResource>,
    pub submissions: Vec<Submission>,
    pub queue_config: QueueConfiguration,
}
