//! Per-resource runtime state the executor consults to derive barriers.
//!
//! Regular resources get fresh state every frame (their handle ids are
//! reallocated by a fresh builder each frame, so carrying state forward
//! would alias unrelated resources that happen to reuse an id). Temporal
//! resources keep the same handle id across frames and so carry their
//! final state from the previous frame into the next, which is why
//! `ExecutorState` is owned by the caller and threaded frame to frame
//! exactly like `TemporalResourceRegistry`.

use std::collections::HashMap;

use gpu_device::{
    BufferHandle, FenceHandle, ImageHandle, ImageLayout, MemoryAccess, PipelineStage, QueueFamily, SurfaceHandle,
    TimelineSemaphoreHandle,
};

use crate::compiler::plan::{CompiledPlan, OwnershipTransfer};

/// One presentable surface's state across frames: whether its window is
/// currently visible, and whether the backend flagged it for recreation.
#[derive(Clone, Copy, Default)]
pub struct SurfaceSlot {
    pub visible: bool,
    pub(crate) needs_recreate: bool,
}

impl SurfaceSlot {
    /// Whether the backend flagged this surface for recreation before its
    /// next acquire (set after an out-of-date/suboptimal acquire or present).
    pub fn needs_recreate(&self) -> bool {
        self.needs_recreate
    }

    pub fn new(visible: bool) -> Self {
        Self { visible, needs_recreate: false }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct ResourceRuntimeState {
    pub(crate) queue: Option<QueueFamily>,
    pub(crate) layout: ImageLayout,
    pub(crate) last_write_stages: PipelineStage,
    pub(crate) last_write_access: MemoryAccess,
    /// Read stages already synchronized against `last_write_*` since the
    /// last write; reset only when a new write lands (or an ownership
    /// transfer lands the resource on a different queue).
    pub(crate) synced_read_stages: PipelineStage,
}

impl Default for ResourceRuntimeState {
    fn default() -> Self {
        Self {
            queue: None,
            layout: ImageLayout::Undefined,
            last_write_stages: PipelineStage::empty(),
            last_write_access: MemoryAccess::empty(),
            synced_read_stages: PipelineStage::empty(),
        }
    }
}

impl ResourceRuntimeState {
    pub(crate) fn observe_write(&mut self, queue: QueueFamily, stages: PipelineStage, access: MemoryAccess, layout: ImageLayout) {
        self.queue = Some(queue);
        self.last_write_stages = stages;
        self.last_write_access = access;
        self.synced_read_stages = PipelineStage::empty();
        self.layout = layout;
    }

    pub(crate) fn observe_read(&mut self, queue: QueueFamily, stages: PipelineStage, layout: ImageLayout) {
        self.queue = Some(queue);
        self.synced_read_stages |= stages;
        self.layout = layout;
    }

    pub(crate) fn observe_ownership_transfer(&mut self, transfer: &OwnershipTransfer) {
        self.queue = Some(transfer.dst_queue);
        self.layout = transfer.dst_layout;
        self.last_write_stages = transfer.dst_stages;
        self.last_write_access = transfer.dst_access;
        self.synced_read_stages = PipelineStage::empty();
    }
}

/// Temporal resource barrier/layout state, carried by the caller across
/// frames alongside the `TemporalResourceRegistry` the builder returns.
#[derive(Default, Clone)]
pub struct ExecutorState {
    temporal: HashMap<u64, ResourceRuntimeState>,
    pub(crate) temporal_buffers: HashMap<u64, BufferHandle>,
    pub(crate) temporal_images: HashMap<u64, ImageHandle>,
    pub(crate) per_frame_buffers: HashMap<String, (BufferHandle, u64)>,
    pub(crate) per_frame_images: HashMap<String, Vec<ImageHandle>>,
    pub(crate) frame_index: u64,
    pub(crate) timeline_semaphores: HashMap<QueueFamily, TimelineSemaphoreHandle>,
    pub(crate) timeline_values: HashMap<QueueFamily, u64>,
    pub(crate) family_fences: HashMap<QueueFamily, Vec<FenceHandle>>,
    pub surfaces: HashMap<SurfaceHandle, SurfaceSlot>,
}

impl ExecutorState {
    /// Builds this frame's working state table: a fresh default for every
    /// non-temporal resource, seeded from last frame's recorded state for
    /// every resource the plan marks temporal.
    pub(crate) fn begin_frame(&self, plan: &CompiledPlan) -> HashMap<u64, ResourceRuntimeState> {
        let mut working = HashMap::new();
        for resource in &plan.resources {
            let state = if resource.temporal {
                self.temporal.get(&resource.handle.handle_id).copied().unwrap_or_default()
            } else {
                ResourceRuntimeState::default()
            };
            working.insert(resource.handle.handle_id, state);
        }
        working
    }

    /// Persists the final state of every temporal resource for next frame;
    /// non-temporal entries are dropped since their handle ids will be
    /// reused by unrelated resources next frame.
    pub(crate) fn end_frame(&mut self, plan: &CompiledPlan, working: HashMap<u64, ResourceRuntimeState>) {
        for resource in &plan.resources {
            if !resource.temporal {
                continue;
            }
            if let Some(state) = working.get(&resource.handle.handle_id) {
                self.temporal.insert(resource.handle.handle_id, *state);
            }
        }
    }
}
