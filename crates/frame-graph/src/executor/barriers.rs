//! Intra-queue barrier derivation: compares each access against the
//! resource's runtime state and decides whether a barrier is needed before
//! it runs. Cross-queue hand-offs are handled separately via the plan's
//! `OwnershipTransfer` descriptors, not through this state machine.

use gpu_device::{ImageLayout, MemoryAccess, PipelineStage, QueueFamily};

use crate::access::AccessMode;
use crate::compiler::plan::ScheduledAccess;
use crate::executor::state::ResourceRuntimeState;
use crate::resource::ResourceKind;

pub(crate) enum BarrierNeed {
    Image {
        old_layout: ImageLayout,
        new_layout: ImageLayout,
        src_stages: PipelineStage,
        src_access: MemoryAccess,
        dst_stages: PipelineStage,
        dst_access: MemoryAccess,
    },
    Buffer {
        src_stages: PipelineStage,
        src_access: MemoryAccess,
        dst_stages: PipelineStage,
        dst_access: MemoryAccess,
    },
}

pub(crate) fn derive_barrier(
    state: &mut ResourceRuntimeState,
    kind: ResourceKind,
    queue: QueueFamily,
    access: &ScheduledAccess,
) -> Option<BarrierNeed> {
    let first_use = state.queue.is_none();

    let need = match kind {
        ResourceKind::Buffer => buffer_need(state, first_use, access),
        ResourceKind::Image | ResourceKind::RenderSurface => image_need(state, first_use, access),
    };

    match access.mode {
        AccessMode::Write => state.observe_write(queue, access.stages, access.access, access.layout),
        AccessMode::Read => state.observe_read(queue, access.stages, access.layout),
    }

    need
}

fn buffer_need(state: &ResourceRuntimeState, first_use: bool, access: &ScheduledAccess) -> Option<BarrierNeed> {
    if first_use {
        return None;
    }

    match access.mode {
        AccessMode::Write => {
            if state.last_write_stages.is_empty() && state.synced_read_stages.is_empty() {
                return None;
            }
            Some(BarrierNeed::Buffer {
                src_stages: state.last_write_stages | state.synced_read_stages,
                src_access: state.last_write_access,
                dst_stages: access.stages,
                dst_access: access.access,
            })
        }
        AccessMode::Read => {
            if state.synced_read_stages.contains(access.stages) {
                return None;
            }
            Some(BarrierNeed::Buffer {
                src_stages: state.last_write_stages,
                src_access: state.last_write_access,
                dst_stages: access.stages,
                dst_access: access.access,
            })
        }
    }
}

fn image_need(state: &ResourceRuntimeState, first_use: bool, access: &ScheduledAccess) -> Option<BarrierNeed> {
    if first_use {
        return Some(BarrierNeed::Image {
            old_layout: ImageLayout::Undefined,
            new_layout: access.layout,
            src_stages: PipelineStage::empty(),
            src_access: MemoryAccess::empty(),
            dst_stages: access.stages,
            dst_access: access.access,
        });
    }

    let layout_changes = state.layout != access.layout;
    let needs_hazard_barrier = match access.mode {
        AccessMode::Write => true,
        AccessMode::Read => !state.synced_read_stages.contains(access.stages) && !state.last_write_stages.is_empty(),
    };

    if !layout_changes && !needs_hazard_barrier {
        return None;
    }

    Some(BarrierNeed::Image {
        old_layout: state.layout,
        new_layout: access.layout,
        src_stages: state.last_write_stages | state.synced_read_stages,
        src_access: state.last_write_access,
        dst_stages: access.stages,
        dst_access: access.access,
    })
}
