//! Access records: what a pass does to a resource, and the default
//! stage/access masks the task builder fills in when the caller omits them.

use gpu_device::{ImageLayout, MemoryAccess, PipelineStage};

use crate::resource::ResourceHandle;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum AccessMode {
    Read,
    Write,
}

/// `(handle, stage_mask, access_mask, image_layout)`, one per access a pass
/// declares through its task builder. For buffers `layout` is `undefined`.
#[derive(Clone, Copy, Debug)]
pub struct AccessRecord {
    pub handle: ResourceHandle,
    pub mode: AccessMode,
    pub stages: PipelineStage,
    pub access: MemoryAccess,
    pub layout: ImageLayout,
}

pub(crate) fn default_read_access(layout: ImageLayout) -> MemoryAccess {
    if matches!(layout, ImageLayout::Undefined) {
        MemoryAccess::ALL_READS
    } else {
        layout.implied_access()
    }
}

pub(crate) fn default_write_access(layout: ImageLayout) -> MemoryAccess {
    if matches!(layout, ImageLayout::Undefined) {
        MemoryAccess::ALL_WRITES
    } else {
        layout.implied_access()
    }
}
