//! Resource handles and builder-side resource entries.

use gpu_device::{BufferDesc, BufferHandle, ImageDesc, ImageHandle, SurfaceHandle};

/// What kind of underlying device object a handle names.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum ResourceKind {
    Buffer,
    Image,
    RenderSurface,
}

/// A typed, versioned resource identifier. Writes bump `version`; the same
/// `handle_id` observed at different versions names the same underlying
/// resource at different points in its read/write history, which is how the
/// compiler disambiguates read-after-write without tracking pointers.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct ResourceHandle {
    pub handle_id: u64,
    pub version: u32,
    pub kind: ResourceKind,
}

impl ResourceHandle {
    pub(crate) fn new(handle_id: u64, kind: ResourceKind) -> Self {
        Self { handle_id, version: 0, kind }
    }

    /// Same underlying resource, one version later. Used by `write`/`read_write`.
    pub(crate) fn bumped(self) -> Self {
        Self { version: self.version + 1, ..self }
    }
}

/// Where a builder-side resource entry's backing storage comes from.
pub(crate) enum ResourceSource {
    ExternalBuffer(BufferHandle),
    ExternalImage(ImageHandle),
    ExternalSurface(SurfaceHandle),
    InternalBuffer(BufferDesc),
    InternalImage(ImageDesc),
}

/// A resource as recorded by the graph builder, before compilation.
pub(crate) struct ResourceEntry {
    pub name: String,
    pub handle: ResourceHandle,
    pub source: ResourceSource,
    pub per_frame: bool,
    pub temporal: bool,
    pub render_target: bool,
    pub presentable: bool,
}

impl ResourceEntry {
    pub(crate) fn is_external(&self) -> bool {
        matches!(
            self.source,
            ResourceSource::ExternalBuffer(_) | ResourceSource::ExternalImage(_) | ResourceSource::ExternalSurface(_)
        )
    }
}
