//! Opaque device-object handles.
//!
//! Every handle is a slot id plus a generation, the same shape raven-rg uses
//! for its own graph-local handles. The generation lets a device detect a
//! stale handle after the underlying slot has been recycled.

macro_rules! device_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
        pub struct $name {
            pub id: u32,
            pub generation: u32,
        }

        impl $name {
            pub fn new(id: u32, generation: u32) -> Self {
                Self { id, generation }
            }
        }
    };
}

device_handle!(
    /// A device-owned buffer.
    BufferHandle
);
device_handle!(
    /// A device-owned image.
    ImageHandle
);
device_handle!(SamplerHandle);
device_handle!(
    /// A binary (non-timeline) semaphore, used for swapchain acquire/present.
    BinarySemaphoreHandle
);
device_handle!(
    /// A timeline semaphore used for cross-submission and cross-queue ordering.
    TimelineSemaphoreHandle
);
device_handle!(FenceHandle);
device_handle!(PipelineHandle);
device_handle!(PipelineLayoutHandle);
device_handle!(
    /// A presentable render surface (swapchain) backing a window.
    SurfaceHandle
);
device_handle!(
    /// A recorded command list handed out by a work queue.
    CommandListHandle
);
