//! Typed execution-context facades handed to pass callables.
//!
//! Each context wraps `(queue, command_list)` and exposes only the
//! operations appropriate to its work kind. All three share resource lookup
//! by graph handle and descriptor/push-constant plumbing. The queue is a
//! trait object so a pass's boxed callable stays a concrete, non-generic
//! type regardless of which `Device::Queue` implementation is running it.

use std::collections::HashMap;

use gpu_device::{
    BufferHandle, CommandListHandle, CullMode, DescriptorBinding, ImageHandle, PipelineHandle,
    SurfaceHandle, WorkQueue,
};

use crate::resource::ResourceHandle;

/// Maps graph-level resource handles to the concrete device handle backing
/// them for the current frame. Render-surface handles resolve to the
/// swapchain image acquired this frame, not a stable device object.
pub struct ResourceLookup<'a> {
    pub(crate) buffers: &'a HashMap<u64, BufferHandle>,
    pub(crate) images: &'a HashMap<u64, ImageHandle>,
    pub(crate) surface_images: &'a HashMap<u64, (ImageHandle, SurfaceHandle, u32)>,
    pub(crate) per_frame_offsets: &'a HashMap<u64, u64>,
}

impl<'a> ResourceLookup<'a> {
    pub fn find_buffer(&self, handle: ResourceHandle) -> Option<BufferHandle> {
        self.buffers.get(&handle.handle_id).copied()
    }

    pub fn find_image(&self, handle: ResourceHandle) -> Option<ImageHandle> {
        self.images
            .get(&handle.handle_id)
            .copied()
            .or_else(|| self.surface_images.get(&handle.handle_id).map(|(image, ..)| *image))
    }

    pub fn find_surface_image(&self, handle: ResourceHandle) -> Option<(SurfaceHandle, u32)> {
        self.surface_images.get(&handle.handle_id).map(|(_, surface, index)| (*surface, *index))
    }

    /// Offset into a per-frame resource's rotated storage for the current frame.
    pub fn per_frame_offset(&self, handle: ResourceHandle) -> u64 {
        self.per_frame_offsets.get(&handle.handle_id).copied().unwrap_or(0)
    }
}

macro_rules! shared_context_ops {
    ($name:ident) => {
        impl<'a> $name<'a> {
            pub fn find_buffer(&self, handle: ResourceHandle) -> Option<BufferHandle> {
                self.resources.find_buffer(handle)
            }

            pub fn find_image(&self, handle: ResourceHandle) -> Option<ImageHandle> {
                self.resources.find_image(handle)
            }

            /// Binds buffers with each one's current per-frame rotation offset applied automatically.
            pub fn bind_descriptor_buffers(&self, set: u32, buffers: &[(ResourceHandle, u32)]) {
                let bindings: Vec<DescriptorBinding> = buffers
                    .iter()
                    .filter_map(|(handle, binding)| {
                        let buffer = self.resources.find_buffer(*handle)?;
                        let offset = self.resources.per_frame_offset(*handle);
                        Some(DescriptorBinding {
                            binding: *binding,
                            buffer: Some((buffer, offset, u64::MAX)),
                            image: None,
                        })
                    })
                    .collect();
                self.queue.push_descriptors(self.cmd, set, &bindings);
            }

            pub fn push_descriptors(&self, set: u32, bindings: &[DescriptorBinding]) {
                self.queue.push_descriptors(self.cmd, set, bindings);
            }

            pub fn push_constants(&self, data: &[u8]) {
                self.queue.push_constants(self.cmd, data);
            }
        }
    };
}

pub struct GraphicsContext<'a> {
    pub(crate) queue: &'a dyn WorkQueue,
    pub(crate) cmd: CommandListHandle,
    pub(crate) resources: ResourceLookup<'a>,
}

shared_context_ops!(GraphicsContext);

impl<'a> GraphicsContext<'a> {
    pub fn begin_render_pass(&self, color_attachments: &[ImageHandle], depth_attachment: Option<ImageHandle>) {
        self.queue.begin_rendering(self.cmd, color_attachments, depth_attachment);
    }

    pub fn end_render_pass(&self) {
        self.queue.end_rendering(self.cmd);
    }

    pub fn set_viewport(&self, x: f32, y: f32, width: f32, height: f32, min_depth: f32, max_depth: f32) {
        self.queue.set_viewport(self.cmd, x, y, width, height, min_depth, max_depth);
    }

    pub fn set_scissor(&self, x: i32, y: i32, width: u32, height: u32) {
        self.queue.set_scissor(self.cmd, x, y, width, height);
    }

    pub fn set_cull_mode(&self, mode: CullMode) {
        self.queue.set_cull_mode(self.cmd, mode);
    }

    pub fn bind_pipeline(&self, pipeline: PipelineHandle) {
        self.queue.bind_raster_pipeline(self.cmd, pipeline);
    }

    pub fn bind_index_buffer(&self, buffer: BufferHandle, offset: u64) {
        self.queue.bind_index_buffer(self.cmd, buffer, offset);
    }

    pub fn bind_vertex_buffers(&self, first_binding: u32, buffers: &[(BufferHandle, u64)]) {
        self.queue.bind_vertex_buffers(self.cmd, first_binding, buffers);
    }

    pub fn draw(&self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) {
        self.queue.draw(self.cmd, vertex_count, instance_count, first_vertex, first_instance);
    }

    pub fn draw_indexed(&self, index_count: u32, instance_count: u32, first_index: u32, vertex_offset: i32, first_instance: u32) {
        self.queue
            .draw_indexed(self.cmd, index_count, instance_count, first_index, vertex_offset, first_instance);
    }

    pub fn draw_indirect(&self, buffer: BufferHandle, offset: u64, draw_count: u32, stride: u32) {
        self.queue.draw_indirect(self.cmd, buffer, offset, draw_count, stride);
    }

    pub fn draw_indexed_indirect(&self, buffer: BufferHandle, offset: u64, draw_count: u32, stride: u32) {
        self.queue.draw_indexed_indirect(self.cmd, buffer, offset, draw_count, stride);
    }
}

pub struct ComputeContext<'a> {
    pub(crate) queue: &'a dyn WorkQueue,
    pub(crate) cmd: CommandListHandle,
    pub(crate) resources: ResourceLookup<'a>,
}

shared_context_ops!(ComputeContext);

impl<'a> ComputeContext<'a> {
    pub fn bind_pipeline(&self, pipeline: PipelineHandle) {
        self.queue.bind_compute_pipeline(self.cmd, pipeline);
    }

    pub fn dispatch(&self, group_x: u32, group_y: u32, group_z: u32) {
        self.queue.dispatch(self.cmd, group_x, group_y, group_z);
    }
}

pub struct TransferContext<'a> {
    pub(crate) queue: &'a dyn WorkQueue,
    pub(crate) cmd: CommandListHandle,
    pub(crate) resources: ResourceLookup<'a>,
}

shared_context_ops!(TransferContext);

impl<'a> TransferContext<'a> {
    pub fn clear_color(&self, handle: ResourceHandle, color: [f32; 4]) {
        if let Some((surface, index)) = self.resources.find_surface_image(handle) {
            self.queue.clear_color_surface(self.cmd, surface, index, color);
        } else if let Some(image) = self.resources.find_image(handle) {
            self.queue.clear_color_image(self.cmd, image, color);
        }
    }

    /// Copies honor per-frame rotation on both ends: the caller passes
    /// logical offsets, and the current frame's rotation offset is added
    /// automatically for any side that names a per-frame resource.
    pub fn copy_buffer_to_buffer(&self, src: ResourceHandle, src_offset: u64, dst: ResourceHandle, dst_offset: u64, size: u64) {
        let (Some(src_buf), Some(dst_buf)) = (self.resources.find_buffer(src), self.resources.find_buffer(dst)) else {
            return;
        };
        let src_offset = src_offset + self.resources.per_frame_offset(src);
        let dst_offset = dst_offset + self.resources.per_frame_offset(dst);
        self.queue.copy_buffer_to_buffer(self.cmd, src_buf, src_offset, dst_buf, dst_offset, size);
    }

    pub fn fill_buffer(&self, handle: ResourceHandle, offset: u64, size: u64, value: u32) {
        if let Some(buffer) = self.resources.find_buffer(handle) {
            let offset = offset + self.resources.per_frame_offset(handle);
            self.queue.fill_buffer(self.cmd, buffer, offset, size, value);
        }
    }

    pub fn blit(&self, src: ResourceHandle, dst: ResourceHandle) {
        let Some(src_image) = self.resources.find_image(src) else { return };
        if let Some((surface, index)) = self.resources.find_surface_image(dst) {
            self.queue.blit_image_to_surface(self.cmd, src_image, surface, index);
        } else if let Some(dst_image) = self.resources.find_image(dst) {
            self.queue.blit_image(self.cmd, src_image, dst_image);
        }
    }
}
