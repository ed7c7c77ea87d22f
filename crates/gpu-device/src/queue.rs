use crate::barrier::{BufferBarrier, ImageBarrier, SubmitInfo};
use crate::handle::{BufferHandle, CommandListHandle, ImageHandle, PipelineHandle, SurfaceHandle};
use crate::mask::ImageLayout;

/// A queue family the frame-graph core can schedule work onto. A device may
/// expose more than one physical queue per family (`queue_index`).
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum QueueFamily {
    Graphics,
    Compute,
    Transfer,
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum CullMode {
    None,
    Front,
    Back,
}

pub struct DescriptorBinding {
    pub binding: u32,
    pub buffer: Option<(BufferHandle, u64, u64)>,
    pub image: Option<ImageHandle>,
}

/// A device-exposed work queue. One `WorkQueue` instance fronts every queue
/// in a family at a given index; the executor never talks to the device
/// directly once it has a queue reference.
pub trait WorkQueue {
    fn family(&self) -> QueueFamily;
    fn queue_index(&self) -> u32;

    fn get_next_command_list(&self) -> CommandListHandle;
    fn begin_command_list(&self, cmd: CommandListHandle) -> anyhow::Result<()>;
    fn end_command_list(&self, cmd: CommandListHandle) -> anyhow::Result<()>;

    fn pipeline_barriers(&self, cmd: CommandListHandle, images: &[ImageBarrier], buffers: &[BufferBarrier]);
    fn transition_image(&self, cmd: CommandListHandle, image: ImageHandle, old_layout: ImageLayout, new_layout: ImageLayout);

    fn begin_rendering(&self, cmd: CommandListHandle, color_attachments: &[ImageHandle], depth_attachment: Option<ImageHandle>);
    fn end_rendering(&self, cmd: CommandListHandle);

    fn bind_raster_pipeline(&self, cmd: CommandListHandle, pipeline: PipelineHandle);
    fn bind_compute_pipeline(&self, cmd: CommandListHandle, pipeline: PipelineHandle);
    fn bind_index_buffer(&self, cmd: CommandListHandle, buffer: BufferHandle, offset: u64);
    fn bind_vertex_buffers(&self, cmd: CommandListHandle, first_binding: u32, buffers: &[(BufferHandle, u64)]);

    fn set_viewport(&self, cmd: CommandListHandle, x: f32, y: f32, width: f32, height: f32, min_depth: f32, max_depth: f32);
    fn set_scissor(&self, cmd: CommandListHandle, x: i32, y: i32, width: u32, height: u32);
    fn set_cull_mode(&self, cmd: CommandListHandle, mode: CullMode);

    fn draw(&self, cmd: CommandListHandle, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32);
    fn draw_indexed(&self, cmd: CommandListHandle, index_count: u32, instance_count: u32, first_index: u32, vertex_offset: i32, first_instance: u32);
    fn draw_indirect(&self, cmd: CommandListHandle, buffer: BufferHandle, offset: u64, draw_count: u32, stride: u32);
    fn draw_indexed_indirect(&self, cmd: CommandListHandle, buffer: BufferHandle, offset: u64, draw_count: u32, stride: u32);

    fn dispatch(&self, cmd: CommandListHandle, group_x: u32, group_y: u32, group_z: u32);

    fn copy_buffer_to_buffer(&self, cmd: CommandListHandle, src: BufferHandle, src_offset: u64, dst: BufferHandle, dst_offset: u64, size: u64);
    fn fill_buffer(&self, cmd: CommandListHandle, buffer: BufferHandle, offset: u64, size: u64, value: u32);
    fn clear_color_image(&self, cmd: CommandListHandle, image: ImageHandle, color: [f32; 4]);
    fn clear_color_surface(&self, cmd: CommandListHandle, surface: SurfaceHandle, image_index: u32, color: [f32; 4]);
    fn blit_image(&self, cmd: CommandListHandle, src: ImageHandle, dst: ImageHandle);
    fn blit_image_to_surface(&self, cmd: CommandListHandle, src: ImageHandle, surface: SurfaceHandle, image_index: u32);

    fn push_descriptors(&self, cmd: CommandListHandle, set: u32, bindings: &[DescriptorBinding]);
    fn push_constants(&self, cmd: CommandListHandle, data: &[u8]);

    /// Named region markers for external GPU profilers/debuggers. A no-op
    /// backend may implement both as empty bodies.
    fn begin_debug_region(&self, cmd: CommandListHandle, name: &str);
    fn end_debug_region(&self, cmd: CommandListHandle);

    fn submit(&self, info: SubmitInfo) -> anyhow::Result<()>;
}
