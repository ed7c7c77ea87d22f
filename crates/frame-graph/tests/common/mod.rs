//! Minimal in-memory `Device`/`WorkQueue` used by the integration tests.
//! Records every barrier, submit, and present call so a test can assert on
//! the shape of what the executor actually issued instead of poking at
//! private compiler structures.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gpu_device::*;

#[derive(Clone, Debug)]
pub enum Event {
    ImageBarrier { old_layout: ImageLayout, new_layout: ImageLayout, src_queue: Option<QueueOwnership>, dst_queue: Option<QueueOwnership> },
    BufferBarrier { src_access: MemoryAccess, dst_access: MemoryAccess, src_queue: Option<QueueOwnership>, dst_queue: Option<QueueOwnership> },
    Submit { family: QueueFamily, waits: Vec<TimelineOp>, signals: Vec<TimelineOp> },
    DebugRegion(String),
    FillBuffer { buffer: BufferHandle, offset: u64 },
    Present,
}

#[derive(Default)]
pub struct Log {
    pub events: Vec<Event>,
}

pub struct MockQueue {
    family: QueueFamily,
    next_cmd: RefCell<u32>,
    log: Rc<RefCell<Log>>,
}

impl WorkQueue for MockQueue {
    fn family(&self) -> QueueFamily {
        self.family
    }

    fn queue_index(&self) -> u32 {
        0
    }

    fn get_next_command_list(&self) -> CommandListHandle {
        let mut n = self.next_cmd.borrow_mut();
        *n += 1;
        CommandListHandle::new(*n, 0)
    }

    fn begin_command_list(&self, _cmd: CommandListHandle) -> anyhow::Result<()> {
        Ok(())
    }

    fn end_command_list(&self, _cmd: CommandListHandle) -> anyhow::Result<()> {
        Ok(())
    }

    fn pipeline_barriers(&self, _cmd: CommandListHandle, images: &[ImageBarrier], buffers: &[BufferBarrier]) {
        let mut log = self.log.borrow_mut();
        for b in images {
            log.events.push(Event::ImageBarrier { old_layout: b.old_layout, new_layout: b.new_layout, src_queue: b.src_queue, dst_queue: b.dst_queue });
        }
        for b in buffers {
            log.events.push(Event::BufferBarrier { src_access: b.src_access, dst_access: b.dst_access, src_queue: b.src_queue, dst_queue: b.dst_queue });
        }
    }

    fn transition_image(&self, _cmd: CommandListHandle, _image: ImageHandle, _old_layout: ImageLayout, _new_layout: ImageLayout) {}

    fn begin_rendering(&self, _cmd: CommandListHandle, _color_attachments: &[ImageHandle], _depth_attachment: Option<ImageHandle>) {}
    fn end_rendering(&self, _cmd: CommandListHandle) {}

    fn bind_raster_pipeline(&self, _cmd: CommandListHandle, _pipeline: PipelineHandle) {}
    fn bind_compute_pipeline(&self, _cmd: CommandListHandle, _pipeline: PipelineHandle) {}
    fn bind_index_buffer(&self, _cmd: CommandListHandle, _buffer: BufferHandle, _offset: u64) {}
    fn bind_vertex_buffers(&self, _cmd: CommandListHandle, _first_binding: u32, _buffers: &[(BufferHandle, u64)]) {}

    fn set_viewport(&self, _cmd: CommandListHandle, _x: f32, _y: f32, _width: f32, _height: f32, _min_depth: f32, _max_depth: f32) {}
    fn set_scissor(&self, _cmd: CommandListHandle, _x: i32, _y: i32, _width: u32, _height: u32) {}
    fn set_cull_mode(&self, _cmd: CommandListHandle, _mode: CullMode) {}

    fn draw(&self, _cmd: CommandListHandle, _vertex_count: u32, _instance_count: u32, _first_vertex: u32, _first_instance: u32) {}
    fn draw_indexed(&self, _cmd: CommandListHandle, _index_count: u32, _instance_count: u32, _first_index: u32, _vertex_offset: i32, _first_instance: u32) {}
    fn draw_indirect(&self, _cmd: CommandListHandle, _buffer: BufferHandle, _offset: u64, _draw_count: u32, _stride: u32) {}
    fn draw_indexed_indirect(&self, _cmd: CommandListHandle, _buffer: BufferHandle, _offset: u64, _draw_count: u32, _stride: u32) {}

    fn dispatch(&self, _cmd: CommandListHandle, _group_x: u32, _group_y: u32, _group_z: u32) {}

    fn copy_buffer_to_buffer(&self, _cmd: CommandListHandle, _src: BufferHandle, _src_offset: u64, _dst: BufferHandle, _dst_offset: u64, _size: u64) {}
    fn fill_buffer(&self, _cmd: CommandListHandle, buffer: BufferHandle, offset: u64, _size: u64, _value: u32) {
        self.log.borrow_mut().events.push(Event::FillBuffer { buffer, offset });
    }
    fn clear_color_image(&self, _cmd: CommandListHandle, _image: ImageHandle, _color: [f32; 4]) {}
    fn clear_color_surface(&self, _cmd: CommandListHandle, _surface: SurfaceHandle, _image_index: u32, _color: [f32; 4]) {}
    fn blit_image(&self, _cmd: CommandListHandle, _src: ImageHandle, _dst: ImageHandle) {}
    fn blit_image_to_surface(&self, _cmd: CommandListHandle, _src: ImageHandle, _surface: SurfaceHandle, _image_index: u32) {}

    fn push_descriptors(&self, _cmd: CommandListHandle, _set: u32, _bindings: &[DescriptorBinding]) {}
    fn push_constants(&self, _cmd: CommandListHandle, _data: &[u8]) {}

    fn begin_debug_region(&self, _cmd: CommandListHandle, name: &str) {
        self.log.borrow_mut().events.push(Event::DebugRegion(name.to_owned()));
    }
    fn end_debug_region(&self, _cmd: CommandListHandle) {}

    fn submit(&self, info: SubmitInfo) -> anyhow::Result<()> {
        self.log.borrow_mut().events.push(Event::Submit { family: self.family, waits: info.waits, signals: info.signals });
        Ok(())
    }
}

pub struct MockDevice {
    queues: HashMap<QueueFamily, MockQueue>,
    next_id: RefCell<u32>,
    pub log: Rc<RefCell<Log>>,
    pub surfaces: RefCell<HashMap<SurfaceHandle, u32>>,
    pub present_results: RefCell<HashMap<SurfaceHandle, Result<(), PresentError>>>,
    pub created_buffers: RefCell<Vec<BufferDesc>>,
}

impl MockDevice {
    pub fn new(families: &[QueueFamily]) -> Self {
        let log = Rc::new(RefCell::new(Log::default()));
        let queues = families.iter().map(|&family| (family, MockQueue { family, next_cmd: RefCell::new(0), log: log.clone() })).collect();
        Self {
            queues,
            next_id: RefCell::new(0),
            log,
            surfaces: RefCell::new(HashMap::new()),
            present_results: RefCell::new(HashMap::new()),
            created_buffers: RefCell::new(Vec::new()),
        }
    }

    fn alloc_id(&self) -> u32 {
        let mut n = self.next_id.borrow_mut();
        *n += 1;
        *n
    }

    pub fn add_surface(&self, surface: SurfaceHandle) {
        self.surfaces.borrow_mut().insert(surface, 0);
    }
}

impl Device for MockDevice {
    type Queue = MockQueue;

    fn queue(&self, family: QueueFamily, _index: u32) -> &Self::Queue {
        self.queues.get(&family).expect("queue family not configured on mock device")
    }

    fn queue_count(&self, family: QueueFamily) -> u32 {
        if self.queues.contains_key(&family) { 1 } else { 0 }
    }

    fn create_buffer(&self, desc: BufferDesc, _name: &str) -> anyhow::Result<BufferHandle> {
        self.created_buffers.borrow_mut().push(desc);
        Ok(BufferHandle::new(self.alloc_id(), 0))
    }
    fn destroy_buffer(&self, _handle: BufferHandle) {}

    fn create_image(&self, _desc: ImageDesc, _name: &str) -> anyhow::Result<ImageHandle> {
        Ok(ImageHandle::new(self.alloc_id(), 0))
    }
    fn destroy_image(&self, _handle: ImageHandle) {}

    fn create_sampler(&self, _desc: SamplerDesc) -> anyhow::Result<SamplerHandle> {
        Ok(SamplerHandle::new(self.alloc_id(), 0))
    }

    fn create_binary_semaphore(&self) -> anyhow::Result<BinarySemaphoreHandle> {
        Ok(BinarySemaphoreHandle::new(self.alloc_id(), 0))
    }

    fn create_timeline_semaphore(&self, _initial_value: u64) -> anyhow::Result<TimelineSemaphoreHandle> {
        Ok(TimelineSemaphoreHandle::new(self.alloc_id(), 0))
    }

    fn create_fence(&self, _signaled: bool) -> anyhow::Result<FenceHandle> {
        Ok(FenceHandle::new(self.alloc_id(), 0))
    }

    fn create_raster_pipeline(&self, _desc: RasterPipelineDesc) -> anyhow::Result<PipelineHandle> {
        Ok(PipelineHandle::new(self.alloc_id(), 0))
    }
    fn create_compute_pipeline(&self, _desc: ComputePipelineDesc) -> anyhow::Result<PipelineHandle> {
        Ok(PipelineHandle::new(self.alloc_id(), 0))
    }
    fn create_pipeline_layout(&self) -> anyhow::Result<PipelineLayoutHandle> {
        Ok(PipelineLayoutHandle::new(self.alloc_id(), 0))
    }

    fn map_buffer(&self, _handle: BufferHandle) -> anyhow::Result<*mut u8> {
        anyhow::bail!("mock device does not support mapping")
    }
    fn unmap_buffer(&self, _handle: BufferHandle) {}
    fn flush_buffer(&self, _handle: BufferHandle, _offset: u64, _size: u64) {}

    fn wait_fences(&self, _fences: &[FenceHandle]) -> anyhow::Result<()> {
        Ok(())
    }
    fn reset_fences(&self, _fences: &[FenceHandle]) -> anyhow::Result<()> {
        Ok(())
    }
    fn reset_command_pool(&self, _family: QueueFamily, _queue_index: u32) -> anyhow::Result<()> {
        Ok(())
    }

    fn acquire_next_image(&self, surface: SurfaceHandle) -> Result<AcquiredImage, AcquireError> {
        let mut surfaces = self.surfaces.borrow_mut();
        let index = surfaces.get_mut(&surface).ok_or(AcquireError::Failure("unknown surface".into()))?;
        let image_index = *index;
        *index = (*index + 1) % 2;
        Ok(AcquiredImage {
            image: ImageHandle::new(1000 + surface.id, image_index),
            image_index,
            acquire_semaphore: BinarySemaphoreHandle::new(self.alloc_id(), 0),
            render_complete_semaphore: BinarySemaphoreHandle::new(self.alloc_id(), 0),
        })
    }

    fn recreate_surface(&self, _surface: SurfaceHandle) -> anyhow::Result<()> {
        Ok(())
    }

    fn present(&self, info: PresentInfo) -> Vec<Result<(), PresentError>> {
        self.log.borrow_mut().events.push(Event::Present);
        info.images.iter().map(|i| self.present_results.borrow().get(&i.surface).cloned().unwrap_or(Ok(()))).collect()
    }

    fn release_resources(&self) {}
}
