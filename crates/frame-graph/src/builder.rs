//! Graph builder: the single-use API that collects resource and pass
//! declarations and is consumed by `compile()` to produce a plan.

use std::collections::HashMap;

use gpu_device::{BufferDesc, BufferHandle, ImageDesc, ImageHandle, SurfaceHandle};

use crate::compiler;
use crate::compiler::plan::{CompiledPlan, QueueConfiguration};
use crate::error::CompileError;
use crate::pass::{PassEntry, WorkKind};
use crate::resource::{ResourceEntry, ResourceHandle, ResourceKind, ResourceSource};
use crate::task_builder::{ComputeTaskBuilder, GraphicsTaskBuilder, TaskBuilder, TransferTaskBuilder};

/// Key used to persist a temporal resource's handle id across successive
/// builder instances (one per frame), so the compiler sees the "same"
/// resource living across frames rather than a freshly created one.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TemporalKey(String);

impl From<&str> for TemporalKey {
    fn from(s: &str) -> Self {
        TemporalKey(s.to_owned())
    }
}

impl From<String> for TemporalKey {
    fn from(s: String) -> Self {
        TemporalKey(s)
    }
}

/// Carries temporal resource handle ids from one frame's builder to the next.
/// Caller owns one instance across the lifetime of the application and
/// threads it through `GraphBuilder::with_temporal_registry` / the value
/// returned by `compile`.
#[derive(Default, Clone, Debug)]
pub struct TemporalResourceRegistry(HashMap<TemporalKey, (u64, ResourceKind)>);

pub struct GraphBuilder {
    pub(crate) resources: Vec<ResourceEntry>,
    pub(crate) passes: Vec<PassEntry>,
    next_handle_id: u64,
    temporal: TemporalResourceRegistry,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::with_temporal_registry(TemporalResourceRegistry::default())
    }

    pub fn with_temporal_registry(temporal: TemporalResourceRegistry) -> Self {
        Self { resources: Vec::new(), passes: Vec::new(), next_handle_id: 0, temporal }
    }

    fn alloc_handle(&mut self, kind: ResourceKind) -> ResourceHandle {
        let id = self.next_handle_id;
        self.next_handle_id += 1;
        ResourceHandle::new(id, kind)
    }

    fn push_resource(&mut self, name: impl Into<String>, handle: ResourceHandle, source: ResourceSource) -> ResourceHandle {
        self.resources.push(ResourceEntry {
            name: name.into(),
            handle,
            source,
            per_frame: false,
            temporal: false,
            render_target: false,
            presentable: false,
        });
        handle
    }

    pub fn import_buffer(&mut self, name: impl Into<String>, device_handle: BufferHandle) -> ResourceHandle {
        let handle = self.alloc_handle(ResourceKind::Buffer);
        self.push_resource(name, handle, ResourceSource::ExternalBuffer(device_handle))
    }

    pub fn import_image(&mut self, name: impl Into<String>, device_handle: ImageHandle) -> ResourceHandle {
        let handle = self.alloc_handle(ResourceKind::Image);
        self.push_resource(name, handle, ResourceSource::ExternalImage(device_handle))
    }

    pub fn import_render_surface(&mut self, name: impl Into<String>, surface: SurfaceHandle) -> ResourceHandle {
        let handle = self.alloc_handle(ResourceKind::RenderSurface);
        let name = name.into();
        self.resources.push(ResourceEntry {
            name,
            handle,
            source: ResourceSource::ExternalSurface(surface),
            per_frame: false,
            temporal: false,
            render_target: false,
            presentable: true,
        });
        handle
    }

    pub fn create_buffer(&mut self, name: impl Into<String>, desc: BufferDesc) -> ResourceHandle {
        let handle = self.alloc_handle(ResourceKind::Buffer);
        self.push_resource(name, handle, ResourceSource::InternalBuffer(desc))
    }

    pub fn create_image(&mut self, name: impl Into<String>, desc: ImageDesc) -> ResourceHandle {
        let handle = self.alloc_handle(ResourceKind::Image);
        self.push_resource(name, handle, ResourceSource::InternalImage(desc))
    }

    pub fn create_per_frame_buffer(&mut self, name: impl Into<String>, desc: BufferDesc) -> ResourceHandle {
        let handle = self.create_buffer(name, desc);
        self.resources.last_mut().unwrap().per_frame = true;
        handle
    }

    pub fn create_per_frame_image(&mut self, name: impl Into<String>, desc: ImageDesc) -> ResourceHandle {
        let handle = self.create_image(name, desc);
        self.resources.last_mut().unwrap().per_frame = true;
        handle
    }

    pub fn create_render_target(&mut self, name: impl Into<String>, desc: ImageDesc) -> ResourceHandle {
        let handle = self.create_image(name, desc);
        self.resources.last_mut().unwrap().render_target = true;
        handle
    }

    pub fn create_temporal_buffer(&mut self, name: impl Into<String>, desc: BufferDesc) -> ResourceHandle {
        let key: TemporalKey = name.into().into();
        let handle = match self.temporal.0.get(&key) {
            Some(&(id, ResourceKind::Buffer)) => ResourceHandle::new(id, ResourceKind::Buffer),
            _ => self.alloc_handle(ResourceKind::Buffer),
        };
        self.temporal.0.insert(key.clone(), (handle.handle_id, ResourceKind::Buffer));
        self.resources.push(ResourceEntry {
            name: key.0,
            handle,
            source: ResourceSource::InternalBuffer(desc),
            per_frame: false,
            temporal: true,
            render_target: false,
            presentable: false,
        });
        handle
    }

    pub fn create_temporal_image(&mut self, name: impl Into<String>, desc: ImageDesc) -> ResourceHandle {
        let key: TemporalKey = name.into().into();
        let handle = match self.temporal.0.get(&key) {
            Some(&(id, ResourceKind::Image)) => ResourceHandle::new(id, ResourceKind::Image),
            _ => self.alloc_handle(ResourceKind::Image),
        };
        self.temporal.0.insert(key.clone(), (handle.handle_id, ResourceKind::Image));
        self.resources.push(ResourceEntry {
            name: key.0,
            handle,
            source: ResourceSource::InternalImage(desc),
            per_frame: false,
            temporal: true,
            render_target: false,
            presentable: false,
        });
        handle
    }

    pub fn add_graphics_pass(&mut self, name: impl Into<String>, build: impl FnOnce(&mut GraphicsTaskBuilder)) {
        let mut pass = PassEntry::new(name.into(), WorkKind::Graphics);
        {
            let mut builder = GraphicsTaskBuilder { inner: TaskBuilder { pass: &mut pass } };
            build(&mut builder);
        }
        self.passes.push(pass);
    }

    pub fn add_compute_pass(&mut self, name: impl Into<String>, build: impl FnOnce(&mut ComputeTaskBuilder)) {
        let mut pass = PassEntry::new(name.into(), WorkKind::Compute);
        {
            let mut builder = ComputeTaskBuilder { inner: TaskBuilder { pass: &mut pass } };
            build(&mut builder);
        }
        self.passes.push(pass);
    }

    pub fn add_transfer_pass(&mut self, name: impl Into<String>, build: impl FnOnce(&mut TransferTaskBuilder)) {
        let mut pass = PassEntry::new(name.into(), WorkKind::Transfer);
        {
            let mut builder = TransferTaskBuilder { inner: TaskBuilder { pass: &mut pass } };
            build(&mut builder);
        }
        self.passes.push(pass);
    }

    /// Consumes the builder, compiling its resource and pass declarations
    /// into an execution plan. Returns the updated temporal registry
    /// alongside the plan so the caller can seed next frame's builder.
    pub fn compile(self, queue_config: QueueConfiguration) -> Result<(CompiledPlan, TemporalResourceRegistry), CompileError> {
        let plan = compiler::compile(self.resources, self.passes, queue_config)?;
        Ok((plan, self.temporal))
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
