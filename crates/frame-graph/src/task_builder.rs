//! Task builders: the per-pass API used to record typed resource accesses.

use gpu_device::{ImageLayout, MemoryAccess, PipelineStage};

use crate::access::{default_read_access, default_write_access, AccessMode, AccessRecord};
use crate::context::{ComputeContext, GraphicsContext, TransferContext};
use crate::pass::{ExecutionCallable, PassEntry};
use crate::resource::ResourceHandle;

/// Shared read/write/read_write vocabulary. Every concrete task builder
/// (graphics/compute/transfer) defers to these default-hint overloads.
pub struct TaskBuilder<'p> {
    pub(crate) pass: &'p mut PassEntry,
}

impl<'p> TaskBuilder<'p> {
    pub fn read(&mut self, handle: ResourceHandle) -> ResourceHandle {
        self.read_hint(handle, PipelineStage::ALL, default_read_access(ImageLayout::Undefined), ImageLayout::Undefined)
    }

    pub fn read_layout(&mut self, handle: ResourceHandle, layout: ImageLayout) -> ResourceHandle {
        self.read_hint(handle, PipelineStage::ALL, default_read_access(layout), layout)
    }

    pub fn read_hint(&mut self, handle: ResourceHandle, stages: PipelineStage, access: MemoryAccess, layout: ImageLayout) -> ResourceHandle {
        self.pass.accesses.push(AccessRecord { handle, mode: AccessMode::Read, stages, access, layout });
        handle
    }

    pub fn write(&mut self, handle: ResourceHandle) -> ResourceHandle {
        self.write_hint(handle, PipelineStage::ALL, default_write_access(ImageLayout::Undefined), ImageLayout::Undefined)
    }

    pub fn write_layout(&mut self, handle: ResourceHandle, layout: ImageLayout) -> ResourceHandle {
        self.write_hint(handle, PipelineStage::ALL, default_write_access(layout), layout)
    }

    pub fn write_hint(&mut self, handle: ResourceHandle, stages: PipelineStage, access: MemoryAccess, layout: ImageLayout) -> ResourceHandle {
        let bumped = handle.bumped();
        self.pass.accesses.push(AccessRecord { handle: bumped, mode: AccessMode::Write, stages, access, layout });
        bumped
    }

    /// Records a read at the current version, then a write that bumps the
    /// version — mirroring the original task builder's read-then-write
    /// emission order for read-modify-write accesses.
    pub fn read_write(&mut self, handle: ResourceHandle) -> ResourceHandle {
        self.read(handle);
        self.write(handle)
    }

    pub fn read_write_layout(&mut self, handle: ResourceHandle, layout: ImageLayout) -> ResourceHandle {
        self.read_layout(handle, layout);
        self.write_layout(handle, layout)
    }

    pub fn depends_on(&mut self, pass_name: impl Into<String>) {
        self.pass.explicit_deps.push(pass_name.into());
    }
}

pub struct GraphicsTaskBuilder<'p> {
    pub(crate) inner: TaskBuilder<'p>,
}

impl<'p> std::ops::Deref for GraphicsTaskBuilder<'p> {
    type Target = TaskBuilder<'p>;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<'p> std::ops::DerefMut for GraphicsTaskBuilder<'p> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<'p> GraphicsTaskBuilder<'p> {
    /// Attaches this pass's deferred execution callable. Called once per pass.
    pub fn execute(&mut self, f: impl FnOnce(&mut GraphicsContext<'_>) -> anyhow::Result<()> + 'static) {
        set_callable(&mut *self.inner.pass, ExecutionCallable::Graphics(Box::new(f)));
    }
}

pub struct ComputeTaskBuilder<'p> {
    pub(crate) inner: TaskBuilder<'p>,
}

impl<'p> std::ops::Deref for ComputeTaskBuilder<'p> {
    type Target = TaskBuilder<'p>;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<'p> std::ops::DerefMut for ComputeTaskBuilder<'p> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<'p> ComputeTaskBuilder<'p> {
    pub fn prefer_async(&mut self) {
        self.inner.pass.async_preferred = true;
    }

    pub fn execute(&mut self, f: impl FnOnce(&mut ComputeContext<'_>) -> anyhow::Result<()> + 'static) {
        set_callable(&mut *self.inner.pass, ExecutionCallable::Compute(Box::new(f)));
    }
}

pub struct TransferTaskBuilder<'p> {
    pub(crate) inner: TaskBuilder<'p>,
}

impl<'p> std::ops::Deref for TransferTaskBuilder<'p> {
    type Target = TaskBuilder<'p>;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<'p> std::ops::DerefMut for TransferTaskBuilder<'p> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<'p> TransferTaskBuilder<'p> {
    pub fn prefer_async(&mut self) {
        self.inner.pass.async_preferred = true;
    }

    pub fn execute(&mut self, f: impl FnOnce(&mut TransferContext<'_>) -> anyhow::Result<()> + 'static) {
        set_callable(&mut *self.inner.pass, ExecutionCallable::Transfer(Box::new(f)));
    }
}

pub(crate) fn set_callable(pass: &mut PassEntry, callable: ExecutionCallable) {
    let old = pass.callable.replace(callable);
    assert!(old.is_none(), "pass `{}` already has an execution callable", pass.name);
}
