//! Per-frame GPU work graph: declare passes and their resource accesses
//! against a [`GraphBuilder`], compile into a scheduled execution plan, then
//! drive that plan against a [`gpu_device::Device`] each frame with
//! [`executor::execute`]. The compiler performs liveness analysis, multi-queue
//! topological scheduling, and barrier/ownership-transfer planning up front;
//! the executor turns the plan into device calls and owns nothing the
//! compiler didn't already decide.

mod access;
pub mod builder;
pub mod compiler;
pub mod context;
pub mod error;
pub mod executor;
mod pass;
mod resource;
mod task_builder;

pub use access::AccessMode;
pub use builder::{GraphBuilder, TemporalKey, TemporalResourceRegistry};
pub use compiler::plan::{CompiledPlan, QueueConfiguration};
pub use context::{ComputeContext, GraphicsContext, ResourceLookup, TransferContext};
pub use error::{CompileError, RuntimeError};
pub use executor::{ExecuteOutcome, ExecutorState, SurfaceSlot};
pub use pass::WorkKind;
pub use resource::{ResourceHandle, ResourceKind};
pub use task_builder::{ComputeTaskBuilder, GraphicsTaskBuilder, TaskBuilder, TransferTaskBuilder};

extern crate log as glog;
