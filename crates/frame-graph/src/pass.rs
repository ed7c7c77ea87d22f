//! Pass entries: what the builder records for each declared unit of GPU work.

use crate::access::AccessRecord;
use crate::context::{ComputeContext, GraphicsContext, TransferContext};

/// What kind of device work a pass performs, and hence which execution
/// context its callable is invoked with.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum WorkKind {
    Graphics,
    Compute,
    Transfer,
}

pub(crate) enum ExecutionCallable {
    Graphics(Box<dyn FnOnce(&mut GraphicsContext<'_>) -> anyhow::Result<()>>),
    Compute(Box<dyn FnOnce(&mut ComputeContext<'_>) -> anyhow::Result<()>>),
    Transfer(Box<dyn FnOnce(&mut TransferContext<'_>) -> anyhow::Result<()>>),
}

impl std::fmt::Debug for ExecutionCallable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self {
            ExecutionCallable::Graphics(_) => "Graphics",
            ExecutionCallable::Compute(_) => "Compute",
            ExecutionCallable::Transfer(_) => "Transfer",
        };
        f.debug_tuple(variant).field(&"<callable>").finish()
    }
}

/// A pass as recorded by the graph builder, before compilation.
pub(crate) struct PassEntry {
    pub name: String,
    pub kind: WorkKind,
    pub async_preferred: bool,
    pub accesses: Vec<AccessRecord>,
    pub explicit_deps: Vec<String>,
    pub callable: Option<ExecutionCallable>,
}

impl PassEntry {
    pub(crate) fn new(name: String, kind: WorkKind) -> Self {
        Self {
            name,
            kind,
            async_preferred: false,
            accesses: Vec::new(),
            explicit_deps: Vec::new(),
            callable: None,
        }
    }
}
