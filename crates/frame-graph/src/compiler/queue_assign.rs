//! Queue family assignment: every pass lands on graphics unless it asked to
//! prefer async execution, in which case it falls down a ladder toward a
//! dedicated queue and back to graphics if none is configured.

use gpu_device::QueueFamily;

use crate::compiler::plan::QueueConfiguration;
use crate::pass::{PassEntry, WorkKind};

pub(crate) fn assign_queue(pass: &PassEntry, config: &QueueConfiguration) -> QueueFamily {
    if !pass.async_preferred {
        return QueueFamily::Graphics;
    }

    match pass.kind {
        WorkKind::Transfer if config.transfer_queues > 0 => QueueFamily::Transfer,
        WorkKind::Compute if config.compute_queues > 0 => QueueFamily::Compute,
        WorkKind::Transfer if config.compute_queues > 0 => QueueFamily::Compute,
        _ => QueueFamily::Graphics,
    }
}
