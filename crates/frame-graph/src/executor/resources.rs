//! Resolves a compiled plan's resources to concrete device objects.
//!
//! Temporal resources keep a stable `handle_id` across frames, so their
//! device objects are cached in `ExecutorState` keyed by id. Per-frame
//! resources get a fresh `handle_id` every frame (a new builder is created
//! each frame), so the same underlying allocation is instead recognized by
//! resource name. Everything else is transient: created fresh every frame
//! and left for the device backend to reclaim once its fence is reset.

use std::collections::HashMap;

use gpu_device::{BufferDesc, BufferHandle, Device, ImageDesc, ImageHandle};

use crate::compiler::plan::{CompiledPlan, PlanResourceOrigin};
use crate::error::RuntimeError;
use crate::executor::state::ExecutorState;

#[derive(Default)]
pub(crate) struct ResolvedResources {
    pub(crate) buffers: HashMap<u64, BufferHandle>,
    pub(crate) images: HashMap<u64, ImageHandle>,
    pub(crate) per_frame_offsets: HashMap<u64, u64>,
}

pub(crate) fn resolve<D: Device>(
    state: &mut ExecutorState,
    device: &D,
    plan: &CompiledPlan,
    frame_index: u64,
    frames_in_flight: u32,
) -> Result<ResolvedResources, RuntimeError> {
    let mut resolved = ResolvedResources::default();
    let slot = frame_index % frames_in_flight as u64;

    for resource in &plan.resources {
        let id = resource.handle.handle_id;
        match &resource.origin {
            PlanResourceOrigin::ExternalBuffer(handle) => {
                resolved.buffers.insert(id, *handle);
            }
            PlanResourceOrigin::ExternalImage(handle) => {
                resolved.images.insert(id, *handle);
            }
            PlanResourceOrigin::ExternalSurface(_) => {
                // Resolved separately once the swapchain image is acquired.
            }
            PlanResourceOrigin::InternalBuffer(desc) => {
                let handle = if resource.temporal {
                    resolve_temporal_buffer(state, device, id, *desc, &resource.name)?
                } else if resource.per_frame {
                    resolve_per_frame_buffer(state, device, *desc, &resource.name, frames_in_flight)?
                } else {
                    device.create_buffer(*desc, &resource.name)?
                };
                resolved.buffers.insert(id, handle);
                if resource.per_frame {
                    resolved.per_frame_offsets.insert(id, slot * desc.size);
                }
            }
            PlanResourceOrigin::InternalImage(desc) => {
                let handle = if resource.temporal {
                    resolve_temporal_image(state, device, id, *desc, &resource.name)?
                } else if resource.per_frame {
                    resolve_per_frame_image(state, device, *desc, &resource.name, slot, frames_in_flight)?
                } else {
                    device.create_image(*desc, &resource.name)?
                };
                resolved.images.insert(id, handle);
            }
        }
    }

    Ok(resolved)
}

fn resolve_temporal_buffer<D: Device>(state: &mut ExecutorState, device: &D, id: u64, desc: BufferDesc, name: &str) -> Result<BufferHandle, RuntimeError> {
    if let Some(&handle) = state.temporal_buffers.get(&id) {
        return Ok(handle);
    }
    let handle = device.create_buffer(desc, name)?;
    state.temporal_buffers.insert(id, handle);
    Ok(handle)
}

fn resolve_temporal_image<D: Device>(state: &mut ExecutorState, device: &D, id: u64, desc: ImageDesc, name: &str) -> Result<ImageHandle, RuntimeError> {
    if let Some(&handle) = state.temporal_images.get(&id) {
        return Ok(handle);
    }
    let handle = device.create_image(desc, name)?;
    state.temporal_images.insert(id, handle);
    Ok(handle)
}

fn resolve_per_frame_buffer<D: Device>(
    state: &mut ExecutorState,
    device: &D,
    desc: BufferDesc,
    name: &str,
    frames_in_flight: u32,
) -> Result<BufferHandle, RuntimeError> {
    if let Some(&(handle, _)) = state.per_frame_buffers.get(name) {
        return Ok(handle);
    }
    let rotated = BufferDesc { size: desc.size.saturating_mul(frames_in_flight as u64), usage: desc.usage };
    let handle = device.create_buffer(rotated, name)?;
    state.per_frame_buffers.insert(name.to_owned(), (handle, desc.size));
    Ok(handle)
}

fn resolve_per_frame_image<D: Device>(
    state: &mut ExecutorState,
    device: &D,
    desc: ImageDesc,
    name: &str,
    slot: u64,
    frames_in_flight: u32,
) -> Result<ImageHandle, RuntimeError> {
    let slots = state.per_frame_images.entry(name.to_owned()).or_insert_with(Vec::new);
    while (slots.len() as u32) < frames_in_flight {
        slots.push(device.create_image(desc, name)?);
    }
    Ok(slots[slot as usize])
}
