//! Swapchain bookkeeping: tracked presentable surfaces, visibility, and the
//! acquire-to-timeline fan-in / present fan-out submissions that collapse
//! binary swapchain semaphores into the timeline semaphores the rest of the
//! frame synchronizes against.

use std::collections::HashMap;

use gpu_device::{
    AcquireError, BinarySemaphoreHandle, Device, ImageHandle, PresentImage, PresentInfo, QueueFamily, SubmitInfo,
    SurfaceHandle, TimelineOp, WorkQueue,
};

use crate::executor::state::SurfaceSlot;

pub(crate) struct AcquiredSurface {
    pub(crate) surface: SurfaceHandle,
    pub(crate) image: ImageHandle,
    pub(crate) image_index: u32,
    pub(crate) acquire_semaphore: BinarySemaphoreHandle,
    pub(crate) render_complete_semaphore: BinarySemaphoreHandle,
}

/// Acquires every visible, non-minimized surface. Surfaces reporting
/// `out_of_date` are queued for recreation and skipped this frame; closed
/// windows (absent from `slots`) are not touched here, the caller evicts
/// them from `slots` directly.
pub(crate) fn acquire_all<D: Device>(device: &D, slots: &mut HashMap<SurfaceHandle, SurfaceSlot>) -> Vec<AcquiredSurface> {
    let mut acquired = Vec::new();

    for (&surface, slot) in slots.iter_mut() {
        if !slot.visible {
            continue;
        }
        if slot.needs_recreate {
            match device.recreate_surface(surface) {
                Ok(()) => slot.needs_recreate = false,
                Err(_) => continue,
            }
        }

        match device.acquire_next_image(surface) {
            Ok(image) => acquired.push(AcquiredSurface {
                surface,
                image: image.image,
                image_index: image.image_index,
                acquire_semaphore: image.acquire_semaphore,
                render_complete_semaphore: image.render_complete_semaphore,
            }),
            Err(AcquireError::OutOfDate) => slot.needs_recreate = true,
            Err(AcquireError::Failure(_)) => {
                // surface evicted from the live set by the caller
            }
        }
    }

    acquired
}

/// Submits an empty command list on the primary queue that waits on every
/// acquire binary semaphore and bumps every queue family's timeline by one,
/// collapsing the acquire signal into a value later submissions can wait on
/// regardless of which queue family they target.
pub(crate) fn fan_in<Q: WorkQueue + ?Sized>(
    primary: &Q,
    acquired: &[AcquiredSurface],
    timeline_bumps: Vec<TimelineOp>,
) -> anyhow::Result<()> {
    if acquired.is_empty() && timeline_bumps.is_empty() {
        return Ok(());
    }

    let cmd = primary.get_next_command_list();
    primary.begin_command_list(cmd)?;
    primary.end_command_list(cmd)?;

    primary.submit(SubmitInfo {
        command_lists: vec![cmd],
        signals: timeline_bumps,
        binary_waits: acquired.iter().map(|a| a.acquire_semaphore).collect(),
        ..Default::default()
    })
}

/// Submits a no-op on the primary queue waiting on every per-queue timeline
/// and signalling each acquired surface's render-complete semaphore, then
/// presents every acquired surface.
pub(crate) fn fan_out_and_present<D: Device>(
    device: &D,
    primary: &D::Queue,
    acquired: &[AcquiredSurface],
    timeline_waits: Vec<TimelineOp>,
) -> Vec<(SurfaceHandle, Result<(), gpu_device::PresentError>)> {
    if acquired.is_empty() {
        return Vec::new();
    }

    let cmd = primary.get_next_command_list();
    if primary.begin_command_list(cmd).is_err() || primary.end_command_list(cmd).is_err() {
        return acquired
            .iter()
            .map(|a| (a.surface, Err(gpu_device::PresentError::Failure("fan-out command list failed".into()))))
            .collect();
    }

    if let Err(err) = primary.submit(SubmitInfo {
        command_lists: vec![cmd],
        waits: timeline_waits,
        binary_signals: acquired.iter().map(|a| a.render_complete_semaphore).collect(),
        ..Default::default()
    }) {
        return acquired.iter().map(|a| (a.surface, Err(gpu_device::PresentError::Failure(err.to_string())))).collect();
    }

    let results = device.present(PresentInfo {
        images: acquired.iter().map(|a| PresentImage { surface: a.surface, image_index: a.image_index }).collect(),
        wait_semaphores: acquired.iter().map(|a| a.render_complete_semaphore).collect(),
    });

    acquired.iter().zip(results).map(|(a, result)| (a.surface, result)).collect()
}

pub(crate) fn primary_family() -> QueueFamily {
    QueueFamily::Graphics
}
