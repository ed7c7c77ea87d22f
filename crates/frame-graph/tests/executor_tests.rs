mod common;

use common::{Event, MockDevice};
use frame_graph::compiler::plan::QueueConfiguration;
use frame_graph::executor::{self, ExecuteOutcome, ExecutorState, SurfaceSlot};
use frame_graph::GraphBuilder;
use gpu_device::{
    BufferDesc, BufferUsage, ImageLayout, PresentError, QueueFamily, SurfaceHandle,
};

fn graphics_only() -> QueueConfiguration {
    QueueConfiguration { graphics_queues: 1, compute_queues: 0, transfer_queues: 0 }
}

/// S1 from the testable-properties scenarios: a single graphics pass writes
/// an imported presentable surface as a color attachment.
#[test]
fn triangle_emits_entry_and_present_barriers() {
    let device = MockDevice::new(&[QueueFamily::Graphics]);
    let surface = SurfaceHandle::new(1, 0);
    device.add_surface(surface);

    let mut builder = GraphBuilder::new();
    let swapchain = builder.import_render_surface("swapchain", surface);

    builder.add_graphics_pass("triangle", |pass| {
        let target = pass.write_layout(swapchain, ImageLayout::ColorAttachment);
        pass.execute(move |ctx| {
            ctx.begin_render_pass(&[ctx.find_image(target).unwrap()], None);
            ctx.end_render_pass();
            Ok(())
        });
    });

    let (mut plan, _) = builder.compile(graphics_only()).unwrap();
    assert_eq!(plan.submissions.len(), 1);
    assert_eq!(plan.submissions[0].queue, QueueFamily::Graphics);

    let mut state = ExecutorState::default();
    state.surfaces.insert(surface, SurfaceSlot::new(true));

    executor::execute(&mut state, &device, &mut plan, 1).unwrap();

    let events = device.log.borrow().events.clone();
    let image_barriers: Vec<&Event> = events
        .iter()
        .filter(|e| matches!(e, Event::ImageBarrier { .. }))
        .collect();
    assert_eq!(image_barriers.len(), 2, "expected entry + present barrier, got {events:?}");

    match image_barriers[0] {
        Event::ImageBarrier { old_layout, new_layout, .. } => {
            assert_eq!(*old_layout, ImageLayout::Undefined);
            assert_eq!(*new_layout, ImageLayout::ColorAttachment);
        }
        _ => unreachable!(),
    }
    match image_barriers[1] {
        Event::ImageBarrier { old_layout, new_layout, .. } => {
            assert_eq!(*old_layout, ImageLayout::ColorAttachment);
            assert_eq!(*new_layout, ImageLayout::Present);
        }
        _ => unreachable!(),
    }

    assert_eq!(events.iter().filter(|e| matches!(e, Event::Present)).count(), 1);
    // One queue family backs the whole frame here, so the acquire fan-in, the
    // pass's own submission, and the present fan-out all land on the same
    // mock queue: three distinct submits sharing one log.
    assert_eq!(events.iter().filter(|e| matches!(e, Event::Submit { .. })).count(), 3);
}

/// S4: a per-frame buffer sized 256 with frames_in_flight=3 is allocated
/// once at size 768, and each frame's offset rotates 0/256/512.
#[test]
fn per_frame_buffer_allocates_once_and_rotates_offset() {
    let device = MockDevice::new(&[QueueFamily::Graphics]);
    let mut state = ExecutorState::default();

    let mut observed_offsets = Vec::new();
    for _ in 0..3 {
        let mut builder = GraphBuilder::new();
        let ubo = builder.create_per_frame_buffer("ubo", BufferDesc { size: 256, usage: BufferUsage::UNIFORM });

        builder.add_transfer_pass("upload_ubo", |pass| {
            pass.write(ubo);
            pass.execute(move |ctx| {
                ctx.fill_buffer(ubo, 0, 256, 0);
                Ok(())
            });
        });

        let (mut plan, _) = builder.compile(graphics_only()).unwrap();
        executor::execute(&mut state, &device, &mut plan, 3).unwrap();

        let offset = device
            .log
            .borrow()
            .events
            .iter()
            .rev()
            .find_map(|e| match e {
                Event::FillBuffer { offset, .. } => Some(*offset),
                _ => None,
            })
            .expect("fill_buffer was recorded");
        observed_offsets.push(offset);
    }

    assert_eq!(observed_offsets, vec![0, 256, 512]);
    assert_eq!(device.created_buffers.borrow().len(), 1, "the rotated buffer is only created once");
    assert_eq!(device.created_buffers.borrow()[0].size, 768);
}

/// S6: two presentable surfaces are acquired, rendered to, and presented in
/// the same frame; a present failure on one schedules it for recreation
/// without affecting the other.
#[test]
fn two_windows_present_independently() {
    let device = MockDevice::new(&[QueueFamily::Graphics]);
    let surface_a = SurfaceHandle::new(1, 0);
    let surface_b = SurfaceHandle::new(2, 0);
    device.add_surface(surface_a);
    device.add_surface(surface_b);
    device.present_results.borrow_mut().insert(surface_a, Err(PresentError::OutOfDate));

    let mut builder = GraphBuilder::new();
    let window_a = builder.import_render_surface("window_a", surface_a);
    let window_b = builder.import_render_surface("window_b", surface_b);

    builder.add_graphics_pass("draw_a", |pass| {
        let target = pass.write_layout(window_a, ImageLayout::ColorAttachment);
        pass.execute(move |ctx| {
            ctx.begin_render_pass(&[ctx.find_image(target).unwrap()], None);
            ctx.end_render_pass();
            Ok(())
        });
    });
    builder.add_graphics_pass("draw_b", |pass| {
        let target = pass.write_layout(window_b, ImageLayout::ColorAttachment);
        pass.execute(move |ctx| {
            ctx.begin_render_pass(&[ctx.find_image(target).unwrap()], None);
            ctx.end_render_pass();
            Ok(())
        });
    });

    let (mut plan, _) = builder.compile(graphics_only()).unwrap();

    let mut state = ExecutorState::default();
    state.surfaces.insert(surface_a, SurfaceSlot::new(true));
    state.surfaces.insert(surface_b, SurfaceSlot::new(true));

    let outcome = executor::execute(&mut state, &device, &mut plan, 1).unwrap();
    let ExecuteOutcome::Presented { recreated } = outcome;

    assert_eq!(recreated, vec![surface_a]);
    assert!(state.surfaces[&surface_a].needs_recreate());
    assert!(!state.surfaces[&surface_b].needs_recreate());
    assert!(state.surfaces.contains_key(&surface_b), "surface_b was not evicted");
}

/// Property 4: two writes to the same buffer on the same queue with no
/// intervening barrier must have a buffer barrier emitted between them.
#[test]
fn same_queue_write_write_gets_an_intervening_buffer_barrier() {
    let device = MockDevice::new(&[QueueFamily::Graphics]);
    let mut builder = GraphBuilder::new();
    let scratch = builder.import_buffer("scratch", gpu_device::BufferHandle::new(7, 0));

    builder.add_transfer_pass("fill_a", |pass| {
        let scratch = pass.write(scratch);
        pass.execute(move |ctx| {
            ctx.fill_buffer(scratch, 0, 64, 1);
            Ok(())
        });
    });
    builder.add_transfer_pass("fill_b", |pass| {
        pass.depends_on("fill_a");
        let scratch = pass.write(scratch);
        pass.execute(move |ctx| {
            ctx.fill_buffer(scratch, 0, 64, 2);
            Ok(())
        });
    });

    let (mut plan, _) = builder.compile(graphics_only()).unwrap();

    let mut state = ExecutorState::default();
    executor::execute(&mut state, &device, &mut plan, 1).unwrap();

    let events = device.log.borrow().events.clone();
    let buffer_barriers = events.iter().filter(|e| matches!(e, Event::BufferBarrier { .. })).count();
    assert_eq!(buffer_barriers, 1, "expected one barrier between the two writes, got {events:?}");

    let fill_count = events.iter().filter(|e| matches!(e, Event::FillBuffer { .. })).count();
    assert_eq!(fill_count, 2);
}

/// An empty plan with only imported external resources and zero passes
/// executes as a no-op: no submissions, no barriers, nothing presented.
#[test]
fn empty_plan_with_no_presentable_resources_is_a_noop() {
    let device = MockDevice::new(&[QueueFamily::Graphics]);
    let mut builder = GraphBuilder::new();
    let _ = builder.import_buffer("external_only", gpu_device::BufferHandle::new(1, 0));

    let (mut plan, _) = builder.compile(graphics_only()).unwrap();
    assert!(plan.submissions.is_empty());

    let mut state = ExecutorState::default();
    let outcome = executor::execute(&mut state, &device, &mut plan, 1).unwrap();
    let ExecuteOutcome::Presented { recreated } = outcome;

    assert!(recreated.is_empty());
    assert!(device.log.borrow().events.is_empty());
}
