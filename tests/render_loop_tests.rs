use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tunnel_flight::camera::PerspectiveCamera;
use tunnel_flight::config::TunnelConfig;
use tunnel_flight::core::{FrameState, ManualTicker, Viewport};
use tunnel_flight::{ActivityFlag, FlightController, FlightState, RenderLoop, SceneRenderer, TickOutcome};

/// What the fake renderer saw, shared with the test after the loop is gone
#[derive(Default)]
struct RenderLog {
    frames: Vec<FrameState>,
    eyes: Vec<glam::Vec3>,
    aspects: Vec<f32>,
    resizes: Vec<Viewport>,
    releases: u32,
}

struct FakeRenderer {
    log: Rc<RefCell<RenderLog>>,
    fail: bool,
}

impl SceneRenderer for FakeRenderer {
    fn render(&mut self, camera: &PerspectiveCamera, frame: &FrameState) -> anyhow::Result<()> {
        let mut log = self.log.borrow_mut();
        log.frames.push(*frame);
        log.eyes.push(camera.position());
        log.aspects.push(camera.aspect);
        if self.fail {
            anyhow::bail!("device lost");
        }
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) {
        self.log.borrow_mut().resizes.push(viewport);
    }

    fn release(&mut self) {
        self.log.borrow_mut().releases += 1;
    }
}

struct Harness {
    render_loop: RenderLoop<FakeRenderer, ManualTicker>,
    log: Rc<RefCell<RenderLog>>,
    activity: ActivityFlag,
    completions: Rc<Cell<u32>>,
}

fn harness(fail: bool) -> Harness {
    build(fail, true)
}

fn build(fail: bool, with_callback: bool) -> Harness {
    let config = TunnelConfig::default();
    let log = Rc::new(RefCell::new(RenderLog::default()));
    let activity = ActivityFlag::default();
    let completions = Rc::new(Cell::new(0));

    let renderer = FakeRenderer {
        log: log.clone(),
        fail,
    };
    let controller = FlightController::new(config.build_path().unwrap(), config.flight.clone());
    let camera = PerspectiveCamera::new(&config.camera, 1.0);

    let mut render_loop = RenderLoop::new(renderer, ManualTicker::new(), controller, camera, activity.clone())
        .with_tube_spin(config.tube.spin_per_frame);
    if with_callback {
        let counter = completions.clone();
        render_loop = render_loop.with_on_complete(move || counter.set(counter.get() + 1));
    }
    render_loop.mount();

    Harness {
        render_loop,
        log,
        activity,
        completions,
    }
}

#[cfg(test)]
mod render_loop_tests {
    use super::*;

    #[test]
    fn test_flight_completes_on_frame_500() {
        let mut h = harness(false);
        h.activity.raise();

        let mut frame = 0;
        let outcome = loop {
            frame += 1;
            match h.render_loop.pump() {
                Some(TickOutcome::Rendered) => continue,
                other => break other,
            }
        };

        assert_eq!(outcome, Some(TickOutcome::Completed));
        assert_eq!(frame, 500);
        assert_eq!(h.completions.get(), 1);
        assert_eq!(h.log.borrow().frames.len(), 499);
    }

    #[test]
    fn test_no_updates_after_completion() {
        let mut h = harness(false);
        h.activity.raise();
        while h.render_loop.pump() == Some(TickOutcome::Rendered) {}

        let rendered = h.log.borrow().frames.len();
        let pose = h.render_loop.camera().pose();
        for _ in 0..10 {
            assert_eq!(h.render_loop.pump(), None, "no tick is scheduled after completion");
        }
        assert!(!h.render_loop.is_running());
        assert_eq!(h.log.borrow().frames.len(), rendered);
        assert_eq!(h.render_loop.camera().pose(), pose);
        assert_eq!(h.render_loop.controller().state(), FlightState::Completed);
        assert_eq!(h.completions.get(), 1);
    }

    #[test]
    fn test_active_flight_without_callback_keeps_looping() {
        let mut h = build(false, false);
        h.activity.raise();

        for frame in 1..=1200 {
            assert_eq!(h.render_loop.pump(), Some(TickOutcome::Rendered), "frame {frame}");
        }

        assert!(h.render_loop.is_running());
        assert_eq!(h.render_loop.controller().state(), FlightState::Active);
        // 1200 frames at 0.002 is 2.4 laps
        let progress = h.render_loop.controller().progress();
        assert!((progress - 0.4).abs() < 1e-9, "progress {progress}");
        assert_eq!(h.log.borrow().frames.len(), 1200);
    }

    #[test]
    fn test_redraw_still_after_completion() {
        let mut h = harness(false);
        assert!(!h.render_loop.redraw_still(), "running loops are drawn by ticks");

        h.activity.raise();
        while h.render_loop.pump() == Some(TickOutcome::Rendered) {}
        let rendered = h.log.borrow().frames.len();
        let last = *h.log.borrow().frames.last().unwrap();
        let eye = h.render_loop.camera().position();
        let progress = h.render_loop.controller().progress();

        assert!(h.render_loop.redraw_still());
        assert!(h.render_loop.redraw_still());
        assert_eq!(h.render_loop.pump(), None);

        let log = h.log.borrow();
        assert_eq!(log.frames.len(), rendered + 2);
        let still = log.frames.last().unwrap();
        assert_eq!(still.progress, last.progress);
        assert_eq!(still.tube_angle, last.tube_angle);
        assert_eq!(still.flight, FlightState::Completed);
        assert_eq!(*log.eyes.last().unwrap(), eye);
        assert_eq!(h.render_loop.controller().progress(), progress);
    }

    #[test]
    fn test_redraw_still_is_noop_after_teardown() {
        let mut h = harness(false);
        h.activity.raise();
        while h.render_loop.pump() == Some(TickOutcome::Rendered) {}
        let rendered = h.log.borrow().frames.len();

        h.render_loop.teardown();
        assert!(!h.render_loop.redraw_still());
        assert_eq!(h.log.borrow().frames.len(), rendered);
    }

    #[test]
    fn test_reset_resumes_idle_without_refiring() {
        let mut h = harness(false);
        h.activity.raise();
        while h.render_loop.pump() == Some(TickOutcome::Rendered) {}

        h.activity.lower();
        h.render_loop.reset();
        assert!(h.render_loop.is_running());
        for _ in 0..3000 {
            assert_eq!(h.render_loop.pump(), Some(TickOutcome::Rendered));
        }
        assert_eq!(h.render_loop.controller().state(), FlightState::Idle);
        assert_eq!(h.completions.get(), 1);
    }

    #[test]
    fn test_idle_keeps_rendering() {
        let mut h = harness(false);
        for _ in 0..2500 {
            assert_eq!(h.render_loop.pump(), Some(TickOutcome::Rendered));
        }

        let log = h.log.borrow();
        assert_eq!(log.frames.len(), 2500);
        assert!(log.frames.iter().all(|f| (0.0..1.0).contains(&f.progress)));
        assert_eq!(log.frames.last().unwrap().info.number, 2500);
        assert_eq!(h.completions.get(), 0);
    }

    #[test]
    fn test_camera_moves_each_frame() {
        let mut h = harness(false);
        for _ in 0..5 {
            h.render_loop.pump();
        }
        let log = h.log.borrow();
        for pair in log.eyes.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_tube_spins_per_frame() {
        let mut h = harness(false);
        for _ in 0..100 {
            h.render_loop.pump();
        }
        let angle = h.log.borrow().frames.last().unwrap().tube_angle;
        assert!((angle - 0.1).abs() < 1e-5, "angle {angle}");
    }

    #[test]
    fn test_render_errors_do_not_stop_the_loop() {
        let mut h = harness(true);
        for _ in 0..3 {
            assert_eq!(h.render_loop.pump(), Some(TickOutcome::Rendered));
        }
        assert!(h.render_loop.is_running());
    }

    #[test]
    fn test_double_teardown_releases_once() {
        let mut h = harness(false);
        h.render_loop.pump();
        h.render_loop.teardown();
        h.render_loop.teardown();

        assert_eq!(h.log.borrow().releases, 1);
        assert_eq!(h.render_loop.ticker().cancelled_count(), 1);
        assert_eq!(h.render_loop.pump(), None);

        drop(h.render_loop);
        assert_eq!(h.log.borrow().releases, 1);
    }

    #[test]
    fn test_drop_releases() {
        let h = harness(false);
        let log = h.log.clone();
        drop(h);
        assert_eq!(log.borrow().releases, 1);
    }

    #[test]
    fn test_teardown_after_completion_still_releases() {
        let mut h = harness(false);
        h.activity.raise();
        while h.render_loop.pump() == Some(TickOutcome::Rendered) {}

        h.render_loop.teardown();
        assert_eq!(h.log.borrow().releases, 1);
        // nothing was pending, so nothing to cancel
        assert_eq!(h.render_loop.ticker().cancelled_count(), 0);
    }

    #[test]
    fn test_teardown_drops_callback_unfired() {
        let mut h = harness(false);
        h.render_loop.teardown();
        h.activity.raise();
        h.render_loop.reset();
        assert_eq!(h.render_loop.pump(), None);
        assert_eq!(h.completions.get(), 0);
    }

    #[test]
    fn test_resize_updates_aspect_only() {
        let mut h = harness(false);
        h.render_loop.pump();
        let progress = h.render_loop.controller().progress();

        h.render_loop.resize(Viewport::new(1600, 800, 1.0));
        assert_eq!(h.render_loop.controller().progress(), progress);
        assert_eq!(h.log.borrow().resizes.len(), 1);

        h.render_loop.pump();
        assert_eq!(*h.log.borrow().aspects.last().unwrap(), 2.0);
    }

    #[test]
    fn test_resize_ignored_when_empty_or_torn_down() {
        let mut h = harness(false);
        h.render_loop.resize(Viewport::new(0, 600, 1.0));
        assert!(h.log.borrow().resizes.is_empty());

        h.render_loop.teardown();
        h.render_loop.resize(Viewport::new(800, 600, 1.0));
        assert!(h.log.borrow().resizes.is_empty());
    }
}
