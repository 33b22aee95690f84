use crate::camera::PerspectiveCamera;

use super::activity::ActivityFlag;
use super::clock::FrameClock;
use super::flight::{FlightController, FlightState, FlightStep};
use super::frame::FrameInfo;
use super::ticker::{FrameTicker, TickHandle};
use super::viewport::Viewport;

/// Per-frame values the renderer needs besides the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub info: FrameInfo,
    /// Tube rotation about world Z, radians
    pub tube_angle: f32,
    pub progress: f64,
    pub flight: FlightState,
}

/// Drawing seam between the loop and the graphics backend
pub trait SceneRenderer {
    fn render(&mut self, camera: &PerspectiveCamera, frame: &FrameState) -> anyhow::Result<()>;

    /// Output size changed. Never called with an empty viewport.
    fn resize(&mut self, viewport: Viewport);

    /// Free every graphics resource. Called exactly once.
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was drawn and the next tick scheduled
    Rendered,
    /// Flight finished this tick; the callback fired and the loop is suspended
    Completed,
    /// The handle is not the one the loop is waiting for
    Stale,
    /// The loop is suspended or torn down
    Stopped,
}

/// One render per tick, driving the flight controller
///
/// The loop owns the renderer: mounting schedules the first tick, and teardown
/// (explicit or on drop) cancels the pending tick and releases the renderer once.
pub struct RenderLoop<R: SceneRenderer, T: FrameTicker> {
    renderer: R,
    ticker: T,
    controller: FlightController,
    camera: PerspectiveCamera,
    activity: ActivityFlag,
    clock: FrameClock,
    on_complete: Option<Box<dyn FnOnce()>>,
    pending: Option<TickHandle>,
    last_frame: Option<FrameState>,
    tube_spin: f32,
    tube_angle: f32,
    torn_down: bool,
}

impl<R: SceneRenderer, T: FrameTicker> RenderLoop<R, T> {
    pub fn new(
        renderer: R,
        ticker: T,
        controller: FlightController,
        camera: PerspectiveCamera,
        activity: ActivityFlag,
    ) -> Self {
        let mut camera = camera;
        camera.set_pose(controller.pose());

        Self {
            renderer,
            ticker,
            controller,
            camera,
            activity,
            clock: FrameClock::new(),
            on_complete: None,
            pending: None,
            last_frame: None,
            tube_spin: 0.0,
            tube_angle: 0.0,
            torn_down: false,
        }
    }

    /// Radians the tube turns every rendered frame
    pub fn with_tube_spin(mut self, radians_per_frame: f32) -> Self {
        self.tube_spin = radians_per_frame;
        self
    }

    /// Called once, with no arguments, when an active flight reaches the end.
    /// Without a callback an active flight wraps around and keeps flying.
    pub fn with_on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Schedule the first tick. No-op when already running or torn down.
    pub fn mount(&mut self) {
        if self.torn_down || self.pending.is_some() || self.controller.is_completed() {
            return;
        }
        self.clock.reset();
        self.pending = Some(self.ticker.schedule());
        log::debug!("Render loop mounted");
    }

    /// Run the tick the ticker says is due, if any
    pub fn pump(&mut self) -> Option<TickOutcome> {
        let handle = self.ticker.take_due()?;
        Some(self.tick(handle))
    }

    pub fn tick(&mut self, handle: TickHandle) -> TickOutcome {
        let frame = self.clock.tick();
        self.tick_frame(handle, frame)
    }

    /// `tick` with caller-supplied timing
    pub fn tick_frame(&mut self, handle: TickHandle, frame: FrameInfo) -> TickOutcome {
        if self.torn_down {
            return TickOutcome::Stopped;
        }
        if self.pending != Some(handle) {
            return TickOutcome::Stale;
        }
        self.pending = None;

        let active = self.activity.is_raised();
        let completes = self.on_complete.is_some();
        match self.controller.advance(active, completes, frame.delta) {
            FlightStep::Completed => {
                if let Some(callback) = self.on_complete.take() {
                    callback();
                }
                log::info!("Flight complete after {} frames", frame.number);
                TickOutcome::Completed
            }
            FlightStep::Halted => TickOutcome::Stopped,
            FlightStep::Moved(pose) => {
                self.camera.set_pose(pose);
                self.tube_angle += self.tube_spin;

                let state = FrameState {
                    info: frame,
                    tube_angle: self.tube_angle,
                    progress: self.controller.progress(),
                    flight: self.controller.state(),
                };
                if let Err(e) = self.renderer.render(&self.camera, &state) {
                    log::error!("Render error: {e:#}");
                }
                self.last_frame = Some(state);

                self.pending = Some(self.ticker.schedule());
                TickOutcome::Rendered
            }
        }
    }

    /// Draw the frozen scene again after a completed flight, without advancing
    ///
    /// Keeps overlays current while the loop is suspended. Returns false when
    /// the loop is running, torn down, or has not drawn anything yet.
    pub fn redraw_still(&mut self) -> bool {
        if self.torn_down || self.pending.is_some() || !self.controller.is_completed() {
            return false;
        }
        let Some(last) = self.last_frame else {
            return false;
        };

        let state = FrameState {
            info: self.clock.tick(),
            flight: self.controller.state(),
            ..last
        };
        if let Err(e) = self.renderer.render(&self.camera, &state) {
            log::error!("Render error: {e:#}");
        }
        true
    }

    /// Back to idle at the start of the path, resuming a completed loop
    pub fn reset(&mut self) {
        self.controller.reset();
        self.camera.set_pose(self.controller.pose());
        self.mount();
    }

    /// Follow the output size. Ignored after teardown or for an empty viewport.
    pub fn resize(&mut self, viewport: Viewport) {
        if self.torn_down || viewport.is_empty() {
            return;
        }
        self.camera.set_aspect(viewport.aspect());
        self.renderer.resize(viewport);
    }

    /// Cancel the pending tick and release the renderer. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        if let Some(handle) = self.pending.take() {
            self.ticker.cancel(handle);
        }
        self.renderer.release();
        self.on_complete = None;
        log::debug!("Render loop torn down");
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn controller(&self) -> &FlightController {
        &self.controller
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn tube_angle(&self) -> f32 {
        self.tube_angle
    }

    pub fn activity(&self) -> &ActivityFlag {
        &self.activity
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn ticker_mut(&mut self) -> &mut T {
        &mut self.ticker
    }
}

impl<R: SceneRenderer, T: FrameTicker> Drop for RenderLoop<R, T> {
    fn drop(&mut self) {
        self.teardown();
    }
}
