use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use tunnel_flight::app::ViewRouter;
use tunnel_flight::cli::Cli;
use tunnel_flight::config::TunnelConfig;
use tunnel_flight::core::{
    ActivityFlag, FlightController, FpsMeter, FrameClock, RedrawTicker, RenderLoop, Viewport,
};
use tunnel_flight::hud::HudStatus;
use tunnel_flight::renderer::{GpuTunnelRenderer, RenderSettings};
use tunnel_flight::{PerspectiveCamera, TunnelScene};

const FPS_UPDATE_INTERVAL: f32 = 1.0;
const IDLE_FRAME: Duration = Duration::from_millis(16);

type TunnelLoop = RenderLoop<GpuTunnelRenderer, RedrawTicker>;

struct App {
    cli: Cli,
    config: TunnelConfig,
    window: Option<Arc<Window>>,
    tunnel: Option<TunnelLoop>,
    router: ViewRouter,
    activity: ActivityFlag,
    flight_completed: Rc<Cell<bool>>,
    clock: FrameClock,
    fps: FpsMeter,
}

impl App {
    fn new(cli: Cli, config: TunnelConfig) -> Self {
        let router = ViewRouter::new(config.view.travel_seconds);
        Self {
            cli,
            config,
            window: None,
            tunnel: None,
            router,
            activity: ActivityFlag::default(),
            flight_completed: Rc::new(Cell::new(false)),
            clock: FrameClock::new(),
            fps: FpsMeter::new(FPS_UPDATE_INTERVAL),
        }
    }

    fn viewport(window: &Window) -> Viewport {
        let size = window.inner_size();
        Viewport::new(size.width, size.height, window.scale_factor())
    }

    /// Build the scene and the GPU renderer, then start the loop
    fn mount_tunnel(&self, window: Arc<Window>) -> anyhow::Result<TunnelLoop> {
        let path = self.config.build_path()?;
        let mut rng = self.config.rng();
        let scene = TunnelScene::build(&path, &self.config, &mut rng)?;

        let viewport = Self::viewport(&window);
        let settings = RenderSettings::from_config(&self.config)?;
        let renderer = pollster::block_on(GpuTunnelRenderer::new(
            window.clone(),
            &scene,
            settings,
            viewport,
            !self.cli.no_ui,
        ))
        .context("Failed to initialize tunnel renderer")?;

        let controller = FlightController::new(path, self.config.flight.clone());
        let camera = PerspectiveCamera::new(&self.config.camera, viewport.aspect());
        let completed = self.flight_completed.clone();

        let mut tunnel = RenderLoop::new(
            renderer,
            RedrawTicker::new(window),
            controller,
            camera,
            self.activity.clone(),
        )
        .with_tube_spin(self.config.tube.spin_per_frame)
        .with_on_complete(move || completed.set(true));
        tunnel.mount();
        Ok(tunnel)
    }

    fn handle_key(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) {
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::Enter | KeyCode::NumpadEnter => {
                self.router.enter();
            }
            KeyCode::Backspace => {
                if self.router.back() {
                    // A finished flight idles again behind the portal
                    if let Some(tunnel) = &mut self.tunnel {
                        if tunnel.controller().is_completed() {
                            tunnel.reset();
                        }
                    }
                    self.flight_completed.set(false);
                }
            }
            _ => {}
        }
    }

    fn redraw(&mut self) {
        let frame = self.clock.tick();
        if let Some(fps) = self.fps.tick(frame.delta) {
            log::debug!("FPS: {fps:.1}");
        }

        self.router.update(frame.delta, self.flight_completed.get());
        self.activity.set(self.router.is_flying());

        let Some(tunnel) = &mut self.tunnel else {
            return;
        };

        let status = HudStatus {
            view: self.router.view().to_string(),
            flight: Some(tunnel.controller().state()),
            progress: tunnel.controller().progress(),
            fps: self.fps.fps(),
        };
        tunnel.renderer_mut().set_status(status);
        // A finished flight keeps its last image, but the overlay and fade still move
        if tunnel.pump().is_none() {
            tunnel.redraw_still();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Tunnel Flight")
                .with_inner_size(winit::dpi::LogicalSize::new(self.cli.width, self.cli.height)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        // Without a GPU the router keeps running over a blank window
        match self.mount_tunnel(window.clone()) {
            Ok(tunnel) => self.tunnel = Some(tunnel),
            Err(e) => log::error!("Tunnel disabled: {e:#}"),
        }
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let the overlay handle the event first
        if let Some(tunnel) = &mut self.tunnel {
            if tunnel.renderer_mut().handle_window_event(&event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(code, event_loop),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let (Some(tunnel), Some(window)) = (&mut self.tunnel, &self.window) {
                    tunnel.resize(Self::viewport(window));
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if let StartCause::ResumeTimeReached { .. } = cause {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // A running tunnel requests its own redraws; otherwise the router still needs ticking
        let suspended = self.tunnel.as_ref().map_or(true, |t| !t.is_running());
        if suspended {
            event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + IDLE_FRAME));
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut tunnel) = self.tunnel.take() {
            tunnel.teardown();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => TunnelConfig::load(path)?,
        None => TunnelConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli, config);

    log::info!("Tunnel Flight - Enter to fly, Backspace to return, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
