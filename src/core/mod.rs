pub mod activity;
pub mod clock;
pub mod flight;
pub mod frame;
pub mod gpu_context;
pub mod render_loop;
pub mod ticker;
pub mod timer;
pub mod viewport;

pub use activity::ActivityFlag;
pub use clock::FrameClock;
pub use flight::{FlightController, FlightState, FlightStep, FramePacing, COMPLETION_EPSILON};
pub use frame::FrameInfo;
pub use gpu_context::GpuContext;
pub use render_loop::{FrameState, RenderLoop, SceneRenderer, TickOutcome};
pub use ticker::{FrameTicker, ManualTicker, RedrawTicker, TickHandle};
pub use timer::{Countdown, Fade, FpsMeter};
pub use viewport::Viewport;
