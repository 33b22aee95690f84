pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod hud;
pub mod math;
pub mod path;
pub mod renderer;
pub mod scenes;
pub mod types;

pub use camera::{CameraPose, PerspectiveCamera};
pub use config::TunnelConfig;
pub use core::{
    ActivityFlag, FlightController, FlightState, FlightStep, FrameTicker, ManualTicker,
    RenderLoop, SceneRenderer, TickOutcome, Viewport,
};
pub use error::{Result, TunnelError};
pub use path::TunnelPath;
pub use scenes::TunnelScene;
