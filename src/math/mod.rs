mod color;
mod frames;

pub use color::{srgb_to_linear, Rgb8};
pub use frames::{parallel_transport_frames, Frame};
