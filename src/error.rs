use thiserror::Error;

/// Errors raised while building the tunnel or its configuration
#[derive(Debug, Error)]
pub enum TunnelError {
    #[error("a closed path needs at least 4 control points, got {0}")]
    TooFewControlPoints(usize),

    #[error("control point {index} is not finite")]
    NonFiniteControlPoint { index: usize },

    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no usable rendering context: {0}")]
    RenderContext(String),
}

pub type Result<T> = std::result::Result<T, TunnelError>;
