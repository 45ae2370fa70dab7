use thiserror::Error;

/// Errors raised by path construction, fitting and editing.
///
/// All of these are structural precondition failures: nothing here is
/// transient, so callers should drop the edit and keep the previous path.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BrushError {
    #[error("invalid element range {start}..{end} for path of {len} elements")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("need at least 3 distinct points to fit a spline, got {0}")]
    InsufficientData(usize),

    #[error("malformed element sequence: {0}")]
    MalformedSequence(String),

    #[error("path contains curve segments; rasterize it before simplifying")]
    NotPolyline,

    #[error("spline system could not be solved")]
    SingularFit,

    #[error("point list has {x} x values but {y} y values")]
    MismatchedPointList { x: usize, y: usize },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "render")]
    #[error("render error: {0}")]
    Render(String),

    #[cfg(feature = "render")]
    #[error("png encoding error: {0}")]
    Png(#[from] png::EncodingError),
}
