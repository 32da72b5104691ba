use thiserror::Error;

/// Input errors: the offending frame is rejected and no pipeline state is
/// mutated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame is {got_width}x{got_height} but the monitor is configured for {want_width}x{want_height}")]
    Geometry {
        got_width: usize,
        got_height: usize,
        want_width: usize,
        want_height: usize,
    },
    #[error("frame carries {got} pixels, expected {want}")]
    PixelCount { got: usize, want: usize },
    #[error("frame timestamp {timestamp_ms} ms is not after the previous frame at {previous_ms} ms")]
    NonMonotonicTimestamp { timestamp_ms: u64, previous_ms: u64 },
}

/// Errors from batched HRV analysis. All are recoverable: the pipeline logs
/// them and reports a missing metric for that cycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricsError {
    #[error("need at least {need} RR intervals, got {got}")]
    InsufficientData { need: usize, got: usize },
    #[error("high-frequency power is zero, stress ratio undefined")]
    ZeroHfPower,
    #[error("rmssd is zero, energy and tension undefined")]
    ZeroRmssd,
}
