use serde::{Deserialize, Serialize};

/// Tunable parameters for the monitoring pipeline. All fields default to the
/// values the sampling and filtering stages were calibrated with, so a TOML
/// config only needs to name the fields it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Width of the sampling frame in pixels.
    pub image_width: usize,
    /// Height of the sampling frame in pixels.
    pub image_height: usize,
    /// Capacity of the sliding sample window (300 ~= 5 s at 60 fps).
    pub window_capacity: usize,
    /// Contact gate: maximum grayscale population variance.
    pub variance_threshold: f64,
    /// Contact gate: maximum count of pixels with grayscale >= 200.
    pub bright_pixel_limit: usize,
    /// Plausibility lower bound for an RR interval (ms, inclusive).
    pub rr_min_ms: u32,
    /// Plausibility upper bound for an RR interval (ms, inclusive).
    pub rr_max_ms: u32,
    /// Size of the rolling baseline of distinct RR intervals.
    pub baseline_window: usize,
    /// Number of validated intervals that triggers HRV analysis.
    pub batch_target: usize,
    /// Maximum distance from the baseline average for batch admission (ms).
    pub outlier_tolerance_ms: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            image_width: 30,
            image_height: 30,
            window_capacity: 300,
            variance_threshold: 300.0,
            bright_pixel_limit: 20,
            rr_min_ms: 250,
            rr_max_ms: 2000,
            baseline_window: 20,
            batch_target: 50,
            outlier_tolerance_ms: 150.0,
        }
    }
}

impl MonitorConfig {
    pub fn pixel_count(&self) -> usize {
        self.image_width * self.image_height
    }
}
