use crate::config::MonitorConfig;
use crate::frame::{grayscale, FrameSample};
use serde::{Deserialize, Serialize};

/// Grayscale level at or above which a pixel counts as "bright" for the
/// histogram shape test.
pub const BRIGHT_LEVEL: u8 = 200;

/// Outcome of the contact gate for a single frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContactReport {
    pub present: bool,
    /// Population variance of the grayscale values.
    pub variance: f64,
    /// Count of pixels with grayscale >= [`BRIGHT_LEVEL`].
    pub bright_pixels: usize,
}

/// Classifies a frame as "contact present" or not. Skin pressed on the
/// sensor produces a low-variance, predominantly dark image; an
/// unobstructed or saturated sensor fails one of the two tests.
pub fn assess_contact(frame: &FrameSample, cfg: &MonitorConfig) -> ContactReport {
    let values: Vec<u8> = frame.pixels.iter().map(|p| grayscale(*p)).collect();
    let variance = population_variance(&values);
    let bright_pixels = values.iter().filter(|&&v| v >= BRIGHT_LEVEL).count();
    let present = variance < cfg.variance_threshold && bright_pixels <= cfg.bright_pixel_limit;
    ContactReport {
        present,
        variance,
        bright_pixels,
    }
}

fn population_variance(values: &[u8]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameSample;

    fn cfg() -> MonitorConfig {
        MonitorConfig::default()
    }

    #[test]
    fn all_white_frame_is_rejected() {
        let frame = FrameSample::uniform(30, 30, [255, 255, 255], 0);
        let report = assess_contact(&frame, &cfg());
        assert!(!report.present);
        assert_eq!(report.bright_pixels, 900);
        assert_eq!(report.variance, 0.0);
    }

    #[test]
    fn uniform_dark_frame_is_accepted() {
        let frame = FrameSample::uniform(30, 30, [40, 40, 40], 0);
        let report = assess_contact(&frame, &cfg());
        assert!(report.present);
        assert_eq!(report.variance, 0.0);
        assert_eq!(report.bright_pixels, 0);
    }

    #[test]
    fn high_variance_frame_is_rejected() {
        // Half black, half mid-gray: variance (60^2) well above threshold.
        let mut frame = FrameSample::uniform(30, 30, [0, 0, 0], 0);
        for pixel in frame.pixels.iter_mut().take(450) {
            *pixel = [120, 120, 120];
        }
        let report = assess_contact(&frame, &cfg());
        assert!(report.variance > 300.0);
        assert!(!report.present);
    }

    #[test]
    fn a_few_bright_pixels_are_tolerated() {
        let mut frame = FrameSample::uniform(30, 30, [40, 40, 40], 0);
        for pixel in frame.pixels.iter_mut().take(20) {
            *pixel = [45, 45, 45];
        }
        let report = assess_contact(&frame, &cfg());
        assert!(report.present);

        // 21 saturated pixels crosses the histogram limit.
        let mut frame = FrameSample::uniform(30, 30, [40, 40, 40], 0);
        for pixel in frame.pixels.iter_mut().take(21) {
            *pixel = [210, 210, 210];
        }
        let report = assess_contact(&frame, &cfg());
        assert_eq!(report.bright_pixels, 21);
        assert!(!report.present);
    }
}
