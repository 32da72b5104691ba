use crate::config::MonitorConfig;
use crate::detectors::{beat, contact};
use crate::error::FrameError;
use crate::frame::FrameSample;
use crate::metrics::hrv::{analyze_batch, HrvMetrics};
use crate::signal::{Sample, SampleWindow, WindowStats};
use crate::tracker::RrTracker;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monitoring state reported alongside each processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorStatus {
    Idle,
    AwaitingContact,
    Calibrating,
    BatchProgress { filled: usize, target: usize },
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorStatus::Idle => Ok(()),
            MonitorStatus::AwaitingContact => write!(f, "awaiting contact"),
            MonitorStatus::Calibrating => write!(f, "calibrating"),
            MonitorStatus::BatchProgress { filled, target } => write!(f, "{filled}/{target}"),
        }
    }
}

/// Everything one processing step produced. Maps one-to-one onto the
/// callback surface of the original monitor: `bpm` is reported at most once
/// per frame, `status` is the current status text, `hrv` fires once per
/// completed batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameOutput {
    pub contact: bool,
    pub status: MonitorStatus,
    pub bpm: Option<u32>,
    pub stats: Option<WindowStats>,
    pub hrv: Option<HrvMetrics>,
}

/// The whole pipeline behind a single state object: contact gate, sample
/// window, beat detector, RR tracker and batched HRV analysis. One instance
/// per monitoring session; every frame is processed to completion before
/// the next is accepted.
#[derive(Debug)]
pub struct HeartRateMonitor {
    cfg: MonitorConfig,
    window: SampleWindow,
    tracker: RrTracker,
    status: MonitorStatus,
    last_timestamp_ms: Option<u64>,
}

impl HeartRateMonitor {
    pub fn new(cfg: MonitorConfig) -> Self {
        let window = SampleWindow::new(cfg.window_capacity);
        let tracker = RrTracker::new(&cfg);
        Self {
            cfg,
            window,
            tracker,
            status: MonitorStatus::Idle,
            last_timestamp_ms: None,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.cfg
    }

    pub fn status(&self) -> MonitorStatus {
        self.status
    }

    /// Clears the window, baseline, batch and timestamp guard. Idempotent:
    /// a subsequent frame is handled as if the monitor had just started.
    pub fn reset(&mut self) {
        self.window.reset();
        self.tracker.reset();
        self.status = MonitorStatus::Idle;
        self.last_timestamp_ms = None;
    }

    fn validate(&self, frame: &FrameSample) -> Result<(), FrameError> {
        if frame.width != self.cfg.image_width || frame.height != self.cfg.image_height {
            return Err(FrameError::Geometry {
                got_width: frame.width,
                got_height: frame.height,
                want_width: self.cfg.image_width,
                want_height: self.cfg.image_height,
            });
        }
        if frame.pixels.len() != frame.width * frame.height {
            return Err(FrameError::PixelCount {
                got: frame.pixels.len(),
                want: frame.width * frame.height,
            });
        }
        if let Some(previous_ms) = self.last_timestamp_ms {
            if frame.timestamp_ms <= previous_ms {
                return Err(FrameError::NonMonotonicTimestamp {
                    timestamp_ms: frame.timestamp_ms,
                    previous_ms,
                });
            }
        }
        Ok(())
    }

    /// Runs one frame through the full chain. Rejected frames leave every
    /// piece of state untouched.
    pub fn process_frame(&mut self, frame: &FrameSample) -> Result<FrameOutput, FrameError> {
        self.validate(frame)?;
        self.last_timestamp_ms = Some(frame.timestamp_ms);

        let report = contact::assess_contact(frame, &self.cfg);
        if !report.present {
            debug!(
                "contact lost at {} ms: variance {:.1}, {} bright pixels",
                frame.timestamp_ms, report.variance, report.bright_pixels
            );
            self.status = MonitorStatus::AwaitingContact;
            return Ok(FrameOutput {
                contact: false,
                status: self.status,
                bpm: None,
                stats: None,
                hrv: None,
            });
        }

        self.window.push(Sample {
            value: frame.average_brightness(),
            timestamp_ms: frame.timestamp_ms,
        });
        let (stats, crossings) = beat::detect_beats(self.window.snapshot());
        let outcome = self.tracker.observe(&crossings);

        if outcome.calibrating {
            self.status = MonitorStatus::Calibrating;
        } else if let Some(filled) = outcome.accepted {
            self.status = MonitorStatus::BatchProgress {
                filled,
                target: self.cfg.batch_target,
            };
        }

        let hrv = outcome.completed.and_then(|batch| match analyze_batch(&batch) {
            Ok(metrics) => Some(metrics),
            Err(err) => {
                warn!("dropping batch of {} intervals: {err}", batch.len());
                None
            }
        });

        Ok(FrameOutput {
            contact: true,
            status: self.status,
            bpm: outcome.bpm,
            stats,
            hrv,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f64::consts::TAU;

    fn monitor() -> HeartRateMonitor {
        HeartRateMonitor::new(MonitorConfig::default())
    }

    /// Uniform skin-toned frame whose red/green level pulses sinusoidally
    /// with the given period.
    fn pulse_frame(t_ms: u64, period_ms: f64) -> FrameSample {
        let phase = TAU * (t_ms as f64) / period_ms;
        let level = (80.0 + 15.0 * phase.sin()).round() as u8;
        FrameSample::uniform(30, 30, [level, level, 40], t_ms)
    }

    #[test]
    fn uncovered_sensor_awaits_contact() {
        let mut monitor = monitor();
        let frame = FrameSample::uniform(30, 30, [255, 255, 255], 10);
        let output = monitor.process_frame(&frame).unwrap();
        assert!(!output.contact);
        assert_eq!(output.status, MonitorStatus::AwaitingContact);
        assert_eq!(output.status.to_string(), "awaiting contact");
        assert!(output.bpm.is_none());
        assert!(monitor.window.is_empty());
    }

    #[test]
    fn early_frames_report_calibrating() {
        let mut monitor = monitor();
        let mut output = None;
        for i in 0..5u64 {
            let frame = pulse_frame(i * 17, 800.0);
            output = Some(monitor.process_frame(&frame).unwrap());
        }
        let output = output.unwrap();
        assert!(output.contact);
        assert_eq!(output.status, MonitorStatus::Calibrating);
        assert_eq!(output.status.to_string(), "calibrating");
    }

    #[test]
    fn wrong_geometry_is_rejected_without_side_effects() {
        let mut monitor = monitor();
        let frame = FrameSample::uniform(10, 10, [80, 80, 40], 10);
        let err = monitor.process_frame(&frame).unwrap_err();
        assert!(matches!(err, FrameError::Geometry { .. }));
        assert!(monitor.window.is_empty());
        assert_eq!(monitor.status(), MonitorStatus::Idle);
    }

    #[test]
    fn rewinding_timestamps_are_rejected() {
        let mut monitor = monitor();
        monitor.process_frame(&pulse_frame(100, 800.0)).unwrap();
        let err = monitor.process_frame(&pulse_frame(100, 800.0)).unwrap_err();
        assert_eq!(
            err,
            FrameError::NonMonotonicTimestamp {
                timestamp_ms: 100,
                previous_ms: 100,
            }
        );
        // the rejected frame contributed nothing
        assert_eq!(monitor.window.len(), 1);
    }

    #[test]
    fn reset_returns_to_a_clean_slate() {
        let mut monitor = monitor();
        for i in 1..50u64 {
            monitor.process_frame(&pulse_frame(i * 17, 800.0)).unwrap();
        }
        assert!(!monitor.window.is_empty());
        monitor.reset();
        assert_eq!(monitor.window.len(), 0);
        assert!(monitor.tracker.baseline().is_empty());
        assert_eq!(monitor.status(), MonitorStatus::Idle);
        // timestamps may restart after a reset
        let output = monitor.process_frame(&pulse_frame(5, 800.0)).unwrap();
        assert!(output.contact);
        assert_eq!(monitor.window.len(), 1);
    }

    #[test]
    fn sinusoidal_signal_converges_to_75_bpm() {
        let mut monitor = monitor();
        let mut rng = StdRng::seed_from_u64(7);
        let mut t = 0u64;
        let mut bpm = None;
        for _ in 0..2200 {
            t += rng.gen_range(14..=20);
            let output = monitor.process_frame(&pulse_frame(t, 800.0)).unwrap();
            if output.bpm.is_some() {
                bpm = output.bpm;
            }
        }
        let bpm = bpm.expect("baseline should stabilize within the run");
        assert!(
            (73..=77).contains(&bpm),
            "expected ~75 bpm from an 800 ms cycle, got {bpm}"
        );
    }

    #[test]
    fn batch_progress_status_renders_as_a_counter() {
        let status = MonitorStatus::BatchProgress {
            filled: 12,
            target: 50,
        };
        assert_eq!(status.to_string(), "12/50");
        assert_eq!(MonitorStatus::Idle.to_string(), "");
    }
}
