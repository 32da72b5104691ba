use pulse_lib::frame::FrameSample;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Parameters for a synthetic PPG recording: uniform skin-toned frames
/// whose red and green levels follow a sinusoidal blood-volume pulse.
/// Deterministic for a given seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSpec {
    /// Simulated heart rate.
    pub bpm: f64,
    pub duration_s: f64,
    /// Nominal frame rate; actual frame intervals jitter around it.
    pub fps: f64,
    pub seed: u64,
    /// Resting red/green pixel level. Must stay below the bright-pixel
    /// cutoff or the contact gate rejects the frames.
    pub base_level: f64,
    /// Peak deviation of the pulse waveform in pixel levels.
    pub amplitude: f64,
    /// Maximum random deviation of each frame interval in ms.
    pub jitter_ms: i64,
    /// Uniform per-frame level noise.
    pub noise: f64,
}

impl Default for SimSpec {
    fn default() -> Self {
        Self {
            bpm: 75.0,
            duration_s: 60.0,
            fps: 60.0,
            seed: 0,
            base_level: 80.0,
            amplitude: 15.0,
            jitter_ms: 3,
            noise: 0.5,
        }
    }
}

/// Generates the frame stream for a spec. Timestamps are strictly
/// increasing; every frame is uniform, so the contact gate sees zero
/// variance and no bright pixels.
pub fn generate_frames(spec: &SimSpec, width: usize, height: usize) -> Vec<FrameSample> {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let period_ms = 60_000.0 / spec.bpm;
    let nominal_interval = 1000.0 / spec.fps;
    let total_ms = (spec.duration_s * 1000.0) as u64;

    let mut frames = Vec::new();
    let mut t_ms = 0u64;
    while t_ms <= total_ms {
        let phase = TAU * t_ms as f64 / period_ms;
        let noise = if spec.noise > 0.0 {
            rng.gen_range(-spec.noise..=spec.noise)
        } else {
            0.0
        };
        let level = (spec.base_level + spec.amplitude * phase.sin() + noise)
            .round()
            .clamp(0.0, 255.0) as u8;
        frames.push(FrameSample::uniform(
            width,
            height,
            [level, level, 40],
            t_ms,
        ));

        let jitter = if spec.jitter_ms > 0 {
            rng.gen_range(-spec.jitter_ms..=spec.jitter_ms)
        } else {
            0
        };
        let step = (nominal_interval.round() as i64 + jitter).max(1) as u64;
        t_ms += step;
    }
    frames
}
