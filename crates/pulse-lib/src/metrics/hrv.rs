use crate::error::MetricsError;
use realfft::RealFftPlanner;
use serde::{Deserialize, Serialize};

/// Normalized frequency band for LF power.
pub const LF_BAND: (f64, f64) = (0.04, 0.15);
/// Normalized frequency band for HF power.
pub const HF_BAND: (f64, f64) = (0.15, 0.4);

/// Metrics computed from one completed batch of validated RR intervals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrvMetrics {
    pub rmssd: f64,
    pub mean_rr: f64,
    pub lf_power: f64,
    pub hf_power: f64,
    pub energy: f64,
    pub stress: f64,
    pub tension: f64,
    pub pnn50: f64,
}

/// Time-domain subset, computable on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeDomain {
    pub mean_rr: f64,
    pub rmssd: f64,
    pub pnn50: f64,
}

/// One bin of the RR power spectrum. The frequency axis is the bin index
/// normalized by N/2, an index proxy rather than true Hz: RR intervals are
/// not uniformly time-sampled and are transformed as-is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PsdPoint {
    pub freq: f64,
    pub power: f64,
}

pub fn time_domain(rr_ms: &[f64]) -> Result<TimeDomain, MetricsError> {
    if rr_ms.len() < 2 {
        return Err(MetricsError::InsufficientData {
            need: 2,
            got: rr_ms.len(),
        });
    }
    let n = rr_ms.len() as f64;
    let mean_rr = rr_ms.iter().sum::<f64>() / n;
    let diffs: Vec<f64> = rr_ms.windows(2).map(|w| w[1] - w[0]).collect();
    let rmssd = (diffs.iter().map(|d| d * d).sum::<f64>() / diffs.len() as f64).sqrt();
    let nn50 = diffs.iter().filter(|d| d.abs() > 50.0).count();
    let pnn50 = 100.0 * nn50 as f64 / diffs.len() as f64;
    Ok(TimeDomain {
        mean_rr,
        rmssd,
        pnn50,
    })
}

/// Power bins `(re² + im²) / N` for the first N/2 bins of the forward
/// transform. A single-element input passes through as its own power.
pub fn fft_power(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return values.iter().map(|v| v * v).collect();
    }
    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let mut buffer = values.to_vec();
    let mut spectrum = fft.make_output_vec();
    fft.process(&mut buffer, &mut spectrum).unwrap();
    spectrum
        .iter()
        .take(n / 2)
        .map(|c| c.norm_sqr() / n as f64)
        .collect()
}

/// Zero-pads the RR sequence to the next power of two, removes the mean of
/// the padded array (pad region included) and transforms. Bin `i` lands at
/// normalized frequency `i / (N/2)`.
pub fn power_spectrum(rr_ms: &[f64]) -> Vec<PsdPoint> {
    if rr_ms.is_empty() {
        return Vec::new();
    }
    let n = rr_ms.len().next_power_of_two();
    let mut padded = vec![0.0; n];
    padded[..rr_ms.len()].copy_from_slice(rr_ms);
    let mean = padded.iter().sum::<f64>() / n as f64;
    for value in padded.iter_mut() {
        *value -= mean;
    }
    let half = (n / 2).max(1) as f64;
    fft_power(&padded)
        .into_iter()
        .enumerate()
        .map(|(i, power)| PsdPoint {
            freq: i as f64 / half,
            power,
        })
        .collect()
}

pub fn band_power(points: &[PsdPoint], band: (f64, f64)) -> f64 {
    points
        .iter()
        .filter(|p| p.freq >= band.0 && p.freq < band.1)
        .map(|p| p.power)
        .sum()
}

/// Full analysis of a completed batch. Division guards surface as
/// [`MetricsError`] instead of NaN or infinity.
pub fn analyze_batch(rr_ms: &[u32]) -> Result<HrvMetrics, MetricsError> {
    let rr: Vec<f64> = rr_ms.iter().map(|&v| v as f64).collect();
    let time = time_domain(&rr)?;
    let spectrum = power_spectrum(&rr);
    let lf_power = band_power(&spectrum, LF_BAND);
    let hf_power = band_power(&spectrum, HF_BAND);
    if time.rmssd == 0.0 {
        return Err(MetricsError::ZeroRmssd);
    }
    if hf_power == 0.0 {
        return Err(MetricsError::ZeroHfPower);
    }
    let energy = 1000.0 / time.rmssd;
    let stress = lf_power / hf_power;
    let tension = (1000.0 / time.rmssd) * (1000.0 / time.mean_rr);
    Ok(HrvMetrics {
        rmssd: time.rmssd,
        mean_rr: time.mean_rr,
        lf_power,
        hf_power,
        energy,
        stress,
        tension,
        pnn50: time.pnn50,
    })
}
