use crate::config::MonitorConfig;
use crate::signal::Sample;
use log::debug;

/// Rolling window of the most recent distinct RR intervals. The average is
/// published only once the window is full; until then downstream stages
/// treat the baseline as not yet established.
#[derive(Debug, Clone)]
pub struct Baseline {
    intervals: Vec<u32>,
    capacity: usize,
}

impl Baseline {
    pub fn new(capacity: usize) -> Self {
        Self {
            intervals: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Evicts the oldest entry if the window is full, appends, and leaves
    /// the average to be recomputed over the actual contents.
    pub fn push(&mut self, rr_ms: u32) {
        if self.intervals.len() >= self.capacity && !self.intervals.is_empty() {
            self.intervals.remove(0);
        }
        if self.capacity > 0 {
            self.intervals.push(rr_ms);
        }
    }

    /// Average RR in milliseconds, once the window holds `capacity` entries.
    pub fn average(&self) -> Option<f64> {
        if self.capacity == 0 || self.intervals.len() < self.capacity {
            return None;
        }
        let sum: u64 = self.intervals.iter().map(|&rr| rr as u64).sum();
        Some(sum as f64 / self.intervals.len() as f64)
    }

    pub fn reset(&mut self) {
        self.intervals.clear();
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn intervals(&self) -> &[u32] {
        &self.intervals
    }
}

/// What one tracker step produced.
#[derive(Debug, Clone, Default)]
pub struct TrackerOutcome {
    /// Instantaneous BPM from the established baseline, rounded for display.
    pub bpm: Option<u32>,
    /// Fewer than 3 beat events were available this frame.
    pub calibrating: bool,
    /// Batch length after an interval was accepted this frame.
    pub accepted: Option<usize>,
    /// A full validated batch, handed over exactly once and then cleared.
    pub completed: Option<Vec<u32>>,
}

/// Turns consecutive beat timestamps into validated RR intervals.
///
/// Each step looks at the last two beat events, deduplicates against the
/// previously processed interval (the event list barely changes between
/// frames), applies the plausibility bound, feeds the rolling baseline and
/// runs the outlier + pacing filter that admits intervals into the
/// validated batch.
#[derive(Debug)]
pub struct RrTracker {
    rr_min_ms: u32,
    rr_max_ms: u32,
    outlier_tolerance_ms: f64,
    batch_target: usize,
    baseline: Baseline,
    batch: Vec<u32>,
    last_rr: Option<u32>,
    last_accepted_ms: Option<u64>,
}

impl RrTracker {
    pub fn new(cfg: &MonitorConfig) -> Self {
        Self {
            rr_min_ms: cfg.rr_min_ms,
            rr_max_ms: cfg.rr_max_ms,
            outlier_tolerance_ms: cfg.outlier_tolerance_ms,
            batch_target: cfg.batch_target,
            baseline: Baseline::new(cfg.baseline_window),
            batch: Vec::with_capacity(cfg.batch_target),
            last_rr: None,
            last_accepted_ms: None,
        }
    }

    /// Clears the baseline, the batch and the dedup/pacing memory.
    pub fn reset(&mut self) {
        self.baseline.reset();
        self.batch.clear();
        self.last_rr = None;
        self.last_accepted_ms = None;
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    /// `round(60000 / avg)` once the baseline is established.
    pub fn bpm(&self) -> Option<u32> {
        self.baseline
            .average()
            .filter(|avg| *avg > 0.0)
            .map(|avg| (60_000.0 / avg).round() as u32)
    }

    pub fn observe(&mut self, events: &[Sample]) -> TrackerOutcome {
        if events.len() < 3 {
            return TrackerOutcome {
                calibrating: true,
                ..TrackerOutcome::default()
            };
        }

        let latest = events[events.len() - 1];
        let previous = events[events.len() - 2];
        let rr_wide = latest.timestamp_ms.saturating_sub(previous.timestamp_ms);
        if rr_wide < self.rr_min_ms as u64 || rr_wide > self.rr_max_ms as u64 {
            // Implausible interval: discarded silently, no BPM this frame.
            return TrackerOutcome::default();
        }
        let rr = rr_wide as u32;

        let mut accepted = None;
        let mut completed = None;
        if self.last_rr != Some(rr) {
            self.last_rr = Some(rr);
            self.baseline.push(rr);
            if let Some(avg) = self.baseline.average() {
                let paced = match self.last_accepted_ms {
                    Some(at) => (latest.timestamp_ms.saturating_sub(at)) as f64 > avg / 2.0,
                    None => true,
                };
                if (rr as f64 - avg).abs() < self.outlier_tolerance_ms && paced {
                    self.batch.push(rr);
                    self.last_accepted_ms = Some(latest.timestamp_ms);
                    accepted = Some(self.batch.len());
                    debug!(
                        "accepted rr={}ms into batch ({}/{})",
                        rr,
                        self.batch.len(),
                        self.batch_target
                    );
                    if self.batch.len() >= self.batch_target {
                        completed = Some(std::mem::take(&mut self.batch));
                    }
                }
            }
        }

        TrackerOutcome {
            bpm: self.bpm(),
            calibrating: false,
            accepted,
            completed,
        }
    }
}
