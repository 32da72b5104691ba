use serde::{Deserialize, Serialize};

/// One brightness reading derived from a gated frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Average red+green brightness, scaled to 0..=1.
    pub value: f64,
    /// Wall-clock timestamp of the source frame in milliseconds.
    pub timestamp_ms: u64,
}

/// Fixed-capacity, time-ordered buffer of samples. Oldest evicted first.
/// The window is the sole owner of its samples; analysis stages only see
/// read-only snapshots.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: Vec<Sample>,
    capacity: usize,
}

impl SampleWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting the oldest when the capacity is exceeded.
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
        if self.samples.len() > self.capacity {
            self.samples.remove(0);
        }
    }

    /// Clears the window; used when monitoring (re)starts.
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn snapshot(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Per-frame statistics of the sample window. The range doubles as a rough
/// quality hint: a steady measurement sits around 0.002..0.02.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

impl WindowStats {
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let first = samples.first()?;
        let mut min = first.value;
        let mut max = first.value;
        let mut sum = 0.0;
        for sample in samples {
            sum += sample.value;
            if sample.value < min {
                min = sample.value;
            }
            if sample.value > max {
                max = sample.value;
            }
        }
        let average = sum / samples.len() as f64;
        Some(Self {
            average,
            min,
            max,
            range: max - min,
        })
    }
}
