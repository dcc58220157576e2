use std::collections::VecDeque;
use std::time::Duration;

/// Sliding window over the most recent samples of a per-tick cost, such as
/// the broadphase pass.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    window: VecDeque<Duration>,
    capacity: usize,
    total_samples: u64,
}

impl FrameTimer {
    /// Keeps the last `capacity` samples; a capacity of zero keeps one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            total_samples: 0,
        }
    }

    pub fn record(&mut self, sample: Duration) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(sample);
        self.total_samples += 1;
    }

    /// Samples currently in the window.
    pub fn count(&self) -> usize {
        self.window.len()
    }

    /// Samples ever recorded, including those that left the window.
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    pub fn average(&self) -> Duration {
        match u32::try_from(self.window.len()) {
            Ok(n) if n > 0 => self.window.iter().sum::<Duration>() / n,
            _ => Duration::ZERO,
        }
    }

    pub fn max(&self) -> Duration {
        self.window.iter().copied().max().unwrap_or_default()
    }

    pub fn min(&self) -> Duration {
        self.window.iter().copied().min().unwrap_or_default()
    }

    /// Nearest-rank percentile of the window; `p` is clamped to `0..=100`.
    pub fn percentile(&self, p: f64) -> Duration {
        if self.window.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted: Vec<Duration> = self.window.iter().copied().collect();
        sorted.sort_unstable();
        let rank = (p.clamp(0.0, 100.0) / 100.0 * sorted.len() as f64).ceil() as usize;
        sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
    }
}
