//! Per-track transfer status: percent complete and a smoothed rate.
//!
//! The rate is computed over a fixed window of the most recent chunk reads,
//! so a single slow or fast read does not swing the displayed value.

use std::collections::VecDeque;
use std::time::Duration;

/// Number of chunk samples kept in the window.
pub const WINDOW_CAPACITY: usize = 32;

/// Snapshot of one track's transfer, surfaced to the console.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferStatus {
    /// Bytes written so far.
    pub bytes_done: u64,
    /// `floor(bytes_done * 100 / declared)`; `None` when the size is unknown.
    pub percent: Option<u64>,
    /// Smoothed rate in KiB/s; `None` until the window is full.
    pub rate_kbps: Option<f64>,
}

/// Sliding window of `(duration, bytes)` per chunk read.
#[derive(Debug, Clone, Default)]
pub struct ThroughputWindow {
    samples: VecDeque<(Duration, u64)>,
}

impl ThroughputWindow {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(WINDOW_CAPACITY),
        }
    }

    /// Record one chunk read; the oldest sample is dropped once the window is full.
    pub fn record_sample(&mut self, elapsed: Duration, chunk_bytes: usize) {
        if self.samples.len() >= WINDOW_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back((elapsed, chunk_bytes as u64));
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == WINDOW_CAPACITY
    }

    /// Bytes per second over the window. `None` until full, or if all reads took no measurable time.
    pub fn bytes_per_sec(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        let (time, bytes) = self
            .samples
            .iter()
            .fold((Duration::ZERO, 0u64), |(t, b), (d, n)| (t + *d, b + n));
        let secs = time.as_secs_f64();
        if secs <= 0.0 {
            return None;
        }
        Some(bytes as f64 / secs)
    }

    /// Status for `bytes_done` of a resource whose declared length is `declared` (0 or `None` = unknown).
    pub fn current_status(&self, bytes_done: u64, declared: Option<u64>) -> TransferStatus {
        let percent = match declared {
            Some(total) if total > 0 => Some(bytes_done.saturating_mul(100) / total),
            _ => None,
        };
        TransferStatus {
            bytes_done,
            percent,
            rate_kbps: self.bytes_per_sec().map(|r| r / 1024.0),
        }
    }
}
