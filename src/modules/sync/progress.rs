//! Shared progress counters and heartbeat logging for the sync drivers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crate::log_info;

/// Outcome counters shared across worker tasks.
#[derive(Debug)]
pub struct ProgressCounts {
    pub ok: AtomicUsize,
    pub skipped: AtomicUsize,
    pub errors: AtomicUsize,
    total: usize,
    started: Instant,
}

impl ProgressCounts {
    pub fn new(total: usize) -> Self {
        Self {
            ok: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            total,
            started: Instant::now(),
        }
    }

    pub fn done(&self) -> usize {
        self.ok.load(Ordering::Relaxed)
            + self.skipped.load(Ordering::Relaxed)
            + self.errors.load(Ordering::Relaxed)
    }

    /// Logs one heartbeat line with throughput and ETA.
    pub fn log_heartbeat(&self) {
        let done = self.done();
        let elapsed = self.started.elapsed().as_secs_f64().max(1e-6);
        let avg_rps = done as f64 / elapsed;
        let remaining = self.total.saturating_sub(done);
        let eta = if avg_rps > 0.0 {
            fmt_eta(remaining as f64 / avg_rps)
        } else {
            fmt_eta(f64::INFINITY)
        };

        log_info!(
            "Processed {}/{} (ok:{} skip:{} err:{}) avg:{:.2} rps ETA:{}",
            done,
            self.total,
            self.ok.load(Ordering::Relaxed),
            self.skipped.load(Ordering::Relaxed),
            self.errors.load(Ordering::Relaxed),
            avg_rps,
            eta
        );
    }
}

/// Formats seconds as `HH:MM:SS`, or `--:--:--` when unknowable.
pub fn fmt_eta(seconds: f64) -> String {
    if seconds <= 0.0 || !seconds.is_finite() {
        return "--:--:--".to_string();
    }
    let total = seconds as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eta_formats_and_handles_edge_cases() {
        assert_eq!(fmt_eta(0.0), "--:--:--");
        assert_eq!(fmt_eta(-5.0), "--:--:--");
        assert_eq!(fmt_eta(f64::INFINITY), "--:--:--");
        assert_eq!(fmt_eta(61.0), "00:01:01");
        assert_eq!(fmt_eta(3661.0), "01:01:01");
    }

    #[test]
    fn counts_accumulate_across_buckets() {
        let counts = ProgressCounts::new(10);
        counts.ok.fetch_add(3, Ordering::Relaxed);
        counts.skipped.fetch_add(2, Ordering::Relaxed);
        counts.errors.fetch_add(1, Ordering::Relaxed);
        assert_eq!(counts.done(), 6);
    }
}
