//! Audio clock state shared between the audio thread and the host.
//!
//! The audio thread is the only writer. The host reads it to learn whether a requested
//! suspend or resume has actually taken effect.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct ClockState {
    running: AtomicBool,
    frames: AtomicU64,
    sample_rate: u32,
}

impl ClockState {
    /// A suspended clock at frame zero.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            running: AtomicBool::new(false),
            frames: AtomicU64::new(0),
            sample_rate,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    /// Frames rendered while running.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    pub(crate) fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::Relaxed);
    }

    /// Elapsed clock time in seconds. Does not advance while suspended.
    pub fn seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Blocks until the clock reports `running` or `timeout` expires.
    ///
    /// Returns whether the clock reached the requested state.
    pub fn wait_for(&self, running: bool, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_running() == running {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }
}
