// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Monotonic time sources for the scheduling engine.
//!
//! Every time value handed out by a [`Clock`] is a nanosecond offset on a
//! monotonic timeline private to that clock. The scheduler only ever compares
//! and subtracts these offsets, so the origin is irrelevant.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Number of nanoseconds in one second.
pub const NANOS_PER_SECOND: f64 = 1.0e9;

/// Remaining time above which [`MonotonicClock::wait_until`] sleeps instead of yielding.
const SLEEP_QUANTUM: Duration = Duration::from_millis(1);

/// A monotonic source of time that can also wait for a deadline.
///
/// Implementations must never go backwards and must never block past a
/// deadline for longer than one sleep quantum.
pub trait Clock: Send + Sync {
    /// Returns the current time in nanoseconds.
    fn now(&self) -> u64;

    /// Waits cooperatively until `deadline` has been reached and returns the
    /// time observed when the wait ended (which may be later than `deadline`).
    fn wait_until(&self, deadline: u64) -> u64;
}

/// The wall-clock implementation backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose timeline starts now.
    #[inline]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Returns the time elapsed since the clock was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> u64 {
        self.elapsed().as_nanos() as u64
    }

    fn wait_until(&self, deadline: u64) -> u64 {
        loop {
            let now = self.now();
            if now >= deadline {
                return now;
            }

            let remaining = Duration::from_nanos(deadline - now);
            if remaining > SLEEP_QUANTUM {
                thread::sleep(SLEEP_QUANTUM);
            } else {
                thread::yield_now();
            }
        }
    }
}

/// A simulated clock that only moves when told to.
///
/// Clones share the same timeline, so a test can keep one copy to inspect or
/// advance time while the scheduler owns another. Waiting on a deadline jumps
/// the timeline forward to that deadline immediately.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a simulated clock positioned at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simulated clock positioned at `start` nanoseconds.
    pub fn starting_at(start: u64) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Moves the timeline forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.nanos
            .fetch_add(delta.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Returns the current simulated time as seconds.
    pub fn now_secs(&self) -> f64 {
        self.now() as f64 / NANOS_PER_SECOND
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.nanos.load(Ordering::SeqCst)
    }

    fn wait_until(&self, deadline: u64) -> u64 {
        // Never rewinds: a deadline in the past leaves the timeline untouched.
        let previous = self.nanos.fetch_max(deadline, Ordering::SeqCst);
        previous.max(deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLEEP_DURATION_MS: u64 = 20;
    const SLEEP_MARGIN_MS: u64 = 200;

    /// A test to check that the monotonic clock starts near zero.
    #[test]
    fn monotonic_clock_starts_near_zero() {
        let clock = MonotonicClock::new();
        assert!(
            clock.now() < Duration::from_millis(15).as_nanos() as u64,
            "Fresh clock should report a very small offset"
        );
    }

    /// A test to check that waiting on a wall-clock deadline never returns early
    /// and does not overshoot by more than a generous scheduling margin.
    #[test]
    fn monotonic_clock_waits_for_deadline() {
        let clock = MonotonicClock::new();
        let deadline = clock.now() + Duration::from_millis(SLEEP_DURATION_MS).as_nanos() as u64;

        let reached = clock.wait_until(deadline);

        assert!(reached >= deadline, "wait_until returned before the deadline");
        let overshoot = Duration::from_nanos(reached - deadline);
        assert!(
            overshoot < Duration::from_millis(SLEEP_MARGIN_MS),
            "Overshoot ({overshoot:?}) should stay within the margin"
        );
    }

    /// A deadline already in the past must return immediately.
    #[test]
    fn monotonic_clock_past_deadline_returns_now() {
        let clock = MonotonicClock::new();
        thread::sleep(Duration::from_millis(2));
        let reached = clock.wait_until(0);
        assert!(reached > 0);
    }

    #[test]
    fn manual_clock_jumps_to_deadline() {
        let clock = ManualClock::new();
        assert_eq!(clock.wait_until(1_500), 1_500);
        assert_eq!(clock.now(), 1_500);
    }

    #[test]
    fn manual_clock_never_rewinds() {
        let clock = ManualClock::starting_at(10_000);
        assert_eq!(clock.wait_until(5_000), 10_000);
        assert_eq!(clock.now(), 10_000);
    }

    /// Clones share a single timeline.
    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let observer = clock.clone();

        clock.advance(Duration::from_millis(250));

        assert_eq!(observer.now(), 250_000_000);
        approx::assert_relative_eq!(observer.now_secs(), 0.25);
    }
}
