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

//! Tick-driven deferred and repeating actions.

use std::fmt;
use std::time::Duration;

/// How many times a [`Timer`] fires before it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetitions {
    /// Fire exactly this many times.
    Times(u32),
    /// Fire on every elapsed delay, never complete.
    Forever,
}

impl Default for Repetitions {
    fn default() -> Self {
        Repetitions::Times(1)
    }
}

/// An action gated on accumulated tick time.
///
/// A timer only observes time through [`Timer::advance`], so it follows the
/// simulation clock and pauses whenever ticks do. Each firing resets the
/// accumulator to zero; time beyond the delay is discarded, so a repeating
/// timer that falls behind never fires twice in one advance.
pub struct Timer {
    action: Box<dyn FnMut() + Send>,
    delay: f64,
    accumulated: f64,
    completed: bool,
    execution_count: u32,
    repetitions: Repetitions,
}

impl Timer {
    /// Creates a one-shot timer that runs `action` once `delay` of tick time
    /// has accumulated.
    pub fn new<F>(delay: Duration, action: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self {
            action: Box::new(action),
            delay: delay.as_secs_f64(),
            accumulated: 0.0,
            completed: false,
            execution_count: 0,
            repetitions: Repetitions::default(),
        }
    }

    /// Makes the timer fire on every elapsed delay without ever completing.
    pub fn repeat(mut self) -> Self {
        self.repetitions = Repetitions::Forever;
        self.completed = false;
        self
    }

    /// Makes the timer fire exactly `times` times. Zero yields a timer that
    /// is already complete.
    pub fn repeat_n(mut self, times: u32) -> Self {
        self.repetitions = Repetitions::Times(times);
        self.completed = times == 0;
        self
    }

    /// Adds `delta_secs` of tick time and fires the action if the delay has
    /// been reached. Returns `true` if the action ran.
    ///
    /// No-op once the timer is complete.
    pub fn advance(&mut self, delta_secs: f64) -> bool {
        if self.completed {
            return false;
        }

        self.accumulated += delta_secs;
        if self.accumulated < self.delay {
            return false;
        }

        (self.action)();
        self.accumulated = 0.0;
        self.execution_count = self.execution_count.saturating_add(1);
        if let Repetitions::Times(target) = self.repetitions {
            self.completed = self.execution_count >= target;
        }
        true
    }

    /// Whether the timer has performed all of its executions.
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Marks the timer complete; further advances do nothing.
    pub fn force_complete(&mut self) {
        self.completed = true;
    }

    /// Re-arms the timer as if freshly constructed with the same delay and
    /// repetitions.
    pub fn force_reset(&mut self) {
        self.accumulated = 0.0;
        self.execution_count = 0;
        self.completed = self.repetitions == Repetitions::Times(0);
    }

    /// How many times the action has run since construction or the last reset.
    pub fn execution_count(&self) -> u32 {
        self.execution_count
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay)
    }

    /// Tick time accumulated towards the next firing, in seconds.
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// The configured repetitions.
    pub fn repetitions(&self) -> Repetitions {
        self.repetitions
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("delay", &self.delay)
            .field("accumulated", &self.accumulated)
            .field("completed", &self.completed)
            .field("execution_count", &self.execution_count)
            .field("repetitions", &self.repetitions)
            .finish_non_exhaustive()
    }
}
