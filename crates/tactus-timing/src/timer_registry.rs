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

//! A live collection of [`Timer`]s advanced once per tick.

use std::time::Duration;

use crate::timer::Timer;

/// Identifies a timer owned by a [`TimerRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// The raw counter value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Owns the live timers of a tick thread.
///
/// Completed timers are pruned by the same pass that advanced them, so a
/// timer that fires for the last time is gone once [`TimerRegistry::advance_all`]
/// returns.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    timers: Vec<(TimerId, Timer)>,
    next_id: u64,
}

impl TimerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `timer` and returns its id.
    pub fn add(&mut self, timer: Timer) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        log::trace!("Registered timer {id:?}: {timer:?}");
        self.timers.push((id, timer));
        id
    }

    /// Registers a one-shot timer.
    pub fn schedule<F>(&mut self, action: F, delay: Duration) -> TimerId
    where
        F: FnMut() + Send + 'static,
    {
        self.add(Timer::new(delay, action))
    }

    /// Registers a timer that fires `times` times.
    pub fn schedule_repeating<F>(&mut self, action: F, delay: Duration, times: u32) -> TimerId
    where
        F: FnMut() + Send + 'static,
    {
        self.add(Timer::new(delay, action).repeat_n(times))
    }

    /// Registers a timer that fires every `delay` until cancelled.
    pub fn schedule_forever<F>(&mut self, action: F, delay: Duration) -> TimerId
    where
        F: FnMut() + Send + 'static,
    {
        self.add(Timer::new(delay, action).repeat())
    }

    /// Advances every live timer by `delta_secs` and drops the ones that are
    /// complete afterwards. Returns how many actions ran.
    pub fn advance_all(&mut self, delta_secs: f64) -> usize {
        let mut fired = 0;
        self.timers.retain_mut(|(id, timer)| {
            if timer.advance(delta_secs) {
                fired += 1;
            }
            if timer.is_complete() {
                log::trace!("Dropping completed timer {id:?}");
                return false;
            }
            true
        });
        fired
    }

    /// Force-completes a live timer so the next [`TimerRegistry::advance_all`]
    /// drops it without firing. Returns `false` for unknown ids.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.get_mut(id) {
            Some(timer) => {
                timer.force_complete();
                true
            }
            None => false,
        }
    }

    /// Looks up a live timer.
    pub fn get(&self, id: TimerId) -> Option<&Timer> {
        self.timers
            .iter()
            .find(|(timer_id, _)| *timer_id == id)
            .map(|(_, timer)| timer)
    }

    /// Looks up a live timer mutably.
    pub fn get_mut(&mut self, id: TimerId) -> Option<&mut Timer> {
        self.timers
            .iter_mut()
            .find(|(timer_id, _)| *timer_id == id)
            .map(|(_, timer)| timer)
    }

    /// Whether `id` is still in the live set.
    pub fn contains(&self, id: TimerId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Whether there are no live timers.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
