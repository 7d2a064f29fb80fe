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

//! The self-correcting dual-rate loop scheduler.
//!
//! A [`GameLoop`] drives a tick callback and a render callback from a single
//! thread. Each cycle waits for the earlier of the two deadlines, runs
//! whichever callbacks are due, and every rate-check window compares the
//! achieved rates with the desired ones. The difference, scaled by the
//! interval correction, is added to the corresponding interval, so an
//! undershooting loop shortens its intervals and an overshooting loop
//! lengthens them.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tactus_core::{AtomicF64, Clock, MonotonicClock, NANOS_PER_SECOND};

use crate::config::{self, LoopConfig};
use crate::error::LoopError;

/// Ceiling applied to corrected intervals: one minute.
pub const MAX_INTERVAL_NANOS: u64 = 60_000_000_000;

type TickFn = Box<dyn FnMut(f64) -> anyhow::Result<()> + Send>;
type RenderFn = Box<dyn FnMut() -> anyhow::Result<()> + Send>;
type InitFn = Box<dyn FnMut() -> anyhow::Result<()> + Send>;
type RateUpdateFn = Box<dyn FnMut(f64) + Send>;

/// Rates and intervals of a [`GameLoop`].
///
/// Intervals start out as `1e9 / rate` nanoseconds and drift from there as
/// the loop corrects itself. They never fall below the configured floor and
/// never exceed [`MAX_INTERVAL_NANOS`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoopClock {
    desired_tick_rate: u32,
    desired_render_rate: u32,
    tick_interval_nanos: u64,
    render_interval_nanos: u64,
    rate_check_interval_nanos: u64,
    interval_correction_nanos: i64,
    min_interval_nanos: u64,
}

impl LoopClock {
    fn from_config(config: &LoopConfig) -> Self {
        Self {
            desired_tick_rate: config.tick_rate,
            desired_render_rate: config.render_rate,
            tick_interval_nanos: interval_for(config.tick_rate),
            render_interval_nanos: interval_for(config.render_rate),
            rate_check_interval_nanos: interval_for(config.rate_checks_per_second),
            interval_correction_nanos: config.interval_correction_nanos,
            min_interval_nanos: config.min_interval_nanos.max(1) as u64,
        }
    }

    /// Desired ticks per second.
    pub fn desired_tick_rate(&self) -> u32 {
        self.desired_tick_rate
    }

    /// Desired renders per second.
    pub fn desired_render_rate(&self) -> u32 {
        self.desired_render_rate
    }

    /// Current tick interval.
    pub fn tick_interval_nanos(&self) -> u64 {
        self.tick_interval_nanos
    }

    /// Current render interval.
    pub fn render_interval_nanos(&self) -> u64 {
        self.render_interval_nanos
    }

    /// Length of a rate-check window.
    pub fn rate_check_interval_nanos(&self) -> u64 {
        self.rate_check_interval_nanos
    }

    /// Nanoseconds applied per unit of rate difference.
    pub fn interval_correction_nanos(&self) -> i64 {
        self.interval_correction_nanos
    }

    /// Floor for corrected intervals.
    pub fn min_interval_nanos(&self) -> u64 {
        self.min_interval_nanos
    }

    fn corrected(&self, kind: &str, interval: u64, observed: f64, desired: u32) -> u64 {
        let adjustment = (observed - f64::from(desired)) * self.interval_correction_nanos as f64;
        let corrected = (interval as f64 + adjustment).round();
        if corrected.is_nan() {
            log::warn!("Corrected {kind} interval is not a number, keeping {interval} ns");
            return interval;
        }
        if corrected > MAX_INTERVAL_NANOS as f64 {
            log::warn!(
                "Corrected {kind} interval {corrected} ns is above the ceiling, clamping to {MAX_INTERVAL_NANOS} ns"
            );
            return MAX_INTERVAL_NANOS;
        }
        if corrected < self.min_interval_nanos as f64 {
            log::warn!(
                "Corrected {kind} interval {corrected} ns is below the floor, clamping to {} ns",
                self.min_interval_nanos
            );
            return self.min_interval_nanos;
        }
        corrected as u64
    }
}

fn interval_for(rate: u32) -> u64 {
    (NANOS_PER_SECOND / f64::from(rate)) as u64
}

/// Telemetry published by a running [`GameLoop`] to its subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    /// The loop finished its init callback and entered its first cycle.
    Started,
    /// A rate check completed and the intervals were corrected.
    RatesUpdated {
        /// Observed ticks per second over the last window.
        tick_rate: f64,
        /// Observed renders per second over the last window.
        render_rate: f64,
        /// Tick interval after correction.
        tick_interval_nanos: u64,
        /// Render interval after correction.
        render_interval_nanos: u64,
    },
    /// The loop left its last cycle, normally or because a callback failed.
    Stopped {
        /// Ticks run since start.
        ticks: u64,
        /// Renders run since start.
        renders: u64,
    },
}

#[derive(Debug)]
struct LoopShared {
    running: AtomicBool,
    active: AtomicBool,
    tick_rate: AtomicF64,
    render_rate: AtomicF64,
    last_delta: AtomicF64,
}

impl LoopShared {
    fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            active: AtomicBool::new(false),
            tick_rate: AtomicF64::new(f64::NAN),
            render_rate: AtomicF64::new(f64::NAN),
            last_delta: AtomicF64::new(0.0),
        }
    }
}

/// Clears the lifecycle flags when a run ends, including by unwinding.
struct ActiveGuard {
    shared: Arc<LoopShared>,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.active.store(false, Ordering::SeqCst);
    }
}

/// A cloneable remote control for a [`GameLoop`], usable from any thread.
#[derive(Debug, Clone)]
pub struct LoopHandle {
    shared: Arc<LoopShared>,
}

impl LoopHandle {
    /// Asks the loop to stop. The cycle in flight completes first.
    pub fn stop(&self) {
        if self.shared.running.swap(false, Ordering::SeqCst) {
            log::info!("Game loop stop requested.");
        }
    }

    /// Whether the loop is running and has not been asked to stop.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Ticks per second observed at the last rate check, or `None` before the
    /// first check of the current run.
    pub fn current_tick_rate(&self) -> Option<f64> {
        observed(&self.shared.tick_rate)
    }

    /// Renders per second observed at the last rate check, or `None` before
    /// the first check of the current run.
    pub fn current_render_rate(&self) -> Option<f64> {
        observed(&self.shared.render_rate)
    }

    /// Seconds handed to the most recent tick callback.
    pub fn last_delta(&self) -> f64 {
        self.shared.last_delta.load(Ordering::Acquire)
    }
}

fn observed(cell: &AtomicF64) -> Option<f64> {
    let value = cell.load(Ordering::Acquire);
    (!value.is_nan()).then_some(value)
}

/// A [`GameLoop`] running on its own thread.
#[derive(Debug)]
pub struct LoopThread {
    handle: LoopHandle,
    join: JoinHandle<Result<(), LoopError>>,
}

impl LoopThread {
    /// The handle of the running loop.
    pub fn handle(&self) -> &LoopHandle {
        &self.handle
    }

    /// Shorthand for `self.handle().stop()`.
    pub fn stop(&self) {
        self.handle.stop();
    }

    /// Whether the thread has exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the loop thread and returns how the run ended.
    pub fn join(self) -> Result<(), LoopError> {
        match self.join.join() {
            Ok(result) => result,
            Err(payload) => Err(LoopError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct RunTotals {
    ticks: u64,
    renders: u64,
}

/// A dual-rate loop driving a tick and a render callback.
///
/// Configuration happens through `&mut self`, so rates and intervals can
/// only change while the loop is not running. Callback errors end the run
/// and are returned from [`GameLoop::run`] or [`LoopThread::join`]; nothing
/// is retried.
pub struct GameLoop<C: Clock = MonotonicClock> {
    clock: C,
    timing: LoopClock,
    tick: TickFn,
    render: RenderFn,
    init: Option<InitFn>,
    rate_update: Option<RateUpdateFn>,
    subscribers: Vec<flume::Sender<LoopEvent>>,
    shared: Arc<LoopShared>,
}

impl GameLoop<MonotonicClock> {
    /// Creates a wall-clock loop with the default configuration.
    pub fn new<T, R>(tick: T, render: R) -> Self
    where
        T: FnMut(f64) -> anyhow::Result<()> + Send + 'static,
        R: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        Self::with_clock(MonotonicClock::new(), tick, render)
    }

    /// Creates a wall-clock loop from a validated configuration.
    pub fn from_config<T, R>(config: &LoopConfig, tick: T, render: R) -> Result<Self, LoopError>
    where
        T: FnMut(f64) -> anyhow::Result<()> + Send + 'static,
        R: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let mut game_loop = Self::new(tick, render);
        game_loop.apply_config(config)?;
        Ok(game_loop)
    }
}

impl<C: Clock> GameLoop<C> {
    /// Creates a loop with the default configuration on an arbitrary clock.
    pub fn with_clock<T, R>(clock: C, tick: T, render: R) -> Self
    where
        T: FnMut(f64) -> anyhow::Result<()> + Send + 'static,
        R: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            clock,
            timing: LoopClock::from_config(&LoopConfig::default()),
            tick: Box::new(tick),
            render: Box::new(render),
            init: None,
            rate_update: None,
            subscribers: Vec::new(),
            shared: Arc::new(LoopShared::new()),
        }
    }

    /// Sets a callback run once at the start of every run, before the first
    /// cycle.
    pub fn with_init<I>(mut self, init: I) -> Self
    where
        I: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }

    /// Sets a callback receiving the observed render rate after every rate
    /// check.
    pub fn on_rate_update<F>(&mut self, callback: F)
    where
        F: FnMut(f64) + Send + 'static,
    {
        self.rate_update = Some(Box::new(callback));
    }

    /// Opens a telemetry channel for this loop.
    pub fn subscribe(&mut self) -> flume::Receiver<LoopEvent> {
        let (sender, receiver) = flume::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    /// Sets the desired ticks per second and resets the tick interval.
    pub fn set_tick_rate(&mut self, rate: u32) -> Result<(), LoopError> {
        config::validate_rate("tick_rate", rate)?;
        self.timing.desired_tick_rate = rate;
        self.timing.tick_interval_nanos = interval_for(rate);
        Ok(())
    }

    /// Sets the desired renders per second and resets the render interval.
    pub fn set_render_rate(&mut self, rate: u32) -> Result<(), LoopError> {
        config::validate_rate("render_rate", rate)?;
        self.timing.desired_render_rate = rate;
        self.timing.render_interval_nanos = interval_for(rate);
        Ok(())
    }

    /// Sets how many rate checks happen per second.
    pub fn set_rate_check_frequency(&mut self, checks_per_second: u32) -> Result<(), LoopError> {
        config::validate_rate("rate_checks_per_second", checks_per_second)?;
        self.timing.rate_check_interval_nanos = interval_for(checks_per_second);
        Ok(())
    }

    /// Sets the nanoseconds applied per unit of rate difference. Zero turns
    /// correction off.
    pub fn set_interval_correction(&mut self, nanos: i64) -> Result<(), LoopError> {
        config::validate_correction(nanos)?;
        self.timing.interval_correction_nanos = nanos;
        Ok(())
    }

    /// Sets the floor for corrected intervals.
    pub fn set_min_interval(&mut self, nanos: i64) -> Result<(), LoopError> {
        config::validate_min_interval(nanos)?;
        self.timing.min_interval_nanos = nanos as u64;
        Ok(())
    }

    /// Validates `config` and, if it is valid, replaces the whole timing state.
    pub fn apply_config(&mut self, config: &LoopConfig) -> Result<(), LoopError> {
        config.validate()?;
        self.timing = LoopClock::from_config(config);
        Ok(())
    }

    /// Current rates and intervals.
    pub fn timing(&self) -> &LoopClock {
        &self.timing
    }

    /// The clock driving this loop.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// A remote control for this loop.
    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// See [`LoopHandle::current_tick_rate`].
    pub fn current_tick_rate(&self) -> Option<f64> {
        observed(&self.shared.tick_rate)
    }

    /// See [`LoopHandle::current_render_rate`].
    pub fn current_render_rate(&self) -> Option<f64> {
        observed(&self.shared.render_rate)
    }

    /// See [`LoopHandle::last_delta`].
    pub fn last_delta(&self) -> f64 {
        self.shared.last_delta.load(Ordering::Acquire)
    }

    /// Runs the loop on the calling thread until it is stopped or a callback
    /// fails.
    pub fn run(&mut self) -> Result<(), LoopError> {
        let guard = self.activate()?;
        self.run_active(guard)
    }

    /// Moves the loop onto a new thread called `name` and starts it.
    ///
    /// The loop is already marked running when this returns, so a
    /// [`LoopHandle::stop`] issued right away is never lost.
    pub fn spawn(mut self, name: &str) -> Result<LoopThread, LoopError>
    where
        C: 'static,
    {
        let guard = self.activate()?;
        let handle = self.handle();
        let join = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || self.run_active(guard))
            .map_err(LoopError::Spawn)?;
        Ok(LoopThread { handle, join })
    }

    fn activate(&self) -> Result<ActiveGuard, LoopError> {
        self.shared
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| LoopError::AlreadyRunning)?;
        self.shared.running.store(true, Ordering::SeqCst);
        self.shared.tick_rate.store(f64::NAN, Ordering::Release);
        self.shared.render_rate.store(f64::NAN, Ordering::Release);
        self.shared.last_delta.store(0.0, Ordering::Release);
        Ok(ActiveGuard {
            shared: Arc::clone(&self.shared),
        })
    }

    fn run_active(&mut self, _guard: ActiveGuard) -> Result<(), LoopError> {
        if let Some(init) = self.init.as_mut() {
            init().map_err(LoopError::InitFailed)?;
        }

        log::info!(
            "Game loop started: {} ticks/s, {} renders/s.",
            self.timing.desired_tick_rate,
            self.timing.desired_render_rate
        );
        self.publish(LoopEvent::Started);

        let mut totals = RunTotals::default();
        let result = self.cycle(&mut totals);

        self.shared.running.store(false, Ordering::SeqCst);
        match &result {
            Ok(()) => log::info!(
                "Game loop stopped after {} ticks and {} renders.",
                totals.ticks,
                totals.renders
            ),
            Err(e) => log::error!("Game loop aborted: {e}"),
        }
        self.publish(LoopEvent::Stopped {
            ticks: totals.ticks,
            renders: totals.renders,
        });
        result
    }

    fn cycle(&mut self, totals: &mut RunTotals) -> Result<(), LoopError> {
        let start = self.clock.now();
        let mut last = start;
        let mut next_tick = start;
        let mut next_render = start;
        let mut tick_delta_nanos: u64 = 0;
        let mut window_nanos: u64 = 0;
        let mut window_ticks: u32 = 0;
        let mut window_renders: u32 = 0;

        while self.shared.running.load(Ordering::Acquire) {
            let now = self.clock.wait_until(next_tick.min(next_render));
            let elapsed = now.saturating_sub(last);
            last = now;
            tick_delta_nanos += elapsed;
            window_nanos += elapsed;

            if now >= next_tick {
                let delta = tick_delta_nanos as f64 / NANOS_PER_SECOND;
                tick_delta_nanos = 0;
                self.shared.last_delta.store(delta, Ordering::Release);
                log::trace!("Tick {} (delta {delta:.6}s)", totals.ticks);
                (self.tick)(delta).map_err(LoopError::TickFailed)?;
                next_tick = next_tick.saturating_add(self.timing.tick_interval_nanos);
                window_ticks += 1;
                totals.ticks += 1;
            }

            if now >= next_render {
                log::trace!("Render {}", totals.renders);
                (self.render)().map_err(LoopError::RenderFailed)?;
                next_render = next_render.saturating_add(self.timing.render_interval_nanos);
                window_renders += 1;
                totals.renders += 1;
            }

            if window_nanos >= self.timing.rate_check_interval_nanos {
                self.check_rates(window_ticks, window_renders, window_nanos);
                window_nanos = 0;
                window_ticks = 0;
                window_renders = 0;
            }
        }
        Ok(())
    }

    fn check_rates(&mut self, ticks: u32, renders: u32, window_nanos: u64) {
        let window_secs = window_nanos as f64 / NANOS_PER_SECOND;
        let tick_rate = f64::from(ticks) / window_secs;
        let render_rate = f64::from(renders) / window_secs;

        let timing = &self.timing;
        let tick_interval = timing.corrected(
            "tick",
            timing.tick_interval_nanos,
            tick_rate,
            timing.desired_tick_rate,
        );
        let render_interval = timing.corrected(
            "render",
            timing.render_interval_nanos,
            render_rate,
            timing.desired_render_rate,
        );
        self.timing.tick_interval_nanos = tick_interval;
        self.timing.render_interval_nanos = render_interval;

        self.shared.tick_rate.store(tick_rate, Ordering::Release);
        self.shared.render_rate.store(render_rate, Ordering::Release);
        log::debug!(
            "Rate check: {tick_rate:.2} ticks/s, {render_rate:.2} renders/s; \
             intervals now {tick_interval} ns / {render_interval} ns"
        );

        if let Some(callback) = self.rate_update.as_mut() {
            callback(render_rate);
        }
        self.publish(LoopEvent::RatesUpdated {
            tick_rate,
            render_rate,
            tick_interval_nanos: tick_interval,
            render_interval_nanos: render_interval,
        });
    }

    fn publish(&mut self, event: LoopEvent) {
        self.subscribers.retain(|sender| {
            if sender.send(event.clone()).is_ok() {
                return true;
            }
            log::debug!("Dropping disconnected loop event subscriber.");
            false
        });
    }
}

impl<C: Clock + std::fmt::Debug> std::fmt::Debug for GameLoop<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLoop")
            .field("clock", &self.clock)
            .field("timing", &self.timing)
            .field("running", &self.shared.running.load(Ordering::Relaxed))
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}
