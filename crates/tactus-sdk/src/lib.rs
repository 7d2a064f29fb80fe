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

//! The public-facing shell of the Tactus engine.
//!
//! An [`Engine`] owns the keyboard state, the key bindings, the live timers
//! and the user's [`Application`], and drives them from a [`GameLoop`]. Every
//! tick runs the same fixed sequence: merge staged input, evaluate key
//! bindings, advance timers, then [`Application::tick`]. Renders are scheduled
//! independently and call [`Application::render`].

#![warn(missing_docs)]

pub mod config;

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use tactus_core::{Clock, MonotonicClock};
use tactus_input::{KeyActions, KeyInput, KeyInputHandle};
use tactus_timing::{GameLoop, LoopError, LoopEvent, LoopHandle, LoopThread, TimerRegistry};

pub use config::EngineConfig;

/// Everything an application usually needs, in one import.
pub mod prelude {
    pub use crate::{Application, Engine, EngineConfig, EngineContext};
    pub use tactus_core::{Clock, ManualClock, MonotonicClock};
    pub use tactus_input::{keycodes, KeyAction, KeyCode, KeyInputHandle, KeyMods, KeyStatus};
    pub use tactus_timing::{LoopConfig, LoopError, LoopEvent, LoopHandle, Timer, TimerId};
}

/// The engine services an [`Application`] may use during a callback.
pub struct EngineContext<'a> {
    /// Keyboard state merged at the start of the current tick.
    pub input: &'a KeyInput,
    /// Key bindings evaluated every tick.
    pub actions: &'a mut KeyActions,
    /// Timers advanced every tick.
    pub timers: &'a mut TimerRegistry,
    loop_handle: Option<&'a LoopHandle>,
}

impl EngineContext<'_> {
    /// Asks the loop to stop once the current cycle completes.
    pub fn stop(&self) {
        match self.loop_handle {
            Some(handle) => handle.stop(),
            None => log::warn!("Stop requested before the engine loop was attached."),
        }
    }

    /// Ticks per second at the last rate check, if any.
    pub fn current_tick_rate(&self) -> Option<f64> {
        self.loop_handle.and_then(LoopHandle::current_tick_rate)
    }

    /// Renders per second at the last rate check, if any.
    pub fn current_render_rate(&self) -> Option<f64> {
        self.loop_handle.and_then(LoopHandle::current_render_rate)
    }
}

/// User logic driven by an [`Engine`].
pub trait Application: Send + 'static {
    /// Called once per run before the first cycle. Register key bindings
    /// and timers here.
    fn init(&mut self, _ctx: &mut EngineContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called every tick after input, bindings and timers were processed.
    fn tick(&mut self, ctx: &mut EngineContext<'_>, delta: f64) -> Result<()>;

    /// Called every render.
    fn render(&mut self, _ctx: &mut EngineContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// The state shared by the loop callbacks.
struct EngineState<A: Application> {
    app: A,
    input: KeyInput,
    actions: KeyActions,
    timers: TimerRegistry,
    loop_handle: Option<LoopHandle>,
}

impl<A: Application> EngineState<A> {
    fn split(&mut self) -> (&mut A, EngineContext<'_>) {
        let ctx = EngineContext {
            input: &self.input,
            actions: &mut self.actions,
            timers: &mut self.timers,
            loop_handle: self.loop_handle.as_ref(),
        };
        (&mut self.app, ctx)
    }

    fn init(&mut self) -> Result<()> {
        let (app, mut ctx) = self.split();
        app.init(&mut ctx)
    }

    fn tick(&mut self, delta: f64) -> Result<()> {
        self.input.merge_staged_changes();
        let fired = self.actions.evaluate(&self.input);
        let expired = self.timers.advance_all(delta);
        if fired + expired > 0 {
            log::trace!("Tick fired {fired} key action(s) and {expired} timer(s).");
        }

        let (app, mut ctx) = self.split();
        app.tick(&mut ctx, delta)
    }

    fn render(&mut self) -> Result<()> {
        let (app, mut ctx) = self.split();
        app.render(&mut ctx)
    }
}

impl<A: Application> Drop for EngineState<A> {
    fn drop(&mut self) {
        log::info!(
            "Engine state dropped with {} key binding(s) and {} live timer(s).",
            self.actions.len(),
            self.timers.len()
        );
    }
}

fn lock_state<A: Application>(state: &Mutex<EngineState<A>>) -> MutexGuard<'_, EngineState<A>> {
    state.lock().unwrap_or_else(|poisoned| {
        log::warn!("Engine state lock was poisoned by a panicking callback, recovering.");
        poisoned.into_inner()
    })
}

/// The public entry point of the Tactus engine.
pub struct Engine<A: Application, C: Clock = MonotonicClock> {
    game_loop: GameLoop<C>,
    state: Arc<Mutex<EngineState<A>>>,
    producer: KeyInputHandle,
}

impl<A: Application> Engine<A> {
    /// Creates a wall-clock engine with [`EngineConfig::default`].
    pub fn new(app: A) -> Result<Self, LoopError> {
        Self::with_config(app, &EngineConfig::default())
    }

    /// Creates a wall-clock engine.
    pub fn with_config(app: A, config: &EngineConfig) -> Result<Self, LoopError> {
        Self::with_clock(app, config, MonotonicClock::new())
    }
}

impl<A: Application, C: Clock> Engine<A, C> {
    /// Creates an engine driven by `clock`.
    pub fn with_clock(app: A, config: &EngineConfig, clock: C) -> Result<Self, LoopError> {
        config.game_loop.validate()?;

        let input = KeyInput::new();
        let producer = input.handle();
        let state = Arc::new(Mutex::new(EngineState {
            app,
            input,
            actions: KeyActions::new(),
            timers: TimerRegistry::new(),
            loop_handle: None,
        }));

        let tick = {
            let state = Arc::clone(&state);
            move |delta| lock_state(&state).tick(delta)
        };
        let render = {
            let state = Arc::clone(&state);
            move || lock_state(&state).render()
        };
        let init = {
            let state = Arc::clone(&state);
            move || lock_state(&state).init()
        };

        let mut game_loop = GameLoop::with_clock(clock, tick, render).with_init(init);
        game_loop.apply_config(&config.game_loop)?;
        if config.log_rate_updates {
            game_loop.on_rate_update(|rate| log::info!("Render rate: {rate:.1}/s"));
        }
        lock_state(&state).loop_handle = Some(game_loop.handle());

        Ok(Self {
            game_loop,
            state,
            producer,
        })
    }

    /// A producer handle for feeding key events from any thread.
    pub fn key_input(&self) -> KeyInputHandle {
        self.producer.clone()
    }

    /// A remote control for the engine loop.
    pub fn handle(&self) -> LoopHandle {
        self.game_loop.handle()
    }

    /// Opens a telemetry channel for the engine loop.
    pub fn subscribe(&mut self) -> flume::Receiver<LoopEvent> {
        self.game_loop.subscribe()
    }

    /// Gives temporary access to the application, e.g. after a run.
    pub fn with_app<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        f(&mut lock_state(&self.state).app)
    }

    /// Runs the engine on the calling thread until it is stopped or a
    /// callback fails.
    pub fn run(&mut self) -> Result<(), LoopError> {
        log::info!("Tactus engine starting...");
        let result = self.game_loop.run();
        log::info!("Tactus engine shut down.");
        result
    }

    /// Moves the engine onto a new thread called `name` and starts it.
    pub fn spawn(self, name: &str) -> Result<LoopThread, LoopError>
    where
        C: 'static,
    {
        log::info!("Tactus engine starting on thread '{name}'...");
        self.game_loop.spawn(name)
    }
}
