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

// Tactus Sandbox
// Runs an engine against a scripted keyboard on a separate thread.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use tactus_sdk::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version)]
/// Drives a Tactus engine with a simulated keyboard.
struct Args {
    /// JSON engine configuration. Defaults are used when omitted.
    config: Option<PathBuf>,

    /// Seconds of tick time after which the sandbox quits on its own.
    #[arg(short, long, default_value_t = 5.0)]
    duration: f64,
}

/// Units per second the player moves while an arrow key is held.
const PLAYER_SPEED: f64 = 4.0;

struct SandboxApp {
    duration: f64,
    elapsed: f64,
    position: (f64, f64),
    airborne: Arc<AtomicBool>,
    landing: Option<TimerId>,
    quit: Arc<AtomicBool>,
}

impl SandboxApp {
    fn new(duration: f64) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            position: (0.0, 0.0),
            airborne: Arc::new(AtomicBool::new(false)),
            landing: None,
            quit: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Application for SandboxApp {
    fn init(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        let quit = Arc::clone(&self.quit);
        ctx.actions
            .on_key_just_down(keycodes::ESCAPE, KeyMods::EMPTY, move || {
                log::info!("Escape pressed, quitting.");
                quit.store(true, Ordering::SeqCst);
            });

        let airborne = Arc::clone(&self.airborne);
        ctx.actions
            .on_key_just_down(keycodes::SPACE, KeyMods::EMPTY, move || {
                if !airborne.swap(true, Ordering::SeqCst) {
                    log::info!("Jump!");
                }
            });
        ctx.actions
            .on_key_released(keycodes::SPACE, KeyMods::EMPTY, || {
                log::debug!("Jump key released.");
            });

        let mut remaining = 3;
        ctx.timers.schedule_repeating(
            move || {
                log::info!("Countdown: {remaining}");
                remaining -= 1;
            },
            Duration::from_millis(250),
            3,
        );
        ctx.timers.schedule_forever(
            || log::info!("Heartbeat."),
            Duration::from_secs(1),
        );
        Ok(())
    }

    fn tick(&mut self, ctx: &mut EngineContext<'_>, delta: f64) -> Result<()> {
        self.elapsed += delta;

        let step = PLAYER_SPEED * delta;
        if ctx.input.is_down(keycodes::RIGHT, KeyMods::EMPTY) {
            self.position.0 += step;
        }
        if ctx.input.is_down(keycodes::RIGHT, KeyMods::SHIFT) {
            self.position.0 += 2.0 * step;
        }
        if ctx.input.is_down(keycodes::LEFT, KeyMods::EMPTY) {
            self.position.0 -= step;
        }
        if ctx.input.is_down(keycodes::UP, KeyMods::EMPTY) {
            self.position.1 += step;
        }
        if ctx.input.is_down(keycodes::DOWN, KeyMods::EMPTY) {
            self.position.1 -= step;
        }

        match self.landing {
            Some(id) if !ctx.timers.contains(id) => self.landing = None,
            None if self.airborne.load(Ordering::SeqCst) => {
                let airborne = Arc::clone(&self.airborne);
                self.landing = Some(ctx.timers.schedule(
                    move || {
                        airborne.store(false, Ordering::SeqCst);
                        log::info!("Landed.");
                    },
                    Duration::from_millis(400),
                ));
            }
            _ => {}
        }

        if self.quit.load(Ordering::SeqCst) || self.elapsed >= self.duration {
            log::info!(
                "Stopping after {:.2}s at ({:.2}, {:.2}).",
                self.elapsed,
                self.position.0,
                self.position.1
            );
            ctx.stop();
        }
        Ok(())
    }

    fn render(&mut self, _ctx: &mut EngineContext<'_>) -> Result<()> {
        log::trace!("Player at ({:.2}, {:.2})", self.position.0, self.position.1);
        Ok(())
    }
}

/// One scripted keyboard event, `delay` after the previous one.
struct ScriptedKey {
    delay: Duration,
    keycode: KeyCode,
    action: KeyAction,
    mods: KeyMods,
}

const fn key(delay_ms: u64, keycode: KeyCode, action: KeyAction, mods: KeyMods) -> ScriptedKey {
    ScriptedKey {
        delay: Duration::from_millis(delay_ms),
        keycode,
        action,
        mods,
    }
}

const SCRIPT: &[ScriptedKey] = &[
    key(300, keycodes::RIGHT, KeyAction::Press, KeyMods::EMPTY),
    key(100, keycodes::RIGHT, KeyAction::Repeat, KeyMods::EMPTY),
    key(100, keycodes::RIGHT, KeyAction::Repeat, KeyMods::EMPTY),
    key(300, keycodes::RIGHT, KeyAction::Release, KeyMods::EMPTY),
    key(200, keycodes::SPACE, KeyAction::Press, KeyMods::EMPTY),
    key(80, keycodes::SPACE, KeyAction::Release, KeyMods::EMPTY),
    key(300, keycodes::UP, KeyAction::Press, KeyMods::EMPTY),
    key(400, keycodes::UP, KeyAction::Release, KeyMods::EMPTY),
    key(200, keycodes::RIGHT, KeyAction::Press, KeyMods::SHIFT),
    key(500, keycodes::RIGHT, KeyAction::Release, KeyMods::SHIFT),
    key(1_500, keycodes::ESCAPE, KeyAction::Press, KeyMods::EMPTY),
    key(50, keycodes::ESCAPE, KeyAction::Release, KeyMods::EMPTY),
];

fn simulate_keyboard(producer: &KeyInputHandle, engine: &LoopHandle) {
    for event in SCRIPT {
        thread::sleep(event.delay);
        if !engine.is_running() {
            log::debug!("Engine stopped, ending keyboard script early.");
            return;
        }
        log::debug!("Keyboard: {:?} {:?} {:?}", event.keycode, event.action, event.mods);
        producer.on_key_action(event.keycode, event.action, event.mods);
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    log::info!("Sandbox config: {config:?}");

    let engine = Engine::with_config(SandboxApp::new(args.duration), &config)?;
    let producer = engine.key_input();
    let handle = engine.handle();

    let engine_thread = engine.spawn("game-loop")?;
    let keyboard = thread::Builder::new()
        .name("keyboard".to_owned())
        .spawn(move || simulate_keyboard(&producer, &handle))?;

    engine_thread.join()?;
    keyboard
        .join()
        .map_err(|_| anyhow!("keyboard thread panicked"))?;
    Ok(())
}
