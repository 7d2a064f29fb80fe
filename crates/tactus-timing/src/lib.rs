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

//! # Tactus Timing
//!
//! The real-time scheduling half of the engine:
//!
//! * [`GameLoop`], a self-correcting dual-rate scheduler that drives a tick
//!   callback and a render callback at independent rates;
//! * [`Timer`] and [`TimerRegistry`], one-shot and repeating actions gated on
//!   accumulated tick time rather than wall time.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod game_loop;
pub mod timer;
pub mod timer_registry;

pub use config::{LoopConfig, MAX_RATE};
pub use error::LoopError;
pub use game_loop::{GameLoop, LoopClock, LoopEvent, LoopHandle, LoopThread, MAX_INTERVAL_NANOS};
pub use timer::{Repetitions, Timer};
pub use timer_registry::{TimerId, TimerRegistry};
