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

//! # Tactus Input
//!
//! Keyboard state for the logic thread.
//!
//! Raw press/release events arrive from whatever context the platform delivers
//! them on and are staged behind a lock through a [`KeyInputHandle`]. The
//! owning thread publishes them with [`KeyInput::merge_staged_changes`] once per
//! tick, then queries the committed state and lets a [`KeyActions`] table fire
//! the callbacks bound to it.

#![warn(missing_docs)]

pub mod key;
pub mod key_actions;
pub mod key_input;
pub mod keycodes;

pub use key::{Key, KeyAction, KeyCode, KeyMods, KeyStatus};
pub use key_actions::KeyActions;
pub use key_input::{KeyInput, KeyInputHandle};
