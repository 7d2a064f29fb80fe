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

//! Value types describing a key and its discrete state.

use tactus_core::tactus_bitflags;

/// Platform key code. Values follow the GLFW numbering (see [`crate::keycodes`]).
pub type KeyCode = i32;

tactus_bitflags! {
    /// Modifier keys held while a key event was produced.
    ///
    /// Bit values match the GLFW modifier bits so raw platform masks can be
    /// passed through [`KeyMods::from_bits_retain`].
    pub struct KeyMods: u32 {
        /// Either shift key.
        const SHIFT = 0x0001;
        /// Either control key.
        const CONTROL = 0x0002;
        /// Either alt key.
        const ALT = 0x0004;
        /// Either super (logo) key.
        const SUPER = 0x0008;
        /// Caps lock is active.
        const CAPS_LOCK = 0x0010;
        /// Num lock is active.
        const NUM_LOCK = 0x0020;
    }
}

/// The four discrete states a key moves through between merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyStatus {
    /// Not held. Also the state of any key never seen.
    #[default]
    NotDown,
    /// Held for longer than one merge cycle.
    Down,
    /// Became held during the last merge cycle.
    JustDown,
    /// Was let go during the last merge cycle.
    Released,
}

impl KeyStatus {
    /// Returns `true` for both held states.
    pub const fn is_down(self) -> bool {
        matches!(self, KeyStatus::Down | KeyStatus::JustDown)
    }

    /// The state this one decays into when a merge cycle passes without a new event.
    pub const fn aged(self) -> Self {
        match self {
            KeyStatus::JustDown => KeyStatus::Down,
            KeyStatus::Released => KeyStatus::NotDown,
            other => other,
        }
    }
}

/// A key code together with its status and modifier set.
///
/// Equality and hashing cover all three fields, so the same physical key in
/// different states or with different modifiers forms distinct map keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    /// The platform key code.
    pub keycode: KeyCode,
    /// The discrete state.
    pub status: KeyStatus,
    /// Modifiers held with the key.
    pub mods: KeyMods,
}

impl Key {
    /// Creates a key value.
    pub const fn new(keycode: KeyCode, status: KeyStatus, mods: KeyMods) -> Self {
        Self {
            keycode,
            status,
            mods,
        }
    }
}

/// A raw key transition as reported by a platform event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// The key went down.
    Press,
    /// The platform auto-repeated a held key.
    Repeat,
    /// The key went up.
    Release,
}
