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

//! The cross-thread key state machine.
//!
//! State lives in two maps keyed by key code:
//!
//! * the **committed** map, owned by the logic thread and read by every query;
//! * the **staged** map, written by event producers under a mutex.
//!
//! [`KeyInput::merge_staged_changes`] is the only bridge between them. It first
//! ages the committed map (`JustDown` becomes `Down`, `Released` becomes
//! `NotDown`) and then copies every staged entry over it. Because of that order
//! `JustDown` and `Released` are each observable for exactly one merge cycle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::key::{Key, KeyAction, KeyCode, KeyMods, KeyStatus};

/// State shared with producers. Only ever touched under the mutex.
#[derive(Debug, Default)]
struct Staging {
    /// Pending changes, last write per key code wins.
    changes: HashMap<KeyCode, Key>,
    /// Keys the committed map reported as held after the last merge, with
    /// their modifiers. Producers consult this to drop repeated presses.
    held: HashMap<KeyCode, KeyMods>,
}

impl Staging {
    fn record_press(&mut self, keycode: KeyCode, mods: KeyMods) {
        if self.held.get(&keycode) == Some(&mods) {
            log::trace!("Ignoring press of held key {keycode} ({mods:?})");
            return;
        }
        self.changes
            .insert(keycode, Key::new(keycode, KeyStatus::JustDown, mods));
    }

    fn record_release(&mut self, keycode: KeyCode, mods: KeyMods) {
        self.changes
            .insert(keycode, Key::new(keycode, KeyStatus::Released, mods));
    }
}

fn lock_staging(staging: &Mutex<Staging>) -> MutexGuard<'_, Staging> {
    staging.lock().unwrap_or_else(|poisoned| {
        log::warn!("Key staging lock was poisoned by a panicking producer; recovering.");
        poisoned.into_inner()
    })
}

/// The producer side of a [`KeyInput`].
///
/// Cheap to clone and safe to move to any thread. Events recorded through a
/// handle stay invisible to queries until the owner merges them.
#[derive(Debug, Clone)]
pub struct KeyInputHandle {
    staging: Arc<Mutex<Staging>>,
}

impl KeyInputHandle {
    /// Stages a press unless the key is already held with the same modifiers.
    pub fn record_press(&self, keycode: KeyCode, mods: KeyMods) {
        lock_staging(&self.staging).record_press(keycode, mods);
    }

    /// Stages a release, overwriting anything staged earlier for this key.
    pub fn record_release(&self, keycode: KeyCode, mods: KeyMods) {
        lock_staging(&self.staging).record_release(keycode, mods);
    }

    /// Routes a raw platform transition. Repeats are treated as presses, which
    /// the held-key check then absorbs.
    pub fn on_key_action(&self, keycode: KeyCode, action: KeyAction, mods: KeyMods) {
        match action {
            KeyAction::Release => self.record_release(keycode, mods),
            KeyAction::Press | KeyAction::Repeat => self.record_press(keycode, mods),
        }
    }

    /// Number of key codes with a staged change waiting for the next merge.
    pub fn pending_changes(&self) -> usize {
        lock_staging(&self.staging).changes.len()
    }
}

/// Keyboard state as seen by the logic thread.
#[derive(Debug, Default)]
pub struct KeyInput {
    committed: HashMap<KeyCode, Key>,
    staging: Arc<Mutex<Staging>>,
}

impl KeyInput {
    /// Creates an empty key state machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a producer handle feeding this state machine.
    pub fn handle(&self) -> KeyInputHandle {
        KeyInputHandle {
            staging: Arc::clone(&self.staging),
        }
    }

    /// Stages a press from the owning thread. See [`KeyInputHandle::record_press`].
    pub fn record_press(&self, keycode: KeyCode, mods: KeyMods) {
        lock_staging(&self.staging).record_press(keycode, mods);
    }

    /// Stages a release from the owning thread. See [`KeyInputHandle::record_release`].
    pub fn record_release(&self, keycode: KeyCode, mods: KeyMods) {
        lock_staging(&self.staging).record_release(keycode, mods);
    }

    /// Ages the committed state and publishes every staged change.
    ///
    /// Call once per tick before any query.
    pub fn merge_staged_changes(&mut self) {
        for key in self.committed.values_mut() {
            key.status = key.status.aged();
        }

        let mut staging = lock_staging(&self.staging);
        if !staging.changes.is_empty() {
            log::trace!("Merging {} staged key change(s)", staging.changes.len());
        }
        for (keycode, key) in staging.changes.drain() {
            self.committed.insert(keycode, key);
        }

        staging.held.clear();
        staging.held.extend(
            self.committed
                .values()
                .filter(|key| key.status.is_down())
                .map(|key| (key.keycode, key.mods)),
        );
    }

    /// `true` if the key is held (either held state) with exactly `mods`.
    pub fn is_down(&self, keycode: KeyCode, mods: KeyMods) -> bool {
        self.committed
            .get(&keycode)
            .is_some_and(|key| key.status.is_down() && key.mods == mods)
    }

    /// `true` if the key went down during the last merge cycle with exactly `mods`.
    pub fn is_just_down(&self, keycode: KeyCode, mods: KeyMods) -> bool {
        self.has_status(keycode, KeyStatus::JustDown, mods)
    }

    /// `true` if the key went up during the last merge cycle with exactly `mods`.
    pub fn is_released(&self, keycode: KeyCode, mods: KeyMods) -> bool {
        self.has_status(keycode, KeyStatus::Released, mods)
    }

    /// The committed status of a key; `NotDown` for keys never seen.
    pub fn status(&self, keycode: KeyCode) -> KeyStatus {
        self.committed
            .get(&keycode)
            .map_or(KeyStatus::NotDown, |key| key.status)
    }

    /// The modifiers last committed for a key; empty for keys never seen.
    pub fn mods(&self, keycode: KeyCode) -> KeyMods {
        self.committed
            .get(&keycode)
            .map_or(KeyMods::EMPTY, |key| key.mods)
    }

    fn has_status(&self, keycode: KeyCode, status: KeyStatus, mods: KeyMods) -> bool {
        self.committed
            .get(&keycode)
            .is_some_and(|key| key.status == status && key.mods == mods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycodes;
    use std::thread;

    const K: KeyCode = keycodes::SPACE;
    const NONE: KeyMods = KeyMods::EMPTY;

    #[test]
    fn unknown_keys_query_as_not_pressed() {
        let input = KeyInput::new();
        assert!(!input.is_down(K, NONE));
        assert!(!input.is_just_down(K, NONE));
        assert!(!input.is_released(K, NONE));
        assert_eq!(input.status(K), KeyStatus::NotDown);
        assert_eq!(input.mods(K), NONE);
    }

    /// A press is `JustDown` for exactly one merge, then plain `Down`.
    #[test]
    fn press_is_just_down_for_one_merge() {
        let mut input = KeyInput::new();
        input.record_press(K, NONE);

        input.merge_staged_changes();
        assert!(input.is_just_down(K, NONE));
        assert!(input.is_down(K, NONE));

        input.merge_staged_changes();
        assert!(!input.is_just_down(K, NONE));
        assert!(input.is_down(K, NONE));
        assert_eq!(input.status(K), KeyStatus::Down);
    }

    /// A release is visible for exactly one merge, then the key is simply up.
    #[test]
    fn release_is_visible_for_one_merge() {
        let mut input = KeyInput::new();
        input.record_press(K, NONE);
        input.merge_staged_changes();

        input.record_release(K, NONE);
        input.merge_staged_changes();
        assert!(input.is_released(K, NONE));
        assert!(!input.is_down(K, NONE));

        input.merge_staged_changes();
        assert!(!input.is_released(K, NONE));
        assert!(!input.is_down(K, NONE));
        assert_eq!(input.status(K), KeyStatus::NotDown);
    }

    #[test]
    fn staged_events_are_not_read_through() {
        let mut input = KeyInput::new();
        input.merge_staged_changes();

        input.record_press(K, NONE);
        assert!(!input.is_down(K, NONE));
        assert!(!input.is_just_down(K, NONE));

        input.merge_staged_changes();
        assert!(input.is_just_down(K, NONE));
    }

    /// Repeated presses of a held key must not re-trigger `JustDown`.
    #[test]
    fn repeated_press_of_held_key_is_ignored() {
        let mut input = KeyInput::new();
        let handle = input.handle();
        handle.record_press(K, NONE);
        input.merge_staged_changes();

        handle.on_key_action(K, KeyAction::Repeat, NONE);
        handle.record_press(K, NONE);
        assert_eq!(handle.pending_changes(), 0);

        input.merge_staged_changes();
        assert!(!input.is_just_down(K, NONE));
        assert!(input.is_down(K, NONE));
    }

    /// Holding the key with a different modifier set counts as a new press.
    #[test]
    fn press_with_new_mods_restages() {
        let mut input = KeyInput::new();
        input.record_press(K, NONE);
        input.merge_staged_changes();

        input.record_press(K, KeyMods::SHIFT);
        input.merge_staged_changes();

        assert!(input.is_just_down(K, KeyMods::SHIFT));
        assert!(!input.is_down(K, NONE));
        assert_eq!(input.mods(K), KeyMods::SHIFT);
    }

    #[test]
    fn queries_require_exact_mods() {
        let mut input = KeyInput::new();
        input.record_press(K, KeyMods::CONTROL | KeyMods::SHIFT);
        input.merge_staged_changes();

        assert!(input.is_down(K, KeyMods::CONTROL | KeyMods::SHIFT));
        assert!(!input.is_down(K, KeyMods::CONTROL));
        assert!(!input.is_down(K, NONE));
    }

    /// Press and release between two merges collapse to the last event.
    #[test]
    fn release_overwrites_staged_press() {
        let mut input = KeyInput::new();
        input.record_press(K, NONE);
        input.record_release(K, NONE);
        input.merge_staged_changes();

        assert!(input.is_released(K, NONE));
        assert!(!input.is_just_down(K, NONE));
    }

    /// The held-key check looks at committed state, so a press staged after an
    /// unmerged release of a held key is dropped and the release wins.
    #[test]
    fn press_after_unmerged_release_of_held_key_is_absorbed() {
        let mut input = KeyInput::new();
        input.record_press(K, NONE);
        input.merge_staged_changes();

        input.record_release(K, NONE);
        input.record_press(K, NONE);
        input.merge_staged_changes();

        assert!(input.is_released(K, NONE));
    }

    #[test]
    fn independent_keys_age_independently() {
        let mut input = KeyInput::new();
        input.record_press(keycodes::A, NONE);
        input.merge_staged_changes();

        input.record_press(keycodes::D, NONE);
        input.merge_staged_changes();

        assert_eq!(input.status(keycodes::A), KeyStatus::Down);
        assert_eq!(input.status(keycodes::D), KeyStatus::JustDown);
    }

    #[test]
    fn events_from_producer_thread_are_visible_after_merge() {
        let mut input = KeyInput::new();
        let handle = input.handle();

        let producer = thread::spawn(move || {
            for keycode in [keycodes::W, keycodes::A, keycodes::S] {
                handle.on_key_action(keycode, KeyAction::Press, NONE);
            }
            handle.on_key_action(keycodes::S, KeyAction::Release, NONE);
        });
        producer.join().expect("Producer thread panicked");

        input.merge_staged_changes();
        assert!(input.is_just_down(keycodes::W, NONE));
        assert!(input.is_just_down(keycodes::A, NONE));
        assert!(input.is_released(keycodes::S, NONE));
    }

    #[test]
    fn poisoned_staging_lock_is_recovered() {
        let mut input = KeyInput::new();
        let staging = Arc::clone(&input.staging);

        let _ = thread::spawn(move || {
            let _guard = staging.lock().expect("Lock should not be poisoned yet");
            panic!("Producer dies while holding the staging lock");
        })
        .join();

        input.record_press(K, NONE);
        input.merge_staged_changes();
        assert!(input.is_just_down(K, NONE));
    }
}
