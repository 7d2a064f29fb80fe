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

//! Declarative bindings from key states to callbacks.

use std::collections::HashMap;
use std::fmt;

use crate::key::{Key, KeyCode, KeyMods, KeyStatus};
use crate::key_input::KeyInput;

type Action = Box<dyn FnMut() + Send>;

/// A table of callbacks keyed by `(keycode, status, mods)`.
///
/// Each binding is independent: the same key can carry separate callbacks for
/// `Down`, `JustDown` and `Released`, and for every modifier set. Binding the
/// exact same triple twice replaces the earlier callback. Evaluation order
/// between bindings is unspecified.
#[derive(Default)]
pub struct KeyActions {
    actions: HashMap<Key, Action>,
}

impl KeyActions {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires `action` on every evaluation during which the key is held with `mods`.
    pub fn on_key_down<F>(&mut self, keycode: KeyCode, mods: KeyMods, action: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.bind(Key::new(keycode, KeyStatus::Down, mods), Box::new(action));
    }

    /// Fires `action` once, on the evaluation following the press.
    pub fn on_key_just_down<F>(&mut self, keycode: KeyCode, mods: KeyMods, action: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.bind(Key::new(keycode, KeyStatus::JustDown, mods), Box::new(action));
    }

    /// Fires `action` once, on the evaluation following the release.
    pub fn on_key_released<F>(&mut self, keycode: KeyCode, mods: KeyMods, action: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.bind(Key::new(keycode, KeyStatus::Released, mods), Box::new(action));
    }

    /// Removes a binding. Returns `true` if one existed.
    pub fn unbind(&mut self, keycode: KeyCode, status: KeyStatus, mods: KeyMods) -> bool {
        self.actions
            .remove(&Key::new(keycode, status, mods))
            .is_some()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Fires every binding whose state currently matches `input`.
    ///
    /// Call once per tick, after [`KeyInput::merge_staged_changes`]. Returns
    /// how many callbacks fired.
    pub fn evaluate(&mut self, input: &KeyInput) -> usize {
        let mut fired = 0;
        for (key, action) in self.actions.iter_mut() {
            let matches = match key.status {
                KeyStatus::Down => input.is_down(key.keycode, key.mods),
                KeyStatus::JustDown => input.is_just_down(key.keycode, key.mods),
                KeyStatus::Released => input.is_released(key.keycode, key.mods),
                KeyStatus::NotDown => false,
            };
            if matches {
                action();
                fired += 1;
            }
        }
        fired
    }

    fn bind(&mut self, key: Key, action: Action) {
        if self.actions.insert(key, action).is_some() {
            log::debug!("Replaced key binding {key:?}");
        }
    }
}

impl fmt::Debug for KeyActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyActions")
            .field("bindings", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycodes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const K: KeyCode = keycodes::SPACE;
    const NONE: KeyMods = KeyMods::EMPTY;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    /// `JustDown` fires on the first cycle only, `Down` on every held cycle.
    #[test]
    fn just_down_and_down_bindings_on_same_key() {
        let mut input = KeyInput::new();
        let mut actions = KeyActions::new();
        let (just_down, on_just_down) = counter();
        let (down, on_down) = counter();
        actions.on_key_just_down(K, NONE, on_just_down);
        actions.on_key_down(K, NONE, on_down);

        input.record_press(K, NONE);
        input.merge_staged_changes();
        assert_eq!(actions.evaluate(&input), 2);
        assert_eq!(just_down.load(Ordering::SeqCst), 1);
        assert_eq!(down.load(Ordering::SeqCst), 1);

        input.merge_staged_changes();
        assert_eq!(actions.evaluate(&input), 1);
        assert_eq!(just_down.load(Ordering::SeqCst), 1);
        assert_eq!(down.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn released_binding_fires_once() {
        let mut input = KeyInput::new();
        let mut actions = KeyActions::new();
        let (released, on_released) = counter();
        actions.on_key_released(K, NONE, on_released);

        input.record_press(K, NONE);
        input.merge_staged_changes();
        actions.evaluate(&input);
        assert_eq!(released.load(Ordering::SeqCst), 0);

        input.record_release(K, NONE);
        input.merge_staged_changes();
        actions.evaluate(&input);
        input.merge_staged_changes();
        actions.evaluate(&input);

        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn bindings_are_separated_by_mods() {
        let mut input = KeyInput::new();
        let mut actions = KeyActions::new();
        let (plain, on_plain) = counter();
        let (shifted, on_shifted) = counter();
        actions.on_key_just_down(K, NONE, on_plain);
        actions.on_key_just_down(K, KeyMods::SHIFT, on_shifted);

        input.record_press(K, KeyMods::SHIFT);
        input.merge_staged_changes();
        actions.evaluate(&input);

        assert_eq!(plain.load(Ordering::SeqCst), 0);
        assert_eq!(shifted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rebinding_same_triple_replaces_callback() {
        let mut input = KeyInput::new();
        let mut actions = KeyActions::new();
        let (first, on_first) = counter();
        let (second, on_second) = counter();
        actions.on_key_down(K, NONE, on_first);
        actions.on_key_down(K, NONE, on_second);
        assert_eq!(actions.len(), 1);

        input.record_press(K, NONE);
        input.merge_staged_changes();
        actions.evaluate(&input);

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unbind_removes_only_that_triple() {
        let mut actions = KeyActions::new();
        actions.on_key_down(K, NONE, || {});
        actions.on_key_released(K, NONE, || {});

        assert!(actions.unbind(K, KeyStatus::Down, NONE));
        assert!(!actions.unbind(K, KeyStatus::Down, NONE));
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn nothing_fires_without_input() {
        let input = KeyInput::new();
        let mut actions = KeyActions::new();
        let (count, action) = counter();
        actions.on_key_down(K, NONE, action);

        assert_eq!(actions.evaluate(&input), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
