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

//! Lock-free floating point cells for values published across threads.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// An `f64` that can be shared between threads without a lock.
///
/// The value is stored as its IEEE-754 bit pattern in an [`AtomicU64`].
pub struct AtomicF64 {
    inner: AtomicU64,
}

impl AtomicF64 {
    /// Creates a new cell holding `value`.
    pub const fn new(value: f64) -> Self {
        Self {
            inner: AtomicU64::new(value.to_bits()),
        }
    }

    /// Loads the current value.
    pub fn load(&self, order: Ordering) -> f64 {
        f64::from_bits(self.inner.load(order))
    }

    /// Stores `value`.
    pub fn store(&self, value: f64, order: Ordering) {
        self.inner.store(value.to_bits(), order)
    }
}

impl Default for AtomicF64 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl fmt::Debug for AtomicF64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.load(Ordering::Relaxed), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn stores_and_loads_exact_bits() {
        let cell = AtomicF64::new(1.5);
        assert_eq!(cell.load(Ordering::Relaxed), 1.5);

        cell.store(-0.125, Ordering::Relaxed);
        assert_eq!(cell.load(Ordering::Relaxed), -0.125);
    }

    #[test]
    fn nan_survives_round_trip() {
        let cell = AtomicF64::new(f64::NAN);
        assert!(cell.load(Ordering::Acquire).is_nan());
    }

    #[test]
    fn value_is_visible_from_another_thread() {
        let cell = Arc::new(AtomicF64::default());
        let writer = Arc::clone(&cell);

        thread::spawn(move || writer.store(59.75, Ordering::Release))
            .join()
            .expect("Writer thread panicked");

        assert_eq!(cell.load(Ordering::Acquire), 59.75);
    }
}
