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

//! Error type for loop configuration and lifecycle failures.

use thiserror::Error;

/// Everything that can go wrong configuring or running a [`crate::GameLoop`].
///
/// Errors raised by host callbacks are carried unchanged; the loop never
/// retries a failed cycle.
#[derive(Debug, Error)]
pub enum LoopError {
    /// A rate, interval or correction value was rejected by a setter.
    #[error("invalid configuration: {parameter} = {value} ({reason})")]
    InvalidConfiguration {
        /// Name of the rejected parameter.
        parameter: &'static str,
        /// The rejected value, formatted.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// `run` or `spawn` was called on a loop that is still running.
    ///
    /// `run(&mut self)` and `spawn(self)` already rule this out for a single
    /// owner; the shared lifecycle flag is still checked at runtime before a
    /// run begins.
    #[error("game loop is already running")]
    AlreadyRunning,

    /// The init callback failed before the first cycle.
    #[error("init callback failed: {0:#}")]
    InitFailed(anyhow::Error),

    /// The tick callback failed; the loop has stopped.
    #[error("tick callback failed: {0:#}")]
    TickFailed(anyhow::Error),

    /// The render callback failed; the loop has stopped.
    #[error("render callback failed: {0:#}")]
    RenderFailed(anyhow::Error),

    /// A JSON loop configuration could not be parsed.
    #[error("failed to parse loop configuration")]
    ConfigParse(#[from] serde_json::Error),

    /// The loop thread could not be started.
    #[error("failed to spawn loop thread")]
    Spawn(#[source] std::io::Error),

    /// The loop thread panicked.
    #[error("loop thread panicked: {0}")]
    Panicked(String),
}

impl LoopError {
    pub(crate) fn invalid(
        parameter: &'static str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        LoopError::InvalidConfiguration {
            parameter,
            value: value.to_string(),
            reason,
        }
    }
}
