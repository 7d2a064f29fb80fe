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

//! Engine-level configuration loaded from JSON.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use tactus_timing::LoopConfig;

/// Configuration of an [`crate::Engine`].
///
/// ```json
/// {
///   "loop": { "tick_rate": 60, "render_rate": 144, "rate_checks_per_second": 2 },
///   "log_rate_updates": true
/// }
/// ```
///
/// Anything missing, whether the whole `"loop"` section or single fields
/// inside it, falls back to [`EngineConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scheduler rates and correction.
    #[serde(rename = "loop", deserialize_with = "engine_loop")]
    pub game_loop: LoopConfig,
    /// Log the observed render rate after every rate check.
    pub log_rate_updates: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            game_loop: default_engine_loop(),
            log_rate_updates: false,
        }
    }
}

fn default_engine_loop() -> LoopConfig {
    LoopConfig {
        tick_rate: 60,
        render_rate: 60,
        rate_checks_per_second: 2,
        ..LoopConfig::default()
    }
}

/// The fields a `"loop"` section may override.
#[derive(Deserialize)]
struct LoopOverrides {
    tick_rate: Option<u32>,
    render_rate: Option<u32>,
    rate_checks_per_second: Option<u32>,
    interval_correction_nanos: Option<i64>,
    min_interval_nanos: Option<i64>,
}

fn engine_loop<'de, D>(deserializer: D) -> Result<LoopConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = LoopOverrides::deserialize(deserializer)?;
    let defaults = default_engine_loop();
    Ok(LoopConfig {
        tick_rate: overrides.tick_rate.unwrap_or(defaults.tick_rate),
        render_rate: overrides.render_rate.unwrap_or(defaults.render_rate),
        rate_checks_per_second: overrides
            .rate_checks_per_second
            .unwrap_or(defaults.rate_checks_per_second),
        interval_correction_nanos: overrides
            .interval_correction_nanos
            .unwrap_or(defaults.interval_correction_nanos),
        min_interval_nanos: overrides
            .min_interval_nanos
            .unwrap_or(defaults.min_interval_nanos),
    })
}

impl EngineConfig {
    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config '{}'", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("invalid engine config '{}'", path.display()))
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.game_loop.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_checks_rates_twice_per_second() {
        let config = EngineConfig::default();
        assert_eq!(config.game_loop.rate_checks_per_second, 2);
        assert_eq!(config.game_loop.tick_rate, 60);
        assert!(config.game_loop.validate().is_ok());
    }

    #[test]
    fn empty_object_is_default() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn loop_section_is_parsed() {
        let config = EngineConfig::from_json_str(
            r#"{ "loop": { "tick_rate": 30, "render_rate": 120 }, "log_rate_updates": true }"#,
        )
        .unwrap();
        assert_eq!(config.game_loop.tick_rate, 30);
        assert_eq!(config.game_loop.render_rate, 120);
        assert!(config.log_rate_updates);
    }

    /// A partial `"loop"` section keeps the engine's rate-check frequency.
    #[test]
    fn partial_loop_section_uses_engine_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "loop": { "tick_rate": 30 } }"#).unwrap();
        assert_eq!(config.game_loop.tick_rate, 30);
        assert_eq!(config.game_loop.rate_checks_per_second, 2);
        assert_eq!(
            config.game_loop.interval_correction_nanos,
            EngineConfig::default().game_loop.interval_correction_nanos
        );

        let empty = EngineConfig::from_json_str(r#"{ "loop": {} }"#).unwrap();
        assert_eq!(empty, EngineConfig::default());
    }

    #[test]
    fn invalid_loop_section_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "loop": { "tick_rate": 0 } }"#).unwrap_err();
        assert!(err.to_string().contains("tick_rate"), "{err:#}");
    }
}
