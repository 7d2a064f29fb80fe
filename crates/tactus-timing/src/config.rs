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

//! Numeric configuration surface of the loop scheduler.

use serde::{Deserialize, Serialize};

use crate::error::LoopError;
use crate::game_loop::MAX_INTERVAL_NANOS;

/// Configuration for a [`crate::GameLoop`].
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Desired tick callbacks per second.
    pub tick_rate: u32,
    /// Desired render callbacks per second.
    pub render_rate: u32,
    /// How many times per second the achieved rates are measured and the
    /// intervals corrected.
    pub rate_checks_per_second: u32,
    /// Nanoseconds added to an interval per unit of rate overshoot.
    /// Zero disables correction.
    pub interval_correction_nanos: i64,
    /// Floor applied to corrected intervals.
    pub min_interval_nanos: i64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            render_rate: 60,
            rate_checks_per_second: 10,
            interval_correction_nanos: 10_000,
            min_interval_nanos: 1_000,
        }
    }
}

impl LoopConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, LoopError> {
        let config: LoopConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies the same rules as the [`crate::GameLoop`] setters.
    pub fn validate(&self) -> Result<(), LoopError> {
        validate_rate("tick_rate", self.tick_rate)?;
        validate_rate("render_rate", self.render_rate)?;
        validate_rate("rate_checks_per_second", self.rate_checks_per_second)?;
        validate_correction(self.interval_correction_nanos)?;
        validate_min_interval(self.min_interval_nanos)
    }
}

/// Highest rate whose interval is still at least one nanosecond.
pub const MAX_RATE: u32 = 1_000_000_000;

pub(crate) fn validate_rate(parameter: &'static str, rate: u32) -> Result<(), LoopError> {
    if rate == 0 {
        return Err(LoopError::invalid(parameter, rate, "rate must be positive"));
    }
    if rate > MAX_RATE {
        return Err(LoopError::invalid(
            parameter,
            rate,
            "rate must not exceed one per nanosecond",
        ));
    }
    Ok(())
}

pub(crate) fn validate_correction(nanos: i64) -> Result<(), LoopError> {
    if nanos < 0 {
        return Err(LoopError::invalid(
            "interval_correction_nanos",
            nanos,
            "correction must not be negative",
        ));
    }
    Ok(())
}

pub(crate) fn validate_min_interval(nanos: i64) -> Result<(), LoopError> {
    if nanos < 1 {
        return Err(LoopError::invalid(
            "min_interval_nanos",
            nanos,
            "interval floor must be at least one nanosecond",
        ));
    }
    if nanos as u64 > MAX_INTERVAL_NANOS {
        return Err(LoopError::invalid(
            "min_interval_nanos",
            nanos,
            "interval floor must not exceed the interval ceiling",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(LoopConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = LoopConfig::from_json_str(r#"{ "tick_rate": 120 }"#)
            .expect("Partial config should parse");
        assert_eq!(config.tick_rate, 120);
        assert_eq!(config.render_rate, 60);
        assert_eq!(config.interval_correction_nanos, 10_000);
    }

    #[test]
    fn zero_rate_is_rejected() {
        let err = LoopConfig::from_json_str(r#"{ "render_rate": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            LoopError::InvalidConfiguration {
                parameter: "render_rate",
                ..
            }
        ));
    }

    #[test]
    fn rate_above_one_per_nanosecond_is_rejected() {
        let err = LoopConfig::from_json_str(r#"{ "rate_checks_per_second": 2000000000 }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            LoopError::InvalidConfiguration {
                parameter: "rate_checks_per_second",
                ..
            }
        ));

        let fastest = LoopConfig {
            tick_rate: MAX_RATE,
            ..LoopConfig::default()
        };
        assert!(fastest.validate().is_ok());
    }

    #[test]
    fn negative_rate_fails_to_parse() {
        let err = LoopConfig::from_json_str(r#"{ "tick_rate": -30 }"#).unwrap_err();
        assert!(matches!(err, LoopError::ConfigParse(_)));
    }

    #[test]
    fn negative_correction_is_rejected() {
        let config = LoopConfig {
            interval_correction_nanos: -1,
            ..LoopConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_interval_floor_is_rejected() {
        let config = LoopConfig {
            min_interval_nanos: 0,
            ..LoopConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn interval_floor_above_ceiling_is_rejected() {
        let config = LoopConfig {
            min_interval_nanos: MAX_INTERVAL_NANOS as i64 + 1,
            ..LoopConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
