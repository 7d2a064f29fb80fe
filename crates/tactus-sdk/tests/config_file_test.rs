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

//! Integration tests for loading an engine configuration from disk.

use std::io::Write;

use anyhow::Result;
use tactus_sdk::prelude::*;

struct Idle;

impl Application for Idle {
    fn tick(&mut self, _ctx: &mut EngineContext<'_>, _delta: f64) -> Result<()> {
        Ok(())
    }
}

fn write_config(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Temp file should be created");
    file.write_all(json.as_bytes())
        .expect("Temp file should be writable");
    file
}

#[test]
fn test_load_config_file_and_build_engine() {
    let file = write_config(
        r#"{
            "loop": {
                "tick_rate": 120,
                "render_rate": 30,
                "rate_checks_per_second": 4,
                "interval_correction_nanos": 5000
            },
            "log_rate_updates": true
        }"#,
    );

    let config = EngineConfig::load(file.path()).expect("Config should load");

    assert_eq!(config.game_loop.tick_rate, 120);
    assert_eq!(config.game_loop.render_rate, 30);
    assert_eq!(config.game_loop.interval_correction_nanos, 5000);
    assert_eq!(config.game_loop.min_interval_nanos, 1_000);
    assert!(config.log_rate_updates);

    let engine = Engine::with_config(Idle, &config).expect("Engine should accept the config");
    assert!(!engine.handle().is_running());
}

#[test]
fn test_malformed_config_names_the_file() {
    let file = write_config(r#"{ "loop": { "tick_rate": "fast" } }"#);

    let err = EngineConfig::load(file.path()).unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("invalid engine config"), "{message}");
    assert!(
        message.contains(&file.path().display().to_string()),
        "{message}"
    );
}

#[test]
fn test_zero_rate_in_file_is_rejected() {
    let file = write_config(r#"{ "loop": { "render_rate": 0 } }"#);

    let err = EngineConfig::load(file.path()).unwrap_err();

    assert!(format!("{err:#}").contains("render_rate"));
}

#[test]
fn test_missing_config_file_is_reported() {
    let dir = tempfile::tempdir().expect("Temp dir should be created");
    let path = dir.path().join("missing.json");

    let err = EngineConfig::load(&path).unwrap_err();

    assert!(err.to_string().contains("failed to read engine config"));
}
