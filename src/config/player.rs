// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::time::Duration;

use duration_string::DurationString;
use serde::Deserialize;

use crate::capture::NameRules;
use crate::command;

use super::vocabulary::Vocabulary;
use super::ConfigError;

const DEFAULT_SINK: &str = "log";
const DEFAULT_MAX_NAME_LENGTH: usize = 20;
const DEFAULT_CAPTURE_TIMES: [u64; 5] = [5, 10, 15, 20, 30];
const DEFAULT_WAIT_AFTER_SCALING: Duration = Duration::from_millis(500);

/// The configuration for the vibration player.
#[derive(Deserialize, Clone, Debug)]
pub struct Player {
    /// The pattern store location.
    store: String,
    /// The vibration sink to use.
    sink: Option<String>,
    /// The longest allowed pattern name.
    max_name_length: Option<usize>,
    /// The allowed capture lengths in seconds.
    capture_times: Option<Vec<u64>>,
    /// How long to wait before playing a rescaled pattern.
    wait_after_scaling: Option<String>,
    /// Overrides for the command words.
    #[serde(default)]
    vocabulary: Vocabulary,
}

impl Player {
    /// Returns the pattern store location.
    pub fn store(&self) -> &str {
        &self.store
    }

    /// Returns the vibration sink name (default: log).
    pub fn sink(&self) -> &str {
        self.sink.as_deref().unwrap_or(DEFAULT_SINK)
    }

    /// Returns the longest allowed pattern name (default: 20).
    pub fn max_name_length(&self) -> usize {
        self.max_name_length.unwrap_or(DEFAULT_MAX_NAME_LENGTH)
    }

    /// Returns the allowed capture lengths in seconds.
    pub fn capture_times(&self) -> &[u64] {
        self.capture_times
            .as_deref()
            .unwrap_or(&DEFAULT_CAPTURE_TIMES)
    }

    /// Returns the wait before a rescaled pattern plays (default: 500ms).
    pub fn wait_after_scaling(&self) -> Result<Duration, ConfigError> {
        match &self.wait_after_scaling {
            Some(wait) => Ok(DurationString::from_string(wait.clone())
                .map_err(|e| ConfigError::Invalid {
                    field: "wait_after_scaling",
                    reason: e.to_string(),
                })?
                .into()),
            None => Ok(DEFAULT_WAIT_AFTER_SCALING),
        }
    }

    /// Returns the command vocabulary.
    pub fn vocabulary(&self) -> Result<command::Vocabulary, ConfigError> {
        self.vocabulary.to_vocabulary()
    }

    /// Returns the rules new pattern names must follow. Command words are reserved.
    pub fn name_rules(&self) -> Result<NameRules, ConfigError> {
        Ok(NameRules::new(
            self.max_name_length(),
            self.vocabulary()?.reserved_words(),
        ))
    }
}
