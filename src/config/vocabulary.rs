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
use serde::Deserialize;

use crate::command;

use super::ConfigError;

/// A YAML representation of the command words. Missing words keep their defaults.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Vocabulary {
    start: Option<String>,
    stop: Option<String>,
    increase: Option<String>,
    decrease: Option<String>,
    disable: Option<String>,
}

impl Vocabulary {
    /// Applies the configured words on top of the default vocabulary.
    pub fn to_vocabulary(&self) -> Result<command::Vocabulary, ConfigError> {
        let mut vocabulary = command::Vocabulary::default();
        for (field, word, command) in [
            ("vocabulary.start", &self.start, &mut vocabulary.start),
            ("vocabulary.stop", &self.stop, &mut vocabulary.stop),
            ("vocabulary.increase", &self.increase, &mut vocabulary.increase),
            ("vocabulary.decrease", &self.decrease, &mut vocabulary.decrease),
            ("vocabulary.disable", &self.disable, &mut vocabulary.disable),
        ] {
            let Some(word) = word else {
                continue;
            };
            let word = word.trim();
            if word.is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "command words can't be empty".to_string(),
                });
            }
            command.word = word.to_lowercase();
        }

        Ok(vocabulary)
    }
}
