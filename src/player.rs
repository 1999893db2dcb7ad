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
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, span, warn, Level, Span};

use crate::command::Action;
use crate::error::EngineError;
use crate::pattern::Scalability;
use crate::patterns::SharedPatterns;
use crate::sink::Sink;

/// Plays the selected pattern through a vibration sink and scales it on request.
pub struct Player {
    /// The sink to vibrate through.
    sink: Arc<dyn Sink>,
    /// The patterns available for playback.
    patterns: SharedPatterns,
    /// The name of the selected pattern.
    selected: Option<String>,
    /// How many scaling steps are applied to the selected pattern.
    modifier: i32,
    /// Whether the vibrator is on.
    on: bool,
    /// How long to wait before playing a pattern that was just rescaled.
    wait_after_scaling: Duration,
    /// The logging span.
    span: Span,
}

impl Player {
    /// Creates a new player. The alphabetically first pattern starts out selected.
    pub fn new(
        sink: Arc<dyn Sink>,
        patterns: SharedPatterns,
        wait_after_scaling: Duration,
    ) -> Player {
        let selected = patterns.read().sorted_names().into_iter().next();
        Player {
            sink,
            patterns,
            selected,
            modifier: 0,
            on: false,
            wait_after_scaling,
            span: span!(Level::INFO, "player"),
        }
    }

    /// Gets the patterns the player plays from.
    pub fn patterns(&self) -> SharedPatterns {
        self.patterns.clone()
    }

    /// Gets the names of all playable patterns, alphabetized.
    pub fn pattern_names(&self) -> Vec<String> {
        self.patterns.read().sorted_names()
    }

    /// Gets the name of the selected pattern.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Gets the current scaling modifier.
    pub fn modifier(&self) -> i32 {
        self.modifier
    }

    /// Returns true if the vibrator is on.
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Whether the selected pattern can be played faster (decrease) or slower (increase).
    pub fn scalability(&self) -> Scalability {
        let pattern = self
            .selected
            .as_ref()
            .and_then(|name| self.patterns.read().get(name));

        match pattern {
            Some(pattern) => pattern.is_scalable(self.modifier),
            None => Scalability {
                can_decrease: false,
                can_increase: false,
            },
        }
    }

    /// Carries out a resolved action.
    pub fn execute(&mut self, action: &Action) -> Result<(), Box<dyn Error>> {
        match action {
            Action::Start => self.start(),
            Action::Stop => {
                self.stop();
                Ok(())
            }
            Action::IncreaseFrequency => self.faster().map(|_| ()),
            Action::DecreaseFrequency => self.slower().map(|_| ()),
            Action::Select(name) => self.select(name),
            Action::Disable | Action::Base => Ok(()),
        }
    }

    /// Turns the vibrator on and starts playing the selected pattern.
    pub fn start(&mut self) -> Result<(), Box<dyn Error>> {
        let _enter = self.span.enter();

        if self.on {
            info!("Vibrator is already on.");
            return Ok(());
        }
        if self.patterns.read().is_empty() {
            warn!("There are no patterns to play.");
            return Ok(());
        }

        info!(pattern = self.selected.as_deref(), "Turning vibrator on.");
        self.on = true;
        self.vibrate(Duration::ZERO)
    }

    /// Turns the vibrator off and forgets any scaling.
    pub fn stop(&mut self) {
        let _enter = self.span.enter();

        if !self.on {
            return;
        }

        info!("Turning vibrator off.");
        self.on = false;
        self.sink.cancel();
        self.modifier = 0;
    }

    /// Selects a pattern. If the vibrator is on, the new pattern starts playing unscaled.
    pub fn select(&mut self, name: &str) -> Result<(), Box<dyn Error>> {
        let _enter = self.span.enter();

        let pattern = {
            let patterns = self.patterns.read();
            if patterns.is_empty() {
                warn!("There are no patterns to select.");
                return Ok(());
            }
            patterns
                .get(name)
                .ok_or_else(|| EngineError::UnknownPattern(name.to_string()))?
        };

        if self.selected.as_deref() == Some(pattern.name()) {
            return Ok(());
        }

        info!(pattern = pattern.name(), "Selecting pattern.");
        self.selected = Some(pattern.name().to_string());
        if self.on {
            self.sink.cancel();
            self.modifier = 0;
            self.vibrate(Duration::ZERO)?;
        }
        Ok(())
    }

    /// Plays the selected pattern one step faster, if it can still be shortened. Returns true
    /// if the pattern was rescaled.
    pub fn faster(&mut self) -> Result<bool, Box<dyn Error>> {
        if !self.on || !self.scalability().can_decrease {
            return Ok(false);
        }

        self.rescale(self.modifier - 1)?;
        Ok(true)
    }

    /// Plays the selected pattern one step slower, if it can still be lengthened. Returns
    /// true if the pattern was rescaled.
    pub fn slower(&mut self) -> Result<bool, Box<dyn Error>> {
        if !self.on || !self.scalability().can_increase {
            return Ok(false);
        }

        self.rescale(self.modifier + 1)?;
        Ok(true)
    }

    fn rescale(&mut self, modifier: i32) -> Result<(), Box<dyn Error>> {
        let _enter = self.span.enter();

        self.sink.cancel();
        self.modifier = modifier;
        info!(modifier, "Rescaling pattern.");
        self.vibrate(self.wait_after_scaling)
    }

    fn vibrate(&self, leading_wait: Duration) -> Result<(), Box<dyn Error>> {
        let Some(name) = self.selected.as_ref() else {
            return Ok(());
        };
        let Some(pattern) = self.patterns.read().get(name) else {
            warn!(pattern = name, "Selected pattern no longer exists.");
            return Ok(());
        };

        let sequence = pattern
            .scale(self.modifier)
            .playback_sequence(leading_wait.as_millis() as u64);
        self.sink.vibrate(&sequence, None)
    }
}
