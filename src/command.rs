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
use std::fmt;

/// Actions a recognized phrase can trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Turns the vibrator on.
    Start,
    /// Turns the vibrator off.
    Stop,
    /// Plays the selected pattern faster, i.e. with shorter durations.
    IncreaseFrequency,
    /// Plays the selected pattern slower, i.e. with longer durations.
    DecreaseFrequency,
    /// Stops listening for phrases.
    Disable,
    /// Selects the pattern with the given name.
    Select(String),
    /// Nothing matched. Does nothing.
    Base,
}

/// A command word and what it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The word that triggers the command.
    pub word: String,
    /// A human readable description of the command.
    pub description: String,
}

impl Command {
    /// Creates a new command.
    pub fn new(word: &str, description: &str) -> Command {
        Command {
            word: word.to_string(),
            description: description.to_string(),
        }
    }

    fn matches(&self, phrase: &str) -> bool {
        self.word.to_lowercase() == phrase.to_lowercase()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.word, self.description)
    }
}

/// The fixed set of command words.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub start: Command,
    pub stop: Command,
    pub increase: Command,
    pub decrease: Command,
    pub disable: Command,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Vocabulary {
            start: Command::new("start", "Starts the vibrator."),
            stop: Command::new("stop", "Stops the vibrator."),
            increase: Command::new("increase", "Increases the frequency of the pattern."),
            decrease: Command::new("decrease", "Decreases the frequency of the pattern."),
            disable: Command::new("disable", "Disables voice commands."),
        }
    }
}

impl Vocabulary {
    /// All commands paired with their actions, in the order they're matched.
    fn actions(&self) -> [(&Command, Action); 5] {
        [
            (&self.start, Action::Start),
            (&self.stop, Action::Stop),
            (&self.decrease, Action::DecreaseFrequency),
            (&self.increase, Action::IncreaseFrequency),
            (&self.disable, Action::Disable),
        ]
    }

    /// All commands, for display.
    pub fn commands(&self) -> Vec<&Command> {
        vec![
            &self.start,
            &self.stop,
            &self.increase,
            &self.decrease,
            &self.disable,
        ]
    }

    /// The words that can't be used as pattern names.
    pub fn reserved_words(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .map(|command| command.word.clone())
            .collect()
    }

    /// Resolves recognized phrases, best candidate first, into a single action. Each phrase
    /// is checked against the command words and then against the pattern names; the first
    /// match wins. Comparison ignores case.
    pub fn resolve<'a, P, N>(&self, phrases: P, pattern_names: N) -> Action
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator<Item = &'a str>,
        N::IntoIter: Clone,
    {
        let pattern_names = pattern_names.into_iter();
        for phrase in phrases {
            let phrase = phrase.as_ref();

            if let Some((_, action)) = self
                .actions()
                .into_iter()
                .find(|(command, _)| command.matches(phrase))
            {
                return action;
            }

            if let Some(name) = pattern_names
                .clone()
                .find(|name| name.to_lowercase() == phrase.to_lowercase())
            {
                return Action::Select(name.to_string());
            }
        }

        Action::Base
    }
}
