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
use std::io;

use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{info, span, warn, Level};

use super::Event;

/// Separates alternative phrases on one input line, most likely first.
const ALTERNATIVES: char = '|';

/// A driver that reads utterances from the keyboard. Each line stands in for one recognition
/// result and may list several candidate phrases separated by '|'.
pub struct Driver {
    /// The words shown in the prompt.
    words: Vec<String>,
}

impl Driver {
    pub fn new(words: Vec<String>) -> Driver {
        Driver { words }
    }

    /// Reads one line and sends its phrases. Returns false once the input is exhausted or
    /// the controller has stopped listening.
    fn monitor_io<R, W>(
        words: &[String],
        events_tx: &Sender<Event>,
        mut reader: R,
        mut writer: W,
    ) -> Result<bool, io::Error>
    where
        R: io::BufRead,
        W: io::Write,
    {
        if events_tx.is_closed() {
            return Ok(false);
        }

        write!(writer, "Say ({} or a pattern name): ", words.join(", "))?;
        writer.flush()?;
        let mut input: String = String::default();
        if reader.read_line(&mut input)? == 0 {
            return Ok(false);
        }

        let phrases: Vec<String> = input
            .split(ALTERNATIVES)
            .map(str::trim)
            .filter(|phrase| !phrase.is_empty())
            .map(str::to_string)
            .collect();
        if phrases.is_empty() {
            warn!("Nothing was said.");
            return Ok(true);
        }

        if events_tx.blocking_send(Event::Phrases(phrases)).is_err() {
            info!("Controller stopped listening.");
            return Ok(false);
        }
        Ok(true)
    }
}

impl super::Driver for Driver {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>> {
        let words = self.words.clone();
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "keyboard driver");
            let _enter = span.enter();

            info!("Keyboard driver started.");

            while Self::monitor_io(&words, &events_tx, io::stdin().lock(), io::stdout())? {}
            info!("Keyboard input closed.");
            Ok(())
        })
    }
}
