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
use std::{error::Error, fmt, sync::Arc};

pub mod log;
pub mod mock;

/// Something that can actuate a vibration sequence.
pub trait Sink: fmt::Display + Send + Sync {
    /// Plays a sequence of `[leading_wait, vibrate, silence, vibrate, silence, ...]` durations
    /// in milliseconds. `repeat` is the index to loop back to after the end, or None to play
    /// the sequence once.
    fn vibrate(&self, sequence: &[u64], repeat: Option<usize>) -> Result<(), Box<dyn Error>>;

    /// Stops any vibration in progress.
    fn cancel(&self);
}

/// Gets the sink with the given name.
pub fn get_sink(name: &str) -> Result<Arc<dyn Sink>, Box<dyn Error>> {
    if name.starts_with("mock") {
        return Ok(Arc::new(mock::Sink::get(name)));
    }
    if name == log::NAME {
        return Ok(Arc::new(log::Sink::new()));
    }

    Err(format!("unknown vibration sink '{}'", name).into())
}
