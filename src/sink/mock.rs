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

use parking_lot::Mutex;
use tracing::info;

/// A recorded call to a mock sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Vibrate {
        sequence: Vec<u64>,
        repeat: Option<usize>,
    },
    Cancel,
}

/// A mock sink. Doesn't vibrate anything, but remembers what it was asked to do.
#[derive(Clone)]
pub struct Sink {
    name: String,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Sink {
    /// Gets the given mock sink.
    pub fn get(name: &str) -> Sink {
        Sink {
            name: name.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns every call made so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Returns the most recently played sequence.
    pub fn last_sequence(&self) -> Option<Vec<u64>> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            Call::Vibrate { sequence, .. } => Some(sequence.clone()),
            Call::Cancel => None,
        })
    }

    /// Returns true if the last call was a vibrate rather than a cancel.
    pub fn is_vibrating(&self) -> bool {
        matches!(self.calls.lock().last(), Some(Call::Vibrate { .. }))
    }
}

impl super::Sink for Sink {
    fn vibrate(&self, sequence: &[u64], repeat: Option<usize>) -> Result<(), Box<dyn Error>> {
        info!(
            sink = self.name,
            sequence = format!("{:?}", sequence),
            "Vibrating (mock)."
        );
        self.calls.lock().push(Call::Vibrate {
            sequence: sequence.to_vec(),
            repeat,
        });
        Ok(())
    }

    fn cancel(&self) {
        self.calls.lock().push(Call::Cancel);
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
