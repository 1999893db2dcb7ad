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
use std::{error::Error, fmt};

use tracing::{info, span, Level, Span};

/// The name the log sink is configured with.
pub const NAME: &str = "log";

/// A sink that reports sequences through the log instead of actuating anything.
pub struct Sink {
    span: Span,
}

impl Sink {
    /// Creates a new log sink.
    pub fn new() -> Sink {
        Sink {
            span: span!(Level::INFO, "log sink"),
        }
    }
}

impl super::Sink for Sink {
    fn vibrate(&self, sequence: &[u64], repeat: Option<usize>) -> Result<(), Box<dyn Error>> {
        let _enter = self.span.enter();
        let total_ms: u64 = sequence.iter().sum();
        info!(
            sequence = format!("{:?}", sequence),
            repeat = format!("{:?}", repeat),
            total_ms,
            "Vibrating."
        );
        Ok(())
    }

    fn cancel(&self) {
        let _enter = self.span.enter();
        info!("Vibration cancelled.");
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", NAME)
    }
}
