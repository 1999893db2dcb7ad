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
use std::time::Instant;

use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{info, span, Level};

use crate::manager::Touch;

/// A driver that turns the Enter key into a capture surface. Each Enter toggles between
/// pressed and released.
pub struct Driver {}

impl Driver {
    pub fn new() -> Driver {
        Driver {}
    }

    /// Waits for one Enter and sends the resulting touch, stamped by the clock once the key
    /// arrives. Returns false once the input is exhausted or nobody is listening anymore.
    fn monitor_io<R, C>(
        touches_tx: &Sender<Touch>,
        mut reader: R,
        pressed: &mut bool,
        clock: C,
    ) -> Result<bool, io::Error>
    where
        R: io::BufRead,
        C: Fn() -> u64,
    {
        if touches_tx.is_closed() {
            return Ok(false);
        }

        let mut input: String = String::default();
        if reader.read_line(&mut input)? == 0 {
            return Ok(false);
        }

        let event_ms = clock();
        let touch = if *pressed {
            Touch::Release(event_ms)
        } else {
            Touch::Press(event_ms)
        };
        *pressed = !*pressed;

        if touches_tx.blocking_send(touch).is_err() {
            info!("Touch receiver closed.");
            return Ok(false);
        }
        Ok(true)
    }

    /// Sends touches read from stdin until the input closes or the receiver goes away.
    pub fn monitor_touches(&self, touches_tx: Sender<Touch>) -> JoinHandle<Result<(), io::Error>> {
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "touch driver");
            let _enter = span.enter();

            info!("Touch driver started. Press Enter to toggle.");

            let started = Instant::now();
            let clock = || started.elapsed().as_millis() as u64;
            let mut pressed = false;
            while Self::monitor_io(&touches_tx, io::stdin().lock(), &mut pressed, clock)? {}
            Ok(())
        })
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}
