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
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc::Sender, Notify};
use tokio::time::{self, Instant};
use tracing::debug;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Events emitted by a running countdown. Each carries the id of the countdown that emitted
/// it so that events from a cancelled countdown can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Emitted at the start and then once per interval while time remains.
    Tick { id: u64, remaining: Duration },
    /// Emitted once when the countdown runs out. Never emitted after a cancel.
    Finished { id: u64 },
}

/// A countdown that reports ticks and completion over a channel, so that they're handled on
/// the same loop as every other event. Dropping the countdown cancels it.
pub struct Countdown {
    /// Identifies this countdown's events.
    id: u64,
    /// Set once the countdown has been cancelled.
    cancelled: Arc<AtomicBool>,
    /// Wakes the countdown task up when cancelled.
    notify: Arc<Notify>,
}

impl Countdown {
    /// Starts a countdown of the given length that ticks every interval.
    pub fn start(total: Duration, interval: Duration, events_tx: Sender<Event>) -> Countdown {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let interval = interval.max(MIN_INTERVAL);
        let cancelled = Arc::new(AtomicBool::new(false));
        let notify = Arc::new(Notify::new());

        {
            let cancelled = cancelled.clone();
            let notify = notify.clone();
            tokio::spawn(async move {
                let deadline = Instant::now() + total;
                loop {
                    let now = Instant::now();
                    let remaining = deadline.saturating_duration_since(now);
                    if remaining.is_zero() {
                        break;
                    }
                    if cancelled.load(Ordering::Relaxed)
                        || events_tx.send(Event::Tick { id, remaining }).await.is_err()
                    {
                        return;
                    }

                    let next = (now + interval).min(deadline);
                    tokio::select! {
                        _ = time::sleep_until(next) => {}
                        _ = notify.notified() => return,
                    }
                }

                if !cancelled.load(Ordering::Relaxed) {
                    debug!(id, "Countdown finished.");
                    let _ = events_tx.send(Event::Finished { id }).await;
                }
            });
        }

        Countdown {
            id,
            cancelled,
            notify,
        }
    }

    /// The id carried by this countdown's events.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns true if the countdown was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Cancels the countdown. Cancelling a stopped countdown does nothing.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::Relaxed) {
            debug!(id = self.id, "Countdown cancelled.");
            self.notify.notify_one();
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::{Countdown, Event};

    #[tokio::test(start_paused = true)]
    async fn test_countdown_runs_out() {
        let (tx, mut rx) = mpsc::channel(8);
        let countdown = Countdown::start(Duration::from_secs(3), Duration::from_secs(1), tx);
        let id = countdown.id();

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(
            vec![
                Event::Tick {
                    id,
                    remaining: Duration::from_secs(3)
                },
                Event::Tick {
                    id,
                    remaining: Duration::from_secs(2)
                },
                Event::Tick {
                    id,
                    remaining: Duration::from_secs(1)
                },
                Event::Finished { id },
            ],
            events
        );
        assert!(!countdown.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_partial_interval() {
        let (tx, mut rx) = mpsc::channel(8);
        let countdown = Countdown::start(Duration::from_millis(1500), Duration::from_secs(1), tx);
        let id = countdown.id();

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(
            vec![
                Event::Tick {
                    id,
                    remaining: Duration::from_millis(1500)
                },
                Event::Tick {
                    id,
                    remaining: Duration::from_millis(500)
                },
                Event::Finished { id },
            ],
            events
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_cancel() {
        let (tx, mut rx) = mpsc::channel(8);
        let countdown = Countdown::start(Duration::from_secs(5), Duration::from_secs(1), tx);

        assert!(matches!(rx.recv().await, Some(Event::Tick { .. })));
        countdown.cancel();
        assert!(countdown.is_cancelled());

        // Cancelling twice is fine.
        countdown.cancel();

        // The task exits without finishing, closing the channel.
        assert_eq!(None, rx.recv().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_ids_are_unique() {
        let (tx, _rx) = mpsc::channel(8);
        let first = Countdown::start(Duration::from_secs(1), Duration::from_secs(1), tx.clone());
        let second = Countdown::start(Duration::from_secs(1), Duration::from_secs(1), tx);
        assert_ne!(first.id(), second.id());
    }
}
