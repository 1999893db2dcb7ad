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
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{error, info, span, Level};

use crate::command::{Action, Vocabulary};
use crate::player::Player;

pub mod keyboard;
pub mod touch;

/// Controller events that will trigger behavior in the player.
#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    /// Candidate phrases for a single utterance, most likely first. They're resolved into a
    /// command or a pattern name against the current patterns.
    Phrases(Vec<String>),
}

pub trait Driver: Send + Sync + 'static {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>>;
}

/// Controls a player.
pub struct Controller {
    handle: JoinHandle<()>,
}

impl Controller {
    /// Creates a new controller with the given driver.
    pub fn new(
        player: Player,
        vocabulary: Vocabulary,
        driver: Arc<dyn Driver>,
    ) -> Result<Controller, Box<dyn Error>> {
        Ok(Controller {
            handle: tokio::spawn(async move {
                Controller::trigger_events(player, vocabulary, driver).await
            }),
        })
    }

    /// Join will block until the controller finishes.
    pub async fn join(&mut self) -> Result<(), JoinError> {
        (&mut self.handle).await
    }

    /// Triggers player actions by resolving the phrases the driver hears. Returns once the
    /// disable command is heard or the driver stops.
    async fn trigger_events(mut player: Player, vocabulary: Vocabulary, driver: Arc<dyn Driver>) {
        let span = span!(Level::INFO, "controller");
        let _enter = span.enter();

        let (events_tx, mut events_rx) = mpsc::channel(1);
        let join_handle = driver.monitor_events(events_tx);

        info!(
            selected = player.selected(),
            patterns = player.pattern_names().len(),
            "Controller started."
        );

        loop {
            let Some(event) = events_rx.recv().await else {
                info!("Controller closing.");
                if let Err(e) = join_handle.await {
                    error!("Error waiting for event monitor to stop: {}", e);
                }
                return;
            };

            let Event::Phrases(phrases) = event;
            let names = player.pattern_names();
            let action = vocabulary.resolve(&phrases, names.iter().map(String::as_str));
            info!(
                phrases = format!("{:?}", phrases),
                action = format!("{:?}", action),
                "Resolved phrases."
            );

            if action == Action::Disable {
                // The player is unreachable once the controller returns, so leave it off.
                player.stop();
                info!("Controller disabled.");
                return;
            }

            if let Err(e) = player.execute(&action) {
                error!("Error talking to player: {}", e);
            }
        }
    }
}
