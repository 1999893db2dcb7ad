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
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, Receiver};
use tracing::{debug, info, span, warn, Level, Span};

use crate::capture::{Capture, NameRules, Request, Transition};
use crate::countdown::{self, Countdown};
use crate::error::EngineError;
use crate::pattern::Pattern;
use crate::patterns::{DirtyTracker, Patterns, SharedPatterns};
use crate::store::{predefined_patterns, Store};
use crate::util::whole_seconds;

/// How often a running capture reports the time it has left.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A press or release of the capture surface, stamped with monotonic milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Touch {
    Press(u64),
    Release(u64),
}

/// Manages the pattern collection: capturing new patterns, deleting old ones, and writing
/// changes back to the store when paused.
pub struct Manager {
    /// Where patterns are loaded from and saved to.
    store: Arc<dyn Store>,
    /// The patterns being managed.
    patterns: SharedPatterns,
    /// Set whenever the patterns change after loading.
    tracker: DirtyTracker,
    /// The capture state machine.
    capture: Capture,
    /// The pattern selected for deletion.
    selected: Option<String>,
    /// The name of a capture that was aborted by a pause, reported on the next resume.
    aborted: Option<String>,
    /// The allowed capture lengths in seconds.
    capture_times: Vec<u64>,
    /// The logging span.
    span: Span,
}

impl Manager {
    /// Creates a new manager, loading every pattern from the store.
    pub fn new(
        store: Arc<dyn Store>,
        rules: NameRules,
        capture_times: Vec<u64>,
    ) -> Result<Manager, EngineError> {
        let span = span!(Level::INFO, "manager");
        let tracker = DirtyTracker::new();
        let patterns = {
            let _enter = span.enter();
            let loaded = store.load_all()?;
            info!(count = loaded.len(), "Loaded patterns.");
            Patterns::new(loaded, Box::new(tracker.clone())).shared()
        };

        Ok(Manager {
            store,
            patterns,
            tracker,
            capture: Capture::new(rules),
            selected: None,
            aborted: None,
            capture_times,
            span,
        })
    }

    /// Gets the managed patterns.
    pub fn patterns(&self) -> SharedPatterns {
        self.patterns.clone()
    }

    /// Returns true if the patterns changed since they were loaded or last saved.
    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    /// The allowed capture lengths in seconds.
    pub fn capture_times(&self) -> &[u64] {
        &self.capture_times
    }

    /// Converts a capture length in seconds into a duration, if the length is allowed.
    pub fn capture_duration(&self, seconds: u64) -> Result<Duration, EngineError> {
        if !self.capture_times.contains(&seconds) {
            return Err(EngineError::DurationNotAllowed(seconds));
        }
        Ok(Duration::from_secs(seconds))
    }

    /// Returns true if a capture is in progress.
    pub fn is_capturing(&self) -> bool {
        self.capture.is_capturing()
    }

    /// Handles a press of the capture surface.
    pub fn press(&mut self, event_ms: u64, request: &Request) -> Result<Transition, EngineError> {
        let patterns = self.patterns.read();
        self.capture.press(event_ms, request, &patterns)
    }

    /// Handles a release of the capture surface.
    pub fn release(&mut self, event_ms: u64) -> Transition {
        self.capture.release(event_ms)
    }

    /// Completes the running capture and adds the pattern to the collection.
    pub fn finish(&mut self) -> Option<Arc<Pattern>> {
        let mut patterns = self.patterns.write();
        self.capture.finish(&mut patterns)
    }

    /// Abandons the running capture. Its name is reported by the next resume.
    pub fn abort_capture(&mut self) -> Option<String> {
        let name = self.capture.abort()?;
        self.aborted = Some(name.clone());
        Some(name)
    }

    /// Captures a pattern from a stream of touches. The capture starts with the first press
    /// and ends when its countdown runs out; the remaining whole seconds are handed to
    /// `on_tick` as the countdown progresses. If the touch stream closes first the capture
    /// is aborted and None is returned.
    pub async fn run_capture<F>(
        &mut self,
        request: Request,
        touches: &mut Receiver<Touch>,
        mut on_tick: F,
    ) -> Result<Option<Arc<Pattern>>, EngineError>
    where
        F: FnMut(u64),
    {
        if self.is_capturing() {
            return Err(EngineError::CaptureInProgress);
        }

        let (countdown_tx, mut countdown_rx) = mpsc::channel(4);
        let mut countdown: Option<Countdown> = None;

        loop {
            tokio::select! {
                touch = touches.recv() => match touch {
                    Some(Touch::Press(event_ms)) => {
                        if let Transition::Started { duration, .. } = self.press(event_ms, &request)? {
                            countdown = Some(Countdown::start(duration, TICK_INTERVAL, countdown_tx.clone()));
                        }
                    }
                    Some(Touch::Release(event_ms)) => {
                        self.release(event_ms);
                    }
                    None => {
                        if let Some(name) = self.abort_capture() {
                            warn!(name, "Touches stopped before the capture finished.");
                        }
                        return Ok(None);
                    }
                },
                Some(event) = countdown_rx.recv() => {
                    let current = countdown.as_ref().map(Countdown::id);
                    match event {
                        countdown::Event::Tick { id, remaining } if Some(id) == current => {
                            on_tick(whole_seconds(remaining));
                        }
                        countdown::Event::Finished { id } if Some(id) == current => {
                            return Ok(self.finish());
                        }
                        _ => debug!(event = format!("{:?}", event), "Ignoring stale countdown event."),
                    }
                }
            }
        }
    }

    /// Selects a pattern for deletion.
    pub fn select(&mut self, name: &str) -> Result<(), EngineError> {
        let pattern = self
            .patterns
            .read()
            .get(name)
            .ok_or_else(|| EngineError::UnknownPattern(name.to_string()))?;
        self.selected = Some(pattern.name().to_string());
        Ok(())
    }

    /// Gets the pattern selected for deletion.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Deletes the selected pattern and clears the selection.
    pub fn delete(&mut self) -> Result<Arc<Pattern>, EngineError> {
        let _enter = self.span.enter();
        if self.is_capturing() {
            return Err(EngineError::CaptureInProgress);
        }

        let name = self.selected.take().ok_or(EngineError::NoPatternSelected)?;
        let removed = self
            .patterns
            .write()
            .remove(&name)
            .ok_or(EngineError::UnknownPattern(name))?;
        info!(name = removed.name(), "Deleted pattern.");
        Ok(removed)
    }

    /// Replaces every pattern with the predefined ones.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        let _enter = self.span.enter();
        if self.is_capturing() {
            return Err(EngineError::CaptureInProgress);
        }

        let mut patterns = self.patterns.write();
        for name in patterns.sorted_names() {
            patterns.remove(&name);
        }
        for pattern in predefined_patterns() {
            let name = pattern.name().to_string();
            patterns.put(&name, Arc::new(pattern));
        }
        self.selected = None;
        info!("Restored predefined patterns.");
        Ok(())
    }

    /// Pauses the manager. A running capture is aborted and any changes are saved. Returns
    /// true if anything was written.
    pub fn pause(&mut self) -> Result<bool, EngineError> {
        self.abort_capture();
        self.save()
    }

    /// Resumes the manager, reporting a capture that the last pause aborted. The abort is
    /// only reported once.
    pub fn resume(&mut self) -> Result<(), EngineError> {
        match self.aborted.take() {
            Some(name) => Err(EngineError::CaptureAborted(name)),
            None => Ok(()),
        }
    }

    /// Writes the patterns to the store if they changed. Returns true if anything was
    /// written. On failure the patterns stay dirty.
    pub fn save(&self) -> Result<bool, EngineError> {
        let _enter = self.span.enter();
        if !self.tracker.is_dirty() {
            debug!("Patterns unchanged, nothing to save.");
            return Ok(false);
        }

        let patterns = self.patterns.read();
        self.store.clear()?;
        self.store.save_all(patterns.as_map())?;
        self.tracker.reset();
        info!(count = patterns.len(), "Saved patterns.");
        Ok(true)
    }
}
