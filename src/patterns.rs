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
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, span, warn, Level, Span};

use crate::pattern::Pattern;
use crate::util::normalize_name;

/// A pattern collection shared between a player and whatever feeds it. Listener callbacks run
/// while the write lock is held, so they never overlap with readers.
pub type SharedPatterns = Arc<RwLock<Patterns>>;

/// Observes changes to a pattern collection.
pub trait Listener: Send + Sync {
    /// Called once when the collection is constructed.
    fn on_created(&mut self, _patterns: &HashMap<String, Arc<Pattern>>) {}

    /// Called after every put or remove.
    fn on_modified(&mut self, _patterns: &HashMap<String, Arc<Pattern>>) {}
}

/// A listener that ignores every notification.
pub struct Silent;

impl Listener for Silent {}

/// Tracks whether a collection has been modified since it was created.
#[derive(Clone, Default)]
pub struct DirtyTracker {
    dirty: Arc<AtomicBool>,
}

impl DirtyTracker {
    /// Creates a new, clean tracker.
    pub fn new() -> DirtyTracker {
        DirtyTracker::default()
    }

    /// Returns true if the tracked collection was modified.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    /// Marks the tracked collection as clean again, e.g. after it was saved.
    pub fn reset(&self) {
        self.dirty.store(false, Ordering::Relaxed);
    }
}

impl Listener for DirtyTracker {
    fn on_created(&mut self, _: &HashMap<String, Arc<Pattern>>) {
        self.reset();
    }

    fn on_modified(&mut self, _: &HashMap<String, Arc<Pattern>>) {
        self.dirty.store(true, Ordering::Relaxed);
    }
}

/// A listener built from a pair of closures.
pub struct Callbacks<C, M>
where
    C: FnMut(&HashMap<String, Arc<Pattern>>) + Send + Sync,
    M: FnMut(&HashMap<String, Arc<Pattern>>) + Send + Sync,
{
    on_created: C,
    on_modified: M,
}

impl<C, M> Callbacks<C, M>
where
    C: FnMut(&HashMap<String, Arc<Pattern>>) + Send + Sync,
    M: FnMut(&HashMap<String, Arc<Pattern>>) + Send + Sync,
{
    /// Creates a listener that calls `on_created` at construction and `on_modified` after
    /// every change.
    pub fn new(on_created: C, on_modified: M) -> Callbacks<C, M> {
        Callbacks {
            on_created,
            on_modified,
        }
    }
}

impl<C, M> Listener for Callbacks<C, M>
where
    C: FnMut(&HashMap<String, Arc<Pattern>>) + Send + Sync,
    M: FnMut(&HashMap<String, Arc<Pattern>>) + Send + Sync,
{
    fn on_created(&mut self, patterns: &HashMap<String, Arc<Pattern>>) {
        (self.on_created)(patterns)
    }

    fn on_modified(&mut self, patterns: &HashMap<String, Arc<Pattern>>) {
        (self.on_modified)(patterns)
    }
}

/// A name-keyed collection of patterns. Names are normalized before they're used as keys.
pub struct Patterns {
    /// The patterns, keyed by normalized name.
    patterns: HashMap<String, Arc<Pattern>>,
    /// Notified of creation and of every change.
    listener: Box<dyn Listener>,
    /// The logging span.
    span: Span,
}

impl fmt::Display for Patterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Patterns ({}):", self.patterns.len())?;
        for name in self.sorted_names() {
            if let Some(pattern) = self.patterns.get(&name) {
                writeln!(f, "  - {}", pattern)?;
            }
        }

        Ok(())
    }
}

impl Patterns {
    /// Creates a new collection from an initial mapping. Patterns are keyed by their own
    /// names; when several map to the same name, the first by original key is kept. The
    /// listener is told about the creation before this returns.
    pub fn new(patterns: HashMap<String, Arc<Pattern>>, listener: Box<dyn Listener>) -> Patterns {
        let span = span!(Level::INFO, "patterns");
        let mut initial: Vec<(String, Arc<Pattern>)> = patterns.into_iter().collect();
        initial.sort_by(|a, b| a.0.cmp(&b.0));

        let mut keyed: HashMap<String, Arc<Pattern>> = HashMap::with_capacity(initial.len());
        {
            let _enter = span.enter();
            for (key, pattern) in initial {
                if keyed.contains_key(pattern.name()) {
                    warn!(
                        key,
                        name = pattern.name(),
                        "Dropping pattern whose name collides with another."
                    );
                    continue;
                }
                keyed.insert(pattern.name().to_string(), pattern);
            }
        }

        let mut collection = Patterns {
            patterns: keyed,
            listener,
            span,
        };
        collection.listener.on_created(&collection.patterns);
        collection
    }

    /// Wraps the collection for sharing between readers and a writer.
    pub fn shared(self) -> SharedPatterns {
        Arc::new(RwLock::new(self))
    }

    /// Inserts a pattern, returning the pattern previously stored under the name.
    pub fn put(&mut self, name: &str, pattern: Arc<Pattern>) -> Option<Arc<Pattern>> {
        let _enter = self.span.enter();
        let name = normalize_name(name);
        debug!(name, "Storing pattern.");
        if name != pattern.name() {
            warn!(
                name,
                pattern = pattern.name(),
                "Storing pattern under a name other than its own."
            );
        }

        let previous = self.patterns.insert(name, pattern);
        self.listener.on_modified(&self.patterns);
        previous
    }

    /// Removes a pattern, returning it if it was present.
    pub fn remove(&mut self, name: &str) -> Option<Arc<Pattern>> {
        let _enter = self.span.enter();
        let name = normalize_name(name);
        debug!(name, "Removing pattern.");

        let removed = self.patterns.remove(&name);
        self.listener.on_modified(&self.patterns);
        removed
    }

    /// Gets the pattern with the given name.
    pub fn get(&self, name: &str) -> Option<Arc<Pattern>> {
        self.patterns.get(&normalize_name(name)).cloned()
    }

    /// Returns true if a pattern with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(&normalize_name(name))
    }

    /// Returns the names of all patterns in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    /// Returns the names of all patterns, alphabetized.
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.patterns.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns true if there are no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns the number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns the underlying mapping, e.g. to hand to a store.
    pub fn as_map(&self) -> &HashMap<String, Arc<Pattern>> {
        &self.patterns
    }
}
