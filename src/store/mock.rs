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
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::info;

use super::{predefined_patterns, PatternMap, StoreError};

/// An in-memory store. Doesn't persist anything past its own lifetime.
#[derive(Default)]
pub struct Store {
    patterns: Mutex<PatternMap>,
    fail: AtomicBool,
    saves: AtomicUsize,
    clears: AtomicUsize,
}

impl Store {
    /// Creates a mock store seeded with the predefined patterns.
    pub fn new() -> Store {
        Store::with_patterns(
            predefined_patterns()
                .into_iter()
                .map(|pattern| (pattern.name().to_string(), pattern.into()))
                .collect(),
        )
    }

    /// Creates a mock store holding the given patterns.
    pub fn with_patterns(patterns: PatternMap) -> Store {
        Store {
            patterns: Mutex::new(patterns),
            ..Default::default()
        }
    }

    /// Makes every following call fail, or succeed again.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }

    /// The number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// The number of successful clears.
    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("mock store set to fail".to_string()));
        }
        Ok(())
    }
}

impl super::Store for Store {
    fn load_all(&self) -> Result<PatternMap, StoreError> {
        self.check()?;
        Ok(self.patterns.lock().clone())
    }

    fn save_all(&self, patterns: &PatternMap) -> Result<(), StoreError> {
        self.check()?;
        info!(count = patterns.len(), "Saving patterns (mock).");
        let mut stored = self.patterns.lock();
        for (name, pattern) in patterns.iter() {
            stored.insert(name.clone(), pattern.clone());
        }
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.check()?;
        self.patterns.lock().clear();
        self.clears.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
