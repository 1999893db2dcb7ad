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
use std::sync::Arc;

use crate::pattern::{DurationPair, Pattern};

mod error;
pub mod mock;
pub mod yaml;

pub use error::StoreError;

/// A name-keyed mapping of patterns as exchanged with a store.
pub type PatternMap = HashMap<String, Arc<Pattern>>;

/// Persists pattern collections. Every call is all-or-nothing from the caller's point of
/// view; recovering from a partial write is up to the implementation.
pub trait Store: Send + Sync {
    /// Loads every stored pattern.
    fn load_all(&self) -> Result<PatternMap, StoreError>;

    /// Writes every given pattern. Segments already stored under the same name and position
    /// are replaced.
    fn save_all(&self, patterns: &PatternMap) -> Result<(), StoreError>;

    /// Deletes every stored pattern.
    fn clear(&self) -> Result<(), StoreError>;
}

/// The patterns a brand new store starts out with.
pub fn predefined_patterns() -> Vec<Pattern> {
    [
        ("CONTINUOUS", vec![DurationPair::new(10_000, 0)]),
        ("REGULAR", vec![DurationPair::new(500, 500)]),
    ]
    .into_iter()
    .filter_map(|(name, segments)| Pattern::new(name, segments).ok())
    .collect()
}

/// Opens the store at the given location. Locations starting with "mock" give an in-memory
/// store, anything else is treated as the path of a YAML store file.
pub fn get_store(location: &str) -> Result<Arc<dyn Store>, StoreError> {
    if location.starts_with("mock") {
        return Ok(Arc::new(mock::Store::new()));
    }

    Ok(Arc::new(yaml::Store::open(location)?))
}
