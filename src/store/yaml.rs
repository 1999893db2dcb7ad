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
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, span, warn, Level, Span};

use crate::pattern::{DurationPair, Pattern};

use super::{predefined_patterns, PatternMap, StoreError};

/// A single stored segment. Rows are unique on (name, pair_no) and pair numbers start at 1.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
struct Row {
    /// The name of the pattern the segment belongs to.
    name: String,
    /// The position of the segment within the pattern.
    pair_no: u32,
    /// The vibration duration in milliseconds.
    vibrate_ms: u32,
    /// The silence duration in milliseconds.
    silence_ms: u32,
}

/// A YAML representation of the store file.
#[derive(Deserialize, Serialize, Default)]
struct StoreFile {
    #[serde(default)]
    rows: Vec<Row>,
}

type RowKey = (String, u32);

/// Stores patterns as rows in a YAML file.
pub struct Store {
    /// The path to the store file.
    path: PathBuf,
    /// Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
    /// The logging span.
    span: Span,
}

impl Store {
    /// Opens the store at the given path. If the file doesn't exist yet, it's created and
    /// seeded with the predefined patterns.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Store, StoreError> {
        let store = Store {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
            span: span!(Level::INFO, "yaml store"),
        };

        if !store.path.exists() {
            let _enter = store.span.enter();
            info!(path = %store.path.display(), "Creating pattern store.");

            let mut rows = BTreeMap::new();
            for pattern in predefined_patterns() {
                insert_rows(&mut rows, &pattern);
            }
            store.write_rows(&rows)?;
        }

        Ok(store)
    }

    /// Reads every row, ordered by (name, pair_no). Later duplicates replace earlier ones.
    fn read_rows(&self) -> Result<BTreeMap<RowKey, Row>, StoreError> {
        let contents = fs::read_to_string(&self.path)?;
        let file: StoreFile = if contents.trim().is_empty() {
            StoreFile::default()
        } else {
            serde_yml::from_str(&contents)?
        };

        Ok(file
            .rows
            .into_iter()
            .map(|row| ((row.name.clone(), row.pair_no), row))
            .collect())
    }

    fn write_rows(&self, rows: &BTreeMap<RowKey, Row>) -> Result<(), StoreError> {
        let file = StoreFile {
            rows: rows.values().cloned().collect(),
        };
        fs::write(&self.path, serde_yml::to_string(&file)?)?;
        Ok(())
    }
}

impl super::Store for Store {
    fn load_all(&self) -> Result<PatternMap, StoreError> {
        let _enter = self.span.enter();
        let _guard = self.lock.lock();

        let mut patterns = PatternMap::new();
        let mut current: Option<(String, Vec<DurationPair>)> = None;
        for row in self.read_rows()?.into_values() {
            match current.as_mut() {
                Some((name, segments)) if *name == row.name => {
                    segments.push(DurationPair::new(row.vibrate_ms, row.silence_ms));
                }
                _ => {
                    if let Some((name, segments)) = current.take() {
                        add_pattern(&mut patterns, &name, segments)?;
                    }
                    current = Some((
                        row.name,
                        vec![DurationPair::new(row.vibrate_ms, row.silence_ms)],
                    ));
                }
            }
        }
        if let Some((name, segments)) = current {
            add_pattern(&mut patterns, &name, segments)?;
        }

        info!(
            path = %self.path.display(),
            count = patterns.len(),
            "Loaded patterns."
        );
        Ok(patterns)
    }

    fn save_all(&self, patterns: &PatternMap) -> Result<(), StoreError> {
        let _enter = self.span.enter();
        let _guard = self.lock.lock();

        let mut rows = self.read_rows()?;
        for pattern in patterns.values() {
            insert_rows(&mut rows, pattern);
        }
        self.write_rows(&rows)?;

        info!(
            path = %self.path.display(),
            count = patterns.len(),
            "Saved patterns."
        );
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _enter = self.span.enter();
        let _guard = self.lock.lock();

        info!(path = %self.path.display(), "Clearing patterns.");
        self.write_rows(&BTreeMap::new())
    }
}

fn insert_rows(rows: &mut BTreeMap<RowKey, Row>, pattern: &Pattern) {
    for (i, pair) in pattern.segments().iter().enumerate() {
        let pair_no = i as u32 + 1;
        rows.insert(
            (pattern.name().to_string(), pair_no),
            Row {
                name: pattern.name().to_string(),
                pair_no,
                vibrate_ms: pair.vibrate_ms(),
                silence_ms: pair.silence_ms(),
            },
        );
    }
}

fn add_pattern(
    patterns: &mut PatternMap,
    name: &str,
    segments: Vec<DurationPair>,
) -> Result<(), StoreError> {
    let pattern =
        Pattern::new(name, segments).map_err(|e| StoreError::InvalidPattern(e.to_string()))?;
    if patterns.contains_key(pattern.name()) {
        // Rows are read in name order, so the first spelling of a name wins.
        warn!(
            row_name = name,
            name = pattern.name(),
            "Ignoring stored pattern whose name collides with another."
        );
        return Ok(());
    }
    patterns.insert(pattern.name().to_string(), Arc::new(pattern));
    Ok(())
}
