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
use crate::store::StoreError;

/// Recoverable errors surfaced by the pattern engine. None of these are fatal; the engine
/// is left in the state it was in before the failing call.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("A pattern name is required")]
    NameMissing,

    #[error("Pattern name is longer than {0} characters")]
    NameTooLong(usize),

    #[error("Pattern name '{0}' may only contain letters and spaces")]
    NameNotSpellable(String),

    #[error("Pattern name '{0}' is reserved for a command")]
    NameReserved(String),

    #[error("A pattern named '{0}' already exists")]
    NameDuplicate(String),

    #[error("No pattern is selected")]
    NoPatternSelected,

    #[error("Capture of pattern '{0}' was aborted")]
    CaptureAborted(String),

    #[error("A capture is already in progress")]
    CaptureInProgress,

    #[error("Unknown pattern '{0}'")]
    UnknownPattern(String),

    #[error("Capture duration of {0}s is not allowed")]
    DurationNotAllowed(u64),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}
