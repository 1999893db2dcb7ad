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

use std::time::Duration;

/// Collapses runs of whitespace into single spaces, trims the ends and upper-cases the
/// result. Pattern names are stored and compared in this form.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_uppercase()
}

/// Returns true if every character of the string is a letter or whitespace.
pub fn is_spellable(name: &str) -> bool {
    name.chars().all(|c| c.is_alphabetic() || c.is_whitespace())
}

/// Outputs the given duration as the number of whole seconds remaining.
pub fn whole_seconds(duration: Duration) -> u64 {
    duration.as_millis() as u64 / 1000
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crate::util::{is_spellable, normalize_name, whole_seconds};

    #[test]
    fn test_normalize_name() {
        assert_eq!("SLOW WAVE", normalize_name("  slow \t  wave\n"));
        assert_eq!("PULSE", normalize_name("Pulse"));
        assert_eq!("", normalize_name(" \t "));
    }

    #[test]
    fn test_is_spellable() {
        assert!(is_spellable("slow wave"));
        assert!(is_spellable("Ünïcode"));
        assert!(!is_spellable("wave 2"));
        assert!(!is_spellable("wave-two"));
    }

    #[test]
    fn test_whole_seconds() {
        assert_eq!(0, whole_seconds(Duration::from_millis(999)));
        assert_eq!(4, whole_seconds(Duration::from_millis(4000)));
        assert_eq!(4, whole_seconds(Duration::from_millis(4999)));
    }
}
