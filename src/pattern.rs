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
use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::util::normalize_name;

/// The shortest segment duration that a pattern may be scaled down to.
pub const MIN_LENGTH_MS: u32 = 50;

/// The longest segment duration that a pattern may be scaled up to.
pub const MAX_LENGTH_MS: u32 = 10_000;

/// The fraction of a duration added or removed for each modifier step.
const SCALER: f64 = 0.25;

/// One vibrate-then-pause segment of a pattern.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DurationPair {
    /// How long the vibration lasts in milliseconds.
    vibrate_ms: u32,
    /// How long the pause after the vibration lasts in milliseconds.
    silence_ms: u32,
}

impl DurationPair {
    /// Creates a new duration pair.
    pub fn new(vibrate_ms: u32, silence_ms: u32) -> DurationPair {
        DurationPair {
            vibrate_ms,
            silence_ms,
        }
    }

    /// Gets the vibration duration in milliseconds.
    pub fn vibrate_ms(&self) -> u32 {
        self.vibrate_ms
    }

    /// Gets the silence duration in milliseconds.
    pub fn silence_ms(&self) -> u32 {
        self.silence_ms
    }

    /// Reinterprets a flat list of alternating vibrate/silence durations as pairs. A trailing
    /// unpaired value is dropped.
    pub fn from_raw(raw: &[u32]) -> Vec<DurationPair> {
        raw.chunks_exact(2)
            .map(|chunk| DurationPair::new(chunk[0], chunk[1]))
            .collect()
    }

    fn scaled(&self, scaling_val: f64) -> DurationPair {
        DurationPair::new(
            scaled_duration(self.vibrate_ms, scaling_val),
            scaled_duration(self.silence_ms, scaling_val),
        )
    }
}

/// Whether a pattern can be scaled one more step in each direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scalability {
    /// Durations can shrink one more step without dropping below the minimum.
    pub can_decrease: bool,
    /// Durations can grow one more step without exceeding the maximum.
    pub can_increase: bool,
}

/// A named vibration pattern. Patterns are immutable; scaling produces a new pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    /// The name of the pattern.
    name: String,
    /// The segments of the pattern in playback order.
    segments: Vec<DurationPair>,
}

impl Pattern {
    /// Creates a new pattern. The name is normalized and must contain something other than
    /// whitespace.
    pub fn new(name: &str, segments: Vec<DurationPair>) -> Result<Pattern, EngineError> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(EngineError::NameMissing);
        }

        Ok(Pattern { name, segments })
    }

    /// Gets the name of the pattern.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the segments of the pattern.
    pub fn segments(&self) -> &[DurationPair] {
        &self.segments
    }

    /// The total time the pattern spends vibrating, in milliseconds.
    pub fn vibration_total_ms(&self) -> u64 {
        self.segments.iter().map(|p| u64::from(p.vibrate_ms)).sum()
    }

    /// The total time the pattern spends silent, in milliseconds.
    pub fn silence_total_ms(&self) -> u64 {
        self.segments.iter().map(|p| u64::from(p.silence_ms)).sum()
    }

    /// Scales every duration in the pattern by the given number of steps. A modifier of
    /// zero returns the pattern itself.
    pub fn scale(&self, modifier: i32) -> Cow<'_, Pattern> {
        if modifier == 0 {
            return Cow::Borrowed(self);
        }

        let scaling_val = SCALER * f64::from(modifier);
        Cow::Owned(Pattern {
            name: self.name.clone(),
            segments: self
                .segments
                .iter()
                .map(|pair| pair.scaled(scaling_val))
                .collect(),
        })
    }

    /// Determines whether the pattern, already scaled by `modifier`, can be scaled one
    /// further step down or up while every segment stays within the length bounds.
    pub fn is_scalable(&self, modifier: i32) -> Scalability {
        let dec_scaling_val = SCALER * (f64::from(modifier) - 1.0);
        let inc_scaling_val = SCALER * (f64::from(modifier) + 1.0);
        let mut can_decrease = true;
        let mut can_increase = true;
        let last_index = self.segments.len().saturating_sub(1);

        for (i, pair) in self.segments.iter().enumerate() {
            if can_decrease {
                let next = pair.scaled(dec_scaling_val);
                // A pattern may end on a vibration, so a zero final silence doesn't count.
                let ignore_silence = i == last_index && pair.silence_ms == 0;
                if next.vibrate_ms < MIN_LENGTH_MS
                    || (!ignore_silence && next.silence_ms < MIN_LENGTH_MS)
                {
                    can_decrease = false;
                }
            }
            if can_increase {
                let next = pair.scaled(inc_scaling_val);
                if next.vibrate_ms > MAX_LENGTH_MS || next.silence_ms > MAX_LENGTH_MS {
                    can_increase = false;
                }
            }
        }

        if self.vibration_total_ms() == 0 || self.silence_total_ms() == 0 {
            return Scalability {
                can_decrease: false,
                can_increase: false,
            };
        }

        Scalability {
            can_decrease,
            can_increase,
        }
    }

    /// Flattens the pattern into the sequence consumed by a vibration sink:
    /// `[leading_wait_ms, v1, s1, v2, s2, ...]`.
    pub fn playback_sequence(&self, leading_wait_ms: u64) -> Vec<u64> {
        let mut sequence = Vec::with_capacity(self.segments.len() * 2 + 1);
        sequence.push(leading_wait_ms);
        for pair in self.segments.iter() {
            sequence.push(u64::from(pair.vibrate_ms));
            sequence.push(u64::from(pair.silence_ms));
        }
        sequence
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Segments: {}, Vibration: {}ms, Silence: {}ms)",
            self.name,
            self.segments.len(),
            self.vibration_total_ms(),
            self.silence_total_ms(),
        )
    }
}

/// Scales a single duration, truncating toward zero and never going negative.
fn scaled_duration(duration: u32, scaling_val: f64) -> u32 {
    (f64::from(duration) * (1.0 + scaling_val)).max(0.0) as u32
}

#[cfg(test)]
mod test {
    use std::borrow::Cow;

    use super::{DurationPair, Pattern, Scalability};

    fn pattern(pairs: &[(u32, u32)]) -> Pattern {
        Pattern::new(
            "TEST",
            pairs
                .iter()
                .map(|(v, s)| DurationPair::new(*v, *s))
                .collect(),
        )
        .expect("pattern should be valid")
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(Pattern::new("   ", vec![DurationPair::new(100, 100)]).is_err());
    }

    #[test]
    fn test_name_is_normalized() {
        let p = Pattern::new("  slow \t wave ", vec![DurationPair::new(100, 100)])
            .expect("pattern should be valid");
        assert_eq!("SLOW WAVE", p.name());
        assert_eq!("SLOW WAVE", p.scale(2).name());
    }

    #[test]
    fn test_is_scalable_extreme_modifiers() {
        // Projections saturate instead of overflowing the modifier.
        let p = pattern(&[(100, 100)]);
        assert_eq!(
            Scalability {
                can_decrease: true,
                can_increase: false
            },
            p.is_scalable(i32::MAX)
        );
        assert_eq!(
            Scalability {
                can_decrease: false,
                can_increase: true
            },
            p.is_scalable(i32::MIN)
        );
    }

    #[test]
    fn test_scale_zero_is_identity() {
        let original = pattern(&[(100, 200), (300, 0)]);
        let scaled = original.scale(0);
        assert!(matches!(scaled, Cow::Borrowed(_)));
        assert_eq!(original, *scaled);
    }

    #[test]
    fn test_scale() {
        let original = pattern(&[(100, 200), (1000, 0)]);

        let longer = original.scale(1);
        assert_eq!("TEST", longer.name());
        assert_eq!(
            vec![DurationPair::new(125, 250), DurationPair::new(1250, 0)],
            longer.segments()
        );

        let shorter = original.scale(-1);
        assert_eq!(
            vec![DurationPair::new(75, 150), DurationPair::new(750, 0)],
            shorter.segments()
        );

        // Scaling past -4 would go negative, which clamps to zero.
        let gone = original.scale(-5);
        assert_eq!(
            vec![DurationPair::new(0, 0), DurationPair::new(0, 0)],
            gone.segments()
        );

        // The original is untouched.
        assert_eq!(
            vec![DurationPair::new(100, 200), DurationPair::new(1000, 0)],
            original.segments()
        );
    }

    #[test]
    fn test_scale_truncates() {
        let original = pattern(&[(101, 99)]);
        // 101 * 0.75 = 75.75, 99 * 0.75 = 74.25
        assert_eq!(vec![DurationPair::new(75, 74)], original.scale(-1).segments());
    }

    #[test]
    fn test_scale_is_lossy() {
        let original = pattern(&[(101, 333)]);
        let round_trip = original.scale(-1).scale(1).into_owned();
        // 101 -> 75 -> 93, 333 -> 249 -> 311
        assert_eq!(vec![DurationPair::new(93, 311)], round_trip.segments());
        assert!(round_trip.segments()[0].vibrate_ms() <= 101);
        assert!(round_trip.segments()[0].silence_ms() <= 333);
    }

    #[test]
    fn test_is_scalable_simple() {
        let p = pattern(&[(100, 100)]);
        assert_eq!(
            Scalability {
                can_decrease: true,
                can_increase: true
            },
            p.is_scalable(0)
        );

        // At -1, one more step down is 100 * 0.5 = 50, still allowed.
        assert!(p.is_scalable(-1).can_decrease);
        // At -2, one more step down is 100 * 0.25 = 25.
        assert!(!p.is_scalable(-2).can_decrease);
        assert!(p.is_scalable(-2).can_increase);
    }

    #[test]
    fn test_is_scalable_upper_bound() {
        let p = pattern(&[(8000, 100)]);
        // 8000 * 1.25 = 10000, allowed.
        assert!(p.is_scalable(0).can_increase);
        // 8000 * 1.5 = 12000, too long.
        assert!(!p.is_scalable(1).can_increase);
        assert!(p.is_scalable(1).can_decrease);
    }

    #[test]
    fn test_is_scalable_trailing_zero_silence() {
        // The trailing zero silence is ignored, so only the vibration counts. 50 * 0.75 = 37.
        let p = pattern(&[(50, 100), (50, 0)]);
        assert!(!p.is_scalable(0).can_decrease);

        let p = pattern(&[(100, 100), (100, 0)]);
        assert_eq!(
            Scalability {
                can_decrease: true,
                can_increase: true
            },
            p.is_scalable(0)
        );

        // A zero silence anywhere but the end still blocks decreasing.
        let p = pattern(&[(100, 0), (100, 100)]);
        assert!(!p.is_scalable(0).can_decrease);
        assert!(p.is_scalable(0).can_increase);
    }

    #[test]
    fn test_is_scalable_degenerate() {
        // No silence at all.
        let p = pattern(&[(50, 0)]);
        assert_eq!(
            Scalability {
                can_decrease: false,
                can_increase: false
            },
            p.is_scalable(0)
        );

        // No vibration at all.
        let p = pattern(&[(0, 500), (0, 500)]);
        assert_eq!(
            Scalability {
                can_decrease: false,
                can_increase: false
            },
            p.is_scalable(0)
        );

        // No segments at all.
        let p = pattern(&[]);
        assert_eq!(
            Scalability {
                can_decrease: false,
                can_increase: false
            },
            p.is_scalable(3)
        );
    }

    #[test]
    fn test_playback_sequence() {
        let p = pattern(&[(100, 200), (300, 400)]);
        assert_eq!(vec![0, 100, 200, 300, 400], p.playback_sequence(0));
        assert_eq!(vec![500, 100, 200, 300, 400], p.playback_sequence(500));

        let empty = pattern(&[]);
        assert_eq!(vec![250], empty.playback_sequence(250));
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(
            vec![DurationPair::new(1000, 4000)],
            DurationPair::from_raw(&[1000, 4000])
        );
        assert_eq!(
            vec![DurationPair::new(1, 2), DurationPair::new(3, 4)],
            DurationPair::from_raw(&[1, 2, 3, 4, 5])
        );
        assert!(DurationPair::from_raw(&[]).is_empty());
    }
}
