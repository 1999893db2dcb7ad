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

use tracing::{error, info, span, Level, Span};

use crate::error::EngineError;
use crate::pattern::{DurationPair, Pattern};
use crate::patterns::Patterns;
use crate::util::{is_spellable, normalize_name};

/// The rules a proposed pattern name must satisfy before a capture can start.
#[derive(Clone, Debug)]
pub struct NameRules {
    /// The maximum number of characters in a normalized name.
    max_length: usize,
    /// Words that can't be used as names. Compared case-insensitively.
    reserved: Vec<String>,
}

impl NameRules {
    /// Creates new name rules.
    pub fn new<I, S>(max_length: usize, reserved: I) -> NameRules
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NameRules {
            max_length,
            reserved: reserved.into_iter().map(Into::into).collect(),
        }
    }

    /// Validates a proposed name against the rules and the existing patterns, returning the
    /// normalized name. Checks run in a fixed order and the first failure is reported.
    pub fn validate(&self, proposed: &str, patterns: &Patterns) -> Result<String, EngineError> {
        let name = normalize_name(proposed);

        if name.is_empty() {
            return Err(EngineError::NameMissing);
        }
        if name.chars().count() > self.max_length {
            return Err(EngineError::NameTooLong(self.max_length));
        }
        if !is_spellable(&name) {
            return Err(EngineError::NameNotSpellable(name));
        }
        if self
            .reserved
            .iter()
            .any(|word| word.to_lowercase() == name.to_lowercase())
        {
            return Err(EngineError::NameReserved(name));
        }
        if patterns.contains(&name) {
            return Err(EngineError::NameDuplicate(name));
        }

        Ok(name)
    }
}

/// What the caller wants captured when the first press arrives.
#[derive(Clone, Debug)]
pub struct Request {
    /// The proposed pattern name, before normalization.
    pub name: String,
    /// How long the capture runs, measured from the first press.
    pub duration: Duration,
}

impl Request {
    /// Creates a new capture request.
    pub fn new(name: &str, duration: Duration) -> Request {
        Request {
            name: name.to_string(),
            duration,
        }
    }
}

/// The outcome of a press or release.
#[derive(Debug, PartialEq, Eq)]
pub enum Transition {
    /// A capture started. The caller should start a countdown for the duration.
    Started { name: String, duration: Duration },
    /// The interval since the previous event was recorded.
    Recorded,
    /// Nothing is being captured, so the event was dropped.
    Ignored,
}

/// The state of an in-progress capture.
struct Session {
    /// The validated, normalized name of the pattern being captured.
    pattern_name: String,
    /// The capture length in milliseconds, relative to the first press.
    deadline_ms: u64,
    /// Alternating vibrate/silence durations, starting with a vibration.
    raw: Vec<u32>,
    /// The timestamp of the previous press or release.
    last_event_ms: u64,
}

impl Session {
    fn record(&mut self, event_ms: u64) {
        let interval = event_ms.saturating_sub(self.last_event_ms);
        self.raw.push(u32::try_from(interval).unwrap_or(u32::MAX));
        self.last_event_ms = event_ms;
    }
}

/// Turns the timing of presses and releases into a pattern.
///
/// The machine is idle until a press arrives with a valid name, at which point it captures
/// until it's either finished (the countdown elapsed) or aborted. Event timestamps are
/// monotonic milliseconds from the same clock.
pub struct Capture {
    /// Rules for the names of new patterns.
    rules: NameRules,
    /// The current capture, if any.
    session: Option<Session>,
    /// The logging span.
    span: Span,
}

impl Capture {
    /// Creates a new, idle capture machine.
    pub fn new(rules: NameRules) -> Capture {
        Capture {
            rules,
            session: None,
            span: span!(Level::INFO, "capture"),
        }
    }

    /// Returns true if a capture is in progress.
    pub fn is_capturing(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the name of the pattern being captured.
    pub fn pattern_name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.pattern_name.as_str())
    }

    /// Returns the durations captured so far.
    pub fn raw_durations(&self) -> &[u32] {
        self.session.as_ref().map_or(&[], |s| s.raw.as_slice())
    }

    /// Handles a press. When idle, this validates the request and starts a capture; nothing
    /// changes if validation fails. When capturing, the silence since the last release is
    /// recorded and the request is ignored.
    pub fn press(
        &mut self,
        event_ms: u64,
        request: &Request,
        patterns: &Patterns,
    ) -> Result<Transition, EngineError> {
        let _enter = self.span.enter();

        if let Some(session) = self.session.as_mut() {
            session.record(event_ms);
            return Ok(Transition::Recorded);
        }

        let name = self.rules.validate(&request.name, patterns)?;
        info!(
            name,
            duration = format!("{:?}", request.duration),
            "Starting capture."
        );

        self.session = Some(Session {
            pattern_name: name.clone(),
            deadline_ms: request.duration.as_millis() as u64,
            raw: Vec::new(),
            last_event_ms: event_ms,
        });
        Ok(Transition::Started {
            name,
            duration: request.duration,
        })
    }

    /// Handles a release, recording the vibration since the last press.
    pub fn release(&mut self, event_ms: u64) -> Transition {
        match self.session.as_mut() {
            Some(session) => {
                session.record(event_ms);
                Transition::Recorded
            }
            None => Transition::Ignored,
        }
    }

    /// Completes the capture once the countdown has elapsed. The time between the last event
    /// and the deadline closes off the final segment, and the resulting pattern is added to
    /// the collection. Returns None if nothing was being captured.
    pub fn finish(&mut self, patterns: &mut Patterns) -> Option<Arc<Pattern>> {
        let _enter = self.span.enter();
        let session = self.session.take()?;

        let mut raw = session.raw;
        let elapsed: u64 = raw.iter().map(|d| u64::from(*d)).sum();
        let time_since_last_event = session.deadline_ms as i64 - elapsed as i64;
        let remainder = u32::try_from(time_since_last_event.max(0)).unwrap_or(u32::MAX);

        if raw.len() % 2 == 0 {
            // Still pressed at the deadline. An empty remainder drops the final segment.
            if time_since_last_event > 0 {
                raw.push(remainder);
                raw.push(0);
            }
        } else {
            // Released at the deadline.
            raw.push(remainder);
        }

        let pattern = match Pattern::new(&session.pattern_name, DurationPair::from_raw(&raw)) {
            Ok(pattern) => Arc::new(pattern),
            Err(e) => {
                error!(err = %e, "Captured pattern was invalid.");
                return None;
            }
        };

        info!(
            name = session.pattern_name,
            segments = pattern.segments().len(),
            "Capture finished."
        );
        patterns.put(&session.pattern_name, pattern.clone());
        Some(pattern)
    }

    /// Abandons the capture, discarding everything recorded. Returns the name of the pattern
    /// that was being captured.
    pub fn abort(&mut self) -> Option<String> {
        let _enter = self.span.enter();
        let session = self.session.take()?;
        info!(name = session.pattern_name, "Capture aborted.");
        Some(session.pattern_name)
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::error::EngineError;
    use crate::pattern::{DurationPair, Pattern};
    use crate::patterns::{DirtyTracker, Patterns, Silent};

    use super::{Capture, NameRules, Request, Transition};

    fn rules() -> NameRules {
        NameRules::new(10, ["start", "stop", "increase", "decrease", "disable"])
    }

    fn patterns() -> Patterns {
        let regular =
            Pattern::new("REGULAR", vec![DurationPair::new(500, 500)]).expect("valid pattern");
        Patterns::new(
            HashMap::from([("REGULAR".to_string(), Arc::new(regular))]),
            Box::new(Silent),
        )
    }

    fn request(name: &str, secs: u64) -> Request {
        Request::new(name, Duration::from_secs(secs))
    }

    #[test]
    fn test_validation() {
        let rules = rules();
        let patterns = patterns();

        assert!(matches!(
            rules.validate("  \t ", &patterns),
            Err(EngineError::NameMissing)
        ));
        assert!(matches!(
            rules.validate("much too long a name", &patterns),
            Err(EngineError::NameTooLong(10))
        ));
        assert!(matches!(
            rules.validate("wave 2", &patterns),
            Err(EngineError::NameNotSpellable(_))
        ));
        assert!(matches!(
            rules.validate("Start", &patterns),
            Err(EngineError::NameReserved(name)) if name == "START"
        ));
        assert!(matches!(
            rules.validate("regular", &patterns),
            Err(EngineError::NameDuplicate(name)) if name == "REGULAR"
        ));
        assert_eq!(
            "SLOW WAVE",
            rules
                .validate(" slow   wave ", &patterns)
                .expect("name should be valid")
        );
    }

    #[test]
    fn test_validation_order() {
        // Too long and not spellable: length is checked first.
        assert!(matches!(
            rules().validate("12345678901", &patterns()),
            Err(EngineError::NameTooLong(_))
        ));
    }

    #[test]
    fn test_invalid_name_stays_idle() {
        let mut capture = Capture::new(rules());
        let patterns = patterns();

        assert!(capture.press(0, &request("stop", 5), &patterns).is_err());
        assert!(!capture.is_capturing());
        assert_eq!(Transition::Ignored, capture.release(100));
    }

    #[test]
    fn test_capture_released_at_deadline() -> Result<(), EngineError> {
        let mut capture = Capture::new(rules());
        let mut patterns = patterns();

        assert_eq!(
            Transition::Started {
                name: "WAVE".to_string(),
                duration: Duration::from_secs(5)
            },
            capture.press(0, &request("wave", 5), &patterns)?
        );
        assert_eq!(Transition::Recorded, capture.release(1000));
        assert_eq!(vec![1000], capture.raw_durations());

        let pattern = capture.finish(&mut patterns).expect("pattern should be captured");
        assert_eq!("WAVE", pattern.name());
        assert_eq!(vec![DurationPair::new(1000, 4000)], pattern.segments());
        assert!(patterns.contains("WAVE"));
        assert!(!capture.is_capturing());
        Ok(())
    }

    #[test]
    fn test_capture_multiple_segments() -> Result<(), EngineError> {
        let mut capture = Capture::new(rules());
        let mut patterns = patterns();

        // Timestamps don't need to start at zero.
        capture.press(10_000, &request("pulse", 5), &patterns)?;
        capture.release(10_200);
        assert_eq!(
            Transition::Recorded,
            capture.press(10_500, &request("ignored", 1), &patterns)?
        );
        capture.release(10_900);
        assert_eq!("PULSE", capture.pattern_name().expect("capturing"));

        let pattern = capture.finish(&mut patterns).expect("pattern should be captured");
        assert_eq!(
            vec![DurationPair::new(200, 300), DurationPair::new(400, 4100)],
            pattern.segments()
        );
        Ok(())
    }

    #[test]
    fn test_capture_pressed_at_deadline() -> Result<(), EngineError> {
        let mut capture = Capture::new(rules());
        let mut patterns = patterns();

        capture.press(0, &request("hold", 5), &patterns)?;
        capture.release(1000);
        capture.press(2000, &request("hold", 5), &patterns)?;

        let pattern = capture.finish(&mut patterns).expect("pattern should be captured");
        assert_eq!(
            vec![DurationPair::new(1000, 1000), DurationPair::new(3000, 0)],
            pattern.segments()
        );
        Ok(())
    }

    #[test]
    fn test_capture_never_released() -> Result<(), EngineError> {
        let mut capture = Capture::new(rules());
        let mut patterns = patterns();

        capture.press(0, &request("hold", 5), &patterns)?;
        let pattern = capture.finish(&mut patterns).expect("pattern should be captured");
        assert_eq!(vec![DurationPair::new(5000, 0)], pattern.segments());
        Ok(())
    }

    #[test]
    fn test_capture_pressed_exactly_at_deadline() -> Result<(), EngineError> {
        let mut capture = Capture::new(rules());
        let mut patterns = patterns();

        capture.press(0, &request("edge", 5), &patterns)?;
        capture.release(1000);
        capture.press(5000, &request("edge", 5), &patterns)?;

        // No time is left for a final vibration, so no trailing segment is added.
        let pattern = capture.finish(&mut patterns).expect("pattern should be captured");
        assert_eq!(vec![DurationPair::new(1000, 4000)], pattern.segments());
        Ok(())
    }

    #[test]
    fn test_capture_released_exactly_at_deadline() -> Result<(), EngineError> {
        let mut capture = Capture::new(rules());
        let mut patterns = patterns();

        capture.press(0, &request("edge", 5), &patterns)?;
        capture.release(5000);

        let pattern = capture.finish(&mut patterns).expect("pattern should be captured");
        assert_eq!(vec![DurationPair::new(5000, 0)], pattern.segments());
        Ok(())
    }

    #[test]
    fn test_capture_zero_length() -> Result<(), EngineError> {
        let mut capture = Capture::new(rules());
        let mut patterns = patterns();

        capture.press(0, &request("empty", 0), &patterns)?;
        let pattern = capture.finish(&mut patterns).expect("pattern should be captured");
        assert!(pattern.segments().is_empty());
        assert_eq!(vec![0], pattern.playback_sequence(0));
        Ok(())
    }

    #[test]
    fn test_abort() -> Result<(), EngineError> {
        let tracker = DirtyTracker::new();
        let mut patterns = Patterns::new(HashMap::new(), Box::new(tracker.clone()));
        let mut capture = Capture::new(rules());

        capture.press(0, &request("wave", 5), &patterns)?;
        capture.release(300);
        assert_eq!(Some("WAVE".to_string()), capture.abort());
        assert!(!capture.is_capturing());
        assert!(capture.raw_durations().is_empty());

        // Nothing was kept, and a late countdown has no effect.
        assert!(capture.finish(&mut patterns).is_none());
        assert!(patterns.is_empty());
        assert!(!tracker.is_dirty());

        // Aborting again is a no-op.
        assert_eq!(None, capture.abort());
        Ok(())
    }
}
