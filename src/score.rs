use std::fmt;
use std::time::{Duration, Instant};

use crate::passage::Passage;

const NANOS_PER_SEC: f64 = 1e9;

/// Tracks active typing time: from the first accepted keystroke to the
/// keystroke that finishes the passage.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionTimer {
    start: Option<Instant>,
    end: Option<Instant>,
}

impl SessionTimer {
    pub fn start(&mut self) {
        if self.start.is_none() {
            self.start = Some(Instant::now());
        }
    }

    pub fn stop(&mut self) {
        if self.start.is_some() && self.end.is_none() {
            self.end = Some(Instant::now());
        }
    }

    pub fn started(&self) -> bool {
        self.start.is_some()
    }

    pub fn elapsed(&self) -> Option<Duration> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub wpm: f64,
    pub accuracy: f64,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "WPM = {:.1}", self.wpm)?;
        write!(f, "Accuracy = {:.1}", self.accuracy)
    }
}

/// Words per minute over `elapsed_nanos`, and the share of the passage typed
/// right the last time it was typed.
pub fn score(passage: &Passage, elapsed_nanos: u128) -> Score {
    // a one-character passage can finish inside a single clock tick
    let minutes = elapsed_nanos.max(1) as f64 / NANOS_PER_SEC / 60.0;
    let wpm = passage.word_count() as f64 / minutes;
    let accuracy =
        100.0 - (passage.wrong_positions().len() as f64 * 100.0 / passage.len() as f64);

    Score { wpm, accuracy }
}
