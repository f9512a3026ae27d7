// Session domain model - Segmentation of readings into appliance run cycles
use super::reading::Reading;
use chrono::TimeDelta;
use serde::Deserialize;

/// A maximal run of consecutive non-zero readings from one switch.
///
/// Always holds at least one reading, and never a zero-draw one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    readings: Vec<Reading>,
}

impl Session {
    /// Returns `None` for an empty run or one containing a zero-draw reading.
    pub fn new(readings: Vec<Reading>) -> Option<Self> {
        if readings.is_empty() || !readings.iter().all(Reading::is_drawing) {
            return None;
        }
        Some(Self { readings })
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn first(&self) -> &Reading {
        &self.readings[0]
    }

    pub fn last(&self) -> &Reading {
        &self.readings[self.readings.len() - 1]
    }

    pub fn switch(&self) -> &str {
        &self.first().switch
    }

    /// Wall-clock span between the first and last reading
    pub fn duration(&self) -> TimeDelta {
        self.last().timestamp - self.first().timestamp
    }
}

/// What to do with a run still open when the input ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingRunPolicy {
    /// Drop it: a cycle that never returned to zero is treated as incomplete
    #[default]
    Discard,
    /// Emit it as the final session
    Close,
}

/// Split an ordered reading sequence for one switch into sessions.
///
/// Every zero-draw reading closes the run in progress; zero readings outside a
/// run are consumed. `policy` decides the fate of a run left open at the end.
pub fn extract_sessions<I>(readings: I, policy: TrailingRunPolicy) -> Vec<Session>
where
    I: IntoIterator<Item = Reading>,
{
    let mut sessions = Vec::new();
    let mut current: Vec<Reading> = Vec::new();

    for reading in readings {
        if reading.is_drawing() {
            current.push(reading);
        } else if !current.is_empty() {
            sessions.extend(Session::new(std::mem::take(&mut current)));
        }
    }

    if policy == TrailingRunPolicy::Close {
        sessions.extend(Session::new(current));
    }

    sessions
}
