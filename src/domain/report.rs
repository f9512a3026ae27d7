// Switch report domain model - Raw readings with their derived sessions
use super::normalized::{normalize, NormalizedSession};
use super::reading::Reading;
use super::session::{extract_sessions, Session, TrailingRunPolicy};

#[derive(Debug, Clone)]
pub struct SwitchReport {
    pub switch: String,
    pub readings: Vec<Reading>,
    pub sessions: Vec<Session>,
    pub normalized: Vec<NormalizedSession>,
}

impl SwitchReport {
    /// Segment and normalize the ordered readings of one switch
    pub fn build(switch: String, readings: Vec<Reading>, policy: TrailingRunPolicy) -> Self {
        let sessions = extract_sessions(readings.iter().cloned(), policy);
        let normalized = sessions.iter().map(normalize).collect();
        Self {
            switch,
            readings,
            sessions,
            normalized,
        }
    }

    pub fn has_sessions(&self) -> bool {
        !self.sessions.is_empty()
    }
}
