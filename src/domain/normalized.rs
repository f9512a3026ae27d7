// Normalized session domain model - Per-second resampling with step-hold
use super::reading::Draw;
use super::session::Session;
use chrono::TimeDelta;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedReading {
    pub switch: String,
    pub draw: Draw,
    pub seconds_since_start: u64,
}

/// A session resampled onto a dense one-second grid starting at offset 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSession {
    readings: Vec<NormalizedReading>,
}

impl NormalizedSession {
    pub fn readings(&self) -> &[NormalizedReading] {
        &self.readings
    }
}

/// Round a non-negative span up to whole seconds. Negative spans clamp to 0.
pub fn whole_seconds_ceil(delta: TimeDelta) -> u64 {
    if delta <= TimeDelta::zero() {
        return 0;
    }
    let seconds = delta.num_seconds() as u64;
    if delta.subsec_nanos() > 0 {
        seconds + 1
    } else {
        seconds
    }
}

/// Resample a session to one entry per second of its duration.
///
/// Each reading is placed at `ceil(t - t0)` seconds; when several land on the
/// same second the latest one wins. Seconds without a reading carry the
/// previous second's draw forward. Readings must be sorted by timestamp.
pub fn normalize(session: &Session) -> NormalizedSession {
    let readings = session.readings();
    debug_assert!(
        readings.windows(2).all(|w| w[0].timestamp <= w[1].timestamp),
        "session readings must be sorted by timestamp"
    );

    let start = session.first().timestamp;
    let duration = whole_seconds_ceil(session.duration());

    let mut slots: Vec<Option<Draw>> = vec![None; duration as usize + 1];
    for reading in readings {
        let offset = whole_seconds_ceil(reading.timestamp - start) as usize;
        // Out-of-order input can land past the end
        if let Some(slot) = slots.get_mut(offset) {
            *slot = Some(reading.draw);
        }
    }

    let switch = session.switch();
    let mut carried = session.first().draw;
    let readings = slots
        .into_iter()
        .enumerate()
        .map(|(offset, slot)| {
            if let Some(draw) = slot {
                carried = draw;
            }
            NormalizedReading {
                switch: switch.to_string(),
                draw: carried,
                seconds_since_start: offset as u64,
            }
        })
        .collect();

    NormalizedSession { readings }
}
