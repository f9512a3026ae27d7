// Power reading domain model
use chrono::{DateTime, Utc};

/// Instantaneous power draw in milliwatts
pub type Draw = u64;

/// One sampled measurement from a monitored switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub switch: String,
    pub draw: Draw,
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    pub fn new(switch: impl Into<String>, draw: Draw, timestamp: DateTime<Utc>) -> Self {
        Self {
            switch: switch.into(),
            draw,
            timestamp,
        }
    }

    /// True when the appliance was consuming power at this sample
    pub fn is_drawing(&self) -> bool {
        self.draw > 0
    }
}

/// Ordered readings belonging to a single switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchReadings {
    pub switch: String,
    pub readings: Vec<Reading>,
}

#[derive(Debug, Default)]
pub struct SplitReadings {
    pub by_switch: Vec<SwitchReadings>,
    pub unexpected: Vec<Reading>,
}

/// Group a mixed reading stream by switch, keeping input order inside each group.
///
/// Groups follow the order of `expected` and every expected switch gets a group,
/// even an empty one. Readings for labels outside `expected` land in
/// `unexpected`. An empty `expected` accepts every label, grouped in order of
/// first appearance.
pub fn split_by_switch(readings: Vec<Reading>, expected: &[String]) -> SplitReadings {
    let mut split = SplitReadings {
        by_switch: expected
            .iter()
            .map(|switch| SwitchReadings {
                switch: switch.clone(),
                readings: Vec::new(),
            })
            .collect(),
        unexpected: Vec::new(),
    };

    for reading in readings {
        match split
            .by_switch
            .iter_mut()
            .find(|group| group.switch == reading.switch)
        {
            Some(group) => group.readings.push(reading),
            None if expected.is_empty() => split.by_switch.push(SwitchReadings {
                switch: reading.switch.clone(),
                readings: vec![reading],
            }),
            None => split.unexpected.push(reading),
        }
    }

    split
}
