// Status service - Use case for reading the latest draw of each switch
use crate::application::reading_repository::ReadingRepository;
use crate::domain::reading::Reading;
use std::sync::Arc;

#[derive(Clone)]
pub struct StatusService {
    repository: Arc<dyn ReadingRepository>,
    switches: Vec<String>,
}

impl StatusService {
    pub fn new(repository: Arc<dyn ReadingRepository>, switches: Vec<String>) -> Self {
        Self {
            repository,
            switches,
        }
    }

    /// Latest reading per configured switch, skipping switches that never reported
    pub async fn latest_readings(&self) -> anyhow::Result<Vec<Reading>> {
        let mut latest = Vec::with_capacity(self.switches.len());

        for switch in &self.switches {
            match self.repository.latest_reading(switch).await? {
                Some(reading) => latest.push(reading),
                None => tracing::debug!("No readings yet for switch {}", switch),
            }
        }

        Ok(latest)
    }
}
