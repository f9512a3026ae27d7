// Repository trait for reading store access
use crate::domain::reading::Reading;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// All readings with a timestamp strictly after `cutoff`, ordered by timestamp
    async fn readings_after(&self, cutoff: DateTime<Utc>) -> anyhow::Result<Vec<Reading>>;

    /// Most recent reading for a switch, if it ever reported
    async fn latest_reading(&self, switch: &str) -> anyhow::Result<Option<Reading>>;
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Reading store backed by a fixed list
    #[derive(Debug, Default)]
    pub struct InMemoryReadingRepository {
        pub readings: Vec<Reading>,
        pub fail: bool,
    }

    impl InMemoryReadingRepository {
        pub fn new(readings: Vec<Reading>) -> Self {
            Self {
                readings,
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                readings: Vec::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl ReadingRepository for InMemoryReadingRepository {
        async fn readings_after(&self, cutoff: DateTime<Utc>) -> anyhow::Result<Vec<Reading>> {
            if self.fail {
                anyhow::bail!("store unavailable");
            }
            Ok(self
                .readings
                .iter()
                .filter(|r| r.timestamp > cutoff)
                .cloned()
                .collect())
        }

        async fn latest_reading(&self, switch: &str) -> anyhow::Result<Option<Reading>> {
            if self.fail {
                anyhow::bail!("store unavailable");
            }
            Ok(self
                .readings
                .iter()
                .filter(|r| r.switch == switch)
                .max_by_key(|r| r.timestamp)
                .cloned())
        }
    }
}
