// Session export service - Use case for turning stored readings into session files
use crate::application::reading_repository::ReadingRepository;
use crate::application::session_writer::SessionWriter;
use crate::domain::reading::split_by_switch;
use crate::domain::report::SwitchReport;
use crate::domain::session::TrailingRunPolicy;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub switch: String,
    pub readings: usize,
    pub sessions: usize,
    pub files: Vec<PathBuf>,
}

#[derive(Clone)]
pub struct SessionExportService {
    repository: Arc<dyn ReadingRepository>,
    writer: Arc<dyn SessionWriter>,
    switches: Vec<String>,
    policy: TrailingRunPolicy,
}

impl SessionExportService {
    pub fn new(
        repository: Arc<dyn ReadingRepository>,
        writer: Arc<dyn SessionWriter>,
        switches: Vec<String>,
        policy: TrailingRunPolicy,
    ) -> Self {
        Self {
            repository,
            writer,
            switches,
            policy,
        }
    }

    /// Fetch everything after `cutoff`, segment it per switch and write it out.
    ///
    /// Switches without any session are reported with no files.
    pub async fn export_after(&self, cutoff: DateTime<Utc>) -> anyhow::Result<Vec<ExportSummary>> {
        let mut readings = self
            .repository
            .readings_after(cutoff)
            .await
            .with_context(|| format!("Failed to fetch readings after {}", cutoff))?;
        readings.sort_by_key(|r| r.timestamp);

        tracing::info!("Fetched {} readings after {}", readings.len(), cutoff);

        let split = split_by_switch(readings, &self.switches);
        for reading in &split.unexpected {
            tracing::warn!("Unexpected reading, switch: {}", reading.switch);
        }

        let mut summaries = Vec::with_capacity(split.by_switch.len());
        for group in split.by_switch {
            let report = SwitchReport::build(group.switch, group.readings, self.policy);

            tracing::debug!(
                "Switch {}: {} readings, {} sessions",
                report.switch,
                report.readings.len(),
                report.sessions.len()
            );

            let files = if report.has_sessions() {
                self.writer
                    .write(&report)
                    .with_context(|| format!("Failed to write sessions for {}", report.switch))?
            } else {
                tracing::warn!("No {} sessions", report.switch);
                Vec::new()
            };

            summaries.push(ExportSummary {
                switch: report.switch,
                readings: report.readings.len(),
                sessions: report.sessions.len(),
                files,
            });
        }

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::reading_repository::testing::InMemoryReadingRepository;
    use crate::domain::reading::{Draw, Reading};
    use chrono::{TimeDelta, TimeZone};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingWriter {
        reports: Mutex<Vec<SwitchReport>>,
    }

    impl SessionWriter for RecordingWriter {
        fn write(&self, report: &SwitchReport) -> anyhow::Result<Vec<PathBuf>> {
            self.reports.lock().unwrap().push(report.clone());
            Ok(vec![PathBuf::from(format!("{}.csv", report.switch))])
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 4, 10, 0, 0, 0).unwrap()
    }

    fn reading(switch: &str, draw: Draw, secs: i64) -> Reading {
        Reading::new(switch, draw, base() + TimeDelta::seconds(secs))
    }

    fn service(
        repository: InMemoryReadingRepository,
        writer: Arc<RecordingWriter>,
        policy: TrailingRunPolicy,
    ) -> SessionExportService {
        SessionExportService::new(
            Arc::new(repository),
            writer,
            vec!["Washer".to_string(), "Dryer".to_string()],
            policy,
        )
    }

    #[tokio::test]
    async fn test_export_writes_switches_with_sessions() {
        // Deliberately out of order: the service sorts before segmenting
        let repository = InMemoryReadingRepository::new(vec![
            reading("Washer", 0, 4),
            reading("Washer", 400, 1),
            reading("Washer", 0, 0),
            reading("Washer", 400, 3),
            reading("Dryer", 0, 2),
            reading("Toaster", 50, 2),
        ]);
        let writer = Arc::new(RecordingWriter::default());

        let summaries = service(repository, writer.clone(), TrailingRunPolicy::Discard)
            .export_after(base() - TimeDelta::seconds(1))
            .await
            .unwrap();

        assert_eq!(
            summaries,
            vec![
                ExportSummary {
                    switch: "Washer".to_string(),
                    readings: 4,
                    sessions: 1,
                    files: vec![PathBuf::from("Washer.csv")],
                },
                ExportSummary {
                    switch: "Dryer".to_string(),
                    readings: 1,
                    sessions: 0,
                    files: Vec::new(),
                },
            ]
        );

        let reports = writer.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        let draws: Vec<(u64, Draw)> = reports[0].normalized[0]
            .readings()
            .iter()
            .map(|r| (r.seconds_since_start, r.draw))
            .collect();
        assert_eq!(draws, vec![(0, 400), (1, 400), (2, 400)]);
    }

    #[tokio::test]
    async fn test_export_respects_cutoff_and_policy() {
        let repository = InMemoryReadingRepository::new(vec![
            reading("Dryer", 700, 0),
            reading("Dryer", 0, 1),
            reading("Dryer", 800, 10),
            reading("Dryer", 820, 11),
        ]);
        let writer = Arc::new(RecordingWriter::default());

        let summaries = service(repository, writer.clone(), TrailingRunPolicy::Close)
            .export_after(base())
            .await
            .unwrap();

        let dryer = summaries.iter().find(|s| s.switch == "Dryer").unwrap();
        assert_eq!(dryer.readings, 3);
        assert_eq!(dryer.sessions, 1);
        assert_eq!(writer.reports.lock().unwrap()[0].sessions[0].readings().len(), 2);
    }

    #[tokio::test]
    async fn test_export_propagates_store_errors() {
        let writer = Arc::new(RecordingWriter::default());

        let result = service(
            InMemoryReadingRepository::failing(),
            writer,
            TrailingRunPolicy::Discard,
        )
        .export_after(base())
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to fetch readings"));
    }
}
