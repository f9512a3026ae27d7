// Writer trait for exporting switch reports
use crate::domain::report::SwitchReport;
use std::path::PathBuf;

pub trait SessionWriter: Send + Sync {
    /// Persist a report, returning the files written
    fn write(&self, report: &SwitchReport) -> anyhow::Result<Vec<PathBuf>>;
}
