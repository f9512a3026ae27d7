// CSV session writer - Tabular output of raw, segmented and normalized readings
use crate::application::session_writer::SessionWriter;
use crate::domain::reading::Reading;
use crate::domain::report::SwitchReport;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const QUOTE: u8 = b'|';

#[derive(Debug, Clone)]
pub struct CsvSessionWriter {
    output_dir: PathBuf,
    delimiter: u8,
}

impl CsvSessionWriter {
    pub fn new(output_dir: PathBuf, delimiter: char) -> Result<Self> {
        if !delimiter.is_ascii() || delimiter == QUOTE as char {
            anyhow::bail!("Unsupported CSV delimiter: {:?}", delimiter);
        }
        Ok(Self {
            output_dir,
            delimiter: delimiter as u8,
        })
    }

    fn open(&self, path: &Path) -> Result<csv::Writer<File>> {
        csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote(QUOTE)
            .from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))
    }

    fn write_raw(&self, path: &Path, report: &SwitchReport) -> Result<()> {
        let mut writer = self.open(path)?;
        writer.write_record(["Date", "Time", "Draw"])?;
        for reading in &report.readings {
            writer.write_record(reading_row(reading))?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_sessions(&self, path: &Path, report: &SwitchReport) -> Result<()> {
        let mut writer = self.open(path)?;
        writer.write_record(["Date", "Time", "Draw"])?;
        for session in &report.sessions {
            for reading in session.readings() {
                writer.write_record(reading_row(reading))?;
            }
            write_blank_row(&mut writer)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_normalized(&self, path: &Path, report: &SwitchReport) -> Result<()> {
        let mut writer = self.open(path)?;
        writer.write_record(["Seconds", "Draw"])?;
        for session in &report.normalized {
            for reading in session.readings() {
                writer.write_record([
                    reading.seconds_since_start.to_string(),
                    reading.draw.to_string(),
                ])?;
            }
            write_blank_row(&mut writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl SessionWriter for CsvSessionWriter {
    fn write(&self, report: &SwitchReport) -> Result<Vec<PathBuf>> {
        let Some(first) = report.sessions.first() else {
            return Ok(Vec::new());
        };

        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;

        let stem = format!("{}_{}", report.switch, first.first().timestamp.timestamp());
        let raw = self.output_dir.join(format!("{}_raw.csv", stem));
        let sessions = self.output_dir.join(format!("{}_sessions.csv", stem));
        let normalized = self.output_dir.join(format!("{}_normalized.csv", stem));

        self.write_raw(&raw, report)?;
        self.write_sessions(&sessions, report)?;
        self.write_normalized(&normalized, report)?;

        tracing::info!(
            "Wrote {} {} sessions to {}",
            report.sessions.len(),
            report.switch,
            self.output_dir.display()
        );

        Ok(vec![raw, sessions, normalized])
    }
}

/// Session separator. Written past the csv encoder, which would quote an empty record.
fn write_blank_row(writer: &mut csv::Writer<File>) -> Result<()> {
    writer.flush()?;
    let mut file: &File = writer.get_ref();
    file.write_all(b"\n")?;
    Ok(())
}

fn reading_row(reading: &Reading) -> [String; 3] {
    [
        reading.timestamp.format("%Y-%m-%d").to_string(),
        reading.timestamp.format("%H:%M:%S%.6f").to_string(),
        reading.draw.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::TrailingRunPolicy;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn report() -> SwitchReport {
        let base = Utc.with_ymd_and_hms(2018, 4, 10, 12, 0, 0).unwrap();
        let at = |draw, millis| Reading::new("Washer", draw, base + TimeDelta::milliseconds(millis));
        SwitchReport::build(
            "Washer".to_string(),
            vec![
                at(0, 0),
                at(400, 1_000),
                at(400, 3_000),
                at(0, 4_000),
                at(150, 5_250),
                at(0, 6_000),
            ],
            TrailingRunPolicy::Discard,
        )
    }

    #[test]
    fn test_write_creates_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvSessionWriter::new(dir.path().join("out"), ' ').unwrap();

        let files = writer.write(&report()).unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "Washer_1523361601_raw.csv",
                "Washer_1523361601_sessions.csv",
                "Washer_1523361601_normalized.csv",
            ]
        );
        assert!(files.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_raw_and_session_rows() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvSessionWriter::new(dir.path().to_path_buf(), ' ').unwrap();

        let files = writer.write(&report()).unwrap();

        let raw = fs::read_to_string(&files[0]).unwrap();
        let raw_lines: Vec<&str> = raw.lines().collect();
        assert_eq!(raw_lines.len(), 7);
        assert_eq!(raw_lines[0], "Date Time Draw");
        assert_eq!(raw_lines[2], "2018-04-10 12:00:01.000000 400");

        let sessions = fs::read_to_string(&files[1]).unwrap();
        let session_lines: Vec<&str> = sessions.lines().collect();
        assert_eq!(
            session_lines,
            vec![
                "Date Time Draw",
                "2018-04-10 12:00:01.000000 400",
                "2018-04-10 12:00:03.000000 400",
                "",
                "2018-04-10 12:00:05.250000 150",
                "",
            ]
        );
    }

    #[test]
    fn test_normalized_rows() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvSessionWriter::new(dir.path().to_path_buf(), ',').unwrap();

        let files = writer.write(&report()).unwrap();

        let normalized = fs::read_to_string(&files[2]).unwrap();
        let lines: Vec<&str> = normalized.lines().collect();
        assert_eq!(lines, vec!["Seconds,Draw", "0,400", "1,400", "2,400", "", "0,150", ""]);
    }

    #[test]
    fn test_write_without_sessions_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvSessionWriter::new(dir.path().join("never"), ' ').unwrap();
        let empty = SwitchReport::build("Dryer".to_string(), Vec::new(), TrailingRunPolicy::Discard);

        assert!(writer.write(&empty).unwrap().is_empty());
        assert!(!dir.path().join("never").exists());
    }

    #[test]
    fn test_rejects_unsupported_delimiter() {
        assert!(CsvSessionWriter::new(PathBuf::from("data"), '|').is_err());
        assert!(CsvSessionWriter::new(PathBuf::from("data"), 'é').is_err());
    }
}
