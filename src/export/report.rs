use anyhow::Result;

use super::csv::{CsvExporter, ExportOutcome};
use crate::store::{RecordStore, StoredEntry, TestStatus};

/// The downloadable reports offered to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Every stored weighing
    Full,
    /// Weigh-ins only
    Start,
    /// Weigh-outs only
    End,
}

impl ReportKind {
    pub fn base_name(&self) -> &'static str {
        match self {
            ReportKind::Full => "DB_Completa",
            ReportKind::Start => "T_Start",
            ReportKind::End => "T_End",
        }
    }

    pub fn includes(&self, entry: &StoredEntry) -> bool {
        match self {
            ReportKind::Full => true,
            ReportKind::Start => entry.entry.status == TestStatus::InProgress,
            ReportKind::End => entry.entry.status == TestStatus::Completed,
        }
    }

    /// Export the matching entries, most recent first.
    pub async fn export(&self, store: &RecordStore, exporter: &CsvExporter) -> Result<ExportOutcome> {
        let selected: Vec<StoredEntry> = store.list().await.into_iter().filter(|e| self.includes(e)).collect();
        exporter.export_to_csv(&selected, self.base_name()).await
    }
}

impl std::str::FromStr for ReportKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" | "all" | "db" => Ok(ReportKind::Full),
            "start" | "t-start" | "t_start" => Ok(ReportKind::Start),
            "end" | "t-end" | "t_end" => Ok(ReportKind::End),
            other => anyhow::bail!("Unknown report '{}' (expected full, start or end)", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::read_csv;
    use crate::store::{FormState, KeyStore, SessionPrefs, TestEntry, TestPhase};
    use chrono::Utc;
    use tempfile::tempdir;

    async fn seeded_store(dir: &std::path::Path) -> RecordStore {
        let store = RecordStore::open(KeyStore::new(dir)).await.unwrap();
        let mut form = FormState::new(&SessionPrefs::default(), Utc::now().date_naive());
        for (number, phase) in [("1", TestPhase::Start), ("2", TestPhase::End), ("3", TestPhase::Start)] {
            form.animal_number = number.into();
            store
                .append(TestEntry::from_form(&form, 250.0, phase, Utc::now()))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_reports_filter_by_status() {
        let temp_dir = tempdir().unwrap();
        let store = seeded_store(&temp_dir.path().join("db")).await;
        let exporter = CsvExporter::new(temp_dir.path().join("out"));

        for (kind, expected_rows) in [(ReportKind::Full, 3), (ReportKind::Start, 2), (ReportKind::End, 1)] {
            let ExportOutcome::Written(path) = kind.export(&store, &exporter).await.unwrap() else {
                panic!("{:?} produced no file", kind);
            };
            let rows = read_csv(&std::fs::read_to_string(&path).unwrap());
            assert_eq!(rows.len(), expected_rows + 1, "{:?}", kind);
            assert_eq!(rows[0][0], "id");
            assert!(path.file_name().unwrap().to_string_lossy().starts_with(kind.base_name()));
        }
    }

    #[tokio::test]
    async fn test_empty_report_is_reported() {
        let temp_dir = tempdir().unwrap();
        let store = RecordStore::open(KeyStore::new(temp_dir.path())).await.unwrap();
        let exporter = CsvExporter::new(temp_dir.path());
        assert_eq!(
            ReportKind::End.export(&store, &exporter).await.unwrap(),
            ExportOutcome::NothingToExport
        );
    }

    #[test]
    fn test_parse_report_kind() {
        assert_eq!("Full".parse::<ReportKind>().unwrap(), ReportKind::Full);
        assert_eq!("t-start".parse::<ReportKind>().unwrap(), ReportKind::Start);
        assert_eq!("END".parse::<ReportKind>().unwrap(), ReportKind::End);
        assert!("weekly".parse::<ReportKind>().is_err());
    }
}
