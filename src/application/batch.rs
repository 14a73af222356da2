//! Batch tagging over explicit file lists and directories

use super::tag_file::{ResourceChange, TaggingService};
use crate::error::Result;
use crate::infrastructure::repository::discover_sources;
use crate::infrastructure::revision::RevisionLookup;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Result for one path in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Modified(Vec<ResourceChange>),
    Unchanged,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub results: BTreeMap<PathBuf, FileStatus>,
    pub dry_run: bool,
}

impl BatchReport {
    pub fn modified_files(&self) -> usize {
        self.results
            .values()
            .filter(|status| matches!(status, FileStatus::Modified(_)))
            .count()
    }

    pub fn marker_count(&self) -> usize {
        self.results
            .values()
            .map(|status| match status {
                FileStatus::Modified(changes) => changes.len(),
                _ => 0,
            })
            .sum()
    }

    pub fn has_errors(&self) -> bool {
        self.results
            .values()
            .any(|status| matches!(status, FileStatus::Error(_)))
    }
}

impl<R: RevisionLookup> TaggingService<R> {
    /// Tag each path; failures are recorded per path and never stop the batch.
    pub fn process_files(&self, paths: &[PathBuf], dry_run: bool) -> BatchReport {
        let mut report = BatchReport {
            results: BTreeMap::new(),
            dry_run,
        };

        for path in paths {
            let status = match self.process_file(path, dry_run) {
                Ok(outcome) if outcome.modified => FileStatus::Modified(outcome.changes),
                Ok(_) => FileStatus::Unchanged,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "file failed");
                    FileStatus::Error(e.to_string())
                }
            };
            report.results.insert(path.clone(), status);
        }

        report
    }

    /// Tag every supported file under `dir`.
    ///
    /// A missing or non-directory `dir` fails the whole run.
    pub fn process_directory(&self, dir: &Path, recursive: bool, dry_run: bool) -> Result<BatchReport> {
        let files = discover_sources(dir, recursive, self.registry())?;
        Ok(self.process_files(&files, dry_run))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaggerError;
    use crate::infrastructure::{FixedRevision, TaggerConfig};
    use std::fs;
    use tempfile::TempDir;

    fn service() -> TaggingService<FixedRevision> {
        TaggingService::new(TaggerConfig::default(), FixedRevision("abc123".to_string()))
    }

    #[test]
    fn test_one_bad_file_does_not_abort() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("good.tf");
        let bad = temp.path().join("bad.tf");
        let missing = temp.path().join("missing.tf");
        fs::write(&good, "resource \"a\" \"b\" {\n  x = 1\n}\n").unwrap();
        fs::write(&bad, "resource \"a\" \"b\" {\n").unwrap();

        let report = service().process_files(&[bad.clone(), good.clone(), missing.clone()], false);

        assert!(matches!(report.results[&good], FileStatus::Modified(_)));
        assert!(matches!(report.results[&bad], FileStatus::Error(_)));
        match &report.results[&missing] {
            FileStatus::Error(msg) => assert!(msg.contains("File not found")),
            other => panic!("Expected error, got {:?}", other),
        }
        assert!(report.has_errors());
        assert_eq!(report.modified_files(), 1);
        assert_eq!(report.marker_count(), 1);
    }

    #[test]
    fn test_directory_processing() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("main.tf"),
            "resource \"a\" \"one\" {}\nresource \"a\" \"two\" {}\n",
        )
        .unwrap();
        fs::write(temp.path().join("empty.yaml"), "# nothing\n").unwrap();
        fs::write(temp.path().join("README.md"), "docs").unwrap();

        let report = service()
            .process_directory(temp.path(), false, false)
            .unwrap();

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[&temp.path().join("empty.yaml")], FileStatus::Unchanged);
        assert_eq!(report.marker_count(), 2);
        assert!(!report.has_errors());
    }

    #[test]
    fn test_directory_must_be_a_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("main.tf");
        fs::write(&file, "").unwrap();

        let err = service().process_directory(&file, false, false).unwrap_err();
        assert!(matches!(err, TaggerError::NotADirectory(_)));
    }
}
