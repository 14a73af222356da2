//! Output formatting utilities

use crate::application::{BatchReport, FileStatus};

/// Format a batch report for display.
///
/// Errors are always listed. Modified files are listed in verbose and dry-run
/// mode together with their new markers; unchanged files only in verbose mode.
pub fn format_report(report: &BatchReport, verbose: bool) -> String {
    let mut output = String::new();

    for (path, status) in &report.results {
        match status {
            FileStatus::Error(message) => {
                output.push_str(&format!("File {}: {}\n", path.display(), message));
            }
            FileStatus::Modified(changes) if verbose || report.dry_run => {
                let label = if report.dry_run {
                    "would be modified"
                } else {
                    "modified"
                };
                output.push_str(&format!("File {}: {}\n", path.display(), label));
                for change in changes {
                    output.push_str(&format!("  {} -> {}\n", change.id, change.marker));
                }
            }
            FileStatus::Unchanged if verbose => {
                output.push_str(&format!("File {}: unchanged\n", path.display()));
            }
            _ => {}
        }
    }

    output.push_str(&format_summary(report));
    output
}

/// One-line summary of a batch
pub fn format_summary(report: &BatchReport) -> String {
    let files = report.modified_files();
    let markers = report.marker_count();

    if report.dry_run {
        format!(
            "Dry run: {} file(s) would be updated with {} marker(s).",
            files, markers
        )
    } else {
        format!("Updated {} file(s) with {} marker(s).", files, markers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ResourceChange;
    use crate::domain::ResourceId;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn report(dry_run: bool) -> BatchReport {
        let mut report = BatchReport {
            dry_run,
            ..BatchReport::default()
        };
        report.results.insert(
            PathBuf::from("a.tf"),
            FileStatus::Modified(vec![ResourceChange {
                id: ResourceId::block("aws_s3_bucket", "logs"),
                previous: None,
                marker: "aws_s3_bucket.logs:0123456789abcdef0123:abc".to_string(),
            }]),
        );
        report
            .results
            .insert(PathBuf::from("b.tf"), FileStatus::Unchanged);
        report.results.insert(
            PathBuf::from("c.json"),
            FileStatus::Error("No parser found for file type: c.json".to_string()),
        );
        report
    }

    #[test]
    fn test_quiet_output_shows_errors_and_summary() {
        let output = format_report(&report(false), false);
        assert_eq!(
            output,
            "File c.json: No parser found for file type: c.json\n\
             Updated 1 file(s) with 1 marker(s)."
        );
    }

    #[test]
    fn test_verbose_output_lists_every_file() {
        let output = format_report(&report(false), true);
        assert_eq!(
            output,
            "File a.tf: modified\n  \
             aws_s3_bucket.logs -> aws_s3_bucket.logs:0123456789abcdef0123:abc\n\
             File b.tf: unchanged\n\
             File c.json: No parser found for file type: c.json\n\
             Updated 1 file(s) with 1 marker(s)."
        );
    }

    #[test]
    fn test_dry_run_lists_pending_markers() {
        let output = format_report(&report(true), false);
        assert!(output.contains("File a.tf: would be modified"));
        assert!(output.contains("aws_s3_bucket.logs ->"));
        assert!(!output.contains("b.tf"));
        assert!(output.ends_with("Dry run: 1 file(s) would be updated with 1 marker(s)."));
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(
            format_report(&BatchReport::default(), true),
            "Updated 0 file(s) with 0 marker(s)."
        );
    }
}
