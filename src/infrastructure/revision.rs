//! Version-control revision lookup

use crate::domain::resource::NO_HISTORY_REVISION;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Source of the revision id stamped into markers.
///
/// Lookups never fail: anything that cannot be resolved yields
/// [`NO_HISTORY_REVISION`].
pub trait RevisionLookup {
    fn last_revision(&self, path: &Path) -> String;
}

/// Asks `git log` for the last commit that touched a file
#[derive(Debug, Clone)]
pub struct GitRevisionLookup {
    timeout: Duration,
}

impl GitRevisionLookup {
    const POLL_INTERVAL: Duration = Duration::from_millis(20);

    pub fn new(timeout: Duration) -> Self {
        GitRevisionLookup { timeout }
    }

    fn query(&self, path: &Path) -> Option<String> {
        let file_name = path.file_name()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut child = Command::new("git")
            .args(["log", "-n", "1", "--pretty=format:%H", "--"])
            .arg(file_name)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| tracing::debug!(error = %e, "could not run git"))
            .ok()?;

        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) if start.elapsed() > self.timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::debug!(
                        path = %path.display(),
                        timeout_secs = self.timeout.as_secs(),
                        "git log timed out"
                    );
                    return None;
                }
                Ok(None) => std::thread::sleep(Self::POLL_INTERVAL),
                Err(e) => {
                    tracing::debug!(error = %e, "failed waiting for git");
                    return None;
                }
            }
        }

        let output = child.wait_with_output().ok()?;
        if !output.status.success() {
            tracing::debug!(path = %path.display(), status = %output.status, "git log failed");
            return None;
        }

        let revision = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if revision.is_empty() {
            None
        } else {
            Some(revision)
        }
    }
}

impl Default for GitRevisionLookup {
    fn default() -> Self {
        GitRevisionLookup::new(Duration::from_secs(10))
    }
}

impl RevisionLookup for GitRevisionLookup {
    fn last_revision(&self, path: &Path) -> String {
        self.query(path).unwrap_or_else(|| {
            tracing::debug!(path = %path.display(), "no revision history, using sentinel");
            NO_HISTORY_REVISION.to_string()
        })
    }
}

/// Returns the same revision id for every file
#[derive(Debug, Clone)]
pub struct FixedRevision(pub String);

impl RevisionLookup for FixedRevision {
    fn last_revision(&self, _path: &Path) -> String {
        self.0.clone()
    }
}
