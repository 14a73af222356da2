//! Tag use case for a single source file

use crate::domain::fingerprint::fingerprint;
use crate::domain::{Marker, ResourceId};
use crate::error::{Result, TaggerError};
use crate::infrastructure::repository::LockedFile;
use crate::infrastructure::revision::RevisionLookup;
use crate::infrastructure::{DialectRegistry, TaggerConfig};
use std::path::{Path, PathBuf};

/// A marker written (or to be written) on one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceChange {
    pub id: ResourceId,
    /// Marker value found before tagging, if any
    pub previous: Option<String>,
    pub marker: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub modified: bool,
    pub changes: Vec<ResourceChange>,
}

pub struct TaggingService<R: RevisionLookup> {
    config: TaggerConfig,
    registry: DialectRegistry,
    revisions: R,
}

impl<R: RevisionLookup> TaggingService<R> {
    pub fn new(config: TaggerConfig, revisions: R) -> Self {
        let registry = config.registry();
        TaggingService {
            config,
            registry,
            revisions,
        }
    }

    pub fn registry(&self) -> &DialectRegistry {
        &self.registry
    }

    /// Bring every resource marker in `path` up to date.
    ///
    /// The file is held under an exclusive lock from read to write and is
    /// written at most once. With `dry_run` nothing is written but the
    /// outcome reports what would change.
    pub fn process_file(&self, path: &Path, dry_run: bool) -> Result<FileOutcome> {
        if !path.exists() {
            return Err(TaggerError::NotFound(path.to_path_buf()));
        }
        let dialect = self
            .registry
            .dialect_for(path)
            .ok_or_else(|| TaggerError::UnsupportedFormat(path.to_path_buf()))?;

        let mut file = LockedFile::open(path)?;
        let original = file.read_to_string()?;
        let resources = dialect.parse(&original)?;

        tracing::debug!(
            path = %path.display(),
            dialect = %dialect,
            resources = resources.len(),
            "parsed source file"
        );

        if resources.is_empty() {
            return Ok(FileOutcome {
                path: path.to_path_buf(),
                modified: false,
                changes: Vec::new(),
            });
        }

        let revision = self.revisions.last_revision(path);
        let key = self.config.marker_key.as_str();
        let mut text = original.clone();
        let mut changes = Vec::new();

        for resource in resources.values() {
            let marker = Marker::new(
                resource.id.clone(),
                fingerprint(&resource.content, self.config.fingerprint_length),
                revision.clone(),
            );
            let existing = dialect.last_marker(resource, key);

            if marker.matches(existing) {
                tracing::debug!(resource = %resource.id, "marker up to date");
                continue;
            }

            let value = marker.to_string();
            text = match dialect.inject(&text, resource, key, &value) {
                Ok(updated) => updated,
                Err(TaggerError::InjectionNotFound(target)) => {
                    tracing::warn!(
                        path = %path.display(),
                        resource = %resource.id,
                        "could not locate {} in source text, skipping",
                        target
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };

            tracing::debug!(resource = %resource.id, marker = %value, "marker updated");
            changes.push(ResourceChange {
                id: resource.id.clone(),
                previous: existing.map(str::to_string),
                marker: value,
            });
        }

        let modified = !changes.is_empty() && text != original;
        if modified && !dry_run {
            file.write_all(&text)?;
        }

        Ok(FileOutcome {
            path: path.to_path_buf(),
            modified,
            changes: if modified { changes } else { Vec::new() },
        })
    }
}
