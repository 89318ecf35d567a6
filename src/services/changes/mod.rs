//! Keeping `red.xml` entries consistent after resources move or disappear.
//!
//! A detector compares the path of every entry of one kind against the path
//! that was moved or deleted. Entries equal to or nested under that path are
//! reported through a [`ChangesProcessor`]; everything else is left alone.
//! Matching works on whole path segments, so `resource_other` is never
//! treated as a child of `resource`.

pub mod collector;
pub mod excluded;
pub mod libraries;

pub use collector::{CollectError, ConfigChange, RedXmlChangesCollector};
pub use excluded::ExcludedPathsChangesDetector;
pub use libraries::LibrariesChangesDetector;

use crate::models::ProjectConfig;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

#[cfg(test)]
use mockall::automock;

/// Receives the classification of affected entries.
#[cfg_attr(test, automock)]
pub trait ChangesProcessor<T: 'static> {
    /// The entry points at a resource that no longer exists.
    fn path_removed(&mut self, config: &ProjectConfig, entry: &T);

    /// The entry has to be replaced by `new`.
    fn path_modified(&mut self, old: &T, new: T);
}

/// Outcome of change detection for a single entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PathChangeRecord<T> {
    Removed(T),
    Modified { old: T, new: T },
}

pub trait ChangesDetector<T: Clone + 'static> {
    fn detect(&self, processor: &mut dyn ChangesProcessor<T>);

    /// Runs detection and collects the results in report order.
    fn detect_records(&self) -> Vec<PathChangeRecord<T>> {
        let mut recorder = Recorder { records: Vec::new() };
        self.detect(&mut recorder);
        recorder.records
    }
}

struct Recorder<T> {
    records: Vec<PathChangeRecord<T>>,
}

impl<T: Clone + 'static> ChangesProcessor<T> for Recorder<T> {
    fn path_removed(&mut self, _config: &ProjectConfig, entry: &T) {
        self.records.push(PathChangeRecord::Removed(entry.clone()));
    }

    fn path_modified(&mut self, old: &T, new: T) {
        self.records.push(PathChangeRecord::Modified {
            old: old.clone(),
            new,
        });
    }
}

/// Part of `path` below `before`, `None` when `path` is not `before` itself
/// or nested under it.
pub(crate) fn suffix_below<'a>(path: &'a Utf8Path, before: &Utf8Path) -> Option<&'a Utf8Path> {
    path.strip_prefix(before).ok()
}

/// `after` extended by `suffix`.
pub(crate) fn moved_path(after: &Utf8Path, suffix: &Utf8Path) -> Utf8PathBuf {
    if suffix.as_str().is_empty() {
        after.to_path_buf()
    } else {
        after.join(suffix)
    }
}

/// Segments of `path` as stored in `red.xml`.
pub(crate) fn segments(path: &Utf8Path) -> Vec<&str> {
    path.components()
        .filter_map(|component| match component {
            Utf8Component::Normal(segment) => Some(segment),
            _ => None,
        })
        .collect()
}

/// `path` joined with `/` regardless of platform.
pub(crate) fn portable(path: &Utf8Path) -> String {
    let joined = segments(path).join("/");
    if path.has_root() {
        format!("/{}", joined)
    } else {
        joined
    }
}
