use super::{
    ChangesDetector, ExcludedPathsChangesDetector, LibrariesChangesDetector, PathChangeRecord,
};
use crate::config::{ConfigManager, ConfigReadError, ConfigWriteError};
use crate::models::{ExcludedPath, ProjectConfig, ReferencedLibrary};
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error(transparent)]
    Read(#[from] ConfigReadError),

    #[error(transparent)]
    Write(#[from] ConfigWriteError),
}

/// Edits to apply to a project's `red.xml` after a resource moved or was deleted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigChange {
    pub excluded_paths: Vec<PathChangeRecord<ExcludedPath>>,
    pub libraries: Vec<PathChangeRecord<ReferencedLibrary>>,
}

impl ConfigChange {
    pub fn is_empty(&self) -> bool {
        self.excluded_paths.is_empty() && self.libraries.is_empty()
    }

    /// Removes and replaces entries in place, keeping the order of the
    /// remaining ones.
    pub fn apply_to(&self, config: &mut ProjectConfig) {
        for record in &self.excluded_paths {
            match record {
                PathChangeRecord::Removed(excluded) => {
                    config.remove_excluded_path(&excluded.path);
                }
                PathChangeRecord::Modified { old, new } => {
                    config.replace_excluded_path(old, new.clone());
                }
            }
        }

        for record in &self.libraries {
            match record {
                PathChangeRecord::Removed(library) => {
                    config.remove_referenced_libraries(std::slice::from_ref(library));
                }
                PathChangeRecord::Modified { old, new } => {
                    config.replace_library(old, new.clone());
                }
            }
        }
    }

    /// Rewrites the project's `red.xml` with this change applied.
    pub fn perform(&self, manager: &ConfigManager) -> Result<ProjectConfig, CollectError> {
        let mut config = manager.load()?;
        self.apply_to(&mut config);
        manager.save(&config)?;

        tracing::info!(
            "Updated {} with {} excluded path and {} library changes",
            manager.config_path(),
            self.excluded_paths.len(),
            self.libraries.len()
        );
        Ok(config)
    }
}

/// Collects the `red.xml` edits caused by moving or deleting a resource.
///
/// Paths are workspace relative, starting with the project name.
pub struct RedXmlChangesCollector<'a> {
    manager: &'a ConfigManager,
    before_path: Utf8PathBuf,
    after_path: Option<Utf8PathBuf>,
}

impl<'a> RedXmlChangesCollector<'a> {
    pub fn new(
        manager: &'a ConfigManager,
        before_path: impl AsRef<Utf8Path>,
        after_path: Option<&Utf8Path>,
    ) -> Self {
        Self {
            manager,
            before_path: before_path.as_ref().to_path_buf(),
            after_path: after_path.map(Utf8Path::to_path_buf),
        }
    }

    /// Runs detection against the current file content.
    ///
    /// # Returns
    /// `None` when no entry of the configuration is affected
    pub fn collect(&self) -> Result<Option<ConfigChange>, CollectError> {
        let config = self.manager.load()?;
        Ok(self.collect_from(&config))
    }

    pub fn collect_from(&self, config: &ProjectConfig) -> Option<ConfigChange> {
        let after_path = self.after_path.as_deref();

        let change = ConfigChange {
            excluded_paths: ExcludedPathsChangesDetector::new(
                &self.before_path,
                after_path,
                self.manager.project_name(),
                config,
            )
            .detect_records(),
            libraries: LibrariesChangesDetector::new(&self.before_path, after_path, config)
                .detect_records(),
        };

        if change.is_empty() {
            tracing::debug!(
                "Change of {} does not affect {}",
                self.before_path,
                self.manager.config_path()
            );
            None
        } else {
            Some(change)
        }
    }
}
