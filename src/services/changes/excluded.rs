use super::{ChangesDetector, ChangesProcessor, moved_path, portable, suffix_below};
use crate::models::{ExcludedPath, ProjectConfig};
use camino::{Utf8Path, Utf8PathBuf};

/// Detects excluded paths affected by moving or deleting `before_path`.
///
/// Excluded paths are stored relative to the project, so each entry is
/// resolved as `<project name>/<stored path>` before matching. Paths passed in
/// are workspace relative.
pub struct ExcludedPathsChangesDetector<'a> {
    before_path: Utf8PathBuf,
    after_path: Option<Utf8PathBuf>,
    project_name: String,
    config: &'a ProjectConfig,
}

impl<'a> ExcludedPathsChangesDetector<'a> {
    pub fn new(
        before_path: impl AsRef<Utf8Path>,
        after_path: Option<&Utf8Path>,
        project_name: impl Into<String>,
        config: &'a ProjectConfig,
    ) -> Self {
        Self {
            before_path: before_path.as_ref().to_path_buf(),
            after_path: after_path.map(Utf8Path::to_path_buf),
            project_name: project_name.into(),
            config,
        }
    }

    fn resolve(&self, excluded: &ExcludedPath) -> Utf8PathBuf {
        let project = Utf8PathBuf::from(&self.project_name);
        if excluded.path.is_empty() {
            project
        } else {
            project.join(&excluded.path)
        }
    }
}

impl ChangesDetector<ExcludedPath> for ExcludedPathsChangesDetector<'_> {
    fn detect(&self, processor: &mut dyn ChangesProcessor<ExcludedPath>) {
        for excluded in self.config.excluded_paths() {
            let resolved = self.resolve(excluded);
            let Some(suffix) = suffix_below(&resolved, &self.before_path) else {
                continue;
            };

            let Some(after_path) = &self.after_path else {
                tracing::debug!("Excluded path '{}' removed", excluded.path);
                processor.path_removed(self.config, excluded);
                continue;
            };

            let moved = moved_path(after_path, suffix);
            match moved.strip_prefix(&self.project_name) {
                Ok(relative) => {
                    let rewritten = ExcludedPath::create(portable(relative));
                    tracing::debug!(
                        "Excluded path '{}' moved to '{}'",
                        excluded.path,
                        rewritten.path
                    );
                    processor.path_modified(excluded, rewritten);
                }
                Err(_) => {
                    tracing::debug!(
                        "Excluded path '{}' moved out of project {}",
                        excluded.path,
                        self.project_name
                    );
                    processor.path_removed(self.config, excluded);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::changes::{MockChangesProcessor, PathChangeRecord};

    fn config_with_excluded(paths: &[&str]) -> ProjectConfig {
        let mut config = ProjectConfig::create();
        for path in paths {
            config.add_excluded_path(path);
        }
        config
    }

    fn standard_config() -> ProjectConfig {
        config_with_excluded(&[
            "",
            "resource",
            "resource/a",
            "resource/b",
            "res/c",
            "resource_other/d",
        ])
    }

    #[test]
    fn test_excluded_paths_reported_for_removal() {
        let config = standard_config();
        let mut processor = MockChangesProcessor::<ExcludedPath>::new();
        for path in ["resource", "resource/a", "resource/b"] {
            processor
                .expect_path_removed()
                .withf(move |_, entry| entry.path == path)
                .times(1)
                .return_const(());
        }
        processor.expect_path_modified().never();

        let detector =
            ExcludedPathsChangesDetector::new("project/resource", None, "project", &config);
        detector.detect(&mut processor);
    }

    #[test]
    fn test_excluded_paths_reported_for_modification() {
        let config = standard_config();
        let mut processor = MockChangesProcessor::<ExcludedPath>::new();
        for (old, new) in [
            ("resource", "different_res"),
            ("resource/a", "different_res/a"),
            ("resource/b", "different_res/b"),
        ] {
            processor
                .expect_path_modified()
                .withf(move |before, after| before.path == old && after.path == new)
                .times(1)
                .return_const(());
        }
        processor.expect_path_removed().never();

        let detector = ExcludedPathsChangesDetector::new(
            "project/resource",
            Some(Utf8Path::new("project/different_res")),
            "project",
            &config,
        );
        detector.detect(&mut processor);
    }

    #[test]
    fn test_move_out_of_project_is_removal() {
        let config = config_with_excluded(&["resource/a"]);
        let detector = ExcludedPathsChangesDetector::new(
            "project/resource",
            Some(Utf8Path::new("other_project/resource")),
            "project",
            &config,
        );

        let records = detector.detect_records();
        assert_eq!(
            records,
            vec![PathChangeRecord::Removed(ExcludedPath::create(
                "resource/a"
            ))]
        );
    }

    #[test]
    fn test_other_project_is_not_affected() {
        let config = config_with_excluded(&["resource"]);
        let detector = ExcludedPathsChangesDetector::new("other/resource", None, "project", &config);
        assert!(detector.detect_records().is_empty());
    }

    #[test]
    fn test_detection_is_idempotent_after_rewrite() {
        let mut config = standard_config();
        let after = Utf8Path::new("project/different_res");
        let records =
            ExcludedPathsChangesDetector::new("project/resource", Some(after), "project", &config)
                .detect_records();
        for record in records {
            if let PathChangeRecord::Modified { old, new } = record {
                config.replace_excluded_path(&old, new);
            }
        }

        let again =
            ExcludedPathsChangesDetector::new("project/resource", Some(after), "project", &config)
                .detect_records();
        assert!(again.is_empty());
    }
}
