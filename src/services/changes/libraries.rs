use super::{ChangesDetector, ChangesProcessor, moved_path, portable, segments, suffix_below};
use crate::models::{LibraryType, ProjectConfig, ReferencedLibrary};
use camino::{Utf8Path, Utf8PathBuf};

/// Detects referenced libraries affected by moving or deleting `before_path`.
///
/// Virtual and java libraries are matched by their stored path. Python
/// libraries are matched by the module location, the stored path followed by
/// every segment of the dotted name.
pub struct LibrariesChangesDetector<'a> {
    before_path: Utf8PathBuf,
    after_path: Option<Utf8PathBuf>,
    config: &'a ProjectConfig,
}

impl<'a> LibrariesChangesDetector<'a> {
    pub fn new(
        before_path: impl AsRef<Utf8Path>,
        after_path: Option<&Utf8Path>,
        config: &'a ProjectConfig,
    ) -> Self {
        Self {
            before_path: before_path.as_ref().to_path_buf(),
            after_path: after_path.map(Utf8Path::to_path_buf),
            config,
        }
    }
}

/// Library pointing at `moved`, or `None` when it cannot be expressed.
fn relocated(library: &ReferencedLibrary, moved: &Utf8Path) -> Option<ReferencedLibrary> {
    match library.library_type {
        LibraryType::Java => Some(ReferencedLibrary::create(
            LibraryType::Java,
            library.name.clone(),
            portable(moved),
        )),
        LibraryType::Virtual => Some(ReferencedLibrary::create(
            LibraryType::Virtual,
            moved.file_name().unwrap_or(&library.name),
            portable(moved),
        )),
        LibraryType::Python => {
            // the module keeps its depth; trailing segments become the name
            let name_length = library.name.split('.').count();
            let parts = segments(moved);
            if parts.len() < name_length {
                return None;
            }
            let (path, name) = parts.split_at(parts.len() - name_length);
            let mut path = path.join("/");
            if moved.has_root() {
                path.insert(0, '/');
            }
            Some(ReferencedLibrary::create(
                LibraryType::Python,
                name.join("."),
                path,
            ))
        }
    }
}

impl ChangesDetector<ReferencedLibrary> for LibrariesChangesDetector<'_> {
    fn detect(&self, processor: &mut dyn ChangesProcessor<ReferencedLibrary>) {
        for library in self.config.libraries() {
            let location = library.file_path();
            let Some(suffix) = suffix_below(&location, &self.before_path) else {
                continue;
            };

            let rewritten = self
                .after_path
                .as_ref()
                .and_then(|after| relocated(library, &moved_path(after, suffix)));

            match rewritten {
                Some(rewritten) => {
                    tracing::debug!(
                        "Library '{}' moved to '{}' at {}",
                        library.name,
                        rewritten.name,
                        rewritten.path
                    );
                    processor.path_modified(library, rewritten);
                }
                None => {
                    tracing::debug!("Library '{}' removed", library.name);
                    processor.path_removed(self.config, library);
                }
            }
        }
    }
}
