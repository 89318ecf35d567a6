//! Upgrading `red.xml` files written by older versions.
//!
//! Every historical version owns one transition that brings a configuration
//! to the next version. Updating walks the table from the configuration's
//! version to the end and finally stamps [`CURRENT_VERSION`].

use crate::config::{ConfigManager, ConfigReadError, ConfigWriteError};
use crate::models::{CURRENT_VERSION, LibraryType, ProjectConfig, RedSettings};
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Could not auto-update red.xml from version '{version}' to version {}", CURRENT_VERSION)]
    Unsupported { version: String },

    #[error("red.xml is already in version {}", CURRENT_VERSION)]
    AlreadyCurrent,

    #[error(transparent)]
    Read(#[from] ConfigReadError),

    #[error(transparent)]
    Write(#[from] ConfigWriteError),
}

/// Answers whether a library module file exists.
#[cfg_attr(test, automock)]
pub trait ModuleFileProbe {
    fn is_file(&self, path: &Utf8Path) -> bool;
}

/// Probes the filesystem, resolving relative paths against the workspace root.
#[derive(Debug, Clone)]
pub struct WorkspaceFiles {
    workspace_root: Option<Utf8PathBuf>,
}

impl WorkspaceFiles {
    pub fn new<P: AsRef<Utf8Path>>(workspace_root: P) -> Self {
        Self {
            workspace_root: Some(workspace_root.as_ref().to_path_buf()),
        }
    }

    /// Probe without a workspace; relative paths resolve against the current directory.
    pub fn unrooted() -> Self {
        Self {
            workspace_root: None,
        }
    }

    /// Probe rooted at the configured workspace, unrooted when none is set.
    pub fn from_settings(settings: &RedSettings) -> Self {
        match settings.workspace_root() {
            Some(root) => Self::new(root),
            None => Self::unrooted(),
        }
    }

    pub fn workspace_root(&self) -> Option<&Utf8Path> {
        self.workspace_root.as_deref()
    }

    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        match &self.workspace_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ModuleFileProbe for WorkspaceFiles {
    fn is_file(&self, path: &Utf8Path) -> bool {
        self.resolve(path).is_file()
    }
}

/// One step of the upgrade chain, applied to configurations in `version`.
pub struct VersionTransition {
    pub version: &'static str,
    pub can_be_auto_upgraded: bool,
    upgrade: fn(&mut ProjectConfig, &dyn ModuleFileProbe),
}

impl VersionTransition {
    pub fn upgrade(&self, config: &mut ProjectConfig, probe: &dyn ModuleFileProbe) {
        (self.upgrade)(config, probe);
    }
}

impl std::fmt::Debug for VersionTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionTransition")
            .field("version", &self.version)
            .field("can_be_auto_upgraded", &self.can_be_auto_upgraded)
            .finish()
    }
}

static TRANSITIONS: [VersionTransition; 2] = [
    VersionTransition {
        version: "1.0",
        can_be_auto_upgraded: true,
        upgrade: version_alias,
    },
    VersionTransition {
        version: "1",
        can_be_auto_upgraded: true,
        upgrade: locate_python_module_files,
    },
];

/// Registered transitions, oldest first.
pub fn transitions() -> &'static [VersionTransition] {
    &TRANSITIONS
}

fn version_alias(_config: &mut ProjectConfig, _probe: &dyn ModuleFileProbe) {}

/// Points python libraries at the file backing the module, trying a package
/// directory before a plain module file.
fn locate_python_module_files(config: &mut ProjectConfig, probe: &dyn ModuleFileProbe) {
    for library in config.libraries_mut() {
        if library.library_type != LibraryType::Python {
            continue;
        }

        let module = library.name.replace('.', "/");
        let candidates = [
            format!("{}/{}/__init__.py", library.path, module),
            format!("{}/{}.py", library.path, module),
        ];
        match candidates
            .into_iter()
            .find(|candidate| probe.is_file(Utf8Path::new(candidate)))
        {
            Some(found) => {
                tracing::debug!("Library '{}' now points to {}", library.name, found);
                library.path = found;
            }
            None => {
                tracing::warn!(
                    "No module file found for library '{}' under {}, path left unchanged",
                    library.name,
                    library.path
                );
            }
        }
    }
}

fn transition_index(version: &str) -> Option<usize> {
    TRANSITIONS
        .iter()
        .position(|transition| transition.version == version)
}

/// True when the configuration is in a known older version and every
/// remaining step can run unattended.
pub fn is_auto_update_possible(config: &ProjectConfig) -> bool {
    transition_index(config.version()).is_some_and(|start| {
        TRANSITIONS[start..]
            .iter()
            .all(|transition| transition.can_be_auto_upgraded)
    })
}

/// Runs version transitions against configurations or files.
#[derive(Debug, Clone)]
pub struct RedXmlVersionUpdater<P: ModuleFileProbe> {
    probe: P,
}

impl<P: ModuleFileProbe> RedXmlVersionUpdater<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    pub fn is_auto_update_possible(&self, config: &ProjectConfig) -> bool {
        is_auto_update_possible(config)
    }

    /// Upgrades `config` in place to [`CURRENT_VERSION`].
    pub fn apply_update(&self, config: &mut ProjectConfig) -> Result<(), MigrationError> {
        if config.version() == CURRENT_VERSION {
            return Err(MigrationError::AlreadyCurrent);
        }
        if !is_auto_update_possible(config) {
            return Err(MigrationError::Unsupported {
                version: config.version().to_string(),
            });
        }

        let start = transition_index(config.version()).unwrap_or(TRANSITIONS.len());
        for transition in &TRANSITIONS[start..] {
            tracing::debug!("Applying red.xml transition from version {}", transition.version);
            transition.upgrade(config, &self.probe);
        }
        config.set_version(CURRENT_VERSION);
        Ok(())
    }

    /// Reads the project's `red.xml`, upgrades it and writes it back.
    ///
    /// # Returns
    /// `false` when the file was already current and left untouched
    pub fn migrate_file(&self, manager: &ConfigManager) -> Result<bool, MigrationError> {
        let mut config = manager.load()?;
        if config.version() == CURRENT_VERSION {
            return Ok(false);
        }

        let previous = config.version().to_string();
        self.apply_update(&mut config)?;
        manager.save(&config)?;

        tracing::info!(
            "Updated {} from version {} to {}",
            manager.config_path(),
            previous,
            CURRENT_VERSION
        );
        Ok(true)
    }
}
