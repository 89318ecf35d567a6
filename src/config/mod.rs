//! Reading and writing of `red.xml` and of the tool settings file.

pub mod error;
pub mod provenance;
pub mod reader;
pub mod settings;
pub mod writer;
mod xml;

pub use error::{ConfigReadError, ConfigWriteError};
pub use provenance::{ElementKey, ProjectConfigWithLines, Provenance, SourcePosition, SourceSpan};
pub use settings::SettingsStore;
pub use writer::ConfigWriter;

use crate::models::{FILENAME, ProjectConfig};
use camino::{Utf8Path, Utf8PathBuf};

/// Configuration manager for the `red.xml` file of a single project.
///
/// The manager owns the project directory and the writer settings; the
/// configuration itself is always passed in explicitly.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    project_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
    writer: ConfigWriter,
}

impl ConfigManager {
    /// Create a new ConfigManager for the specified project directory.
    ///
    /// # Arguments
    /// * `project_dir` - Project root containing (or about to contain) `red.xml`
    pub fn new<P: AsRef<Utf8Path>>(project_dir: P) -> Self {
        let project_dir = project_dir.as_ref().to_path_buf();
        Self {
            config_path: project_dir.join(FILENAME),
            project_dir,
            writer: ConfigWriter::new(),
        }
    }

    /// Use a different indentation width when saving.
    pub fn with_writer(mut self, writer: ConfigWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn project_dir(&self) -> &Utf8Path {
        &self.project_dir
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    /// Name of the project, taken from the last segment of its directory.
    pub fn project_name(&self) -> &str {
        self.project_dir.file_name().unwrap_or_default()
    }

    pub fn exists(&self) -> bool {
        self.config_path.is_file()
    }

    /// Load the project configuration.
    ///
    /// # Returns
    /// The loaded configuration, or an error when the file is missing or invalid
    pub fn load(&self) -> Result<ProjectConfig, ConfigReadError> {
        let config = reader::read_file(&self.config_path)?;
        tracing::info!(
            "Loaded project configuration (version {}) from {}",
            config.version(),
            self.config_path
        );
        Ok(config)
    }

    /// Load the project configuration together with element positions.
    pub fn load_with_lines(&self) -> Result<ProjectConfigWithLines, ConfigReadError> {
        let config = reader::read_file_with_provenance(&self.config_path)?;
        tracing::info!("Loaded project configuration from {}", self.config_path);
        Ok(config)
    }

    /// Load the project configuration, falling back to a fresh one when the
    /// file is missing or cannot be read.
    pub fn load_or_default(&self) -> ProjectConfig {
        match self.load() {
            Ok(config) => config,
            Err(error) => {
                tracing::warn!(
                    "Unable to load {} ({}), using defaults",
                    self.config_path,
                    error
                );
                ProjectConfig::create()
            }
        }
    }

    /// Save the project configuration, replacing `red.xml` atomically.
    ///
    /// # Arguments
    /// * `config` - The ProjectConfig to save
    pub fn save(&self, config: &ProjectConfig) -> Result<(), ConfigWriteError> {
        self.writer.write_file(config, &self.config_path)?;
        tracing::info!("Saved project configuration to {}", self.config_path);
        Ok(())
    }
}
