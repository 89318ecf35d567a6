//! Data models for red.xml handling.
//!
//! - [`ProjectConfig`]: the project configuration stored in `red.xml`, with its
//!   referenced libraries, search paths, remote locations, variable files,
//!   variable mappings and paths excluded from validation
//! - [`RedSettings`]: tool settings loaded from `red-settings.yaml`
//!
//! Entries of [`ProjectConfig`] compare by their identity keys (a library is
//! identified by type and name, an excluded path by its path string), so
//! `add_*` operations are idempotent.

pub mod project_config;
pub mod settings;

pub use project_config::{
    CURRENT_VERSION, ExcludedPath, ExecutionEnvironment, FILENAME, InterpreterKind, LibraryType,
    ProjectConfig, ReferencedLibrary, ReferencedVariableFile, RelativityPoint, RemoteLocation,
    SearchPath, ValidationSettings, VariableMapping,
};
pub use settings::{GeneralSettings, LoggingSettings, RedSettings};
