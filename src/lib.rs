// redxml - Robot Framework project configuration (red.xml) support
//
// The library holds the project configuration model, its XML codec with
// source positions, version migration and the path-refactoring change
// detectors. It has no UI or command line surface.

pub mod config;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::{ConfigManager, ConfigReadError, ConfigWriteError, SettingsStore};
pub use models::{ProjectConfig, RedSettings};
pub use services::changes::{ChangesDetector, ChangesProcessor, PathChangeRecord};
pub use services::migration::RedXmlVersionUpdater;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
