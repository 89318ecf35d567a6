//! Services module - Operations over project configurations.
//!
//! The services work on [`ProjectConfig`](crate::models::ProjectConfig)
//! values passed in explicitly and touch the filesystem only through a
//! [`ConfigManager`](crate::config::ConfigManager) or a
//! [`ModuleFileProbe`](migration::ModuleFileProbe).
//!
//! # Components
//!
//! - [`migration`]: Upgrades `red.xml` files from older versions. Handles:
//!   - The ordered table of version transitions
//!   - Deciding whether an unattended update is possible
//!   - Pointing python libraries at their module files
//!
//! - [`changes`]: Keeps configuration entries valid after a resource is moved
//!   or deleted:
//!   - [`ExcludedPathsChangesDetector`] and [`LibrariesChangesDetector`]
//!     classify entries as removed or modified
//!   - [`RedXmlChangesCollector`] gathers both into a [`ConfigChange`] that
//!     can be applied to a configuration or written to disk
//!
//! # Usage Example
//!
//! ```ignore
//! use redxml::services::changes::RedXmlChangesCollector;
//!
//! let manager = ConfigManager::new("/workspace/Project");
//! let collector = RedXmlChangesCollector::new(
//!     &manager,
//!     "Project/libs/inner_lib",
//!     Some(Utf8Path::new("Project/libs/moved")),
//! );
//! if let Some(change) = collector.collect()? {
//!     change.perform(&manager)?;
//! }
//! ```

pub mod changes;
pub mod migration;

pub use changes::{
    CollectError, ConfigChange, ExcludedPathsChangesDetector, LibrariesChangesDetector,
    RedXmlChangesCollector,
};
pub use migration::{
    MigrationError, ModuleFileProbe, RedXmlVersionUpdater, VersionTransition, WorkspaceFiles,
    is_auto_update_possible, transitions,
};
