//! Integration tests for red.xml version migration
//!
//! These tests verify:
//! - The transition table covers every version up to the current one
//! - Which versions can be updated unattended
//! - Python library paths are resolved against files in the workspace
//! - Migrated files are written back in the current version

use camino::{Utf8Path, Utf8PathBuf};
use redxml::models::{CURRENT_VERSION, LibraryType, ReferencedLibrary};
use redxml::services::migration::{
    MigrationError, RedXmlVersionUpdater, WorkspaceFiles, is_auto_update_possible, transitions,
};
use redxml::config::ConfigWriter;
use redxml::{ConfigManager, ProjectConfig, SettingsStore};
use std::fs;
use tempfile::TempDir;

fn create_test_workspace() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let workspace = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    fs::create_dir_all(workspace.join("Project/libs/inner_lib")).unwrap();
    fs::write(workspace.join("Project/libs/lib.py"), "class lib(object): pass\n").unwrap();
    fs::write(workspace.join("Project/libs/inner_lib/__init__.py"), "").unwrap();
    fs::write(workspace.join("Project/libs/inner_lib/inside.py"), "").unwrap();
    (temp_dir, workspace)
}

fn old_config(version: &str) -> ProjectConfig {
    let mut config = ProjectConfig::with_version(version);
    for (name, path) in [
        ("lib", "Project/libs"),
        ("inner_lib", "Project/libs"),
        ("inner_lib.inside", "Project/libs"),
        ("missing", "Project/libs"),
    ] {
        config.add_referenced_library(ReferencedLibrary::create(LibraryType::Python, name, path));
    }
    config.add_referenced_library(ReferencedLibrary::create(
        LibraryType::Java,
        "JavaLib",
        "Project/libs/lib.jar",
    ));
    config
}

#[test]
fn test_transition_count_matches_current_version() {
    let current: usize = CURRENT_VERSION.parse().unwrap();
    assert_eq!(transitions().len(), current);
    assert!(transitions().iter().all(|transition| transition.can_be_auto_upgraded));
}

#[test]
fn test_auto_update_truth_table() {
    assert!(!is_auto_update_possible(&ProjectConfig::with_version("not a version")));
    assert!(!is_auto_update_possible(&ProjectConfig::with_version("3")));
    assert!(!is_auto_update_possible(&ProjectConfig::create()));
    for transition in transitions() {
        assert!(is_auto_update_possible(&ProjectConfig::with_version(
            transition.version
        )));
    }
}

#[test]
fn test_python_libraries_point_to_module_files() {
    let (_temp_dir, workspace) = create_test_workspace();
    let updater = RedXmlVersionUpdater::new(WorkspaceFiles::new(&workspace));

    let mut config = old_config("1");
    updater.apply_update(&mut config).unwrap();

    let paths: Vec<&str> = config
        .libraries()
        .iter()
        .map(|library| library.path.as_str())
        .collect();
    assert_eq!(
        paths,
        vec![
            "Project/libs/lib.py",
            "Project/libs/inner_lib/__init__.py",
            "Project/libs/inner_lib/inside.py",
            "Project/libs",
            "Project/libs/lib.jar",
        ]
    );
    assert_eq!(config.version(), CURRENT_VERSION);
}

#[test]
fn test_migrate_file_writes_current_version() {
    let (_temp_dir, workspace) = create_test_workspace();
    let manager = ConfigManager::new(workspace.join("Project"));
    manager.save(&old_config("1.0")).unwrap();

    let updater = RedXmlVersionUpdater::new(WorkspaceFiles::new(&workspace));
    assert!(updater.migrate_file(&manager).unwrap());

    let migrated = manager.load().unwrap();
    assert_eq!(migrated.version(), CURRENT_VERSION);
    assert_eq!(migrated.libraries()[0].path, "Project/libs/lib.py");

    // a second run has nothing to do
    assert!(!updater.migrate_file(&manager).unwrap());
}

#[test]
fn test_migrate_file_refuses_unknown_version() {
    let (_temp_dir, workspace) = create_test_workspace();
    let manager = ConfigManager::new(workspace.join("Project"));
    manager.save(&old_config("0.5")).unwrap();

    let updater = RedXmlVersionUpdater::new(WorkspaceFiles::new(&workspace));
    let error = updater.migrate_file(&manager).unwrap_err();

    assert!(matches!(error, MigrationError::Unsupported { ref version } if version == "0.5"));
    assert_eq!(manager.load().unwrap().version(), "0.5");
}

#[test]
fn test_absolute_library_paths_are_probed_directly() {
    let (_temp_dir, workspace) = create_test_workspace();
    let absolute_libs = workspace.join("Project/libs");

    let mut config = ProjectConfig::with_version("1");
    config.add_referenced_library(ReferencedLibrary::create(
        LibraryType::Python,
        "lib",
        absolute_libs.as_str(),
    ));

    RedXmlVersionUpdater::new(WorkspaceFiles::new(Utf8Path::new("/nonexistent")))
        .apply_update(&mut config)
        .unwrap();

    assert_eq!(
        config.libraries()[0].path,
        absolute_libs.join("lib.py").as_str()
    );
}

#[test]
fn test_settings_file_drives_probe_root_and_indent() {
    let (_temp_dir, workspace) = create_test_workspace();
    let store = SettingsStore::new(workspace.join(".settings")).unwrap();
    let mut settings = store.load().unwrap();
    settings.red_settings.workspace_root = workspace.to_string();
    settings.red_settings.indent_width = 2;
    store.save(&settings).unwrap();

    let settings = store.load().unwrap();
    let manager = ConfigManager::new(workspace.join("Project"))
        .with_writer(ConfigWriter::from_settings(&settings));
    manager.save(&old_config("1")).unwrap();

    let updater = RedXmlVersionUpdater::new(WorkspaceFiles::from_settings(&settings));
    assert!(updater.migrate_file(&manager).unwrap());

    let migrated = manager.load().unwrap();
    assert_eq!(migrated.libraries()[0].path, "Project/libs/lib.py");

    let content = fs::read_to_string(manager.config_path()).unwrap();
    assert!(content.contains("\n  <configVersion>2</configVersion>"));
}
