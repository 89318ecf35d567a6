//! Integration tests for ConfigManager and red.xml file handling
//!
//! These tests verify:
//! - Saving and loading red.xml through the project directory
//! - Error reporting with line numbers for broken files
//! - Source positions of configuration entries
//! - Settings store defaults and persistence

use camino::Utf8PathBuf;
use redxml::config::ElementKey;
use redxml::models::{
    ExcludedPath, ExecutionEnvironment, InterpreterKind, LibraryType, ReferencedLibrary,
    ReferencedVariableFile, RelativityPoint, RemoteLocation, SearchPath, VariableMapping,
};
use redxml::{ConfigManager, ConfigReadError, ConfigWriteError, ProjectConfig, SettingsStore};
use std::fs;
use tempfile::TempDir;

fn create_test_project_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let project_path = Utf8PathBuf::try_from(temp_dir.path().join("Project")).unwrap();
    fs::create_dir_all(&project_path).unwrap();
    (temp_dir, project_path)
}

fn full_config() -> ProjectConfig {
    let mut config = ProjectConfig::create();
    config.set_execution_environment(Some(ExecutionEnvironment::new(
        "/usr/bin/python3",
        Some(InterpreterKind::Python3),
    )));
    config.set_relativity_point(RelativityPoint::Project);
    config.add_variable_mapping(VariableMapping::create("${host}", "localhost"));
    config.add_referenced_library(ReferencedLibrary::create(
        LibraryType::Python,
        "pkg.lib",
        "Project/libs",
    ));
    config.add_referenced_library(ReferencedLibrary::create(
        LibraryType::Virtual,
        "lib.xml",
        "Project/lib.xml",
    ));
    config.add_python_path(SearchPath::create("Project/py"));
    config.add_class_path(SearchPath::create("Project/jars/a.jar"));
    config.add_remote_location(RemoteLocation::create("http://127.0.0.1:8270/"));
    config.add_referenced_variable_file(ReferencedVariableFile::with_arguments(
        "Project/vars.py",
        vec!["arg".to_string()],
    ));
    config.add_excluded_path("results");
    config
}

#[test]
fn test_save_and_load_round_trip() {
    let (_temp_dir, project_path) = create_test_project_dir();
    let manager = ConfigManager::new(&project_path);

    let config = full_config();
    manager.save(&config).unwrap();

    let loaded = manager.load().unwrap();
    assert_eq!(loaded, config);
    assert_eq!(
        loaded.execution_environment().unwrap().interpreter,
        Some(InterpreterKind::Python3)
    );
}

#[test]
fn test_save_replaces_existing_file() {
    let (_temp_dir, project_path) = create_test_project_dir();
    let manager = ConfigManager::new(&project_path);
    fs::write(manager.config_path(), "old content").unwrap();

    manager.save(&ProjectConfig::create()).unwrap();

    let content = fs::read_to_string(manager.config_path()).unwrap();
    assert!(content.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));

    // no temporary files are left behind
    let entries = fs::read_dir(&project_path).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn test_null_config_is_not_saved() {
    let (_temp_dir, project_path) = create_test_project_dir();
    let manager = ConfigManager::new(&project_path);

    let result = manager.save(&ProjectConfig::null());

    assert!(matches!(result, Err(ConfigWriteError::NullConfig)));
    assert!(!manager.exists());
}

#[test]
fn test_missing_file_error() {
    let (_temp_dir, project_path) = create_test_project_dir();
    let manager = ConfigManager::new(&project_path);

    let error = manager.load().unwrap_err();
    assert_eq!(
        error.to_string(),
        "Project configuration file 'red.xml' does not exist"
    );
    assert_eq!(error.line(), 1);
}

#[test]
fn test_malformed_file_reports_line() {
    let (_temp_dir, project_path) = create_test_project_dir();
    let manager = ConfigManager::new(&project_path);
    fs::write(
        manager.config_path(),
        "<projectConfiguration>\n<configVersion>2</configVersion>\n<relativeTo>PROJECT</relative>\n</projectConfiguration>\n",
    )
    .unwrap();

    let error = manager.load().unwrap_err();
    assert!(matches!(error, ConfigReadError::Malformed { .. }));
    assert_eq!(error.line(), 3);
}

#[test]
fn test_invalid_relativity_point_reports_line() {
    let (_temp_dir, project_path) = create_test_project_dir();
    let manager = ConfigManager::new(&project_path);
    fs::write(
        manager.config_path(),
        "<projectConfiguration>\n  <configVersion>2</configVersion>\n\n  <relativeTo>SOMEWHERE</relativeTo>\n</projectConfiguration>\n",
    )
    .unwrap();

    let error = manager.load().unwrap_err();
    assert!(matches!(error, ConfigReadError::Invalid { line: 4, .. }));
}

#[test]
fn test_load_or_default_falls_back() {
    let (_temp_dir, project_path) = create_test_project_dir();
    let manager = ConfigManager::new(&project_path);
    fs::write(manager.config_path(), "not xml at all <").unwrap();

    let config = manager.load_or_default();
    assert_eq!(config, ProjectConfig::create());
}

#[test]
fn test_positions_of_saved_entries() {
    let (_temp_dir, project_path) = create_test_project_dir();
    let manager = ConfigManager::new(&project_path);
    manager.save(&full_config()).unwrap();

    let with_lines = manager.load_with_lines().unwrap();
    let config = with_lines.config();

    // declaration, root, version, environment, relativeTo, variable, libraries...
    assert_eq!(with_lines.root_line(), Some(2));
    assert_eq!(with_lines.version_line(), Some(3));
    assert_eq!(with_lines.variable_mapping_line(&config.variable_mappings()[0]), Some(6));
    assert_eq!(with_lines.library_line(&config.libraries()[0]), Some(7));
    assert_eq!(with_lines.library_line(&config.libraries()[1]), Some(8));
    assert_eq!(
        with_lines.excluded_path_line(&ExcludedPath::create("results")),
        Some(20)
    );

    let provenance = with_lines.provenance();
    let library = provenance.span_of(ElementKey::Library(0)).unwrap();
    assert_eq!(library.start.column, 5);
    let enclosing = provenance.enclosing_span(7, 10).unwrap();
    assert_eq!(enclosing.start.line, 7);
}

#[test]
fn test_settings_store_round_trip() {
    let (_temp_dir, project_path) = create_test_project_dir();
    let store = SettingsStore::new(&project_path).unwrap();

    let mut settings = store.load().unwrap();
    settings.red_settings.indent_width = 2;
    store.save(&settings).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.red_settings.indent_width, 2);
    assert_eq!(loaded.logging.log_prefix, "redxml");
}
