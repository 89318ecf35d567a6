//! `red.xml` deserialization.
//!
//! The document is turned into a position-aware element tree in a single
//! pass and then mapped onto [`ProjectConfig`] by hand. Every element span is
//! recorded in the resulting [`Provenance`], and every mapped entry is bound
//! to the span of the element it came from.

use super::error::ConfigReadError;
use super::provenance::{ElementKey, ProjectConfigWithLines, Provenance};
use super::xml::{XmlElement, parse_document};
use crate::models::{
    ExcludedPath, ExecutionEnvironment, InterpreterKind, LibraryType, ProjectConfig,
    ReferencedLibrary, ReferencedVariableFile, RelativityPoint, RemoteLocation, SearchPath,
    ValidationSettings, VariableMapping,
};
use camino::Utf8Path;
use std::fs;
use std::str::FromStr;

/// Element and attribute names of `red.xml`.
pub(crate) mod tags {
    pub const ROOT: &str = "projectConfiguration";
    pub const VERSION: &str = "configVersion";
    pub const EXECUTION_ENVIRONMENT: &str = "robotExecEnvironment";
    pub const RELATIVE_TO: &str = "relativeTo";
    pub const VARIABLE: &str = "variable";
    pub const LIBRARY: &str = "referencedLibrary";
    pub const PYTHON_PATH: &str = "pythonpath";
    pub const CLASS_PATH: &str = "classpath";
    pub const PATH: &str = "path";
    pub const REMOTE_LOCATION: &str = "remoteLocations";
    pub const VARIABLE_FILE: &str = "variableFiles";
    pub const ARGUMENTS: &str = "arguments";
    pub const EXCLUDED: &str = "excludedForValidation";
    pub const EXCLUDED_PATH: &str = "excludedPath";

    pub const FILE_SIZE_CHECKING: &str = "isValidatedFileSizeCheckingEnabled";
    pub const FILE_MAX_SIZE: &str = "validatedFileMaxSize";
    pub const AUTO_RELOAD: &str = "isReferencedLibrariesAutoReloadEnabled";
    pub const AUTO_DISCOVERING: &str = "isReferencedLibrariesAutoDiscoveringEnabled";
    pub const SUMMARY_WINDOW: &str = "isLibrariesAutoDiscoveringSummaryWindowEnabled";

    pub const ATTR_PATH: &str = "path";
    pub const ATTR_TYPE: &str = "type";
    pub const ATTR_INTERPRETER: &str = "interpreter";
    pub const ATTR_NAME: &str = "name";
    pub const ATTR_VALUE: &str = "value";
    pub const ATTR_LOCATION: &str = "location";
    pub const ATTR_URI: &str = "uri";
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Reads a configuration from raw `red.xml` content.
pub fn read(bytes: &[u8]) -> Result<ProjectConfig, ConfigReadError> {
    read_with_provenance(bytes).map(ProjectConfigWithLines::into_config)
}

/// Reads a configuration and keeps the source position of every element.
pub fn read_with_provenance(bytes: &[u8]) -> Result<ProjectConfigWithLines, ConfigReadError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)?;
    let root = parse_document(text)?;

    let mut mapper = Mapper::default();
    mapper.map_root(&root)?;
    Ok(ProjectConfigWithLines::new(mapper.config, mapper.provenance))
}

pub fn read_file(path: &Utf8Path) -> Result<ProjectConfig, ConfigReadError> {
    read_file_with_provenance(path).map(ProjectConfigWithLines::into_config)
}

pub fn read_file_with_provenance(
    path: &Utf8Path,
) -> Result<ProjectConfigWithLines, ConfigReadError> {
    let name = path.file_name().unwrap_or(path.as_str()).to_string();
    if !path.is_file() {
        return Err(ConfigReadError::Missing { name });
    }
    let bytes = fs::read(path).map_err(|source| ConfigReadError::Unreadable { name, source })?;

    let config = read_with_provenance(&bytes)?;
    tracing::debug!("Read project configuration from {}", path);
    Ok(config)
}

fn invalid(element: &XmlElement, message: impl Into<String>) -> ConfigReadError {
    ConfigReadError::Invalid {
        line: element.line(),
        message: message.into(),
    }
}

fn required_attribute<'a>(element: &'a XmlElement, name: &str) -> Result<&'a str, ConfigReadError> {
    element.attribute(name).ok_or_else(|| {
        invalid(
            element,
            format!("Element '{}' is missing attribute '{}'", element.name, name),
        )
    })
}

fn parse_bool(element: &XmlElement) -> Result<bool, ConfigReadError> {
    match element.trimmed_text() {
        value if value.eq_ignore_ascii_case("true") => Ok(true),
        value if value.eq_ignore_ascii_case("false") => Ok(false),
        value => Err(invalid(
            element,
            format!("Expected boolean in '{}', found '{}'", element.name, value),
        )),
    }
}

fn parse_number(element: &XmlElement) -> Result<u64, ConfigReadError> {
    element.trimmed_text().parse().map_err(|_| {
        invalid(
            element,
            format!(
                "Expected number in '{}', found '{}'",
                element.name,
                element.trimmed_text()
            ),
        )
    })
}

fn parse_enum<T: FromStr<Err = String>>(
    element: &XmlElement,
    value: &str,
) -> Result<T, ConfigReadError> {
    T::from_str(value).map_err(|message| invalid(element, message))
}

#[derive(Default)]
struct Mapper {
    config: ProjectConfig,
    provenance: Provenance,
}

impl Mapper {
    fn map_root(&mut self, root: &XmlElement) -> Result<(), ConfigReadError> {
        if root.name != tags::ROOT {
            return Err(invalid(
                root,
                format!(
                    "Expected root element '{}', found '{}'",
                    tags::ROOT,
                    root.name
                ),
            ));
        }

        root.walk(&mut |element| self.provenance.record_span(element.span));
        self.provenance.bind(ElementKey::Root, root.span);

        // Entries are collected in document order, duplicates included, so
        // their index matches the bound element key.
        let mut version = String::new();
        let mut environment = None;
        let mut relativity_point = RelativityPoint::default();
        let mut variables = Vec::new();
        let mut libraries = Vec::new();
        let mut python_paths = Vec::new();
        let mut class_paths = Vec::new();
        let mut remote_locations = Vec::new();
        let mut variable_files = Vec::new();
        let mut excluded_paths = Vec::new();
        let mut validation = ValidationSettings::default();

        for child in &root.children {
            match child.name.as_str() {
                tags::VERSION => {
                    version = child.text().to_string();
                    self.provenance.bind(ElementKey::Version, child.span);
                }
                tags::EXECUTION_ENVIRONMENT => {
                    let interpreter = child
                        .attribute(tags::ATTR_INTERPRETER)
                        .map(|kind| parse_enum::<InterpreterKind>(child, kind))
                        .transpose()?;
                    environment = Some(ExecutionEnvironment {
                        path: child.attribute(tags::ATTR_PATH).map(str::to_string),
                        interpreter,
                    });
                    self.provenance
                        .bind(ElementKey::ExecutionEnvironment, child.span);
                }
                tags::RELATIVE_TO => {
                    relativity_point = parse_enum(child, child.trimmed_text())?;
                    self.provenance.bind(ElementKey::RelativityPoint, child.span);
                }
                tags::VARIABLE => {
                    self.provenance
                        .bind(ElementKey::VariableMapping(variables.len()), child.span);
                    variables.push(VariableMapping::create(
                        required_attribute(child, tags::ATTR_NAME)?,
                        required_attribute(child, tags::ATTR_VALUE)?,
                    ));
                }
                tags::LIBRARY => {
                    let library_type =
                        parse_enum::<LibraryType>(child, required_attribute(child, tags::ATTR_TYPE)?)?;
                    self.provenance
                        .bind(ElementKey::Library(libraries.len()), child.span);
                    libraries.push(ReferencedLibrary::create(
                        library_type,
                        required_attribute(child, tags::ATTR_NAME)?,
                        child.attribute(tags::ATTR_PATH).unwrap_or_default(),
                    ));
                }
                tags::PYTHON_PATH => {
                    self.map_search_paths(child, &mut python_paths, ElementKey::PythonPath)?
                }
                tags::CLASS_PATH => {
                    self.map_search_paths(child, &mut class_paths, ElementKey::ClassPath)?
                }
                tags::REMOTE_LOCATION => {
                    self.provenance
                        .bind(ElementKey::RemoteLocation(remote_locations.len()), child.span);
                    remote_locations.push(RemoteLocation::create(required_attribute(
                        child,
                        tags::ATTR_URI,
                    )?));
                }
                tags::VARIABLE_FILE => {
                    let arguments = child
                        .children_named(tags::ARGUMENTS)
                        .map(|argument| argument.text().to_string())
                        .collect();
                    self.provenance
                        .bind(ElementKey::VariableFile(variable_files.len()), child.span);
                    variable_files.push(ReferencedVariableFile::with_arguments(
                        required_attribute(child, tags::ATTR_PATH)?,
                        arguments,
                    ));
                }
                tags::EXCLUDED => {
                    for excluded in child.children_named(tags::EXCLUDED_PATH) {
                        self.provenance
                            .bind(ElementKey::ExcludedPath(excluded_paths.len()), excluded.span);
                        excluded_paths.push(ExcludedPath::create(required_attribute(
                            excluded,
                            tags::ATTR_PATH,
                        )?));
                    }
                }
                tags::FILE_SIZE_CHECKING => {
                    validation.file_size_checking_enabled = parse_bool(child)?;
                    self.bind_setting(tags::FILE_SIZE_CHECKING, child);
                }
                tags::FILE_MAX_SIZE => {
                    validation.file_max_size = parse_number(child)?;
                    self.bind_setting(tags::FILE_MAX_SIZE, child);
                }
                tags::AUTO_RELOAD => {
                    validation.libraries_auto_reload_enabled = parse_bool(child)?;
                    self.bind_setting(tags::AUTO_RELOAD, child);
                }
                tags::AUTO_DISCOVERING => {
                    validation.libraries_auto_discovering_enabled = parse_bool(child)?;
                    self.bind_setting(tags::AUTO_DISCOVERING, child);
                }
                tags::SUMMARY_WINDOW => {
                    validation.libraries_auto_discovering_summary_window_enabled =
                        parse_bool(child)?;
                    self.bind_setting(tags::SUMMARY_WINDOW, child);
                }
                other => {
                    tracing::debug!(
                        "Skipping unknown element '{}' at line {}",
                        other,
                        child.line()
                    );
                }
            }
        }

        let config = &mut self.config;
        config.set_version(version);
        config.set_execution_environment(environment);
        config.set_relativity_point(relativity_point);
        config.set_variable_mappings(variables);
        config.set_referenced_libraries(libraries);
        config.set_python_paths(python_paths);
        config.set_class_paths(class_paths);
        config.set_remote_locations(remote_locations);
        config.set_referenced_variable_files(variable_files);
        config.set_excluded_paths(excluded_paths);
        config.set_validation(validation);
        Ok(())
    }

    fn map_search_paths(
        &mut self,
        element: &XmlElement,
        paths: &mut Vec<SearchPath>,
        key: fn(usize) -> ElementKey,
    ) -> Result<(), ConfigReadError> {
        for path in element.children_named(tags::PATH) {
            self.provenance.bind(key(paths.len()), path.span);
            paths.push(SearchPath::create(required_attribute(
                path,
                tags::ATTR_LOCATION,
            )?));
        }
        Ok(())
    }

    fn bind_setting(&mut self, tag: &'static str, element: &XmlElement) {
        self.provenance.bind(ElementKey::Setting(tag), element.span);
    }
}
