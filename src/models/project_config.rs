use camino::Utf8PathBuf;
use regex::Regex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

/// Name of the project configuration file kept in every project root.
pub const FILENAME: &str = "red.xml";

/// Version written by this crate. Older versions are upgraded by
/// [`crate::services::migration`].
pub const CURRENT_VERSION: &str = "2";

/// Default limit (in KB) for validated files.
pub const DEFAULT_VALIDATED_FILE_MAX_SIZE: u64 = 1024;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("Invalid libspec name regex"));

/// Kind of a referenced library, stored verbatim in the `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryType {
    Virtual,
    Python,
    Java,
}

impl LibraryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryType::Virtual => "VIRTUAL",
            LibraryType::Python => "PYTHON",
            LibraryType::Java => "JAVA",
        }
    }
}

impl FromStr for LibraryType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "VIRTUAL" => Ok(LibraryType::Virtual),
            "PYTHON" => Ok(LibraryType::Python),
            "JAVA" => Ok(LibraryType::Java),
            other => Err(format!("Unknown library type '{}'", other)),
        }
    }
}

impl fmt::Display for LibraryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base directory against which relative paths of the configuration resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RelativityPoint {
    #[default]
    Workspace,
    Project,
}

impl RelativityPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelativityPoint::Workspace => "WORKSPACE",
            RelativityPoint::Project => "PROJECT",
        }
    }
}

impl FromStr for RelativityPoint {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "WORKSPACE" => Ok(RelativityPoint::Workspace),
            "PROJECT" => Ok(RelativityPoint::Project),
            other => Err(format!("Unknown relativity point '{}'", other)),
        }
    }
}

/// Interpreter family of the execution environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterpreterKind {
    Python,
    Jython,
    IronPython,
    PyPy,
    Python3,
}

impl InterpreterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterpreterKind::Python => "Python",
            InterpreterKind::Jython => "Jython",
            InterpreterKind::IronPython => "IronPython",
            InterpreterKind::PyPy => "PyPy",
            InterpreterKind::Python3 => "Python3",
        }
    }
}

impl FromStr for InterpreterKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Python" => Ok(InterpreterKind::Python),
            "Jython" => Ok(InterpreterKind::Jython),
            "IronPython" => Ok(InterpreterKind::IronPython),
            "PyPy" => Ok(InterpreterKind::PyPy),
            "Python3" => Ok(InterpreterKind::Python3),
            other => Err(format!("Unknown interpreter type '{}'", other)),
        }
    }
}

/// Interpreter used to run the project, `<robotExecEnvironment>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ExecutionEnvironment {
    pub path: Option<String>,
    pub interpreter: Option<InterpreterKind>,
}

impl ExecutionEnvironment {
    pub fn new(path: impl Into<String>, interpreter: Option<InterpreterKind>) -> Self {
        Self {
            path: Some(path.into()),
            interpreter,
        }
    }
}

/// External test library declaration.
///
/// Two libraries are the same library when their type and name match; the
/// path is not part of the identity.
#[derive(Debug, Clone)]
pub struct ReferencedLibrary {
    pub library_type: LibraryType,
    pub name: String,
    pub path: String,
}

impl ReferencedLibrary {
    pub fn create(
        library_type: LibraryType,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            library_type,
            name: name.into(),
            path: path.into(),
        }
    }

    /// Location of the library sources. Python modules append their dotted
    /// name as path segments.
    pub fn file_path(&self) -> Utf8PathBuf {
        let mut path = Utf8PathBuf::from(&self.path);
        if self.library_type == LibraryType::Python {
            for segment in self.name.split('.') {
                path.push(segment);
            }
        }
        path
    }

    /// Compares every field, including the path.
    pub fn has_same_fields(&self, other: &ReferencedLibrary) -> bool {
        self.library_type == other.library_type
            && self.name == other.name
            && self.path == other.path
    }
}

impl PartialEq for ReferencedLibrary {
    fn eq(&self, other: &Self) -> bool {
        self.library_type == other.library_type && self.name == other.name
    }
}

impl Eq for ReferencedLibrary {}

impl Hash for ReferencedLibrary {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.library_type.hash(state);
        self.name.hash(state);
    }
}

/// Entry of the python or class search path.
///
/// `system` marks paths contributed by the environment; it is never persisted
/// and does not take part in equality.
#[derive(Debug, Clone)]
pub struct SearchPath {
    pub location: String,
    pub system: bool,
}

impl SearchPath {
    pub fn create(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            system: false,
        }
    }

    pub fn create_system(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            system: true,
        }
    }
}

impl PartialEq for SearchPath {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl Eq for SearchPath {}

impl Hash for SearchPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteLocation {
    pub uri: String,
}

impl RemoteLocation {
    pub fn create(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    /// Display name of the remote library served at this location.
    pub fn remote_name(&self) -> String {
        format!("Remote {}", self.uri)
    }

    /// Name of the libspec file generated for this remote library.
    pub fn libspec_file_name(&self) -> String {
        format!("Remote_{}", NON_ALPHANUMERIC.replace_all(&self.uri, "_"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferencedVariableFile {
    pub path: String,
    pub arguments: Vec<String>,
}

impl ReferencedVariableFile {
    pub fn create(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_arguments(path: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            path: path.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableMapping {
    pub name: String,
    pub value: String,
}

impl VariableMapping {
    pub fn create(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Project-relative path skipped during validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExcludedPath {
    pub path: String,
}

impl ExcludedPath {
    pub fn create(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Validation related scalar settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSettings {
    pub file_size_checking_enabled: bool,
    pub file_max_size: u64,
    pub libraries_auto_reload_enabled: bool,
    pub libraries_auto_discovering_enabled: bool,
    pub libraries_auto_discovering_summary_window_enabled: bool,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            file_size_checking_enabled: true,
            file_max_size: DEFAULT_VALIDATED_FILE_MAX_SIZE,
            libraries_auto_reload_enabled: true,
            libraries_auto_discovering_enabled: true,
            libraries_auto_discovering_summary_window_enabled: false,
        }
    }
}

/// In-memory form of `red.xml`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    version: String,
    execution_environment: Option<ExecutionEnvironment>,
    relativity_point: RelativityPoint,
    variable_mappings: Vec<VariableMapping>,
    libraries: Vec<ReferencedLibrary>,
    python_paths: Vec<SearchPath>,
    class_paths: Vec<SearchPath>,
    remote_locations: Vec<RemoteLocation>,
    variable_files: Vec<ReferencedVariableFile>,
    excluded_paths: Vec<ExcludedPath>,
    validation: ValidationSettings,
    null: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::create()
    }
}

/// Appends `item` unless an equal one is already present.
fn add_unique<T: PartialEq>(items: &mut Vec<T>, item: T) -> bool {
    if items.contains(&item) {
        return false;
    }
    items.push(item);
    true
}

fn remove_all<T: PartialEq>(items: &mut Vec<T>, to_remove: &[T]) -> bool {
    let before = items.len();
    items.retain(|item| !to_remove.contains(item));
    items.len() != before
}

impl ProjectConfig {
    /// Fresh configuration in the current version.
    pub fn create() -> Self {
        Self::with_version(CURRENT_VERSION)
    }

    /// Empty configuration with the given version tag.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            execution_environment: None,
            relativity_point: RelativityPoint::default(),
            variable_mappings: Vec::new(),
            libraries: Vec::new(),
            python_paths: Vec::new(),
            class_paths: Vec::new(),
            remote_locations: Vec::new(),
            variable_files: Vec::new(),
            excluded_paths: Vec::new(),
            validation: ValidationSettings::default(),
            null: false,
        }
    }

    /// Configuration used when there is no project behind it.
    pub fn null() -> Self {
        Self {
            null: true,
            ..Self::create()
        }
    }

    pub fn is_null(&self) -> bool {
        self.null
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        if !self.null {
            self.version = version.into();
        }
    }

    pub fn execution_environment(&self) -> Option<&ExecutionEnvironment> {
        self.execution_environment.as_ref()
    }

    pub fn set_execution_environment(&mut self, environment: Option<ExecutionEnvironment>) {
        if !self.null {
            self.execution_environment = environment;
        }
    }

    /// True when the interpreter comes from preferences instead of this file.
    pub fn uses_preferences(&self) -> bool {
        self.execution_environment.is_none()
    }

    pub fn relativity_point(&self) -> RelativityPoint {
        self.relativity_point
    }

    pub fn set_relativity_point(&mut self, point: RelativityPoint) {
        if !self.null {
            self.relativity_point = point;
        }
    }

    pub fn validation(&self) -> &ValidationSettings {
        &self.validation
    }

    pub fn set_validation(&mut self, validation: ValidationSettings) {
        if !self.null {
            self.validation = validation;
        }
    }

    // Referenced libraries

    pub fn libraries(&self) -> &[ReferencedLibrary] {
        &self.libraries
    }

    pub fn libraries_mut(&mut self) -> &mut [ReferencedLibrary] {
        &mut self.libraries
    }

    pub fn set_referenced_libraries(&mut self, libraries: Vec<ReferencedLibrary>) {
        if !self.null {
            self.libraries = libraries;
        }
    }

    pub fn add_referenced_library(&mut self, library: ReferencedLibrary) -> bool {
        !self.null && add_unique(&mut self.libraries, library)
    }

    pub fn remove_referenced_libraries(&mut self, libraries: &[ReferencedLibrary]) -> bool {
        remove_all(&mut self.libraries, libraries)
    }

    pub fn has_referenced_libraries(&self) -> bool {
        !self.libraries.is_empty()
    }

    // Remote locations

    pub fn remote_locations(&self) -> &[RemoteLocation] {
        &self.remote_locations
    }

    pub fn set_remote_locations(&mut self, locations: Vec<RemoteLocation>) {
        if !self.null {
            self.remote_locations = locations;
        }
    }

    pub fn add_remote_location(&mut self, location: RemoteLocation) -> bool {
        !self.null && add_unique(&mut self.remote_locations, location)
    }

    pub fn remove_remote_locations(&mut self, locations: &[RemoteLocation]) -> bool {
        remove_all(&mut self.remote_locations, locations)
    }

    pub fn has_remote_locations(&self) -> bool {
        !self.remote_locations.is_empty()
    }

    // Search paths

    pub fn python_paths(&self) -> &[SearchPath] {
        &self.python_paths
    }

    pub fn set_python_paths(&mut self, paths: Vec<SearchPath>) {
        if !self.null {
            self.python_paths = paths;
        }
    }

    pub fn add_python_path(&mut self, path: SearchPath) -> bool {
        !self.null && add_unique(&mut self.python_paths, path)
    }

    pub fn remove_python_paths(&mut self, paths: &[SearchPath]) -> bool {
        remove_all(&mut self.python_paths, paths)
    }

    pub fn class_paths(&self) -> &[SearchPath] {
        &self.class_paths
    }

    pub fn set_class_paths(&mut self, paths: Vec<SearchPath>) {
        if !self.null {
            self.class_paths = paths;
        }
    }

    pub fn add_class_path(&mut self, path: SearchPath) -> bool {
        !self.null && add_unique(&mut self.class_paths, path)
    }

    pub fn remove_class_paths(&mut self, paths: &[SearchPath]) -> bool {
        remove_all(&mut self.class_paths, paths)
    }

    // Variable files

    pub fn referenced_variable_files(&self) -> &[ReferencedVariableFile] {
        &self.variable_files
    }

    pub fn set_referenced_variable_files(&mut self, files: Vec<ReferencedVariableFile>) {
        if !self.null {
            self.variable_files = files;
        }
    }

    pub fn add_referenced_variable_file(&mut self, file: ReferencedVariableFile) -> bool {
        !self.null && add_unique(&mut self.variable_files, file)
    }

    pub fn remove_referenced_variable_files(&mut self, files: &[ReferencedVariableFile]) -> bool {
        remove_all(&mut self.variable_files, files)
    }

    // Variable mappings

    pub fn variable_mappings(&self) -> &[VariableMapping] {
        &self.variable_mappings
    }

    pub fn set_variable_mappings(&mut self, mappings: Vec<VariableMapping>) {
        if !self.null {
            self.variable_mappings = mappings;
        }
    }

    pub fn add_variable_mapping(&mut self, mapping: VariableMapping) -> bool {
        !self.null && add_unique(&mut self.variable_mappings, mapping)
    }

    pub fn remove_variable_mappings(&mut self, mappings: &[VariableMapping]) -> bool {
        remove_all(&mut self.variable_mappings, mappings)
    }

    // Excluded paths

    pub fn excluded_paths(&self) -> &[ExcludedPath] {
        &self.excluded_paths
    }

    pub fn set_excluded_paths(&mut self, paths: Vec<ExcludedPath>) {
        if !self.null {
            self.excluded_paths = paths;
        }
    }

    pub fn add_excluded_path(&mut self, path: &str) -> bool {
        !self.null && add_unique(&mut self.excluded_paths, ExcludedPath::create(path))
    }

    pub fn remove_excluded_path(&mut self, path: &str) -> bool {
        let before = self.excluded_paths.len();
        self.excluded_paths.retain(|excluded| excluded.path != path);
        self.excluded_paths.len() != before
    }

    pub fn is_excluded_path(&self, path: &str) -> bool {
        self.excluded_path(path).is_some()
    }

    pub fn excluded_path(&self, path: &str) -> Option<&ExcludedPath> {
        self.excluded_paths.iter().find(|excluded| excluded.path == path)
    }

    /// Replaces `old` in place, keeping its position. When another entry
    /// already has the identity of `new`, `old` is dropped instead. Returns
    /// false when `old` is not present.
    pub(crate) fn replace_library(&mut self, old: &ReferencedLibrary, new: ReferencedLibrary) -> bool {
        let Some(index) = self.libraries.iter().position(|lib| lib == old) else {
            return false;
        };
        if old != &new && self.libraries.contains(&new) {
            self.libraries.remove(index);
        } else {
            self.libraries[index] = new;
        }
        true
    }

    pub(crate) fn replace_excluded_path(&mut self, old: &ExcludedPath, new: ExcludedPath) -> bool {
        let Some(index) = self.excluded_paths.iter().position(|path| path == old) else {
            return false;
        };
        if self.excluded_paths.contains(&new) {
            self.excluded_paths.remove(index);
        } else {
            self.excluded_paths[index] = new;
        }
        true
    }
}
