//! Source positions of configuration elements.
//!
//! Every element of a parsed `red.xml` carries the span of its tags, so
//! problems found later in a configuration entry can be reported at the line
//! the entry came from.

use crate::models::{
    ExcludedPath, ProjectConfig, ReferencedLibrary, ReferencedVariableFile, RemoteLocation,
    SearchPath, VariableMapping,
};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// 1-based line and column plus the byte offset in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl SourcePosition {
    fn key(&self) -> (usize, usize) {
        (self.line, self.column)
    }
}

/// Range from the opening tag start to the closing tag end (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourceSpan {
    pub fn contains(&self, line: usize, column: usize) -> bool {
        self.start.key() <= (line, column) && (line, column) <= self.end.key()
    }
}

/// Identifies a configuration entry by its role and index in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKey {
    Root,
    Version,
    ExecutionEnvironment,
    RelativityPoint,
    VariableMapping(usize),
    Library(usize),
    PythonPath(usize),
    ClassPath(usize),
    RemoteLocation(usize),
    VariableFile(usize),
    ExcludedPath(usize),
    /// Scalar validation setting, keyed by its tag name.
    Setting(&'static str),
}

#[derive(Debug, Clone, Default)]
pub struct Provenance {
    spans: BTreeMap<(usize, usize), SourceSpan>,
    elements: IndexMap<ElementKey, SourceSpan>,
}

impl Provenance {
    pub(crate) fn record_span(&mut self, span: SourceSpan) {
        self.spans.insert(span.start.key(), span);
    }

    pub(crate) fn bind(&mut self, key: ElementKey, span: SourceSpan) {
        self.elements.insert(key, span);
    }

    /// All element spans ordered by their start.
    pub fn spans(&self) -> impl Iterator<Item = &SourceSpan> {
        self.spans.values()
    }

    /// Innermost element span containing the given location.
    pub fn enclosing_span(&self, line: usize, column: usize) -> Option<&SourceSpan> {
        self.spans
            .range(..=(line, column))
            .rev()
            .map(|(_, span)| span)
            .find(|span| span.contains(line, column))
    }

    pub fn span_of(&self, key: ElementKey) -> Option<&SourceSpan> {
        self.elements.get(&key)
    }

    /// Position of the opening tag of the element bound to `key`.
    pub fn position_of(&self, key: ElementKey) -> Option<SourcePosition> {
        self.span_of(key).map(|span| span.start)
    }

    pub fn line_of(&self, key: ElementKey) -> Option<usize> {
        self.position_of(key).map(|position| position.line)
    }

    /// Bound elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = (&ElementKey, &SourceSpan)> {
        self.elements.iter()
    }
}

/// Configuration read together with the positions of its elements.
#[derive(Debug, Clone)]
pub struct ProjectConfigWithLines {
    config: ProjectConfig,
    provenance: Provenance,
}

fn index_of<T: PartialEq>(items: &[T], item: &T) -> Option<usize> {
    items.iter().position(|candidate| candidate == item)
}

impl ProjectConfigWithLines {
    pub(crate) fn new(config: ProjectConfig, provenance: Provenance) -> Self {
        Self { config, provenance }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn into_config(self) -> ProjectConfig {
        self.config
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn root_line(&self) -> Option<usize> {
        self.provenance.line_of(ElementKey::Root)
    }

    pub fn version_line(&self) -> Option<usize> {
        self.provenance.line_of(ElementKey::Version)
    }

    pub fn library_line(&self, library: &ReferencedLibrary) -> Option<usize> {
        let index = index_of(self.config.libraries(), library)?;
        self.provenance.line_of(ElementKey::Library(index))
    }

    pub fn python_path_line(&self, path: &SearchPath) -> Option<usize> {
        let index = index_of(self.config.python_paths(), path)?;
        self.provenance.line_of(ElementKey::PythonPath(index))
    }

    pub fn class_path_line(&self, path: &SearchPath) -> Option<usize> {
        let index = index_of(self.config.class_paths(), path)?;
        self.provenance.line_of(ElementKey::ClassPath(index))
    }

    pub fn remote_location_line(&self, location: &RemoteLocation) -> Option<usize> {
        let index = index_of(self.config.remote_locations(), location)?;
        self.provenance.line_of(ElementKey::RemoteLocation(index))
    }

    pub fn variable_file_line(&self, file: &ReferencedVariableFile) -> Option<usize> {
        let index = index_of(self.config.referenced_variable_files(), file)?;
        self.provenance.line_of(ElementKey::VariableFile(index))
    }

    pub fn variable_mapping_line(&self, mapping: &VariableMapping) -> Option<usize> {
        let index = index_of(self.config.variable_mappings(), mapping)?;
        self.provenance.line_of(ElementKey::VariableMapping(index))
    }

    pub fn excluded_path_line(&self, path: &ExcludedPath) -> Option<usize> {
        let index = index_of(self.config.excluded_paths(), path)?;
        self.provenance.line_of(ElementKey::ExcludedPath(index))
    }
}
