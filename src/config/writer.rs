//! `red.xml` serialization.

use super::error::ConfigWriteError;
use super::reader::tags;
use crate::models::{ProjectConfig, RedSettings};
use camino::Utf8Path;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;
use tempfile::NamedTempFile;

pub const DEFAULT_INDENT: usize = 4;

type XmlWriter = Writer<Vec<u8>>;

/// Writes configurations as indented UTF-8 XML.
#[derive(Debug, Clone, Copy)]
pub struct ConfigWriter {
    indent: usize,
}

impl Default for ConfigWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigWriter {
    pub fn new() -> Self {
        Self::with_indent(DEFAULT_INDENT)
    }

    pub fn with_indent(indent: usize) -> Self {
        Self { indent }
    }

    /// Writer using the indent width from the tool settings.
    pub fn from_settings(settings: &RedSettings) -> Self {
        Self::with_indent(settings.red_settings.indent_width)
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn write(&self, config: &ProjectConfig) -> Result<Vec<u8>, ConfigWriteError> {
        if config.is_null() {
            return Err(ConfigWriteError::NullConfig);
        }

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', self.indent);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        writer.write_event(Event::Start(BytesStart::new(tags::ROOT)))?;

        text_element(&mut writer, tags::VERSION, config.version())?;

        if let Some(environment) = config.execution_environment() {
            let mut start = BytesStart::new(tags::EXECUTION_ENVIRONMENT);
            if let Some(path) = &environment.path {
                start.push_attribute((tags::ATTR_PATH, path.as_str()));
            }
            if let Some(interpreter) = environment.interpreter {
                start.push_attribute((tags::ATTR_INTERPRETER, interpreter.as_str()));
            }
            writer.write_event(Event::Empty(start))?;
        }

        text_element(
            &mut writer,
            tags::RELATIVE_TO,
            config.relativity_point().as_str(),
        )?;

        for mapping in config.variable_mappings() {
            empty_element(
                &mut writer,
                tags::VARIABLE,
                &[
                    (tags::ATTR_NAME, mapping.name.as_str()),
                    (tags::ATTR_VALUE, mapping.value.as_str()),
                ],
            )?;
        }

        for library in config.libraries() {
            empty_element(
                &mut writer,
                tags::LIBRARY,
                &[
                    (tags::ATTR_TYPE, library.library_type.as_str()),
                    (tags::ATTR_NAME, library.name.as_str()),
                    (tags::ATTR_PATH, library.path.as_str()),
                ],
            )?;
        }

        for (tag, paths) in [
            (tags::PYTHON_PATH, config.python_paths()),
            (tags::CLASS_PATH, config.class_paths()),
        ] {
            wrapper(&mut writer, tag, paths.is_empty(), |writer| {
                for path in paths {
                    empty_element(
                        writer,
                        tags::PATH,
                        &[(tags::ATTR_LOCATION, path.location.as_str())],
                    )?;
                }
                Ok(())
            })?;
        }

        for location in config.remote_locations() {
            empty_element(
                &mut writer,
                tags::REMOTE_LOCATION,
                &[(tags::ATTR_URI, location.uri.as_str())],
            )?;
        }

        for file in config.referenced_variable_files() {
            let mut start = BytesStart::new(tags::VARIABLE_FILE);
            start.push_attribute((tags::ATTR_PATH, file.path.as_str()));
            if file.arguments.is_empty() {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                for argument in &file.arguments {
                    text_element(&mut writer, tags::ARGUMENTS, argument)?;
                }
                writer.write_event(Event::End(BytesEnd::new(tags::VARIABLE_FILE)))?;
            }
        }

        let excluded = config.excluded_paths();
        wrapper(&mut writer, tags::EXCLUDED, excluded.is_empty(), |writer| {
            for path in excluded {
                empty_element(writer, tags::EXCLUDED_PATH, &[(tags::ATTR_PATH, path.path.as_str())])?;
            }
            Ok(())
        })?;

        let validation = config.validation();
        text_element(
            &mut writer,
            tags::FILE_SIZE_CHECKING,
            &validation.file_size_checking_enabled.to_string(),
        )?;
        text_element(
            &mut writer,
            tags::FILE_MAX_SIZE,
            &validation.file_max_size.to_string(),
        )?;
        text_element(
            &mut writer,
            tags::AUTO_RELOAD,
            &validation.libraries_auto_reload_enabled.to_string(),
        )?;
        text_element(
            &mut writer,
            tags::AUTO_DISCOVERING,
            &validation.libraries_auto_discovering_enabled.to_string(),
        )?;
        text_element(
            &mut writer,
            tags::SUMMARY_WINDOW,
            &validation
                .libraries_auto_discovering_summary_window_enabled
                .to_string(),
        )?;

        writer.write_event(Event::End(BytesEnd::new(tags::ROOT)))?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn write_to_string(&self, config: &ProjectConfig) -> Result<String, ConfigWriteError> {
        let bytes = self.write(config)?;
        // quick-xml only emits the UTF-8 text it was given
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Serializes the whole document first, then replaces `path` through a
    /// temporary file in the same directory.
    pub fn write_file(&self, config: &ProjectConfig, path: &Utf8Path) -> Result<(), ConfigWriteError> {
        let bytes = self.write(config)?;

        let name = path.file_name().unwrap_or(path.as_str()).to_string();
        let io_error = |source: std::io::Error| ConfigWriteError::Io {
            name: name.clone(),
            source,
        };

        let directory = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(directory).map_err(io_error)?;
        temp.write_all(&bytes).map_err(io_error)?;
        temp.flush().map_err(io_error)?;
        temp.persist(path).map_err(|error| io_error(error.error))?;

        tracing::debug!("Wrote project configuration to {}", path);
        Ok(())
    }
}

fn text_element(writer: &mut XmlWriter, tag: &str, text: &str) -> Result<(), ConfigWriteError> {
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(tag)))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn empty_element(
    writer: &mut XmlWriter,
    tag: &str,
    attributes: &[(&str, &str)],
) -> Result<(), ConfigWriteError> {
    let mut start = BytesStart::new(tag);
    for attribute in attributes {
        start.push_attribute(*attribute);
    }
    writer.write_event(Event::Empty(start))?;
    Ok(())
}

/// Container element, written as an empty tag when it has no children.
fn wrapper(
    writer: &mut XmlWriter,
    tag: &str,
    empty: bool,
    children: impl FnOnce(&mut XmlWriter) -> Result<(), ConfigWriteError>,
) -> Result<(), ConfigWriteError> {
    if empty {
        writer.write_event(Event::Empty(BytesStart::new(tag)))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    children(writer)?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
