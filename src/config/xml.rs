// Position-aware XML element tree.
//
// The document is parsed once with quick-xml; each element records the span
// of its tags as it is built, so no second pass over the token stream is
// needed to recover positions.

use super::error::ConfigReadError;
use super::provenance::{SourcePosition, SourceSpan};
use quick_xml::Reader;
use quick_xml::events::Event;

#[derive(Debug, Clone)]
pub(crate) struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    text: String,
    pub span: SourceSpan,
}

impl XmlElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Character data exactly as written, whitespace included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Character data without surrounding whitespace, for scalar values.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    pub fn line(&self) -> usize {
        self.span.start.line
    }

    /// Visits this element and all descendants, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a XmlElement)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Maps byte offsets to 1-based line/column positions.
pub(crate) struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(index, _)| index + 1),
        );
        Self { text, line_starts }
    }

    pub fn position(&self, offset: usize) -> SourcePosition {
        let offset = offset.min(self.text.len());
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        let line_start = self.line_starts[line_index];
        let column = self
            .text
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - line_start);
        SourcePosition {
            line: line_index + 1,
            column: column + 1,
            offset,
        }
    }
}

/// Offset of the `<` opening the tag whose event starts near `offset`.
fn tag_start(text: &str, offset: usize) -> usize {
    let end = (offset + 1).min(text.len());
    text.get(..end)
        .and_then(|prefix| prefix.rfind('<'))
        .unwrap_or(offset)
}

fn invalid(line: usize, message: impl Into<String>) -> ConfigReadError {
    ConfigReadError::Invalid {
        line,
        message: message.into(),
    }
}

/// Parses `text` into its root element.
pub(crate) fn parse_document(text: &str) -> Result<XmlElement, ConfigReadError> {
    let index = LineIndex::new(text);
    let malformed = |offset: usize, source: quick_xml::Error| ConfigReadError::Malformed {
        line: index.position(offset).line,
        source,
    };

    let mut reader = Reader::from_str(text);
    reader.expand_empty_elements(true);

    let mut open: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event_start = reader.buffer_position();
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(source) => return Err(malformed(reader.buffer_position(), source)),
        };

        match event {
            Event::Start(start) => {
                let position = index.position(tag_start(text, event_start));
                if root.is_some() && open.is_empty() {
                    return Err(invalid(position.line, "Content after the root element"));
                }

                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                let mut attributes = Vec::new();
                for attribute in start.attributes() {
                    let attribute = attribute
                        .map_err(|error| malformed(event_start, quick_xml::Error::from(error)))?;
                    let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
                    let value = attribute
                        .unescape_value()
                        .map_err(|error| malformed(event_start, error))?
                        .into_owned();
                    attributes.push((key, value));
                }

                open.push(XmlElement {
                    name,
                    attributes,
                    children: Vec::new(),
                    text: String::new(),
                    span: SourceSpan {
                        start: position,
                        end: position,
                    },
                });
            }
            Event::End(_) => {
                let Some(mut element) = open.pop() else {
                    return Err(invalid(
                        index.position(event_start).line,
                        "Closing tag without an opening tag",
                    ));
                };
                element.span.end = index.position(reader.buffer_position());
                match open.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(content) => {
                let content = content
                    .unescape()
                    .map_err(|error| malformed(event_start, error))?;
                match open.last_mut() {
                    Some(current) => current.text.push_str(&content),
                    None if content.trim().is_empty() => {}
                    None => {
                        return Err(invalid(
                            index.position(event_start).line,
                            "Text outside of the root element",
                        ));
                    }
                }
            }
            Event::CData(data) => {
                if let Some(current) = open.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(invalid(
            unclosed.line(),
            format!("Element '{}' is not closed", unclosed.name),
        ));
    }

    root.ok_or_else(|| invalid(1, "Document has no root element"))
}
