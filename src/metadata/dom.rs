//! Generic XML tree built from an XMP packet.
//!
//! The tree keeps every piece of markup the packet contains (declaration,
//! processing instructions, comments, CDATA) so the viewer can show the packet
//! exactly as it is structured, not as an interpreted RDF model.

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::error::ExtractionFailure;

/// Discriminant of an [`XmlNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Document,
    DocumentType,
    Element,
    Attribute,
    Text,
    CData,
    Comment,
    ProcessingInstruction,
    Declaration,
}

/// A node of the generic XML tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XmlNode {
    pub name: String,
    pub kind: NodeKind,
    pub value: String,
    pub attributes: Vec<XmlNode>,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn leaf(kind: NodeKind, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn document() -> Self {
        Self::leaf(NodeKind::Document, "#document", "")
    }

    pub fn element(name: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Element, name, "")
    }

    /// An attribute node; its value is also carried as a single text child.
    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut node = Self::leaf(NodeKind::Attribute, name, value.clone());
        node.children.push(Self::text(value));
        node
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Text, "#text", value)
    }

    pub fn cdata(value: impl Into<String>) -> Self {
        Self::leaf(NodeKind::CData, "#cdata-section", value)
    }

    pub fn comment(value: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Comment, "#comment", value)
    }

    pub fn processing_instruction(target: impl Into<String>, value: impl Into<String>) -> Self {
        Self::leaf(NodeKind::ProcessingInstruction, target, value)
    }

    pub fn declaration(value: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Declaration, "xml", value)
    }

    pub fn doctype(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::leaf(NodeKind::DocumentType, name, value)
    }

    pub fn with_attribute(mut self, attribute: XmlNode) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree, attributes included.
    pub fn node_count(&self) -> usize {
        1 + self
            .attributes
            .iter()
            .chain(&self.children)
            .map(XmlNode::node_count)
            .sum::<usize>()
    }
}

/// Parse an XML document into a generic tree rooted at a `#document` node.
///
/// Whitespace-only text between markup is dropped; adjacent text and entity
/// references are merged into one text node.
pub fn parse_xmp_document(xml: &str) -> Result<XmlNode, ExtractionFailure> {
    let mut reader = Reader::from_str(xml);

    // stack[0] is the document; the last entry is the open element
    let mut stack = vec![XmlNode::document()];
    let mut pending_text = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractionFailure::Xml(format!("{e} at byte {}", reader.buffer_position())))?;

        if !matches!(event, Event::Text(_) | Event::GeneralRef(_)) {
            flush_text(&mut pending_text, &mut stack);
        }

        match event {
            Event::Start(e) => {
                let element = element_from(&e)?;
                stack.push(element);
            }
            Event::Empty(e) => {
                let element = element_from(&e)?;
                append(&mut stack, element);
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if stack.len() < 2 {
                    return Err(ExtractionFailure::Xml(format!("unexpected end tag </{name}>")));
                }
                let Some(element) = stack.pop() else { break };
                if element.name != name {
                    return Err(ExtractionFailure::Xml(format!(
                        "end tag </{name}> does not match <{}>",
                        element.name
                    )));
                }
                append(&mut stack, element);
            }
            Event::Text(e) => {
                let raw = String::from_utf8_lossy(e.as_ref());
                match unescape(&raw) {
                    Ok(text) => pending_text.push_str(&text),
                    Err(_) => pending_text.push_str(&raw),
                }
            }
            Event::GeneralRef(e) => {
                let name = String::from_utf8_lossy(e.as_ref()).to_string();
                let resolved = resolve_reference(&name).ok_or_else(|| {
                    ExtractionFailure::Xml(format!("unknown entity reference &{name};"))
                })?;
                pending_text.push(resolved);
            }
            Event::CData(e) => {
                let value = String::from_utf8_lossy(e.as_ref()).to_string();
                append(&mut stack, XmlNode::cdata(value));
            }
            Event::Comment(e) => {
                let value = String::from_utf8_lossy(e.as_ref()).to_string();
                append(&mut stack, XmlNode::comment(value));
            }
            Event::Decl(e) => {
                let raw = String::from_utf8_lossy(e.as_ref()).to_string();
                let raw = raw.trim();
                let body = raw.strip_prefix("xml").map(str::trim).unwrap_or(raw);
                append(&mut stack, XmlNode::declaration(body));
            }
            Event::PI(e) => {
                let (target, body) = split_target(&String::from_utf8_lossy(e.as_ref()));
                append(&mut stack, XmlNode::processing_instruction(target, body));
            }
            Event::DocType(e) => {
                let (name, body) = split_target(&String::from_utf8_lossy(e.as_ref()));
                append(&mut stack, XmlNode::doctype(name, body));
            }
            Event::Eof => break,
        }
    }

    if stack.len() > 1 {
        let open = stack.last().map(|n| n.name.clone()).unwrap_or_default();
        return Err(ExtractionFailure::Xml(format!("unclosed element <{open}>")));
    }
    stack
        .pop()
        .ok_or_else(|| ExtractionFailure::Xml("empty document".into()))
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlNode, ExtractionFailure> {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
    let mut element = XmlNode::element(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ExtractionFailure::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let raw_value = String::from_utf8_lossy(attr.value.as_ref());
        let value = match unescape(&raw_value) {
            Ok(unescaped) => unescaped.to_string(),
            Err(_) => raw_value.to_string(),
        };
        element.attributes.push(XmlNode::attribute(key, value));
    }
    Ok(element)
}

fn append(stack: &mut [XmlNode], node: XmlNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn flush_text(pending: &mut String, stack: &mut [XmlNode]) {
    if pending.is_empty() {
        return;
    }
    let text = std::mem::take(pending);
    if !text.trim().is_empty() {
        append(stack, XmlNode::text(text));
    }
}

/// Split `target rest` at the first whitespace.
fn split_target(content: &str) -> (String, String) {
    let content = content.trim();
    match content.split_once(char::is_whitespace) {
        Some((target, rest)) => (target.to_string(), rest.trim().to_string()),
        None => (content.to_string(), String::new()),
    }
}

fn resolve_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}
