use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::TeiError;

// @module: Owned mutable XML tree with quick-xml parse/serialize

/// One node in the tree: either a nested element or a run of character data.
/// Mixed content (text interleaved with child elements) is represented
/// directly by the order of children, so there is no separate text/tail
/// bookkeeping to keep consistent during rewrites.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with its attributes and ordered children.
///
/// Names are stored exactly as written in the source (prefix included);
/// lookups go through [`XmlElement::local_name`] so documents using a default
/// namespace and documents using a `tei:` prefix behave identically.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Element name as written in the source, e.g. "p" or "tei:p"
    pub name: String,
    /// Attributes in document order, name stored as written
    pub attributes: Vec<(String, String)>,
    /// Ordered child nodes (elements and text runs)
    pub children: Vec<XmlNode>,
}

/// Strip a namespace prefix from a qualified name.
pub fn local_name(name: &str) -> &str {
    match name.rfind(':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

impl XmlElement {
    /// Create an empty element with the given name
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Local (prefix-free) name of this element
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Look up an attribute value by exact attribute name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value for the same name
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self.attributes.iter_mut().find(|(k, _)| *k == name) {
            existing.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// Append a child element
    pub fn push_element(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }

    /// Append a text run
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    /// Iterate over direct child elements
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Mutable iteration over direct child elements
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child element with the given local name
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.local_name() == local)
    }

    /// Mutable access to the first direct child element with the given local name
    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.child_elements_mut().find(|e| e.local_name() == local)
    }

    /// First descendant element with the given local name, pre-order,
    /// the element itself excluded
    pub fn find_descendant(&self, local: &str) -> Option<&XmlElement> {
        for child in self.child_elements() {
            if child.local_name() == local {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(local) {
                return Some(found);
            }
        }
        None
    }

    /// Mutable variant of [`XmlElement::find_descendant`]
    pub fn find_descendant_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        for child in self.child_elements_mut() {
            if child.local_name() == local {
                return Some(child);
            }
            if let Some(found) = child.find_descendant_mut(local) {
                return Some(found);
            }
        }
        None
    }

    /// Count all descendant elements with the given local name
    pub fn count_descendants(&self, local: &str) -> usize {
        let mut count = 0;
        for child in self.child_elements() {
            if child.local_name() == local {
                count += 1;
            }
            count += child.count_descendants(local);
        }
        count
    }

    /// All descendant character data concatenated in reading order
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Serialize this element and its subtree to an XML string, without a declaration
    pub fn serialize(&self) -> Result<String, TeiError> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, self)
            .map_err(|e| TeiError::Projection(format!("XML serialization failed: {}", e)))?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| TeiError::Projection(format!("XML serialization produced invalid UTF-8: {}", e)))
    }

    /// Serialize as a standalone document with an XML declaration
    pub fn to_document_string(&self) -> Result<String, TeiError> {
        Ok(format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}",
            self.serialize()?
        ))
    }
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &XmlElement,
) -> quick_xml::Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for node in &element.children {
        match node {
            XmlNode::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            XmlNode::Element(e) => write_element(writer, e)?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

/// Parse a well-formed XML document into an owned tree.
///
/// Fails with [`TeiError::InvalidXml`] on malformed input: mismatched or
/// unclosed tags, character data outside the root element, or more than one
/// root element. Comments, processing instructions and doctype declarations
/// are dropped; CDATA sections become plain text runs.
pub fn parse(xml: &str) -> Result<XmlElement, TeiError> {
    let mut reader = Reader::from_str(xml);
    // Virtual document node; its single element child becomes the root
    let mut stack: Vec<XmlElement> = vec![XmlElement::new("#document")];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(element_from_start(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let element = element_from_start(&e)?;
                attach_child(&mut stack, XmlNode::Element(element))?;
            }
            Ok(Event::End(_)) => {
                // Name mismatches are already rejected by the reader
                let finished = stack.pop().ok_or_else(|| {
                    TeiError::InvalidXml("closing tag without matching opening tag".to_string())
                })?;
                attach_child(&mut stack, XmlNode::Element(finished))?;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| TeiError::InvalidXml(err.to_string()))?;
                attach_text(&mut stack, &text)?;
            }
            Ok(Event::CData(e)) => {
                let bytes = e.into_inner();
                let text = std::str::from_utf8(&bytes)
                    .map_err(|err| TeiError::InvalidXml(err.to_string()))?;
                attach_text(&mut stack, text)?;
            }
            Ok(Event::Decl(_)) | Ok(Event::Comment(_)) | Ok(Event::PI(_)) | Ok(Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(e) => return Err(TeiError::InvalidXml(e.to_string())),
        }
    }

    if stack.len() != 1 {
        return Err(TeiError::InvalidXml(
            "unexpected end of document with unclosed elements".to_string(),
        ));
    }

    let document = stack.pop().unwrap_or_default();
    let mut roots = document.children.into_iter().filter_map(|node| match node {
        XmlNode::Element(e) => Some(e),
        XmlNode::Text(_) => None,
    });

    match (roots.next(), roots.next()) {
        (Some(root), None) => Ok(root),
        (Some(_), Some(_)) => Err(TeiError::InvalidXml(
            "document has more than one root element".to_string(),
        )),
        _ => Err(TeiError::InvalidXml("document has no root element".to_string())),
    }
}

fn element_from_start(start: &BytesStart) -> Result<XmlElement, TeiError> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| TeiError::InvalidXml(e.to_string()))?
        .to_string();
    let mut element = XmlElement::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| TeiError::InvalidXml(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| TeiError::InvalidXml(e.to_string()))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| TeiError::InvalidXml(e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn attach_child(stack: &mut Vec<XmlElement>, node: XmlNode) -> Result<(), TeiError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None => Err(TeiError::InvalidXml(
            "content found after the root element was closed".to_string(),
        )),
    }
}

fn attach_text(stack: &mut Vec<XmlElement>, text: &str) -> Result<(), TeiError> {
    // Whitespace between top-level constructs is insignificant; anything
    // else outside the root is malformed
    if stack.len() == 1 && text.trim().is_empty() {
        return Ok(());
    }
    if stack.len() == 1 {
        return Err(TeiError::InvalidXml(
            "character data outside the root element".to_string(),
        ));
    }
    attach_child(stack, XmlNode::Text(text.to_string()))
}
