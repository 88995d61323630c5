//! Generic labeled document tree
//!
//! The resolver never touches XML directly; it walks a [`Document`], a plain
//! tree of named nodes with attributes, text content, and ordered children.
//! Lookups are explicit and optional-returning: a missing element is a normal
//! outcome, not an error path.
//!
//! Dotted paths include the root element name, mirroring the external schema
//! (`drachtio.admin`, `drachtio.sip.timers.t1`, ...).

use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};

/// A single element in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Node {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Element name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trimmed text content of this element
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Look up an attribute by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All child elements, in document order
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All child elements with the given name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Text content of the first child with the given name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(Node::text)
    }
}

/// A parsed configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Node,
}

impl Document {
    /// Parse a document from its textual form.
    ///
    /// Structural problems (unbalanced tags, no root element, trailing
    /// garbage) surface as [`Error::DocumentParse`] with the underlying
    /// diagnostic.
    pub fn parse(input: &str) -> Result<Document> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Node> = Vec::new();
        let mut root: Option<Node> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let node = Node::new(element_name(e.name()), read_attributes(e)?);
                    stack.push(node);
                }
                Ok(Event::Empty(ref e)) => {
                    let node = Node::new(element_name(e.name()), read_attributes(e)?);
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::Text(ref e)) => {
                    if let Some(current) = stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|err| Error::DocumentParse(err.to_string()))?;
                        current.text.push_str(text.trim());
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(String::from_utf8_lossy(e).trim());
                    }
                }
                Ok(Event::End(_)) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| Error::DocumentParse("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => return Err(Error::DocumentParse(err.to_string())),
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(Error::DocumentParse(
                "document ends inside an open element".to_string(),
            ));
        }
        root.map(|root| Document { root })
            .ok_or_else(|| Error::DocumentParse("document has no root element".to_string()))
    }

    /// Read and parse a document from a file.
    pub fn from_file(path: &Path) -> Result<Document> {
        let input = fs::read_to_string(path).map_err(|source| Error::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Document::parse(&input)
    }

    /// The root element
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Look up a node by dotted path, starting at the root element name.
    ///
    /// Each segment selects the first matching child; `None` if any segment
    /// is missing.
    pub fn node(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split('.');
        if segments.next()? != self.root.name {
            return None;
        }
        let mut current = &self.root;
        for segment in segments {
            current = current.child(segment)?;
        }
        Some(current)
    }

    /// Text content of the node at a dotted path
    pub fn text_at(&self, path: &str) -> Option<&str> {
        self.node(path).map(Node::text)
    }
}

fn element_name(name: quick_xml::name::QName) -> String {
    String::from_utf8_lossy(name.as_ref()).into_owned()
}

fn read_attributes(e: &quick_xml::events::BytesStart) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::DocumentParse(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| Error::DocumentParse(err.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

fn attach(stack: &mut Vec<Node>, root: &mut Option<Node>, node: Node) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root.is_none() {
        *root = Some(node);
    } else {
        return Err(Error::DocumentParse(
            "document has more than one root element".to_string(),
        ));
    }
    Ok(())
}
