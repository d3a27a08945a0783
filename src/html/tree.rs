//! Text-bearing tree over rendered HTML
//!
//! The anchoring algorithms need an explicit tree they can walk and splice
//! rather than a live browser DOM. This module parses renderer output into
//! that tree and serializes it back. Nodes are addressed by child-index
//! paths from the fragment root, the same step addressing used by EPUB CFI
//! locations.
//!
//! Input is expected to be well-formed renderer output (XHTML-style, with
//! void elements self-closed as `<br />`). Tag soup is rejected with a
//! `ParseError` rather than repaired.

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// HTML parsing errors
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed HTML at position {position}: {message}")]
    Malformed { position: usize, message: String },

    #[error("Unexpected closing tag </{0}>")]
    UnexpectedClose(String),
}

/// Child-index path from a fragment root to a descendant node.
pub type NodePath = Vec<usize>;

/// One node of the rendered-content tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element node with its attributes and ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// HTML void elements: never carry children, serialized self-closed.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl Node {
    /// The text payload, if this is a text node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(t.as_str()),
            Node::Element(_) => None,
        }
    }

    /// The element, if this is an element node.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }
}

/// Parse rendered HTML into a fragment (ordered list of top-level nodes).
pub fn parse_html(html: &str) -> Result<Vec<Node>, ParseError> {
    let mut reader = Reader::from_str(html);
    let mut roots: Vec<Node> = Vec::new();
    // Stack of open elements; the fragment root is the implicit bottom.
    let mut stack: Vec<Element> = Vec::new();

    fn push_child(roots: &mut Vec<Node>, stack: &mut [Element], node: Node) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let element = read_element(&start, position)?;
                if is_void(&element.tag) {
                    push_child(&mut roots, &mut stack, Node::Element(element));
                } else {
                    stack.push(element);
                }
            }
            Ok(Event::Empty(start)) => {
                let element = read_element(&start, position)?;
                push_child(&mut roots, &mut stack, Node::Element(element));
            }
            Ok(Event::End(end)) => {
                let tag = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                match stack.pop() {
                    Some(element) => push_child(&mut roots, &mut stack, Node::Element(element)),
                    None => return Err(ParseError::UnexpectedClose(tag)),
                }
            }
            Ok(Event::Text(text)) => {
                let value = text.unescape().map_err(|e| ParseError::Malformed {
                    position,
                    message: e.to_string(),
                })?;
                if !value.is_empty() {
                    push_child(&mut roots, &mut stack, Node::Text(value.into_owned()));
                }
            }
            Ok(Event::CData(cdata)) => {
                let value = String::from_utf8_lossy(&cdata).into_owned();
                push_child(&mut roots, &mut stack, Node::Text(value));
            }
            // Comments, processing instructions and doctypes carry no text
            // and are not re-emitted.
            Ok(Event::Comment(_)) | Ok(Event::PI(_)) | Ok(Event::DocType(_)) | Ok(Event::Decl(_)) => {}
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ParseError::Malformed {
                    position,
                    message: e.to_string(),
                })
            }
        }
    }

    // Unclosed elements at EOF are closed implicitly, outermost last.
    while let Some(element) = stack.pop() {
        push_child(&mut roots, &mut stack, Node::Element(element));
    }

    Ok(roots)
}

fn read_element(
    start: &quick_xml::events::BytesStart<'_>,
    position: usize,
) -> Result<Element, ParseError> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).to_lowercase();
    let mut attrs = Vec::new();
    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| ParseError::Malformed {
            position,
            message: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::Malformed {
                position,
                message: e.to_string(),
            })?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(Element {
        tag,
        attrs,
        children: Vec::new(),
    })
}

/// Serialize a fragment back to an HTML string.
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => {
            out.push_str(&html_escape::encode_text(text));
        }
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (key, value) in &element.attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(value));
                out.push('"');
            }
            if is_void(&element.tag) {
                out.push_str(" />");
            } else {
                out.push('>');
                for child in &element.children {
                    write_node(out, child);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

/// Resolve a child-index path to a node within a fragment.
pub fn node_at<'a>(nodes: &'a [Node], path: &[usize]) -> Option<&'a Node> {
    let (&index, rest) = path.split_first()?;
    let node = nodes.get(index)?;
    if rest.is_empty() {
        return Some(node);
    }
    match node {
        Node::Element(element) => node_at(&element.children, rest),
        Node::Text(_) => None,
    }
}

/// Replace the node at `path` with a sequence of nodes, in place.
///
/// Sibling indices after the replaced node shift by `replacement.len() - 1`;
/// callers holding paths into the fragment must apply replacements in
/// reverse document order to keep them valid.
pub fn splice_at(nodes: &mut Vec<Node>, path: &[usize], replacement: Vec<Node>) -> bool {
    let Some((&index, rest)) = path.split_first() else {
        return false;
    };
    if rest.is_empty() {
        if index > nodes.len() {
            return false;
        }
        nodes.splice(index..(index + 1).min(nodes.len()), replacement);
        return true;
    }
    match nodes.get_mut(index) {
        Some(Node::Element(element)) => splice_at(&mut element.children, rest, replacement),
        _ => false,
    }
}
