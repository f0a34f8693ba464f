//! Mutable XML element tree for OOXML parts.
//!
//! Parts are read with `quick_xml` into a small DOM, edited in place, and
//! written back. Whitespace text, comments, processing instructions, and the
//! declaration are kept so untouched regions serialise the way they came in.

use office_core::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// A node inside an element.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Unescaped character data.
    Text(String),
    /// Anything else (comments, CDATA, declarations), written back verbatim.
    Other(Event<'static>),
}

/// An element with its qualified name, attributes, and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

/// A parsed XML part.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    prolog: Vec<XmlNode>,
    pub root: XmlElement,
    epilog: Vec<XmlNode>,
}

/// Extract the local name from a potentially namespaced element name.
pub fn local_name(name: &str) -> &str {
    match name.find(':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.set_attr(key, value);
        self
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::XmlError(format!("bad attribute: {}", e)))?;
            let value = attr
                .unescape_value()
                .map_err(|e| Error::XmlError(format!("bad attribute value: {}", e)))?;
            element.attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value.into_owned(),
            ));
        }
        Ok(element)
    }

    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Namespace prefix of this element's name, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.name.find(':').map(|pos| &self.name[..pos])
    }

    /// Qualified name for a sibling element in this element's namespace.
    pub fn qualify(&self, local: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }

    /// Attribute value by exact qualified name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value by local name, ignoring any prefix.
    pub fn attr_local(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| local_name(k) == local)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value by local name, only among namespaced attributes.
    ///
    /// Distinguishes `r:id="rId2"` from a plain `id="256"` on the same element.
    pub fn prefixed_attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.contains(':') && local_name(k) == local)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.local_name() == local)
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|el| el.local_name() == local)
    }

    /// Child elements with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |el| el.local_name() == local)
    }

    pub fn children_named_mut<'a>(
        &'a mut self,
        local: &'a str,
    ) -> impl Iterator<Item = &'a mut XmlElement> {
        self.elements_mut().filter(move |el| el.local_name() == local)
    }

    /// Follow a path of local names through first matching children.
    pub fn find(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter().try_fold(self, |el, local| el.child(local))
    }

    pub fn find_mut(&mut self, path: &[&str]) -> Option<&mut XmlElement> {
        path.iter().try_fold(self, |el, local| el.child_mut(local))
    }

    /// First descendant (depth-first, not self) with the given local name.
    pub fn find_descendant(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find_map(|el| {
            if el.local_name() == local {
                Some(el)
            } else {
                el.find_descendant(local)
            }
        })
    }

    /// Whether any descendant (not self) has the given local name.
    pub fn contains_descendant(&self, local: &str) -> bool {
        self.elements()
            .any(|el| el.local_name() == local || el.contains_descendant(local))
    }

    /// True if this element holds only character data (no child elements).
    pub fn is_leaf(&self) -> bool {
        !self.children.iter().any(|n| matches!(n, XmlNode::Element(_)))
    }

    /// Concatenated direct character data.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }

    pub fn push_element(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }

    /// Get the child with local name `local`, creating it (as `qualified`)
    /// at the position required by `order` when absent.
    ///
    /// `order` lists local names in schema sequence. Existing children whose
    /// names are not in `order` never move.
    pub fn upsert_child_ordered(
        &mut self,
        qualified: &str,
        order: &[&str],
    ) -> &mut XmlElement {
        let local = local_name(qualified);
        let existing = self.children.iter().position(
            |node| matches!(node, XmlNode::Element(el) if el.local_name() == local),
        );

        let index = match existing {
            Some(index) => index,
            None => {
                let rank = order.iter().position(|name| *name == local);
                let insert_at = rank
                    .and_then(|rank| {
                        self.children.iter().position(|node| match node {
                            XmlNode::Element(el) => order
                                .iter()
                                .position(|name| *name == el.local_name())
                                .is_some_and(|other| other > rank),
                            _ => false,
                        })
                    })
                    .unwrap_or(self.children.len());
                self.children
                    .insert(insert_at, XmlNode::Element(XmlElement::new(qualified)));
                insert_at
            }
        };

        match &mut self.children[index] {
            XmlNode::Element(el) => el,
            _ => unreachable!("index always points at an element"),
        }
    }

    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            return write_event(writer, Event::Empty(start));
        }

        write_event(writer, Event::Start(start))?;
        for child in &self.children {
            child.write(writer)?;
        }
        write_event(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

impl XmlNode {
    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            XmlNode::Element(el) => el.write(writer),
            XmlNode::Text(text) => write_event(writer, Event::Text(BytesText::new(text))),
            XmlNode::Other(event) => write_event(writer, event.clone()),
        }
    }
}

fn write_event<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::XmlError(format!("Failed to write XML: {}", e)))
}

impl XmlDocument {
    /// Parse a complete XML part.
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let node = match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    stack.push(XmlElement::from_start(e)?);
                    continue;
                }
                Ok(Event::Empty(ref e)) => XmlNode::Element(XmlElement::from_start(e)?),
                Ok(Event::End(_)) => match stack.pop() {
                    Some(el) => XmlNode::Element(el),
                    None => return Err(Error::XmlError("unbalanced end tag".to_string())),
                },
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().map_err(|err| {
                        Error::XmlError(format!(
                            "bad text at position {}: {}",
                            reader.buffer_position(),
                            err
                        ))
                    })?;
                    XmlNode::Text(text.into_owned())
                }
                Ok(Event::Eof) => break,
                Ok(other) => XmlNode::Other(other.into_owned()),
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            };

            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
            } else if root.is_some() {
                epilog.push(node);
            } else {
                match node {
                    XmlNode::Element(el) => root = Some(el),
                    other => prolog.push(other),
                }
            }
        }

        if !stack.is_empty() {
            return Err(Error::XmlError("unexpected end of document".to_string()));
        }
        let root = root.ok_or_else(|| Error::XmlError("document has no root element".to_string()))?;

        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    /// Serialise back to UTF-8 bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.prolog {
            node.write(&mut writer)?;
        }
        self.root.write(&mut writer)?;
        for node in &self.epilog {
            node.write(&mut writer)?;
        }
        Ok(writer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><!-- note --><a:p><a:r><a:rPr lang="en-US" b="1"/><a:t>Tom &amp; Jerry </a:t></a:r></a:p></p:sld>"#;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("p:sp"), "sp");
        assert_eq!(local_name("a:t"), "t");
        assert_eq!(local_name("sp"), "sp");
    }

    #[test]
    fn test_parse_and_navigate() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.root.name, "p:sld");
        assert_eq!(doc.root.prefix(), Some("p"));

        let t = doc.root.find(&["p", "r", "t"]).unwrap();
        assert_eq!(t.text(), "Tom & Jerry ");
        assert!(t.is_leaf());

        let rpr = doc.root.find(&["p", "r", "rPr"]).unwrap();
        assert_eq!(rpr.attr("b"), Some("1"));
        assert_eq!(rpr.attr_local("lang"), Some("en-US"));
        assert!(doc.root.contains_descendant("rPr"));
        assert_eq!(doc.root.find_descendant("t").map(|t| t.text()), Some("Tom & Jerry ".to_string()));
    }

    #[test]
    fn test_prefixed_attr() {
        let el = XmlElement::new("p:sldId")
            .with_attr("id", "256")
            .with_attr("r:id", "rId2");
        assert_eq!(el.prefixed_attr("id"), Some("rId2"));
        assert_eq!(el.attr("id"), Some("256"));
    }

    #[test]
    fn test_round_trip_preserves_content() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let bytes = doc.to_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(text.contains("<!-- note -->"));
        assert!(text.contains("<a:rPr lang=\"en-US\" b=\"1\"/>"));
        assert!(text.contains("Tom &amp; Jerry </a:t>"));

        let reparsed = XmlDocument::parse(&text).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_set_text_escapes_on_write() {
        let mut doc = XmlDocument::parse(SAMPLE).unwrap();
        doc.root
            .find_mut(&["p", "r", "t"])
            .unwrap()
            .set_text("<汤姆> & 杰瑞");
        let text = String::from_utf8(doc.to_bytes().unwrap()).unwrap();
        assert!(text.contains("&lt;汤姆&gt; &amp; 杰瑞"));
    }

    #[test]
    fn test_upsert_child_ordered() {
        let order = ["ln", "solidFill", "latin", "ea", "cs", "hlinkClick"];
        let mut rpr = XmlElement::new("a:rPr");
        rpr.push_element(XmlElement::new("a:solidFill"));
        rpr.push_element(XmlElement::new("a:hlinkClick"));

        rpr.upsert_child_ordered("a:ea", &order).set_attr("typeface", "SimSun");
        rpr.upsert_child_ordered("a:latin", &order).set_attr("typeface", "Arial");
        // Existing child is reused.
        rpr.upsert_child_ordered("a:latin", &order).set_attr("typeface", "Calibri");

        let names: Vec<&str> = rpr.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a:solidFill", "a:latin", "a:ea", "a:hlinkClick"]);
        assert_eq!(rpr.child("latin").unwrap().attr("typeface"), Some("Calibri"));
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        assert!(XmlDocument::parse("<a><b></a>").is_err());
        assert!(XmlDocument::parse("").is_err());
    }
}
