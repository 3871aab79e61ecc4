//! XML documents as an arena of elements
//!
//! The document node is element 0; the root element is its only child.
//! Element and attribute names are stored with their resolved namespace so
//! XPath name tests can match on (namespace, local name).

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{RmlError, RmlResult};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Index of an element in its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

/// Something an XPath step can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XmlItem {
    Element(ElementId),
    /// Attribute `n` of an element
    Attribute(ElementId, usize),
    /// The direct text children of an element (`text()`)
    Text(ElementId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlName {
    pub namespace: Option<String>,
    pub local: String,
}

#[derive(Debug, Clone)]
pub struct XmlAttribute {
    pub name: XmlName,
    pub value: String,
}

#[derive(Debug, Clone)]
enum Child {
    Element(ElementId),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct XmlElement {
    pub name: XmlName,
    pub attributes: Vec<XmlAttribute>,
    pub parent: Option<ElementId>,
    children: Vec<Child>,
}

/// A parsed XML document
#[derive(Debug, Clone)]
pub struct XmlDocument {
    elements: Vec<XmlElement>,
}

impl XmlDocument {
    pub const DOCUMENT: ElementId = ElementId(0);

    /// Parse a document, resolving namespace prefixes as declared in it
    pub fn parse(text: &str) -> RmlResult<Self> {
        let mut doc = XmlDocument {
            elements: vec![XmlElement {
                name: XmlName {
                    namespace: None,
                    local: String::new(),
                },
                attributes: Vec::new(),
                parent: None,
                children: Vec::new(),
            }],
        };

        let mut reader = Reader::from_str(text);
        let mut open: Vec<ElementId> = vec![Self::DOCUMENT];
        let mut scopes: Vec<Vec<(String, String)>> = Vec::new();

        loop {
            let position = reader.buffer_position();
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let parent = *open.last().unwrap_or(&Self::DOCUMENT);
                    let id = doc.open_element(&e, parent, &mut scopes)?;
                    open.push(id);
                }
                Ok(Event::Empty(e)) => {
                    let parent = *open.last().unwrap_or(&Self::DOCUMENT);
                    doc.open_element(&e, parent, &mut scopes)?;
                    scopes.pop();
                }
                Ok(Event::End(_)) => {
                    if open.len() <= 1 {
                        return Err(RmlError::Source(format!(
                            "unbalanced end tag at byte {position}"
                        )));
                    }
                    open.pop();
                    scopes.pop();
                }
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(|e| {
                        RmlError::Source(format!("XML text at byte {position}: {e}"))
                    })?;
                    doc.push_text(*open.last().unwrap_or(&Self::DOCUMENT), &text);
                }
                Ok(Event::CData(c)) => {
                    let text = String::from_utf8_lossy(&c).into_owned();
                    doc.push_text(*open.last().unwrap_or(&Self::DOCUMENT), &text);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(RmlError::Source(format!("XML error at byte {position}: {e}")));
                }
            }
        }

        if open.len() > 1 {
            return Err(RmlError::Source("unexpected end of XML document".to_string()));
        }
        if doc.root().is_none() {
            return Err(RmlError::Source("XML document has no root element".to_string()));
        }
        Ok(doc)
    }

    fn open_element(
        &mut self,
        e: &BytesStart<'_>,
        parent: ElementId,
        scopes: &mut Vec<Vec<(String, String)>>,
    ) -> RmlResult<ElementId> {
        let mut declared = Vec::new();
        let mut raw_attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| RmlError::Source(format!("XML attribute: {err}")))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| RmlError::Source(format!("XML attribute {key}: {err}")))?
                .into_owned();
            if key == "xmlns" {
                declared.push((String::new(), value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                declared.push((prefix.to_string(), value));
            } else {
                raw_attrs.push((key, value));
            }
        }
        scopes.push(declared);

        let raw_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let name = resolve_name(&raw_name, scopes, true);
        let attributes = raw_attrs
            .into_iter()
            .map(|(key, value)| XmlAttribute {
                name: resolve_name(&key, scopes, false),
                value,
            })
            .collect();

        let id = ElementId(self.elements.len());
        self.elements.push(XmlElement {
            name,
            attributes,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.elements[parent.0].children.push(Child::Element(id));
        Ok(id)
    }

    fn push_text(&mut self, element: ElementId, text: &str) {
        if element == Self::DOCUMENT {
            return;
        }
        let children = &mut self.elements[element.0].children;
        if let Some(Child::Text(existing)) = children.last_mut() {
            existing.push_str(text);
        } else {
            children.push(Child::Text(text.to_string()));
        }
    }

    /// The root element
    pub fn root(&self) -> Option<ElementId> {
        self.child_elements(Self::DOCUMENT).next()
    }

    pub fn element(&self, id: ElementId) -> &XmlElement {
        &self.elements[id.0]
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements[id.0].parent
    }

    pub fn child_elements(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.elements[id.0].children.iter().filter_map(|c| match c {
            Child::Element(child) => Some(*child),
            Child::Text(_) => None,
        })
    }

    /// `id` followed by all of its descendants, in document order
    pub fn descendants_or_self(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            let children: Vec<ElementId> = self.child_elements(next).collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Concatenated direct text children
    pub fn direct_text(&self, id: ElementId) -> String {
        self.elements[id.0]
            .children
            .iter()
            .filter_map(|c| match c {
                Child::Text(t) => Some(t.as_str()),
                Child::Element(_) => None,
            })
            .collect()
    }

    /// XPath string value: all descendant text in document order
    pub fn text_content(&self, id: ElementId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: ElementId, out: &mut String) {
        for child in &self.elements[id.0].children {
            match child {
                Child::Text(t) => out.push_str(t),
                Child::Element(e) => self.collect_text(*e, out),
            }
        }
    }

    /// String value of a selected item
    pub fn string_value(&self, item: XmlItem) -> String {
        match item {
            XmlItem::Element(id) => self.text_content(id),
            XmlItem::Attribute(id, n) => self.elements[id.0]
                .attributes
                .get(n)
                .map(|a| a.value.clone())
                .unwrap_or_default(),
            XmlItem::Text(id) => self.direct_text(id),
        }
    }
}

fn resolve_name(raw: &str, scopes: &[Vec<(String, String)>], use_default: bool) -> XmlName {
    let (prefix, local) = match raw.split_once(':') {
        Some((p, l)) => (Some(p), l),
        None => (None, raw),
    };

    let namespace = match prefix {
        Some("xml") => Some(XML_NS.to_string()),
        Some(p) => lookup_prefix(scopes, p),
        // Unprefixed attributes are never in the default namespace
        None if use_default => lookup_prefix(scopes, "").filter(|ns| !ns.is_empty()),
        None => None,
    };

    XmlName {
        namespace,
        local: local.to_string(),
    }
}

fn lookup_prefix(scopes: &[Vec<(String, String)>], prefix: &str) -> Option<String> {
    scopes
        .iter()
        .rev()
        .flat_map(|frame| frame.iter().rev())
        .find(|(p, _)| p == prefix)
        .map(|(_, ns)| ns.clone())
}
