//! Generic XML element tree handed to the assembler.
//!
//! The tree carries no Tiled semantics: a tag name, attributes in document
//! order, child elements in document order, and the concatenated character
//! data found directly inside the element. Any XML front-end can build one;
//! [`Element::parse_str`] is the bundled quick-xml based front-end.

use crate::error::{MapError, Result};
use crate::options::ParseOptions;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::str;

/// One XML element with its attributes, children and direct character data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Tag name as written, prefix included.
    pub name: String,
    /// Attributes in document order, values unescaped.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<Element>,
    /// Character data directly inside this element (not its descendants).
    pub text: String,
}

impl Element {
    /// An element with no attributes, children or text.
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// Appends an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Appends character data.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text.push_str(&text.into());
        self
    }

    /// Raw value of the first attribute called `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Children with tag `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First child with tag `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Builds the element tree of a UTF-8 XML document with default limits.
    pub fn parse_str(xml: &str) -> Result<Element> {
        Self::parse_str_with(xml, &ParseOptions::default())
    }

    /// Builds the element tree of a UTF-8 XML document and returns its root.
    ///
    /// Elements nested deeper than `options.max_element_depth` fail with
    /// [`MapError::NestingTooDeep`]. Whitespace-only text between elements is
    /// kept as-is; the assembler decides where character data is meaningful.
    pub fn parse_str_with(xml: &str, options: &ParseOptions) -> Result<Element> {
        let limit = options.max_element_depth;
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    if stack.len() >= limit {
                        return Err(MapError::NestingTooDeep { limit });
                    }
                    stack.push(element_from_start(&e)?);
                }
                Event::Empty(e) => {
                    if stack.len() >= limit {
                        return Err(MapError::NestingTooDeep { limit });
                    }
                    let el = element_from_start(&e)?;
                    attach(&mut stack, &mut root, el)?;
                }
                Event::End(_) => {
                    let el = stack.pop().ok_or_else(|| {
                        MapError::Structure("closing tag without opening tag".into())
                    })?;
                    attach(&mut stack, &mut root, el)?;
                }
                Event::Text(t) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&t.decode()?);
                    }
                }
                Event::CData(c) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&c.decode()?);
                    }
                }
                Event::GeneralRef(r) => {
                    if let Some(top) = stack.last_mut() {
                        if let Some(ch) = r.resolve_char_ref()? {
                            top.text.push(ch);
                        } else {
                            let name = r.decode()?;
                            let resolved = resolve_predefined_entity(&name).ok_or_else(|| {
                                MapError::Structure(format!("unknown entity &{name};"))
                            })?;
                            top.text.push_str(resolved);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(MapError::Structure(format!("unclosed element <{}>", open.name)));
        }
        root.ok_or_else(|| MapError::Structure("document has no root element".into()))
    }
}

// Children are released from a work list so that dropping a deep tree does
// not recurse once per level.
impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut el) = pending.pop() {
            pending.append(&mut el.children);
        }
    }
}

fn element_from_start(e: &BytesStart<'_>) -> Result<Element> {
    let name = str::from_utf8(e.name().as_ref())?.to_string();
    let mut el = Element::new(name);
    for a in e.attributes() {
        let a = a?;
        let key = str::from_utf8(a.key.as_ref())?.to_string();
        let val = a.unescape_value()?.into_owned();
        el.attributes.push((key, val));
    }
    Ok(el)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(el),
        None if root.is_none() => *root = Some(el),
        None => {
            return Err(MapError::Structure(
                "document has more than one root element".into(),
            ))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_tree_in_document_order() {
        let root = Element::parse_str(
            r#"<?xml version="1.0"?>
            <map version="1.10"><layer id="1"/><group id="2"><layer id="3"/></group></map>"#,
        )
        .expect("parse");

        assert_eq!(root.name, "map");
        assert_eq!(root.attr("version"), Some("1.10"));
        let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["layer", "group"]);
        assert_eq!(root.children[1].children[0].attr("id"), Some("3"));
    }

    #[test]
    fn resolves_entities_in_text_and_attributes() {
        let root = Element::parse_str(r#"<text name="a &amp; b">x &lt; y &#65;</text>"#)
            .expect("parse");
        assert_eq!(root.attr("name"), Some("a & b"));
        assert_eq!(root.text, "x < y A");
    }

    #[test]
    fn rejects_document_without_root() {
        let err = Element::parse_str("<?xml version=\"1.0\"?>").unwrap_err();
        assert!(matches!(err, MapError::Structure(_)));
    }

    #[test]
    fn rejects_mismatched_tags() {
        let err = Element::parse_str("<map><layer></map>").unwrap_err();
        assert!(matches!(err, MapError::Xml(_)));
    }

    #[test]
    fn reader_errors_keep_their_source() {
        let err = Element::parse_str("<map><layer></map>").unwrap_err();
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn element_depth_is_capped_while_reading() {
        let xml = format!("{}{}", "<a>".repeat(200_000), "</a>".repeat(200_000));
        let err = Element::parse_str(&xml).unwrap_err();
        assert!(matches!(
            err,
            MapError::NestingTooDeep { limit: ParseOptions::DEFAULT_MAX_ELEMENT_DEPTH }
        ));

        let shallow = ParseOptions::default().with_max_element_depth(2);
        assert!(Element::parse_str_with("<a><b/></a>", &shallow).is_ok());
        assert!(Element::parse_str_with("<a><b><c/></b></a>", &shallow).is_err());
    }

    #[test]
    fn dropping_a_deep_tree_does_not_recurse() {
        let mut el = Element::new("a");
        for _ in 0..200_000 {
            el = Element::new("a").with_child(el);
        }
        drop(el);
    }
}
