//! A small owned element tree for CSL documents.
//!
//! Styles and locales are read with `quick-xml`'s pull parser into [`Element`]s.
//! Attribute values are then converted into typed values through the serde
//! spellings of the taxonomy and style enums.

use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::util::{from_keyword, parse_bool};

/// A structural problem in an XML document.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("{0}")]
pub(crate) struct XmlError(pub String);

impl XmlError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub(crate) struct Element {
    /// Local name, without any namespace prefix.
    pub name: String,
    /// Attributes in document order, keyed by their qualified name.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Concatenated text content of this element.
    pub text: String,
}

/// Parse a document and return its root element.
pub(crate) fn parse_document(input: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            XmlError::new(format!("invalid XML at byte {}: {e}", reader.buffer_position()))
        })?;

        match event {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::new("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| XmlError::new(format!("invalid text content: {e}")))?;
                if let Some(parent) = stack.last_mut() {
                    parent.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                let data = std::str::from_utf8(&data)
                    .map_err(|_| XmlError::new("CDATA section is not valid UTF-8"))?;
                if let Some(parent) = stack.last_mut() {
                    parent.text.push_str(data);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::new(format!("unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| XmlError::new("document has no root element"))
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, XmlError> {
    let name = std::str::from_utf8(start.local_name().as_ref())
        .map_err(|_| XmlError::new("element name is not valid UTF-8"))?
        .to_string();

    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr
            .map_err(|e| XmlError::new(format!("malformed attribute on <{name}>: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|_| XmlError::new("attribute name is not valid UTF-8"))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::new(format!("invalid value for `{key}` on <{name}>: {e}")))?
            .into_owned();
        attrs.push((key, value));
    }

    Ok(Element { name, attrs, children: Vec::new(), text: String::new() })
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(XmlError::new("document has more than one root element")),
    }
    Ok(())
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }

    pub fn string_attr(&self, key: &str) -> Option<String> {
        self.attr(key).map(ToString::to_string)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Parse a keyword attribute such as `form="short"`.
    pub fn keyword<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, XmlError> {
        self.attr(key)
            .map(|value| from_keyword(value.trim()).map_err(|_| self.invalid(key, value)))
            .transpose()
    }

    /// Parse a whitespace-separated list of keywords, e.g. `variable="title URL"`.
    pub fn keyword_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, XmlError> {
        let Some(value) = self.attr(key) else { return Ok(Vec::new()) };
        value
            .split_whitespace()
            .map(|word| from_keyword(word).map_err(|_| self.invalid(key, word)))
            .collect()
    }

    pub fn bool_attr(&self, key: &str, default: bool) -> Result<bool, XmlError> {
        match self.attr(key) {
            None => Ok(default),
            Some(value) => parse_bool(value).ok_or_else(|| self.invalid(key, value)),
        }
    }

    /// A boolean attribute whose absence is distinct from `false`.
    pub fn opt_bool_attr(&self, key: &str) -> Result<Option<bool>, XmlError> {
        self.attr(key)
            .map(|value| parse_bool(value).ok_or_else(|| self.invalid(key, value)))
            .transpose()
    }

    pub fn int_attr<T: FromStr>(&self, key: &str) -> Result<Option<T>, XmlError> {
        self.attr(key)
            .map(|value| value.trim().parse().map_err(|_| self.invalid(key, value)))
            .transpose()
    }

    fn invalid(&self, key: &str, value: &str) -> XmlError {
        XmlError::new(format!("invalid value `{value}` for `{key}` on <{}>", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree() {
        let root = parse_document(
            r#"<?xml version="1.0" encoding="utf-8"?>
            <style xmlns="http://purl.org/net/xbiblio/csl" version="1.0">
              <!-- comment -->
              <info><title>Example &amp; Co</title></info>
              <citation><layout><text variable="title"/></layout></citation>
            </style>"#,
        )
        .unwrap();

        assert_eq!(root.name, "style");
        assert_eq!(root.attr("version"), Some("1.0"));
        assert_eq!(root.child("info").unwrap().child("title").unwrap().text, "Example & Co");
        let layout = root.child("citation").unwrap().child("layout").unwrap();
        assert_eq!(layout.children[0].attr("variable"), Some("title"));
    }

    #[test]
    fn test_structural_errors() {
        assert!(parse_document("<style><citation></style>").is_err());
        assert!(parse_document("<style>").is_err());
        assert!(parse_document("").is_err());
        assert!(parse_document("<a/><b/>").is_err());
    }

    #[test]
    fn test_typed_attributes() {
        let root = parse_document(r#"<text quotes="true" et-al-min="3" form="x"/>"#).unwrap();
        assert_eq!(root.bool_attr("quotes", false), Ok(true));
        assert_eq!(root.bool_attr("strip-periods", false), Ok(false));
        assert_eq!(root.int_attr::<u32>("et-al-min"), Ok(Some(3)));
        assert!(root.keyword::<crate::taxonomy::Kind>("form").is_err());
    }
}
