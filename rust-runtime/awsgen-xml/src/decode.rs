/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Decoding of XML payloads into [`Document`] trees.
//!
//! The mapping is schema-less:
//! - an element with child elements or attributes becomes an object keyed by child name
//! - repeated sibling elements with the same name are collected into an array
//! - any other element becomes a string holding its (unescaped) text
//!
//! Namespace declarations are dropped. Callers that know the shape of the payload are expected
//! to normalize single elements into lists where the shape says so.

use crate::escape::{unescape, UnescapeError};
use awsgen_types::Document;
use indexmap::map::Entry;
use indexmap::IndexMap;
use xmlparser::{ElementEnd, Token, Tokenizer};

/// Failure to decode an XML payload.
#[derive(Debug, thiserror::Error)]
pub enum XmlDecodeError {
    /// The payload is not valid UTF-8.
    #[error("XML payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    /// The tokenizer rejected the payload.
    #[error("invalid XML")]
    InvalidXml(#[from] xmlparser::Error),
    /// An entity reference could not be resolved.
    #[error("invalid XML escape")]
    InvalidEscape(#[from] UnescapeError),
    /// The element structure is not well formed.
    #[error("malformed XML: {0}")]
    Malformed(&'static str),
}

/// The root element of a decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRoot {
    /// Root element name, including any namespace prefix
    pub name: String,
    /// Root element contents
    pub value: Document,
}

#[derive(Debug)]
struct Frame {
    name: String,
    attributes: Vec<(String, String)>,
    children: IndexMap<String, Document>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: IndexMap::new(),
            text: String::new(),
        }
    }

    fn into_document(self) -> (String, Document) {
        if self.children.is_empty() && self.attributes.is_empty() {
            return (self.name, Document::String(self.text));
        }
        let mut object: IndexMap<String, Document> = self
            .attributes
            .into_iter()
            .map(|(k, v)| (k, Document::String(v)))
            .collect();
        object.extend(self.children);
        (self.name, Document::Object(object))
    }

    fn insert_child(&mut self, name: String, value: Document) {
        match self.children.entry(name) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(mut entry) => match entry.get_mut() {
                Document::Array(items) => items.push(value),
                existing => {
                    let first = std::mem::replace(existing, Document::Null);
                    *existing = Document::Array(vec![first, value]);
                }
            },
        }
    }
}

fn qualified_name(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

/// Decodes `input`. Returns `None` for an empty payload.
pub fn decode(input: &[u8]) -> Result<Option<DecodedRoot>, XmlDecodeError> {
    let text = std::str::from_utf8(input)?;
    if text.trim().is_empty() {
        return Ok(None);
    }

    let mut stack: Vec<Frame> = Vec::new();
    let mut root = None;
    for token in Tokenizer::from(text) {
        match token? {
            Token::ElementStart { prefix, local, .. } => {
                if root.is_some() {
                    return Err(XmlDecodeError::Malformed("content after the root element"));
                }
                stack.push(Frame::new(qualified_name(prefix.as_str(), local.as_str())));
            }
            Token::Attribute {
                prefix,
                local,
                value,
                ..
            } => {
                let frame = stack
                    .last_mut()
                    .ok_or(XmlDecodeError::Malformed("attribute outside of an element"))?;
                let is_namespace_declaration = prefix.as_str() == "xmlns"
                    || (prefix.as_str().is_empty() && local.as_str() == "xmlns");
                if !is_namespace_declaration {
                    frame.attributes.push((
                        qualified_name(prefix.as_str(), local.as_str()),
                        unescape(value.as_str())?.into_owned(),
                    ));
                }
            }
            Token::ElementEnd { end, .. } => match end {
                ElementEnd::Open => {}
                ElementEnd::Close(..) | ElementEnd::Empty => {
                    let frame = stack
                        .pop()
                        .ok_or(XmlDecodeError::Malformed("unbalanced closing tag"))?;
                    if let ElementEnd::Close(prefix, local) = end {
                        if frame.name != qualified_name(prefix.as_str(), local.as_str()) {
                            return Err(XmlDecodeError::Malformed("mismatched closing tag"));
                        }
                    }
                    let (name, value) = frame.into_document();
                    match stack.last_mut() {
                        Some(parent) => parent.insert_child(name, value),
                        None => root = Some(DecodedRoot { name, value }),
                    }
                }
            },
            Token::Text { text } => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&unescape(text.as_str())?);
                }
            }
            Token::Cdata { text, .. } => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(text.as_str());
                }
            }
            _ => {}
        }
    }
    if !stack.is_empty() {
        return Err(XmlDecodeError::Malformed("unclosed element"));
    }
    root.map(Some)
        .ok_or(XmlDecodeError::Malformed("no root element"))
}
