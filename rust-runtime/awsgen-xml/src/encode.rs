/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! XML document construction.
//!
//! Request bodies are assembled as an element tree first and only rendered once complete, so
//! that a document whose root was never attached renders to the empty string instead of an
//! empty element.

use crate::escape::escape;
use std::fmt::{self, Write};

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// A node inside an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// A nested element
    Element(XmlElement),
    /// Character data
    Text(String),
}

/// An XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Creates an element named `name` with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates an element holding a single text node.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.children.push(XmlNode::Text(text.into()));
        element
    }

    /// Element name, including any namespace prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets an attribute, replacing an earlier value for the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Returns the value of the attribute `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Appends a child element.
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Appends a text node.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    /// Child nodes in document order.
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    fn write_to(&self, out: &mut String) -> fmt::Result {
        write!(out, "<{}", self.name)?;
        for (name, value) in &self.attributes {
            write!(out, " {}=\"{}\"", name, escape(value))?;
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return Ok(());
        }
        out.push('>');
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.write_to(out)?,
                XmlNode::Text(text) => out.push_str(&escape(text)),
            }
        }
        write!(out, "</{}>", self.name)
    }
}

/// An XML document with at most one root element.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: Option<XmlElement>,
}

impl XmlDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the root element.
    pub fn set_root(&mut self, root: XmlElement) {
        self.root = Some(root);
    }

    /// Returns true if no root element was attached.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Renders the document. A document without a root renders as the empty string.
    pub fn finish(self) -> String {
        let Some(root) = self.root else {
            return String::new();
        };
        let mut out = String::with_capacity(128);
        out.push_str(DECLARATION);
        out.push('\n');
        // Writing to a String cannot fail.
        let _ = root.write_to(&mut out);
        out
    }
}
