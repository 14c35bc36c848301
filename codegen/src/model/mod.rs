/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! In-memory representation of a service definition.
//!
//! The model is immutable once loaded. Compiler components borrow it for the lifetime of a
//! generation run.

mod loader;

use crate::error::ModelError;
use awsgen_types::date_time::Format;
use indexmap::IndexMap;

/// Wire protocol spoken by a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Form-encoded requests, XML responses (`query`, `ec2`)
    Query,
    /// XML bodies with HTTP bindings (`rest-xml`)
    Xml,
    /// JSON bodies (`json`, `rest-json`)
    Json,
}

/// Kind of a scalar shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `string` without an `enum` list
    String,
    /// `boolean`
    Boolean,
    /// `integer` and `long`
    Integer,
    /// `float` and `double`
    Float,
    /// `timestamp`
    Timestamp,
    /// `blob`, possibly streaming
    Blob,
}

impl ScalarKind {
    pub(crate) fn name(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Timestamp => "timestamp",
            ScalarKind::Blob => "blob",
        }
    }
}

/// Where a member lives on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// A `{label}` of the URI template
    Uri,
    /// A query string parameter
    QueryString,
    /// A single header
    Header,
    /// A map of headers sharing a name prefix
    HeaderPrefix,
    /// The HTTP status code (output only)
    StatusCode,
    /// An element of the XML body
    BodyXml,
    /// A member of the JSON body
    BodyJson,
    /// A field of the form-encoded body
    BodyForm,
    /// The entire body
    Payload,
}

impl Location {
    /// Returns true for the body locations.
    pub fn is_body(self) -> bool {
        matches!(
            self,
            Location::BodyXml | Location::BodyJson | Location::BodyForm
        )
    }
}

/// An XML namespace declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XmlNamespace {
    /// Namespace URI
    pub uri: String,
    /// Prefix bound to the URI, or `None` for the default namespace
    pub prefix: Option<String>,
}

impl XmlNamespace {
    /// Name of the attribute that declares this namespace.
    pub fn attribute_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        }
    }
}

/// Reference from a list or map to the shape of its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeRef {
    /// Name of the referenced shape
    pub target: String,
    /// Element or key name of the entries on the wire
    pub location_name: Option<String>,
}

/// A member of a structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Member name as declared
    pub name: String,
    /// Name of the member's shape
    pub target: String,
    /// Whether the structure's `required` list names this member
    pub required: bool,
    /// Wire location
    pub location: Location,
    /// Wire name, if it differs from `name`
    pub location_name: Option<String>,
    /// Serialized as an XML attribute of the enclosing element
    pub xml_attribute: bool,
    /// Namespace declared on the member's element
    pub xml_namespace: Option<XmlNamespace>,
    /// The member's list or map is written without a wrapping element
    pub flattened: bool,
    /// Overrides the default timestamp format of the location
    pub timestamp_format: Option<Format>,
}

impl Member {
    /// Name of the member on the wire.
    pub fn wire_name(&self) -> &str {
        self.location_name.as_deref().unwrap_or(&self.name)
    }
}

/// Members of a structure shape, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    /// Members in declaration order
    pub members: Vec<Member>,
    /// Member bound to the whole body, if any
    pub payload: Option<String>,
}

impl Structure {
    /// Looks up a member by name.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Variant data of a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeKind {
    /// A scalar
    Scalar(ScalarKind),
    /// A string restricted to a closed set of values, in declaration order
    Enum(Vec<String>),
    /// An ordered list
    List {
        /// Shape of the items
        member: ShapeRef,
        /// Items are written without a wrapping element
        flattened: bool,
    },
    /// A map with string keys
    Map {
        /// Shape of the keys
        key: ShapeRef,
        /// Shape of the values
        value: ShapeRef,
        /// Entries are written without a wrapping element
        flattened: bool,
    },
    /// A structure
    Structure(Structure),
}

impl ShapeKind {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            ShapeKind::Scalar(kind) => kind.name(),
            ShapeKind::Enum(_) => "enum",
            ShapeKind::List { .. } => "list",
            ShapeKind::Map { .. } => "map",
            ShapeKind::Structure(_) => "structure",
        }
    }
}

/// A named node of the model's data graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    /// Unique name within the model
    pub name: String,
    /// Variant data
    pub kind: ShapeKind,
    /// Element name used when the shape is a document root
    pub location_name: Option<String>,
    /// Namespace declared on the shape's element
    pub xml_namespace: Option<XmlNamespace>,
    /// Timestamp format of a timestamp shape
    pub timestamp_format: Option<Format>,
    /// Blob shape streamed from a content source
    pub streaming: bool,
}

impl Shape {
    /// Returns the members of a structure shape.
    pub fn as_structure(&self) -> Result<&Structure, ModelError> {
        match &self.kind {
            ShapeKind::Structure(structure) => Ok(structure),
            _ => Err(ModelError::WrongShapeKind {
                shape: self.name.clone(),
                expected: "structure",
                found: self.kind.name(),
            }),
        }
    }
}

/// Continuation rules of a paginated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Input member receiving the continuation token
    pub input_token: String,
    /// Output member holding the next continuation token
    pub output_token: String,
    /// Input member setting the page size
    pub page_size: Option<String>,
}

/// An operation of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Operation name, also the query protocol `Action`
    pub name: String,
    /// Input structure
    pub input: String,
    /// Output structure, if the operation returns one
    pub output: Option<String>,
    /// HTTP method, `POST` when the model omits it
    pub http_method: String,
    /// URI template, possibly with a fixed query suffix
    pub request_uri: String,
    /// Element wrapping query protocol results
    pub result_wrapper: Option<String>,
    /// Continuation rules, if paginated
    pub pagination: Option<Pagination>,
}

/// Service-wide metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    /// `serviceId`, falling back to the endpoint prefix
    pub name: String,
    /// Sent as `Version` by the query protocol
    pub api_version: String,
    /// Wire protocol
    pub protocol: Protocol,
    /// Default namespace of XML request bodies
    pub xml_namespace: Option<String>,
    /// Prefix of the json protocol `X-Amz-Target` header
    pub target_prefix: Option<String>,
    /// Version in the json protocol content type
    pub json_version: Option<String>,
}

/// A loaded service definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceModel {
    service: Service,
    shapes: IndexMap<String, Shape>,
    operations: IndexMap<String, Operation>,
}

impl ServiceModel {
    /// Service-wide metadata.
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Looks up a shape, failing with [`ModelError::UnknownShape`].
    pub fn shape(&self, name: &str) -> Result<&Shape, ModelError> {
        self.shapes
            .get(name)
            .ok_or_else(|| ModelError::UnknownShape(name.to_string()))
    }

    /// Shapes in declaration order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    /// Looks up an operation, failing with [`ModelError::UnknownOperation`].
    pub fn operation(&self, name: &str) -> Result<&Operation, ModelError> {
        self.operations
            .get(name)
            .ok_or_else(|| ModelError::UnknownOperation(name.to_string()))
    }

    /// Operations in declaration order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }
}

pub(crate) fn parse_timestamp_format(value: &str) -> Option<Format> {
    match value {
        "iso8601" => Some(Format::DateTime),
        "rfc822" => Some(Format::HttpDate),
        "unixTimestamp" => Some(Format::EpochSeconds),
        _ => None,
    }
}
