/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Loading of service definitions in the AWS `api-2.json` dialect.

use super::{
    parse_timestamp_format, Location, Member, Operation, Pagination, Protocol, ScalarKind,
    Service, ServiceModel, Shape, ShapeKind, ShapeRef, Structure, XmlNamespace,
};
use crate::error::ModelError;
use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawModel {
    metadata: RawMetadata,
    #[serde(default)]
    operations: IndexMap<String, RawOperation>,
    #[serde(default)]
    shapes: IndexMap<String, RawShape>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    protocol: String,
    api_version: String,
    service_id: Option<String>,
    endpoint_prefix: Option<String>,
    xml_namespace: Option<String>,
    target_prefix: Option<String>,
    json_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOperation {
    #[serde(default)]
    http: RawHttp,
    input: Option<RawShapeRef>,
    output: Option<RawShapeRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHttp {
    #[serde(default = "default_method")]
    method: String,
    #[serde(default = "default_request_uri")]
    request_uri: String,
}

impl Default for RawHttp {
    fn default() -> Self {
        RawHttp {
            method: default_method(),
            request_uri: default_request_uri(),
        }
    }
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_request_uri() -> String {
    "/".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawShapeRef {
    shape: String,
    location: Option<String>,
    location_name: Option<String>,
    #[serde(default)]
    xml_attribute: bool,
    xml_namespace: Option<RawXmlNamespace>,
    #[serde(default)]
    flattened: bool,
    timestamp_format: Option<String>,
    result_wrapper: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawXmlNamespace {
    uri: String,
    prefix: Option<String>,
}

impl From<RawXmlNamespace> for XmlNamespace {
    fn from(raw: RawXmlNamespace) -> Self {
        XmlNamespace {
            uri: raw.uri,
            prefix: raw.prefix,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawShape {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    members: IndexMap<String, RawShapeRef>,
    #[serde(default)]
    required: Vec<String>,
    #[serde(rename = "enum")]
    enum_values: Option<Vec<String>>,
    member: Option<RawShapeRef>,
    key: Option<RawShapeRef>,
    value: Option<RawShapeRef>,
    #[serde(default)]
    flattened: bool,
    location_name: Option<String>,
    xml_namespace: Option<RawXmlNamespace>,
    timestamp_format: Option<String>,
    payload: Option<String>,
    #[serde(default)]
    streaming: bool,
}

#[derive(Debug, Deserialize)]
struct RawPaginators {
    #[serde(default)]
    pagination: IndexMap<String, RawPaginator>,
}

#[derive(Debug, Deserialize)]
struct RawPaginator {
    input_token: Option<OneOrMany>,
    output_token: Option<OneOrMany>,
    limit_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn parse_error(err: serde_json::Error) -> ModelError {
    ModelError::Parse(err.to_string())
}

fn parse_protocol(protocol: &str) -> Result<Protocol, ModelError> {
    match protocol {
        "rest-xml" => Ok(Protocol::Xml),
        "rest-json" | "json" => Ok(Protocol::Json),
        "query" | "ec2" => Ok(Protocol::Query),
        other => Err(ModelError::UnsupportedProtocol(other.to_string())),
    }
}

fn body_location(protocol: Protocol) -> Location {
    match protocol {
        Protocol::Query => Location::BodyForm,
        Protocol::Xml => Location::BodyXml,
        Protocol::Json => Location::BodyJson,
    }
}

fn shape_ref(raw: RawShapeRef) -> ShapeRef {
    ShapeRef {
        target: raw.shape,
        location_name: raw.location_name,
    }
}

fn required_ref(
    shape: &str,
    field: &'static str,
    raw: Option<RawShapeRef>,
) -> Result<ShapeRef, ModelError> {
    raw.map(shape_ref).ok_or_else(|| {
        ModelError::Parse(format!("shape `{}` is missing its `{}` reference", shape, field))
    })
}

fn convert_structure(
    name: &str,
    raw: &mut RawShape,
    protocol: Protocol,
) -> Result<Structure, ModelError> {
    let payload = raw.payload.take();
    if let Some(payload) = &payload {
        if !raw.members.contains_key(payload) {
            return Err(ModelError::UnknownMember {
                structure: name.to_string(),
                member: payload.clone(),
            });
        }
    }
    let mut members = Vec::with_capacity(raw.members.len());
    for (member_name, member) in std::mem::take(&mut raw.members) {
        let location = if payload.as_deref() == Some(member_name.as_str()) {
            Location::Payload
        } else {
            match member.location.as_deref() {
                None => body_location(protocol),
                Some("uri") => Location::Uri,
                Some("querystring") => Location::QueryString,
                Some("header") => Location::Header,
                Some("headers") => Location::HeaderPrefix,
                Some("statusCode") => Location::StatusCode,
                Some(other) => {
                    return Err(ModelError::UnsupportedLocation {
                        structure: name.to_string(),
                        member: member_name,
                        location: other.to_string(),
                    })
                }
            }
        };
        members.push(Member {
            required: raw.required.contains(&member_name),
            name: member_name,
            target: member.shape,
            location,
            location_name: member.location_name,
            xml_attribute: member.xml_attribute,
            xml_namespace: member.xml_namespace.map(Into::into),
            flattened: member.flattened,
            timestamp_format: member
                .timestamp_format
                .as_deref()
                .and_then(parse_timestamp_format),
        });
    }
    Ok(Structure { members, payload })
}

fn convert_shape(name: String, mut raw: RawShape, protocol: Protocol) -> Result<Shape, ModelError> {
    let kind = match raw.kind.as_str() {
        "structure" => ShapeKind::Structure(convert_structure(&name, &mut raw, protocol)?),
        "list" => ShapeKind::List {
            member: required_ref(&name, "member", raw.member.take())?,
            flattened: raw.flattened,
        },
        "map" => ShapeKind::Map {
            key: required_ref(&name, "key", raw.key.take())?,
            value: required_ref(&name, "value", raw.value.take())?,
            flattened: raw.flattened,
        },
        "string" => match raw.enum_values.take() {
            Some(values) => {
                let mut unique: Vec<String> = Vec::with_capacity(values.len());
                for value in values {
                    if !unique.contains(&value) {
                        unique.push(value);
                    }
                }
                ShapeKind::Enum(unique)
            }
            None => ShapeKind::Scalar(ScalarKind::String),
        },
        "boolean" => ShapeKind::Scalar(ScalarKind::Boolean),
        "integer" | "long" => ShapeKind::Scalar(ScalarKind::Integer),
        "float" | "double" => ShapeKind::Scalar(ScalarKind::Float),
        "timestamp" => ShapeKind::Scalar(ScalarKind::Timestamp),
        "blob" => ShapeKind::Scalar(ScalarKind::Blob),
        other => {
            return Err(ModelError::UnsupportedShapeType {
                shape: name,
                kind: other.to_string(),
            })
        }
    };
    Ok(Shape {
        name,
        kind,
        location_name: raw.location_name,
        xml_namespace: raw.xml_namespace.map(Into::into),
        timestamp_format: raw
            .timestamp_format
            .as_deref()
            .and_then(parse_timestamp_format),
        streaming: raw.streaming,
    })
}

fn single_token(operation: &str, token: OneOrMany) -> Result<String, ModelError> {
    let token = match token {
        OneOrMany::One(token) => token,
        OneOrMany::Many(mut tokens) if tokens.len() == 1 => tokens.remove(0),
        OneOrMany::Many(tokens) => {
            return Err(ModelError::UnsupportedPaginator {
                operation: operation.to_string(),
                token: tokens.join(", "),
            })
        }
    };
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ModelError::UnsupportedPaginator {
            operation: operation.to_string(),
            token,
        });
    }
    Ok(token)
}

impl ServiceModel {
    /// Loads a service definition from its JSON text.
    pub fn from_json(input: &str) -> Result<Self, ModelError> {
        Self::from_slice(input.as_bytes())
    }

    /// Loads a service definition from JSON bytes.
    pub fn from_slice(input: &[u8]) -> Result<Self, ModelError> {
        let raw: RawModel = serde_json::from_slice(input).map_err(parse_error)?;
        let protocol = parse_protocol(&raw.metadata.protocol)?;
        let service = Service {
            name: raw
                .metadata
                .service_id
                .or(raw.metadata.endpoint_prefix)
                .unwrap_or_else(|| "Service".to_string()),
            api_version: raw.metadata.api_version,
            protocol,
            xml_namespace: raw.metadata.xml_namespace,
            target_prefix: raw.metadata.target_prefix,
            json_version: raw.metadata.json_version,
        };

        let mut shapes = IndexMap::with_capacity(raw.shapes.len());
        for (name, shape) in raw.shapes {
            let shape = convert_shape(name.clone(), shape, protocol)?;
            shapes.insert(name, shape);
        }

        let mut operations = IndexMap::with_capacity(raw.operations.len());
        for (name, operation) in raw.operations {
            let input = match operation.input {
                Some(input) => input.shape,
                None => {
                    // Operations always take a structure, possibly an empty one.
                    let synthesized = format!("{}Request", name);
                    shapes.entry(synthesized.clone()).or_insert_with(|| Shape {
                        name: synthesized.clone(),
                        kind: ShapeKind::Structure(Structure {
                            members: Vec::new(),
                            payload: None,
                        }),
                        location_name: None,
                        xml_namespace: None,
                        timestamp_format: None,
                        streaming: false,
                    });
                    synthesized
                }
            };
            let (output, result_wrapper) = match operation.output {
                Some(output) => (Some(output.shape), output.result_wrapper),
                None => (None, None),
            };
            operations.insert(
                name.clone(),
                Operation {
                    name,
                    input,
                    output,
                    http_method: operation.http.method,
                    request_uri: operation.http.request_uri,
                    result_wrapper,
                    pagination: None,
                },
            );
        }

        Ok(ServiceModel {
            service,
            shapes,
            operations,
        })
    }

    /// Attaches pagination rules from a `paginators-1.json` document.
    ///
    /// Rules for operations that are not part of the model are ignored.
    pub fn with_paginators(mut self, input: &str) -> Result<Self, ModelError> {
        let raw: RawPaginators = serde_json::from_str(input).map_err(parse_error)?;
        for (name, paginator) in raw.pagination {
            let Some(operation) = self.operations.get_mut(&name) else {
                tracing::debug!(operation = %name, "ignoring paginator for unknown operation");
                continue;
            };
            let (Some(input_token), Some(output_token)) =
                (paginator.input_token, paginator.output_token)
            else {
                continue;
            };
            operation.pagination = Some(Pagination {
                input_token: single_token(&name, input_token)?,
                output_token: single_token(&name, output_token)?,
                page_size: paginator.limit_key,
            });
        }
        Ok(self)
    }
}
