/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Request serialization.
//!
//! A [`RequestSerializer`] is compiled once per operation from the input's structure plan and
//! the operation's HTTP bindings. It splits a request into the four parts a protocol places
//! members in: URI, query string, headers and body.

use crate::error::{ModelError, SerializeError};
use crate::model::{Location, Operation, Protocol, ScalarKind, Service, XmlNamespace};
use crate::plan::{MemberPlan, StructurePlan, TargetPlan};
use crate::value::{StructValue, Value};
use awsgen_http::transport::{HttpRequest, RequestBody};
use awsgen_json::serialize::{JsonObjectWriter, JsonValueWriter};
use awsgen_query::{QueryValueWriter, QueryWriter};
use awsgen_types::date_time::Format;
use awsgen_types::Number;
use awsgen_xml::encode::{XmlDocument, XmlElement};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Label {
        member: String,
        label: String,
        greedy: bool,
    },
}

/// Serializes operation inputs into HTTP requests.
#[derive(Debug, Clone)]
pub struct RequestSerializer {
    operation: String,
    protocol: Protocol,
    api_version: String,
    target: Option<String>,
    content_type: String,
    xml_namespace: Option<String>,
    method: Method,
    path: Vec<Segment>,
    fixed_query: Option<String>,
    plan: Arc<StructurePlan>,
}

impl RequestSerializer {
    /// Compiles the serializer of `operation`, whose input compiled to `plan`.
    pub fn new(
        service: &Service,
        operation: &Operation,
        plan: Arc<StructurePlan>,
    ) -> Result<Self, ModelError> {
        let method = Method::from_bytes(operation.http_method.as_bytes()).map_err(|_| {
            ModelError::Parse(format!(
                "operation `{}` has invalid HTTP method `{}`",
                operation.name, operation.http_method
            ))
        })?;
        let (path, fixed_query) = parse_template(&operation.request_uri, &plan)?;
        let content_type = match (service.protocol, &service.target_prefix) {
            (Protocol::Query, _) => "application/x-www-form-urlencoded".to_string(),
            (Protocol::Xml, _) => "application/xml".to_string(),
            (Protocol::Json, Some(_)) => format!(
                "application/x-amz-json-{}",
                service.json_version.as_deref().unwrap_or("1.0")
            ),
            (Protocol::Json, None) => "application/json".to_string(),
        };
        Ok(RequestSerializer {
            operation: operation.name.clone(),
            protocol: service.protocol,
            api_version: service.api_version.clone(),
            target: service
                .target_prefix
                .as_ref()
                .map(|prefix| format!("{}.{}", prefix, operation.name)),
            content_type,
            xml_namespace: service.xml_namespace.clone(),
            method,
            path,
            fixed_query,
            plan,
        })
    }

    /// HTTP method of the request.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path and query string of the request.
    pub fn uri(&self, input: &StructValue) -> Result<String, SerializeError> {
        let mut path = String::new();
        for segment in &self.path {
            match segment {
                Segment::Literal(literal) => path.push_str(literal),
                Segment::Label {
                    member,
                    label,
                    greedy,
                } => {
                    let (plan, value) = match (self.plan.member(member), input.get(member)) {
                        (Some(plan), Some(value)) => (plan, value),
                        _ => return Err(SerializeError::MissingLabel(label.clone())),
                    };
                    let text = scalar_text(&plan.target, value, Format::DateTime, member)?;
                    path.push_str(&awsgen_http::label::fmt_string(text, *greedy));
                }
            }
        }
        if let Some(fixed) = &self.fixed_query {
            path.push('?');
            path.push_str(fixed);
        }
        let mut writer = awsgen_http::query::QueryWriter::new(path);
        for (key, value) in self.query(input)? {
            writer.insert(&key, &value);
        }
        Ok(writer.build())
    }

    /// Query string parameters of members bound to the query string, in member order.
    ///
    /// Lists repeat their parameter and maps contribute one parameter per entry. Absent members
    /// contribute nothing.
    pub fn query(&self, input: &StructValue) -> Result<Vec<(String, String)>, SerializeError> {
        let mut params = Vec::new();
        for member in self.plan.members_at(Location::QueryString) {
            let Some(value) = input.get(&member.name) else {
                continue;
            };
            match (&member.target, value) {
                (TargetPlan::List(list), Value::List(items)) => {
                    for item in items {
                        let text = scalar_text(&list.member, item, Format::DateTime, &member.name)?;
                        params.push((member.wire_name.clone(), text));
                    }
                }
                (TargetPlan::Map(map), Value::Map(entries)) => {
                    for (key, entry) in entries {
                        let text = scalar_text(&map.value, entry, Format::DateTime, &member.name)?;
                        params.push((key.clone(), text));
                    }
                }
                (target, value) => {
                    let text = scalar_text(target, value, Format::DateTime, &member.name)?;
                    params.push((member.wire_name.clone(), text));
                }
            }
        }
        Ok(params)
    }

    /// Headers of members bound to headers, plus the protocol's target header.
    pub fn headers(&self, input: &StructValue) -> Result<HeaderMap, SerializeError> {
        let mut headers = HeaderMap::new();
        if let Some(target) = &self.target {
            headers.insert("x-amz-target", header_value("X-Amz-Target", target)?);
        }
        for member in &self.plan.members {
            let Some(value) = input.get(&member.name) else {
                continue;
            };
            match member.location {
                Location::Header => {
                    let text = match (&member.target, value) {
                        (TargetPlan::List(list), Value::List(items)) => items
                            .iter()
                            .map(|item| {
                                scalar_text(&list.member, item, Format::HttpDate, &member.name)
                            })
                            .collect::<Result<Vec<_>, _>>()?
                            .join(", "),
                        (target, value) => {
                            scalar_text(target, value, Format::HttpDate, &member.name)?
                        }
                    };
                    headers.insert(
                        header_name(&member.wire_name)?,
                        header_value(&member.wire_name, &text)?,
                    );
                }
                Location::HeaderPrefix => {
                    let (TargetPlan::Map(map), Value::Map(entries)) = (&member.target, value)
                    else {
                        return Err(mismatch(&member.name, &member.target, value));
                    };
                    for (key, entry) in entries {
                        let name = format!("{}{}", member.wire_name, key);
                        let text = scalar_text(&map.value, entry, Format::HttpDate, &name)?;
                        headers.insert(header_name(&name)?, header_value(&name, &text)?);
                    }
                }
                _ => {}
            }
        }
        Ok(headers)
    }

    /// Body of the request in the protocol's encoding.
    pub fn body(&self, input: &StructValue) -> Result<RequestBody, SerializeError> {
        match self.protocol {
            Protocol::Query => self.query_body(input),
            Protocol::Xml => self.xml_body(input),
            Protocol::Json => self.json_body(input),
        }
    }

    /// Builds the full request against `endpoint`.
    pub fn build_request(
        &self,
        endpoint: &str,
        input: &StructValue,
    ) -> Result<HttpRequest, SerializeError> {
        let uri = format!("{}{}", endpoint.trim_end_matches('/'), self.uri(input)?);
        let mut headers = self.headers(input)?;
        let body = self.body(input)?;
        if body != RequestBody::Empty && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, header_value("Content-Type", &self.content_type)?);
        }
        let mut request = http::Request::builder()
            .method(self.method.clone())
            .uri(uri)
            .body(body)?;
        *request.headers_mut() = headers;
        tracing::trace!(operation = %self.operation, uri = %request.uri(), "built request");
        Ok(request)
    }

    fn query_body(&self, input: &StructValue) -> Result<RequestBody, SerializeError> {
        let mut out = String::new();
        let mut writer = QueryWriter::new(&mut out, &self.operation, &self.api_version);
        for member in self.plan.members.iter().filter(|m| m.location.is_body()) {
            if let Some(value) = input.get(&member.name) {
                write_query(
                    writer.prefix(&member.wire_name),
                    &member.target,
                    value,
                    &member.name,
                )?;
            }
        }
        writer.finish();
        Ok(RequestBody::from(out))
    }

    fn xml_body(&self, input: &StructValue) -> Result<RequestBody, SerializeError> {
        let mut document = XmlDocument::new();
        if let Some(member) = self.plan.payload_member() {
            let Some(value) = input.get(&member.name) else {
                return Ok(RequestBody::Empty);
            };
            let TargetPlan::Structure(nested) = &member.target else {
                return raw_payload(member, value);
            };
            let Value::Structure(fields) = value else {
                return Err(mismatch(&member.name, &member.target, value));
            };
            if !has_body_content(nested, fields) {
                return Ok(RequestBody::Empty);
            }
            let name = if member.wire_name != member.name {
                &member.wire_name
            } else {
                nested.location_name.as_ref().unwrap_or(&member.name)
            };
            let mut root = XmlElement::new(name.as_str());
            self.set_root_namespace(
                &mut root,
                member.xml_namespace.as_ref().or(nested.xml_namespace.as_ref()),
            );
            write_xml_members(&mut root, nested, fields, &member.name)?;
            document.set_root(root);
        } else {
            if !has_body_content(&self.plan, input) {
                return Ok(RequestBody::Empty);
            }
            let mut root = XmlElement::new(
                self.plan
                    .location_name
                    .as_deref()
                    .unwrap_or(&self.plan.shape),
            );
            self.set_root_namespace(&mut root, self.plan.xml_namespace.as_ref());
            write_xml_members(&mut root, &self.plan, input, "")?;
            document.set_root(root);
        }
        Ok(RequestBody::from(document.finish()))
    }

    fn set_root_namespace(&self, root: &mut XmlElement, namespace: Option<&XmlNamespace>) {
        match (namespace, &self.xml_namespace) {
            (Some(namespace), _) => root.set_attribute(namespace.attribute_name(), &namespace.uri),
            (None, Some(uri)) => root.set_attribute("xmlns", uri),
            (None, None) => {}
        }
    }

    fn json_body(&self, input: &StructValue) -> Result<RequestBody, SerializeError> {
        if let Some(member) = self.plan.payload_member() {
            let Some(value) = input.get(&member.name) else {
                return Ok(RequestBody::Empty);
            };
            if !matches!(member.target, TargetPlan::Structure(_)) {
                return raw_payload(member, value);
            }
            let mut out = String::new();
            write_json(JsonValueWriter::new(&mut out), &member.target, value, &member.name)?;
            return Ok(RequestBody::from(out));
        }
        // RPC-style services always send an object.
        if self.target.is_none() && !has_body_content(&self.plan, input) {
            return Ok(RequestBody::Empty);
        }
        let mut out = String::new();
        let mut object = JsonObjectWriter::new(&mut out);
        write_json_members(&mut object, &self.plan, input, "")?;
        object.finish();
        Ok(RequestBody::from(out))
    }
}

fn parse_template(
    template: &str,
    plan: &StructurePlan,
) -> Result<(Vec<Segment>, Option<String>), ModelError> {
    let invalid = || ModelError::InvalidUriTemplate(template.to_string());
    let (path, fixed_query) = match template.split_once('?') {
        Some((path, query)) => (path, Some(query.to_string())),
        None => (template, None),
    };
    let mut segments = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        if start > 0 {
            segments.push(Segment::Literal(rest[..start].to_string()));
        }
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(invalid)?;
        let (label, greedy) = match after[..end].strip_suffix('+') {
            Some(label) => (label, true),
            None => (&after[..end], false),
        };
        if label.is_empty() {
            return Err(invalid());
        }
        let member = plan
            .members_at(Location::Uri)
            .find(|m| m.wire_name == label || m.name == label)
            .ok_or_else(|| ModelError::UnknownMember {
                structure: plan.shape.clone(),
                member: label.to_string(),
            })?;
        segments.push(Segment::Label {
            member: member.name.clone(),
            label: label.to_string(),
            greedy,
        });
        rest = &after[end + 1..];
    }
    if rest.contains('}') {
        return Err(invalid());
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }
    Ok((segments, fixed_query))
}

fn mismatch(path: &str, target: &TargetPlan, value: &Value) -> SerializeError {
    SerializeError::TypeMismatch {
        path: path.to_string(),
        expected: target.expected(),
        found: value.type_name(),
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

fn header_name(name: &str) -> Result<HeaderName, SerializeError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| SerializeError::InvalidHeader(name.to_string()))
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, SerializeError> {
    HeaderValue::from_str(value).map_err(|_| SerializeError::InvalidHeader(name.to_string()))
}

fn has_body_content(plan: &StructurePlan, value: &StructValue) -> bool {
    plan.members
        .iter()
        .any(|m| m.location.is_body() && value.get(&m.name).is_some())
}

/// Text form of a scalar value. Timestamps use the member's format, or `default_format`.
fn scalar_text(
    target: &TargetPlan,
    value: &Value,
    default_format: Format,
    path: &str,
) -> Result<String, SerializeError> {
    let kind = match target {
        TargetPlan::Scalar { kind, .. } => Some(*kind),
        _ => None,
    };
    Ok(match (target, kind, value) {
        (TargetPlan::Enum(_), _, Value::String(s)) => s.clone(),
        (_, Some(ScalarKind::String), Value::String(s)) => s.clone(),
        (_, Some(ScalarKind::Boolean), Value::Boolean(b)) => b.to_string(),
        (_, Some(ScalarKind::Integer), Value::Integer(i)) => i.to_string(),
        (_, Some(ScalarKind::Float), Value::Float(f)) => Number::Float(*f).to_string(),
        (_, Some(ScalarKind::Float), Value::Integer(i)) => i.to_string(),
        (_, Some(ScalarKind::Timestamp), Value::Timestamp(t)) => {
            t.fmt(target.timestamp_format().unwrap_or(default_format))?
        }
        (_, Some(ScalarKind::Blob), Value::Blob(b)) => awsgen_types::base64::encode(b),
        _ => return Err(mismatch(path, target, value)),
    })
}

fn raw_payload(member: &MemberPlan, value: &Value) -> Result<RequestBody, SerializeError> {
    match value {
        Value::Blob(blob) => Ok(RequestBody::Bytes(Bytes::copy_from_slice(blob.as_ref()))),
        Value::String(text) => Ok(RequestBody::Bytes(Bytes::from(text.clone()))),
        Value::Stream(source) => Ok(RequestBody::Stream(source.clone())),
        other => Err(mismatch(&member.name, &member.target, other)),
    }
}

fn write_query(
    mut writer: QueryValueWriter<'_>,
    target: &TargetPlan,
    value: &Value,
    path: &str,
) -> Result<(), SerializeError> {
    match (target, value) {
        (TargetPlan::Structure(plan), Value::Structure(fields)) => {
            for member in &plan.members {
                if let Some(field) = fields.get(&member.name) {
                    write_query(
                        writer.prefix(&member.wire_name),
                        &member.target,
                        field,
                        &join(path, &member.name),
                    )?;
                }
            }
        }
        (TargetPlan::List(list), Value::List(items)) => {
            let mut entries = writer.start_list(list.flattened, list.member_name.as_deref());
            for (i, item) in items.iter().enumerate() {
                write_query(entries.entry(), &list.member, item, &format!("{}[{}]", path, i))?;
            }
            entries.finish();
        }
        (TargetPlan::Map(map), Value::Map(items)) => {
            let mut entries = writer.start_map(map.flattened, map.key_name(), map.value_name());
            for (key, item) in items {
                write_query(entries.entry(key), &map.value, item, &join(path, key))?;
            }
            entries.finish();
        }
        (target, value) => writer.string(&scalar_text(target, value, Format::DateTime, path)?),
    }
    Ok(())
}

fn write_xml_members(
    element: &mut XmlElement,
    plan: &StructurePlan,
    value: &StructValue,
    path: &str,
) -> Result<(), SerializeError> {
    for member in plan.members.iter().filter(|m| m.location.is_body()) {
        let Some(field) = value.get(&member.name) else {
            continue;
        };
        let path = join(path, &member.name);
        if member.xml_attribute {
            let text = scalar_text(&member.target, field, Format::DateTime, &path)?;
            element.set_attribute(member.wire_name.as_str(), text);
            continue;
        }
        write_xml_value(
            element,
            &member.wire_name,
            member.xml_namespace.as_ref(),
            &member.target,
            field,
            &path,
        )?;
    }
    Ok(())
}

fn write_xml_value(
    parent: &mut XmlElement,
    name: &str,
    namespace: Option<&XmlNamespace>,
    target: &TargetPlan,
    value: &Value,
    path: &str,
) -> Result<(), SerializeError> {
    let mut element = XmlElement::new(name);
    match (target, value) {
        (TargetPlan::Structure(plan), Value::Structure(fields)) => {
            if let Some(namespace) = namespace.or(plan.xml_namespace.as_ref()) {
                element.set_attribute(namespace.attribute_name(), namespace.uri.as_str());
            }
            write_xml_members(&mut element, plan, fields, path)?;
        }
        (TargetPlan::List(list), Value::List(items)) => {
            if list.flattened {
                for (i, item) in items.iter().enumerate() {
                    let path = format!("{}[{}]", path, i);
                    write_xml_value(parent, name, namespace, &list.member, item, &path)?;
                }
                return Ok(());
            }
            let item_name = list.member_name.as_deref().unwrap_or("member");
            for (i, item) in items.iter().enumerate() {
                let path = format!("{}[{}]", path, i);
                write_xml_value(&mut element, item_name, None, &list.member, item, &path)?;
            }
        }
        (TargetPlan::Map(map), Value::Map(entries)) => {
            let mut container = if map.flattened {
                None
            } else {
                Some(XmlElement::new(name))
            };
            for (key, entry) in entries {
                let mut node = XmlElement::new(if map.flattened { name } else { "entry" });
                node.push(XmlElement::with_text(map.key_name(), key.as_str()));
                write_xml_value(
                    &mut node,
                    map.value_name(),
                    None,
                    &map.value,
                    entry,
                    &join(path, key),
                )?;
                match &mut container {
                    Some(container) => container.push(node),
                    None => parent.push(node),
                }
            }
            if let Some(container) = container {
                parent.push(container);
            }
            return Ok(());
        }
        (target, value) => {
            if let Some(namespace) = namespace {
                element.set_attribute(namespace.attribute_name(), namespace.uri.as_str());
            }
            element.push_text(scalar_text(target, value, Format::DateTime, path)?);
        }
    }
    parent.push(element);
    Ok(())
}

fn write_json_members(
    object: &mut JsonObjectWriter<'_>,
    plan: &StructurePlan,
    value: &StructValue,
    path: &str,
) -> Result<(), SerializeError> {
    for member in plan.members.iter().filter(|m| m.location.is_body()) {
        if let Some(field) = value.get(&member.name) {
            write_json(
                object.key(&member.wire_name),
                &member.target,
                field,
                &join(path, &member.name),
            )?;
        }
    }
    Ok(())
}

fn write_json(
    writer: JsonValueWriter<'_>,
    target: &TargetPlan,
    value: &Value,
    path: &str,
) -> Result<(), SerializeError> {
    let kind = match target {
        TargetPlan::Scalar { kind, .. } => Some(*kind),
        _ => None,
    };
    match (target, kind, value) {
        (TargetPlan::Structure(plan), _, Value::Structure(fields)) => {
            let mut object = writer.start_object();
            write_json_members(&mut object, plan, fields, path)?;
            object.finish();
        }
        (TargetPlan::List(list), _, Value::List(items)) => {
            let mut array = writer.start_array();
            for (i, item) in items.iter().enumerate() {
                write_json(array.value(), &list.member, item, &format!("{}[{}]", path, i))?;
            }
            array.finish();
        }
        (TargetPlan::Map(map), _, Value::Map(entries)) => {
            let mut object = writer.start_object();
            for (key, entry) in entries {
                write_json(object.key(key), &map.value, entry, &join(path, key))?;
            }
            object.finish();
        }
        (TargetPlan::Enum(_), _, Value::String(s)) => writer.string(s),
        (_, Some(ScalarKind::String), Value::String(s)) => writer.string(s),
        (_, Some(ScalarKind::Boolean), Value::Boolean(b)) => writer.boolean(*b),
        (_, Some(ScalarKind::Integer), Value::Integer(i)) => writer.number(Number::from(*i)),
        (_, Some(ScalarKind::Float), Value::Float(f)) => writer.number(Number::Float(*f)),
        (_, Some(ScalarKind::Float), Value::Integer(i)) => writer.number(Number::from(*i)),
        (_, Some(ScalarKind::Timestamp), Value::Timestamp(t)) => writer.date_time(
            t,
            target.timestamp_format().unwrap_or(Format::EpochSeconds),
        )?,
        (_, Some(ScalarKind::Blob), Value::Blob(b)) => writer.blob(b),
        (target, _, value) => return Err(mismatch(path, target, value)),
    }
    Ok(())
}
