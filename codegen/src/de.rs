/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Response deserialization.

use crate::coerce::{coerce, coerce_structure, Dialect};
use crate::error::DeserializeError;
use crate::model::{Location, Protocol, ScalarKind};
use crate::plan::{StructurePlan, TargetPlan};
use crate::value::{StructValue, Value};
use awsgen_http::response::{LoadedResponse, PayloadFormat};
use awsgen_types::{Blob, Document};
use indexmap::IndexMap;
use std::sync::Arc;

/// Rebuilds operation outputs from responses.
#[derive(Debug, Clone)]
pub struct ResponseDeserializer {
    plan: Option<Arc<StructurePlan>>,
    protocol: Protocol,
    result_wrapper: Option<String>,
}

impl ResponseDeserializer {
    /// Creates a deserializer for an output compiled to `plan`. Operations without an output
    /// deserialize to an empty value.
    pub fn new(
        plan: Option<Arc<StructurePlan>>,
        protocol: Protocol,
        result_wrapper: Option<String>,
    ) -> Self {
        ResponseDeserializer {
            plan,
            protocol,
            result_wrapper,
        }
    }

    /// Plan of the output structure.
    pub fn plan(&self) -> Option<&Arc<StructurePlan>> {
        self.plan.as_ref()
    }

    fn format(&self) -> PayloadFormat {
        match self.protocol {
            Protocol::Query | Protocol::Xml => PayloadFormat::Xml,
            Protocol::Json => PayloadFormat::Json,
        }
    }

    fn dialect(&self) -> Dialect {
        match self.protocol {
            Protocol::Query | Protocol::Xml => Dialect::Xml,
            Protocol::Json => Dialect::Json,
        }
    }

    fn empty(&self) -> StructValue {
        StructValue::new(self.plan.as_ref().map(|p| p.shape.as_str()).unwrap_or_default())
    }

    /// Reads the body members of the output from a decoded payload.
    ///
    /// Keys missing from the payload leave their members null.
    pub fn deserialize(&self, payload: &Document) -> Result<StructValue, DeserializeError> {
        let Some(plan) = &self.plan else {
            return Ok(self.empty());
        };
        let payload = match &self.result_wrapper {
            Some(wrapper) => match payload.get(wrapper) {
                Some(inner) => inner,
                None => return Ok(self.empty()),
            },
            None => payload,
        };
        Ok(coerce_structure(plan, payload, self.dialect(), "")?)
    }

    /// Reads the full output: body, headers and status code.
    pub fn deserialize_response(
        &self,
        response: &LoadedResponse,
    ) -> Result<StructValue, DeserializeError> {
        let Some(plan) = &self.plan else {
            return Ok(self.empty());
        };
        let mut out = match plan.payload_member() {
            Some(member) => {
                let mut out = self.empty();
                let body = response.body();
                match &member.target {
                    TargetPlan::Structure(nested) if !body.is_empty() => {
                        let doc = response.decode(self.format())?;
                        let value = coerce_structure(nested, &doc, self.dialect(), &member.name)?;
                        out.set(member.name.clone(), value);
                    }
                    TargetPlan::Structure(_) => {}
                    TargetPlan::Scalar {
                        kind: ScalarKind::String,
                        ..
                    } => out.set(
                        member.name.clone(),
                        String::from_utf8_lossy(body).into_owned(),
                    ),
                    _ => out.set(member.name.clone(), Blob::new(body.to_vec())),
                }
                out
            }
            None if plan.members.iter().any(|m| m.location.is_body()) => {
                self.deserialize(&response.decode(self.format())?)?
            }
            None => self.empty(),
        };

        for member in &plan.members {
            match member.location {
                Location::Header => {
                    let Some(text) = response.header(&member.wire_name) else {
                        continue;
                    };
                    let doc = match &member.target {
                        TargetPlan::List(_) => Document::Array(
                            text.split(',')
                                .map(|item| Document::from(item.trim()))
                                .collect(),
                        ),
                        _ => Document::from(text),
                    };
                    if let Some(value) = coerce(&member.target, &doc, Dialect::Json, &member.name)? {
                        out.set(member.name.clone(), value);
                    }
                }
                Location::HeaderPrefix => {
                    let prefix = member.wire_name.to_ascii_lowercase();
                    let mut entries = IndexMap::new();
                    for (name, value) in response.headers() {
                        let Some(key) = name.as_str().strip_prefix(&prefix) else {
                            continue;
                        };
                        if let Ok(value) = value.to_str() {
                            entries.insert(key.to_string(), Document::from(value));
                        }
                    }
                    if entries.is_empty() {
                        continue;
                    }
                    if let Some(value) = coerce(
                        &member.target,
                        &Document::Object(entries),
                        Dialect::Json,
                        &member.name,
                    )? {
                        out.set(member.name.clone(), value);
                    }
                }
                Location::StatusCode => out.set(
                    member.name.clone(),
                    Value::Integer(response.status_code().as_u16().into()),
                ),
                _ => {}
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use super::ResponseDeserializer;
    use crate::cache::{Context, GenerationCache};
    use crate::emit::MemorySink;
    use crate::error::DeserializeError;
    use crate::model::{Protocol, ServiceModel};
    use crate::plan::compile_structure;
    use crate::settings::CodegenSettings;
    use crate::value::Value;
    use awsgen_http::response::LoadedResponse;
    use awsgen_types::{Blob, DateTime};
    use bytes::Bytes;

    fn deserializer(model: &str, output: &str, wrapper: Option<&str>) -> ResponseDeserializer {
        let model = ServiceModel::from_json(model).unwrap();
        let settings = CodegenSettings::default();
        let mut cache = GenerationCache::new(&model);
        let mut sink = MemorySink::new();
        let mut ctx = Context::new(&model, &settings, &mut cache, &mut sink);
        let plan = compile_structure(&mut ctx, output).unwrap();
        ResponseDeserializer::new(
            Some(plan),
            model.service().protocol,
            wrapper.map(String::from),
        )
    }

    fn response(status: u16, headers: &[(&str, &str)], body: &'static str) -> LoadedResponse {
        let mut builder = http::Response::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Bytes::from_static(body.as_bytes())).unwrap().into()
    }

    const QUEUES: &str = r#"{
        "metadata": {"protocol": "query", "apiVersion": "2012-11-05"},
        "operations": {},
        "shapes": {
            "ListQueuesResult": {
                "type": "structure",
                "members": {
                    "QueueUrls": {"shape": "QueueUrlList"},
                    "NextToken": {"shape": "String"}
                }
            },
            "QueueUrlList": {"type": "list", "member": {"shape": "String", "locationName": "QueueUrl"}, "flattened": true},
            "String": {"type": "string"}
        }
    }"#;

    #[test]
    fn query_results_are_unwrapped() {
        let de = deserializer(QUEUES, "ListQueuesResult", Some("ListQueuesResult"));
        let loaded = response(
            200,
            &[],
            "<ListQueuesResponse><ListQueuesResult>\
             <QueueUrl>https://sqs/1/a</QueueUrl><QueueUrl>https://sqs/1/b</QueueUrl>\
             <NextToken>t1</NextToken></ListQueuesResult>\
             <ResponseMetadata><RequestId>r</RequestId></ResponseMetadata></ListQueuesResponse>",
        );
        let value = de.deserialize_response(&loaded).unwrap();
        assert_eq!(
            value.get("QueueUrls"),
            Some(&Value::from(vec!["https://sqs/1/a", "https://sqs/1/b"]))
        );
        assert_eq!(value.get_str("NextToken"), Some("t1"));
    }

    #[test]
    fn missing_wrapper_is_an_empty_output() {
        let de = deserializer(QUEUES, "ListQueuesResult", Some("ListQueuesResult"));
        let value = de
            .deserialize_response(&response(200, &[], "<ListQueuesResponse/>"))
            .unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn indented_empty_results() {
        let de = deserializer(QUEUES, "ListQueuesResult", Some("ListQueuesResult"));
        let value = de
            .deserialize_response(&response(
                200,
                &[],
                "<ListQueuesResponse>\n  <ListQueuesResult>\n  </ListQueuesResult>\n</ListQueuesResponse>",
            ))
            .unwrap();
        assert!(value.is_empty());
    }

    const OBJECTS: &str = r#"{
        "metadata": {"protocol": "rest-xml", "apiVersion": "2006-03-01"},
        "operations": {},
        "shapes": {
            "GetObjectOutput": {
                "type": "structure",
                "members": {
                    "Body": {"shape": "Body"},
                    "LastModified": {"shape": "Timestamp", "location": "header", "locationName": "Last-Modified"},
                    "ContentLength": {"shape": "Long", "location": "header", "locationName": "Content-Length"},
                    "Metadata": {"shape": "Metadata", "location": "headers", "locationName": "x-amz-meta-"},
                    "Status": {"shape": "Integer", "location": "statusCode"}
                },
                "payload": "Body"
            },
            "Body": {"type": "blob", "streaming": true},
            "Metadata": {"type": "map", "key": {"shape": "String"}, "value": {"shape": "String"}},
            "String": {"type": "string"},
            "Long": {"type": "long"},
            "Integer": {"type": "integer"},
            "Timestamp": {"type": "timestamp"}
        }
    }"#;

    #[test]
    fn headers_status_and_raw_payloads() {
        let de = deserializer(OBJECTS, "GetObjectOutput", None);
        let loaded = response(
            206,
            &[
                ("Last-Modified", "Sat, 02 Jan 2021 03:04:05 GMT"),
                ("Content-Length", "5"),
                ("x-amz-meta-Color", "blue"),
            ],
            "hello",
        );
        let value = de.deserialize_response(&loaded).unwrap();
        assert_eq!(value.get("Body"), Some(&Value::Blob(Blob::new("hello"))));
        assert_eq!(
            value.get("LastModified"),
            Some(&Value::Timestamp(DateTime::from_secs(1609556645)))
        );
        assert_eq!(value.get("ContentLength"), Some(&Value::Integer(5)));
        assert_eq!(value.get("Status"), Some(&Value::Integer(206)));
        let metadata = value.get("Metadata").and_then(Value::as_map).unwrap();
        assert_eq!(metadata.get("color"), Some(&Value::from("blue")));
    }

    #[test]
    fn malformed_values_are_errors() {
        let de = deserializer(OBJECTS, "GetObjectOutput", None);
        let bad_length = response(200, &[("Content-Length", "five")], "");
        assert!(matches!(
            de.deserialize_response(&bad_length),
            Err(DeserializeError::Coercion { path, expected: "integer", .. }) if path == "ContentLength"
        ));
        let bad_date = response(200, &[("Last-Modified", "yesterday")], "");
        assert!(matches!(
            de.deserialize_response(&bad_date),
            Err(DeserializeError::Timestamp { path, .. }) if path == "LastModified"
        ));
    }

    #[test]
    fn operations_without_output() {
        let de = ResponseDeserializer::new(None, Protocol::Json, None);
        let value = de.deserialize_response(&response(200, &[], "not json")).unwrap();
        assert!(value.is_empty());
    }
}
