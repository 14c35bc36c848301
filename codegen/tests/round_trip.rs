/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use awsgen_codegen::{CodegenRun, MemorySink, ServiceModel, StructValue, Value};
use awsgen_http::response::LoadedResponse;
use awsgen_types::{Blob, DateTime};
use bytes::Bytes;
use pretty_assertions::assert_eq;

fn model(protocol: &str) -> ServiceModel {
    let model = r#"{
        "metadata": {"protocol": "PROTOCOL", "apiVersion": "2021-01-01", "targetPrefix": "Things_20210101"},
        "operations": {
            "EchoThing": {
                "http": {"method": "POST", "requestUri": "/"},
                "input": {"shape": "Thing"},
                "output": {"shape": "Thing"}
            }
        },
        "shapes": {
            "Thing": {
                "type": "structure",
                "members": {
                    "Name": {"shape": "String"},
                    "Count": {"shape": "Integer"},
                    "Ratio": {"shape": "Double"},
                    "Enabled": {"shape": "Boolean"},
                    "Created": {"shape": "Timestamp"},
                    "Checksum": {"shape": "Blob"},
                    "Labels": {"shape": "Labels"},
                    "Attributes": {"shape": "Attributes"},
                    "Owner": {"shape": "Owner"}
                }
            },
            "Labels": {"type": "list", "member": {"shape": "String"}},
            "Attributes": {"type": "map", "key": {"shape": "String"}, "value": {"shape": "String"}},
            "Owner": {
                "type": "structure",
                "members": {
                    "Id": {"shape": "String"},
                    "Since": {"shape": "Timestamp"}
                }
            },
            "String": {"type": "string"},
            "Integer": {"type": "integer"},
            "Double": {"type": "double"},
            "Boolean": {"type": "boolean"},
            "Timestamp": {"type": "timestamp"},
            "Blob": {"type": "blob"}
        }
    }"#
    .replace("PROTOCOL", protocol);
    ServiceModel::from_json(&model).unwrap()
}

fn populated() -> StructValue {
    StructValue::new("Thing")
        .with("Name", "widget & <co>")
        .with("Count", 42)
        .with("Ratio", 2.5)
        .with("Enabled", true)
        .with("Created", DateTime::from_secs(1609556645))
        .with("Checksum", Blob::new("hello"))
        .with("Labels", vec!["a", "b"])
        .with(
            "Attributes",
            [("env", "prod"), ("tier", "api")]
                .into_iter()
                .collect::<Value>(),
        )
        .with(
            "Owner",
            StructValue::new("Owner")
                .with("Id", "o-1")
                .with("Since", DateTime::from_secs(1576540098)),
        )
}

/// Serializes `value` as an `EchoThing` request and reads the request body back as the response.
fn round_trip(protocol: &str, value: StructValue) -> StructValue {
    let model = model(protocol);
    let mut sink = MemorySink::new();
    let report = CodegenRun::new(&model, &mut sink).run();
    assert!(report.is_success(), "{:?}", report.failures);
    let method = &report.methods["EchoThing"];

    let request = method
        .build_request("https://things.amazonaws.com", value)
        .unwrap();
    let body = request.body().bytes().unwrap().to_vec();
    let response: LoadedResponse = http::Response::builder()
        .status(200)
        .body(Bytes::from(body))
        .unwrap()
        .into();
    method.deserializer().deserialize_response(&response).unwrap()
}

#[test]
fn json_values_survive_a_round_trip() {
    assert_eq!(round_trip("json", populated()), populated());
}

#[test]
fn xml_values_survive_a_round_trip() {
    assert_eq!(round_trip("rest-xml", populated()), populated());
}

#[test]
fn empty_values_stay_empty() {
    for protocol in ["json", "rest-xml"] {
        let value = round_trip(protocol, StructValue::new("Thing"));
        assert!(value.is_empty(), "{}: {:?}", protocol, value);
        assert_eq!(value.shape(), "Thing");
    }
}
