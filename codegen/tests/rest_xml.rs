/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use awsgen_codegen::{
    Client, ClientConfig, CodegenRun, InvocationError, MemorySink, ServiceModel, StructValue,
    ValidationError, Value,
};
use awsgen_http::content::ContentSource;
use awsgen_http::test_util::{response, ReplayTransport};
use awsgen_http::transport::{HttpResponse, SharedTransport};
use awsgen_types::{Blob, DateTime, Document};
use bytes::Bytes;
use pretty_assertions::assert_eq;

const ENDPOINT: &str = "https://s3.us-east-1.amazonaws.com";

fn client(replay: &ReplayTransport) -> Client {
    let model = ServiceModel::from_json(include_str!("models/s3.json"))
        .unwrap()
        .with_paginators(include_str!("models/s3.paginators.json"))
        .unwrap();
    let mut sink = MemorySink::new();
    let report = CodegenRun::new(&model, &mut sink).run();
    assert!(report.is_success(), "{:?}", report.failures);
    report.into_client(ClientConfig::new(
        ENDPOINT,
        SharedTransport::new(replay.clone()),
    ))
}

fn response_with_headers(status: u16, headers: &[(&str, &str)], body: &'static str) -> HttpResponse {
    let mut builder = http::Response::builder().status(status);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Bytes::from_static(body.as_bytes())).unwrap()
}

#[tokio::test]
async fn delete_object_requires_bucket() {
    let replay = ReplayTransport::new(vec![response_with_headers(
        204,
        &[("x-amz-delete-marker", "true"), ("x-amz-version-id", "3")],
        "",
    )]);
    let client = client(&replay);

    let raw: Document = [("Key", "a.txt")].into_iter().collect();
    let err = client.invoke("DeleteObject", raw).unwrap_err();
    assert!(matches!(
        err,
        InvocationError::Validation(ValidationError::MissingRequiredField { field, structure })
            if field == "Bucket" && structure == "DeleteObjectRequest"
    ));
    assert!(replay.requests().is_empty());

    let input = StructValue::new("DeleteObjectRequest")
        .with("Bucket", "bucket")
        .with("Key", "photos/a b.jpg")
        .with("VersionId", "3")
        .with("MFA", "arn:mfa 123456");
    let output = client
        .invoke("DeleteObject", input)
        .unwrap()
        .into_result()
        .await
        .unwrap();
    {
        let requests = replay.requests();
        assert_eq!(requests[0].method, http::Method::DELETE);
        assert_eq!(
            requests[0].uri.to_string(),
            "https://s3.us-east-1.amazonaws.com/bucket/photos/a%20b.jpg?versionId=3"
        );
        assert_eq!(requests[0].header("x-amz-mfa"), Some("arn:mfa 123456"));
        assert_eq!(requests[0].header("content-type"), None);
        assert!(requests[0].body.is_empty());
    }
    assert_eq!(output.get("DeleteMarker"), Some(&Value::Boolean(true)));
    assert_eq!(output.get_str("VersionId"), Some("3"));
    replay.assert_exhausted();
}

fn grant(permission: &str) -> StructValue {
    StructValue::new("Grant")
        .with(
            "Grantee",
            StructValue::new("Grantee")
                .with("ID", "abc")
                .with("Type", "CanonicalUser"),
        )
        .with("Permission", permission)
}

fn put_object_acl(grants: Vec<StructValue>) -> StructValue {
    StructValue::new("PutObjectAclRequest")
        .with("Bucket", "bucket")
        .with("Key", "a.txt")
        .with(
            "AccessControlPolicy",
            StructValue::new("AccessControlPolicy")
                .with("Grants", grants)
                .with("Owner", StructValue::new("Owner").with("ID", "abc")),
        )
}

#[tokio::test]
async fn put_object_acl_writes_namespaced_attributes() {
    let replay = ReplayTransport::new(vec![response(200, "")]);
    let client = client(&replay);

    let output = client
        .invoke("PutObjectAcl", put_object_acl(vec![grant("READ")]))
        .unwrap()
        .into_result()
        .await
        .unwrap();
    assert!(output.is_empty());

    let requests = replay.requests();
    assert_eq!(
        requests[0].uri.to_string(),
        "https://s3.us-east-1.amazonaws.com/bucket/a.txt?acl"
    );
    assert_eq!(requests[0].header("content-type"), Some("application/xml"));
    assert_eq!(
        requests[0].body_str(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <AccessControlPolicy xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
         <AccessControlList><Grant>\
         <Grantee xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" xsi:type=\"CanonicalUser\">\
         <ID>abc</ID></Grantee>\
         <Permission>READ</Permission>\
         </Grant></AccessControlList>\
         <Owner><ID>abc</ID></Owner>\
         </AccessControlPolicy>"
    );
}

#[test]
fn put_object_acl_validates_nested_grants() {
    let replay = ReplayTransport::new(vec![]);
    let client = client(&replay);

    let err = client
        .invoke("PutObjectAcl", put_object_acl(vec![grant("READ"), grant("READ_WRITE")]))
        .unwrap_err();
    assert!(matches!(
        err,
        InvocationError::Validation(ValidationError::InvalidEnumValue { field, value, enum_name })
            if field == "Permission" && value == "READ_WRITE" && enum_name == "Permission"
    ));

    let anonymous = StructValue::new("Grant")
        .with("Grantee", StructValue::new("Grantee").with("ID", "abc"))
        .with("Permission", "READ");
    let err = client
        .invoke("PutObjectAcl", put_object_acl(vec![anonymous]))
        .unwrap_err();
    assert!(matches!(
        err,
        InvocationError::Validation(ValidationError::MissingRequiredField { field, structure })
            if field == "Type" && structure == "Grantee"
    ));
    assert!(replay.requests().is_empty());
}

#[tokio::test]
async fn create_bucket_omits_empty_configuration() {
    let replay = ReplayTransport::new(vec![
        response_with_headers(200, &[("Location", "/bucket")], ""),
        response(200, ""),
        response(200, ""),
    ]);
    let client = client(&replay);

    let input = StructValue::new("CreateBucketRequest")
        .with("Bucket", "bucket")
        .with("ACL", "private");
    let output = client
        .invoke("CreateBucket", input.clone())
        .unwrap()
        .into_result()
        .await
        .unwrap();
    assert_eq!(output.get_str("Location"), Some("/bucket"));

    let empty = input
        .clone()
        .with("CreateBucketConfiguration", StructValue::new("CreateBucketConfiguration"));
    client.invoke("CreateBucket", empty).unwrap();

    let configured = input.with(
        "CreateBucketConfiguration",
        StructValue::new("CreateBucketConfiguration").with("LocationConstraint", "eu-west-1"),
    );
    client.invoke("CreateBucket", configured).unwrap();

    let requests = replay.requests();
    for request in &requests[..2] {
        assert_eq!(request.method, http::Method::PUT);
        assert_eq!(request.header("x-amz-acl"), Some("private"));
        assert_eq!(request.header("content-type"), None);
        assert!(request.body.is_empty());
    }
    assert_eq!(requests[2].header("content-type"), Some("application/xml"));
    assert_eq!(
        requests[2].body_str(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <CreateBucketConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
         <LocationConstraint>eu-west-1</LocationConstraint>\
         </CreateBucketConfiguration>"
    );
}

#[tokio::test]
async fn get_object_reads_headers_and_raw_body() {
    let replay = ReplayTransport::new(vec![response_with_headers(
        200,
        &[
            ("Content-Length", "5"),
            ("ETag", "\"5d41402a\""),
            ("Last-Modified", "Sat, 02 Jan 2021 03:04:05 GMT"),
            ("x-amz-meta-color", "blue"),
        ],
        "hello",
    )]);
    let client = client(&replay);

    let input = StructValue::new("GetObjectRequest")
        .with("Bucket", "bucket")
        .with("Key", "docs/readme.txt")
        .with("IfModifiedSince", DateTime::from_secs(1609556645))
        .with("Range", "bytes=0-4");
    let mut output = client.invoke("GetObject", input).unwrap();
    let value = output.resolve().await.unwrap();
    assert_eq!(value.get("Body"), Some(&Value::Blob(Blob::new("hello"))));
    assert_eq!(value.get("ContentLength"), Some(&Value::Integer(5)));
    assert_eq!(value.get_str("ETag"), Some("\"5d41402a\""));
    assert_eq!(
        value.get("LastModified"),
        Some(&Value::Timestamp(DateTime::from_secs(1609556645)))
    );
    let metadata = value.get("Metadata").and_then(Value::as_map).unwrap();
    assert_eq!(metadata.get("color"), Some(&Value::from("blue")));

    let requests = replay.requests();
    assert_eq!(
        requests[0].uri.to_string(),
        "https://s3.us-east-1.amazonaws.com/bucket/docs/readme.txt"
    );
    assert_eq!(
        requests[0].header("if-modified-since"),
        Some("Sat, 02 Jan 2021 03:04:05 GMT")
    );
    assert_eq!(requests[0].header("range"), Some("bytes=0-4"));
}

#[tokio::test]
async fn put_object_streams_its_body() {
    let replay = ReplayTransport::new(vec![response_with_headers(
        200,
        &[("ETag", "\"5d41402a\"")],
        "",
    )]);
    let client = client(&replay);

    let metadata: Value = [("color", "blue")].into_iter().collect();
    let input = StructValue::new("PutObjectRequest")
        .with("Bucket", "bucket")
        .with("Key", "hello.txt")
        .with("ContentType", "text/plain")
        .with("Metadata", metadata)
        .with("Body", ContentSource::from_bytes("hello"));
    let output = client
        .invoke("PutObject", input)
        .unwrap()
        .into_result()
        .await
        .unwrap();
    assert_eq!(output.get_str("ETag"), Some("\"5d41402a\""));

    let requests = replay.requests();
    assert_eq!(requests[0].body_str(), "hello");
    assert_eq!(requests[0].header("content-type"), Some("text/plain"));
    assert_eq!(requests[0].header("x-amz-meta-color"), Some("blue"));
}

const PAGE_1: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
    <Name>bucket</Name>
    <KeyCount>2</KeyCount>
    <IsTruncated>true</IsTruncated>
    <NextContinuationToken>t1</NextContinuationToken>
    <Contents>
        <Key>a.txt</Key>
        <LastModified>2021-01-02T03:04:05.000Z</LastModified>
        <Size>1</Size>
        <StorageClass>STANDARD</StorageClass>
    </Contents>
    <Contents>
        <Key>b.txt</Key>
        <Size>2</Size>
    </Contents>
</ListBucketResult>"#;

const PAGE_2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
    <Name>bucket</Name>
    <KeyCount>1</KeyCount>
    <IsTruncated>false</IsTruncated>
    <Contents>
        <Key>c.txt</Key>
        <Size>3</Size>
    </Contents>
</ListBucketResult>"#;

fn keys(page: &StructValue) -> Vec<&str> {
    page.get("Contents")
        .and_then(Value::as_list)
        .unwrap()
        .iter()
        .map(|object| object.as_structure().unwrap().get_str("Key").unwrap())
        .collect()
}

#[tokio::test]
async fn list_objects_v2_paginates() {
    let replay = ReplayTransport::new(vec![response(200, PAGE_1), response(200, PAGE_2)]);
    let client = client(&replay);

    let input = StructValue::new("ListObjectsV2Request").with("Bucket", "bucket");
    let pages = client
        .paginate("ListObjectsV2", input)
        .unwrap()
        .page_size(2)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(keys(&pages[0]), vec!["a.txt", "b.txt"]);
    // A single entry of a flattened list is still a list.
    assert_eq!(keys(&pages[1]), vec!["c.txt"]);
    assert_eq!(pages[0].get("IsTruncated"), Some(&Value::Boolean(true)));
    assert_eq!(pages[0].get("KeyCount"), Some(&Value::Integer(2)));

    let first = pages[0].get("Contents").and_then(Value::as_list).unwrap()[0]
        .as_structure()
        .unwrap();
    assert_eq!(
        first.get("LastModified"),
        Some(&Value::Timestamp(DateTime::from_secs(1609556645)))
    );
    assert_eq!(first.get_str("StorageClass"), Some("STANDARD"));

    let uris: Vec<String> = replay
        .requests()
        .iter()
        .map(|r| r.uri.to_string())
        .collect();
    assert_eq!(
        uris,
        vec![
            "https://s3.us-east-1.amazonaws.com/bucket?list-type=2&max-keys=2",
            "https://s3.us-east-1.amazonaws.com/bucket?list-type=2&continuation-token=t1&max-keys=2",
        ]
    );
    replay.assert_exhausted();
}

#[test]
fn unknown_operations_are_rejected() {
    let client = client(&ReplayTransport::new(vec![]));
    assert!(matches!(
        client.invoke("HeadBucket", StructValue::new("HeadBucketRequest")),
        Err(InvocationError::UnknownOperation(name)) if name == "HeadBucket"
    ));
    assert!(matches!(
        client.paginate("GetObject", StructValue::new("GetObjectRequest")),
        Err(InvocationError::NotPaginated(name)) if name == "GetObject"
    ));
}
