/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Compilation of operations into client methods.

use crate::cache::Context;
use crate::coerce::{coerce_structure, Dialect};
use crate::de::ResponseDeserializer;
use crate::error::{CompileError, DeserializeError, InvocationError, ModelError, ValidationError};
use crate::model::{Operation, Pagination};
use crate::naming::Identifier;
use crate::paginator::PaginationStream;
use crate::plan::{compile_structure, StructurePlan};
use crate::render;
use crate::ser::RequestSerializer;
use crate::validate::validate;
use crate::value::{ShapeInput, StructValue, Value};
use awsgen_http::lazy::LazyResult;
use awsgen_http::response::ResponseHandle;
use awsgen_http::result::SdkError;
use awsgen_http::transport::{HttpRequest, SharedTransport, Transport};
use std::sync::Arc;

/// A compiled operation: validate, serialize, dispatch and wrap the result.
#[derive(Debug)]
pub struct ClientMethod {
    name: String,
    ident: Identifier,
    input: Arc<StructurePlan>,
    serializer: RequestSerializer,
    deserializer: Arc<ResponseDeserializer>,
    pagination: Option<Pagination>,
}

impl ClientMethod {
    /// Name of the operation in the model.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of the emitted client function.
    pub fn ident(&self) -> &Identifier {
        &self.ident
    }

    /// Plan of the input structure.
    pub fn input(&self) -> &Arc<StructurePlan> {
        &self.input
    }

    /// Plan of the output structure, `None` for operations without output.
    pub fn output(&self) -> Option<&Arc<StructurePlan>> {
        self.deserializer.plan()
    }

    /// Builds requests from validated inputs.
    pub fn serializer(&self) -> &RequestSerializer {
        &self.serializer
    }

    /// Reads outputs from responses.
    pub fn deserializer(&self) -> &ResponseDeserializer {
        &self.deserializer
    }

    /// Continuation rules of a paginated operation.
    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    /// Converts `input` into a value of the input shape.
    ///
    /// Typed values are accepted as they are if they belong to the input shape. Raw documents
    /// are keyed by member name and converted member by member.
    pub fn create(&self, input: ShapeInput) -> Result<StructValue, ValidationError> {
        match input {
            ShapeInput::Typed(value) if value.shape() == self.input.shape => Ok(value),
            ShapeInput::Typed(value) => Err(ValidationError::WrongInputShape {
                expected: self.input.shape.clone(),
                found: value.shape().to_string(),
            }),
            ShapeInput::Raw(doc) => Ok(coerce_structure(&self.input, &doc, Dialect::Create, "")?),
        }
    }

    /// Creates and validates an input.
    pub fn prepare(&self, input: impl Into<ShapeInput>) -> Result<StructValue, ValidationError> {
        let value = self.create(input.into())?;
        validate(&self.input, &value)?;
        Ok(value)
    }

    /// Builds the request for `input` against `endpoint` without sending it.
    pub fn build_request(
        &self,
        endpoint: &str,
        input: impl Into<ShapeInput>,
    ) -> Result<HttpRequest, InvocationError> {
        let value = self.prepare(input)?;
        Ok(self.serializer.build_request(endpoint, &value)?)
    }

    /// Validates and serializes `input`, then dispatches it.
    ///
    /// Returns as soon as the request is handed to `transport`; the response is read when the
    /// output is first resolved. Validation failures are returned before anything is sent.
    pub fn invoke(
        &self,
        transport: &SharedTransport,
        endpoint: &str,
        input: impl Into<ShapeInput>,
    ) -> Result<OperationOutput, InvocationError> {
        let value = self.prepare(input)?;
        self.dispatch(transport, endpoint, &value)
    }

    pub(crate) fn dispatch(
        &self,
        transport: &SharedTransport,
        endpoint: &str,
        input: &StructValue,
    ) -> Result<OperationOutput, InvocationError> {
        let request = self.serializer.build_request(endpoint, input)?;
        tracing::debug!(
            operation = %self.name,
            method = %request.method(),
            uri = %request.uri(),
            "dispatching request"
        );
        let handle = ResponseHandle::new(transport.send(request));
        Ok(OperationOutput::new(
            handle,
            self.deserializer.clone(),
            self.pagination.as_ref().map(|p| p.output_token.clone()),
        ))
    }

    /// Starts iterating over the pages of a paginated operation.
    pub fn paginate(
        self: &Arc<Self>,
        transport: &SharedTransport,
        endpoint: &str,
        input: impl Into<ShapeInput>,
    ) -> Result<PaginationStream, InvocationError> {
        let Some(pagination) = &self.pagination else {
            return Err(InvocationError::NotPaginated(self.name.clone()));
        };
        let value = self.prepare(input)?;
        Ok(PaginationStream::new(
            self.clone(),
            pagination.clone(),
            transport.clone(),
            endpoint.to_string(),
            value,
        ))
    }
}

/// The result of an invoked operation, read from the response on first resolve.
#[derive(Debug)]
pub struct OperationOutput {
    result: LazyResult<StructValue, SdkError<DeserializeError>>,
    output_token: Option<String>,
}

impl OperationOutput {
    fn new(
        handle: ResponseHandle,
        deserializer: Arc<ResponseDeserializer>,
        output_token: Option<String>,
    ) -> Self {
        let result = LazyResult::new(async move {
            let response = handle.load().await.map_err(SdkError::DispatchFailure)?;
            let status = response.status_code();
            if status.as_u16() >= 300 {
                return Err(SdkError::ServiceError {
                    status,
                    body: response.into_body(),
                });
            }
            deserializer
                .deserialize_response(&response)
                .map_err(|err| SdkError::ResponseError { status, err })
        });
        OperationOutput {
            result,
            output_token,
        }
    }

    /// Waits for the response and deserializes it, once. Later calls return the same outcome.
    pub async fn resolve(&mut self) -> Result<&StructValue, &SdkError<DeserializeError>> {
        self.result.resolve().await
    }

    /// Returns true once [`resolve`](OperationOutput::resolve) has completed.
    pub fn is_resolved(&self) -> bool {
        self.result.is_populated()
    }

    /// The continuation token of a paginated operation, if the page has one.
    pub async fn continuation_token(
        &mut self,
    ) -> Result<Option<&Value>, &SdkError<DeserializeError>> {
        let Some(member) = &self.output_token else {
            return Ok(None);
        };
        Ok(self.result.resolve().await?.get(member))
    }

    /// Resolves the output and takes ownership of it.
    pub async fn into_result(self) -> Result<StructValue, SdkError<DeserializeError>> {
        self.result.into_result().await
    }
}

/// Compiles operation `name`, or returns the method compiled earlier in this run.
pub fn compile_operation(
    ctx: &mut Context<'_>,
    name: &str,
) -> Result<Arc<ClientMethod>, CompileError> {
    if let Some(method) = ctx.cache.operation(name) {
        return Ok(method);
    }
    let model = ctx.model;
    let operation = model.operation(name)?;
    tracing::debug!(operation = name, "compiling operation");

    let input = compile_structure(ctx, &operation.input)?;
    let output = match &operation.output {
        Some(output) => Some(compile_structure(ctx, output)?),
        None => None,
    };
    let serializer = RequestSerializer::new(model.service(), operation, input.clone())?;
    let pagination = match &operation.pagination {
        Some(pagination) => Some(check_pagination(
            operation,
            pagination,
            &input,
            output.as_deref(),
        )?),
        None => None,
    };
    let deserializer = ResponseDeserializer::new(
        output,
        model.service().protocol,
        operation.result_wrapper.clone(),
    );

    let method = Arc::new(ClientMethod {
        name: operation.name.clone(),
        ident: ctx.cache.names().operation(name),
        input,
        serializer,
        deserializer: Arc::new(deserializer),
        pagination,
    });
    ctx.emit(method.ident.clone(), render::render_operation(&method))?;
    ctx.cache.insert_operation(method.clone());
    tracing::debug!(operation = name, "compiled operation");
    Ok(method)
}

fn check_pagination(
    operation: &Operation,
    pagination: &Pagination,
    input: &StructurePlan,
    output: Option<&StructurePlan>,
) -> Result<Pagination, ModelError> {
    let unknown = |structure: &StructurePlan, member: &str| ModelError::UnknownMember {
        structure: structure.shape.clone(),
        member: member.to_string(),
    };
    if input.member(&pagination.input_token).is_none() {
        return Err(unknown(input, &pagination.input_token));
    }
    if let Some(page_size) = &pagination.page_size {
        if input.member(page_size).is_none() {
            return Err(unknown(input, page_size));
        }
    }
    match output {
        Some(output) if output.member(&pagination.output_token).is_some() => {
            Ok(pagination.clone())
        }
        Some(output) => Err(unknown(output, &pagination.output_token)),
        None => Err(ModelError::UnsupportedPaginator {
            operation: operation.name.clone(),
            token: pagination.output_token.clone(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::compile_operation;
    use crate::cache::{Context, GenerationCache};
    use crate::emit::MemorySink;
    use crate::error::{CompileError, InvocationError, ModelError, ValidationError};
    use crate::model::ServiceModel;
    use crate::naming::ModuleKind;
    use crate::settings::CodegenSettings;
    use crate::value::{ShapeInput, StructValue};
    use awsgen_http::result::SdkError;
    use awsgen_http::test_util::{response, ReplayTransport};
    use awsgen_http::transport::SharedTransport;
    use awsgen_types::Document;
    use std::sync::Arc;

    const MODEL: &str = r#"{
        "metadata": {
            "protocol": "json",
            "apiVersion": "2012-08-10",
            "targetPrefix": "DynamoDB_20120810",
            "jsonVersion": "1.0"
        },
        "operations": {
            "DescribeTable": {
                "input": {"shape": "DescribeTableInput"},
                "output": {"shape": "DescribeTableOutput"}
            },
            "BadPager": {
                "input": {"shape": "DescribeTableInput"},
                "output": {"shape": "DescribeTableOutput"}
            }
        },
        "shapes": {
            "DescribeTableInput": {
                "type": "structure",
                "required": ["TableName"],
                "members": {"TableName": {"shape": "String"}}
            },
            "DescribeTableOutput": {
                "type": "structure",
                "members": {"Table": {"shape": "TableDescription"}}
            },
            "TableDescription": {
                "type": "structure",
                "members": {"TableName": {"shape": "String"}, "ItemCount": {"shape": "Long"}}
            },
            "String": {"type": "string"},
            "Long": {"type": "long"}
        }
    }"#;

    const PAGINATORS: &str = r#"{
        "pagination": {
            "BadPager": {"input_token": "StartToken", "output_token": "NextToken"}
        }
    }"#;

    fn model() -> ServiceModel {
        ServiceModel::from_json(MODEL)
            .unwrap()
            .with_paginators(PAGINATORS)
            .unwrap()
    }

    #[test]
    fn methods_are_compiled_once() {
        let model = model();
        let settings = CodegenSettings::default();
        let mut cache = GenerationCache::new(&model);
        let mut sink = MemorySink::new();
        let mut ctx = Context::new(&model, &settings, &mut cache, &mut sink);
        let first = compile_operation(&mut ctx, "DescribeTable").unwrap();
        let second = compile_operation(&mut ctx, "DescribeTable").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.ident().module, ModuleKind::Client);
        assert_eq!(first.ident().name, "describe_table");
        drop(ctx);
        assert_eq!(sink.attempts(first.ident()), 1);
    }

    #[test]
    fn paginator_tokens_must_exist() {
        let model = model();
        let settings = CodegenSettings::default();
        let mut cache = GenerationCache::new(&model);
        let mut sink = MemorySink::new();
        let mut ctx = Context::new(&model, &settings, &mut cache, &mut sink);
        assert!(matches!(
            compile_operation(&mut ctx, "BadPager"),
            Err(CompileError::Model(ModelError::UnknownMember { member, .. })) if member == "StartToken"
        ));
    }

    fn method() -> Arc<super::ClientMethod> {
        let model = model();
        let settings = CodegenSettings::default();
        let mut cache = GenerationCache::new(&model);
        let mut sink = MemorySink::new();
        let mut ctx = Context::new(&model, &settings, &mut cache, &mut sink);
        compile_operation(&mut ctx, "DescribeTable").unwrap()
    }

    #[test]
    fn create_accepts_typed_and_raw_input() {
        let method = method();
        let typed = StructValue::new("DescribeTableInput").with("TableName", "users");
        let raw: Document = [("TableName", "users")].into_iter().collect();
        assert_eq!(method.create(ShapeInput::from(typed.clone())), Ok(typed.clone()));
        assert_eq!(method.create(ShapeInput::from(raw)), Ok(typed));
        assert_eq!(
            method.create(StructValue::new("Other").into()),
            Err(ValidationError::WrongInputShape {
                expected: "DescribeTableInput".into(),
                found: "Other".into()
            })
        );
    }

    #[tokio::test]
    async fn invalid_input_is_never_sent() {
        let method = method();
        let replay = ReplayTransport::new(vec![]);
        let transport = SharedTransport::new(replay.clone());
        let err = method
            .invoke(&transport, "https://dynamodb", StructValue::new("DescribeTableInput"))
            .unwrap_err();
        assert!(matches!(
            err,
            InvocationError::Validation(ValidationError::MissingRequiredField { .. })
        ));
        assert!(replay.requests().is_empty());
    }

    #[tokio::test]
    async fn results_resolve_once() {
        let method = method();
        let replay = ReplayTransport::new(vec![response(
            200,
            r#"{"Table": {"TableName": "users", "ItemCount": 12}}"#,
        )]);
        let transport = SharedTransport::new(replay.clone());
        let input = StructValue::new("DescribeTableInput").with("TableName", "users");
        let mut output = method.invoke(&transport, "https://dynamodb", input).unwrap();
        assert!(!output.is_resolved());

        {
            let requests = replay.requests();
            assert_eq!(
                requests[0].header("x-amz-target"),
                Some("DynamoDB_20120810.DescribeTable")
            );
            assert_eq!(requests[0].header("content-type"), Some("application/x-amz-json-1.0"));
            assert_eq!(requests[0].body_str(), r#"{"TableName":"users"}"#);
        }

        let table = output.resolve().await.unwrap().get("Table").cloned().unwrap();
        assert_eq!(
            table.as_structure().unwrap().get("ItemCount").and_then(|v| v.as_i64()),
            Some(12)
        );
        assert!(output.is_resolved());
        assert!(output.resolve().await.is_ok());
        replay.assert_exhausted();
    }

    #[tokio::test]
    async fn failures_are_stable() {
        let method = method();
        let replay = ReplayTransport::new(vec![response(400, "{\"__type\":\"ResourceNotFound\"}")]);
        let transport = SharedTransport::new(replay.clone());
        let input = StructValue::new("DescribeTableInput").with("TableName", "users");
        let mut output = method.invoke(&transport, "https://dynamodb", input).unwrap();
        for _ in 0..2 {
            match output.resolve().await {
                Err(SdkError::ServiceError { status, body }) => {
                    assert_eq!(status.as_u16(), 400);
                    assert_eq!(body.as_ref(), b"{\"__type\":\"ResourceNotFound\"}");
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(replay.requests().len(), 1);
    }
}
