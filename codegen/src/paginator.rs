/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Sequential page iteration driven by continuation tokens.

use crate::error::PageError;
use crate::model::Pagination;
use crate::operation::ClientMethod;
use crate::value::{StructValue, Value};
use awsgen_http::transport::SharedTransport;
use std::collections::HashSet;
use std::sync::Arc;

/// Pages of a paginated operation.
///
/// Each call to [`next`](PaginationStream::next) sends one request and waits for its response
/// before the next request can be built; pages are never fetched ahead. Iteration ends after
/// a page without a continuation token, after a page repeating a token seen before, or after
/// the first error.
#[derive(Debug)]
pub struct PaginationStream {
    method: Arc<ClientMethod>,
    pagination: Pagination,
    transport: SharedTransport,
    endpoint: String,
    input: StructValue,
    seen: HashSet<String>,
    pages: usize,
    done: bool,
}

fn token_text(value: &Value) -> Option<String> {
    match value {
        Value::String(token) if !token.is_empty() => Some(token.clone()),
        Value::Integer(token) => Some(token.to_string()),
        _ => None,
    }
}

impl PaginationStream {
    pub(crate) fn new(
        method: Arc<ClientMethod>,
        pagination: Pagination,
        transport: SharedTransport,
        endpoint: String,
        input: StructValue,
    ) -> Self {
        let seen = input
            .get(&pagination.input_token)
            .and_then(token_text)
            .into_iter()
            .collect();
        PaginationStream {
            method,
            pagination,
            transport,
            endpoint,
            input,
            seen,
            pages: 0,
            done: false,
        }
    }

    /// Sets the page size on every request. Ignored if the operation declares no page size.
    pub fn page_size(mut self, size: i64) -> Self {
        match &self.pagination.page_size {
            Some(member) => self.input.set(member.clone(), size),
            None => tracing::warn!(
                operation = %self.method.name(),
                "operation has no page size member; ignoring page size"
            ),
        }
        self
    }

    /// Number of pages requested so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Fetches the next page, or returns `None` once iteration has ended.
    pub async fn next(&mut self) -> Option<Result<StructValue, PageError>> {
        if self.done {
            return None;
        }
        self.pages += 1;
        tracing::debug!(operation = %self.method.name(), page = self.pages, "fetching page");
        let page = match self
            .method
            .dispatch(&self.transport, &self.endpoint, &self.input)
        {
            Ok(output) => output.into_result().await.map_err(PageError::from),
            Err(err) => Err(PageError::from(err)),
        };
        let page = match page {
            Ok(page) => page,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };

        let next = page.get(&self.pagination.output_token);
        match next.and_then(token_text) {
            Some(token) if self.seen.insert(token.clone()) => {
                tracing::trace!(token = %token, "continuing");
                let value = next.cloned().unwrap_or(Value::String(token));
                self.input.set(self.pagination.input_token.clone(), value);
            }
            Some(token) => {
                tracing::warn!(
                    operation = %self.method.name(),
                    token = %token,
                    "continuation token repeated; stopping"
                );
                self.done = true;
            }
            None => self.done = true,
        }
        Some(Ok(page))
    }

    /// Fetches every remaining page.
    pub async fn try_collect(mut self) -> Result<Vec<StructValue>, PageError> {
        let mut pages = Vec::new();
        while let Some(page) = self.next().await {
            pages.push(page?);
        }
        Ok(pages)
    }
}

#[cfg(test)]
mod test {
    use crate::cache::{Context, GenerationCache};
    use crate::emit::MemorySink;
    use crate::error::{InvocationError, PageError};
    use crate::model::ServiceModel;
    use crate::operation::{compile_operation, ClientMethod};
    use crate::settings::CodegenSettings;
    use crate::value::StructValue;
    use awsgen_http::result::SdkError;
    use awsgen_http::test_util::{response, ReplayTransport};
    use awsgen_http::transport::SharedTransport;
    use std::sync::Arc;

    const MODEL: &str = r#"{
        "metadata": {"protocol": "json", "apiVersion": "2012-08-10", "targetPrefix": "DynamoDB_20120810"},
        "operations": {
            "ListTables": {"input": {"shape": "ListTablesInput"}, "output": {"shape": "ListTablesOutput"}},
            "DescribeLimits": {"output": {"shape": "ListTablesOutput"}}
        },
        "shapes": {
            "ListTablesInput": {
                "type": "structure",
                "members": {
                    "ExclusiveStartTableName": {"shape": "String"},
                    "Limit": {"shape": "Integer"}
                }
            },
            "ListTablesOutput": {
                "type": "structure",
                "members": {
                    "TableNames": {"shape": "TableNames"},
                    "LastEvaluatedTableName": {"shape": "String"}
                }
            },
            "TableNames": {"type": "list", "member": {"shape": "String"}},
            "String": {"type": "string"},
            "Integer": {"type": "integer"}
        }
    }"#;

    const PAGINATORS: &str = r#"{
        "pagination": {
            "ListTables": {
                "input_token": "ExclusiveStartTableName",
                "output_token": "LastEvaluatedTableName",
                "limit_key": "Limit"
            }
        }
    }"#;

    fn method(name: &str) -> Arc<ClientMethod> {
        let model = ServiceModel::from_json(MODEL)
            .unwrap()
            .with_paginators(PAGINATORS)
            .unwrap();
        let settings = CodegenSettings::default();
        let mut cache = GenerationCache::new(&model);
        let mut sink = MemorySink::new();
        let mut ctx = Context::new(&model, &settings, &mut cache, &mut sink);
        compile_operation(&mut ctx, name).unwrap()
    }

    fn page(tables: &[&str], token: Option<&str>) -> http::Response<bytes::Bytes> {
        let names = tables
            .iter()
            .map(|t| format!("\"{}\"", t))
            .collect::<Vec<_>>()
            .join(",");
        let body = match token {
            Some(token) => format!(
                r#"{{"TableNames":[{}],"LastEvaluatedTableName":"{}"}}"#,
                names, token
            ),
            None => format!(r#"{{"TableNames":[{}]}}"#, names),
        };
        response(200, body)
    }

    #[tokio::test]
    async fn follows_tokens_in_sequence() {
        let replay = ReplayTransport::new(vec![
            page(&["a"], Some("t1")),
            page(&["b"], Some("t2")),
            page(&["c"], None),
        ]);
        let transport = SharedTransport::new(replay.clone());
        let input = StructValue::new("ListTablesInput");
        let mut pages = method("ListTables")
            .paginate(&transport, "https://dynamodb", input)
            .unwrap()
            .page_size(1);

        let mut count = 0;
        while let Some(page) = pages.next().await {
            page.unwrap();
            count += 1;
            // Nothing is requested ahead of the caller.
            assert_eq!(replay.requests().len(), count);
        }
        assert_eq!(count, 3);
        assert_eq!(pages.pages(), 3);
        let bodies: Vec<_> = replay
            .requests()
            .iter()
            .map(|r| r.body_str().to_string())
            .collect();
        assert_eq!(
            bodies,
            vec![
                r#"{"Limit":1}"#,
                r#"{"ExclusiveStartTableName":"t1","Limit":1}"#,
                r#"{"ExclusiveStartTableName":"t2","Limit":1}"#,
            ]
        );
        replay.assert_exhausted();
    }

    #[tokio::test]
    async fn repeated_tokens_stop_iteration() {
        let replay = ReplayTransport::new(vec![page(&["a"], Some("t1")), page(&["b"], Some("t1"))]);
        let transport = SharedTransport::new(replay.clone());
        let pages = method("ListTables")
            .paginate(&transport, "https://dynamodb", StructValue::new("ListTablesInput"))
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(pages.len(), 2);
        replay.assert_exhausted();
    }

    #[tokio::test]
    async fn errors_end_iteration() {
        let replay = ReplayTransport::new(vec![page(&["a"], Some("t1")), response(500, "")]);
        let transport = SharedTransport::new(replay.clone());
        let mut pages = method("ListTables")
            .paginate(&transport, "https://dynamodb", StructValue::new("ListTablesInput"))
            .unwrap();
        assert!(pages.next().await.unwrap().is_ok());
        assert!(matches!(
            pages.next().await,
            Some(Err(PageError::Sdk(SdkError::ServiceError { .. })))
        ));
        assert!(pages.next().await.is_none());
    }

    #[test]
    fn only_paginated_operations_paginate() {
        let transport = SharedTransport::new(ReplayTransport::new(vec![]));
        assert!(matches!(
            method("DescribeLimits").paginate(
                &transport,
                "https://dynamodb",
                StructValue::new("DescribeLimitsRequest")
            ),
            Err(InvocationError::NotPaginated(name)) if name == "DescribeLimits"
        ));
    }
}
