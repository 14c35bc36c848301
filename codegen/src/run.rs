/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A generation run over a whole service.

use crate::cache::{Context, GenerationCache};
use crate::client::{Client, ClientConfig};
use crate::emit::EmissionSink;
use crate::error::CompileError;
use crate::model::ServiceModel;
use crate::operation::{compile_operation, ClientMethod};
use crate::settings::CodegenSettings;
use indexmap::IndexMap;
use std::sync::Arc;

/// An operation that failed to compile.
#[derive(Debug)]
pub struct OperationFailure {
    /// Name of the operation
    pub operation: String,
    /// Why it failed
    pub error: CompileError,
}

/// Outcome of [`CodegenRun::run`].
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Compiled methods, by operation name in name order
    pub methods: IndexMap<String, Arc<ClientMethod>>,
    /// Operations that failed to compile
    pub failures: Vec<OperationFailure>,
}

impl GenerationReport {
    /// Returns true if every operation compiled.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Builds a client over the compiled methods.
    pub fn into_client(self, config: ClientConfig) -> Client {
        Client::new(self.methods, config)
    }
}

/// One generation run: a model, an emission sink and the cache shared by every compiler
/// component for the duration of the run.
///
/// Runs are independent. Nothing compiled in one run is visible to another.
pub struct CodegenRun<'a> {
    model: &'a ServiceModel,
    settings: CodegenSettings,
    cache: GenerationCache,
    sink: &'a mut dyn EmissionSink,
}

impl std::fmt::Debug for CodegenRun<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodegenRun")
            .field("service", &self.model.service().name)
            .field("settings", &self.settings)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl<'a> CodegenRun<'a> {
    /// Creates a run with default settings.
    pub fn new(model: &'a ServiceModel, sink: &'a mut dyn EmissionSink) -> Self {
        CodegenRun {
            model,
            settings: CodegenSettings::default(),
            cache: GenerationCache::new(model),
            sink,
        }
    }

    /// Replaces the settings of the run.
    pub fn with_settings(mut self, settings: CodegenSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Everything compiled so far.
    pub fn cache(&self) -> &GenerationCache {
        &self.cache
    }

    /// Compiles a single operation, reusing everything compiled earlier in the run.
    pub fn compile_operation(&mut self, name: &str) -> Result<Arc<ClientMethod>, CompileError> {
        let mut ctx = Context::new(self.model, &self.settings, &mut self.cache, &mut *self.sink);
        compile_operation(&mut ctx, name)
    }

    /// Compiles every operation of the model in name order.
    ///
    /// A failing operation is recorded in the report and does not stop the run.
    pub fn run(&mut self) -> GenerationReport {
        let mut names: Vec<&str> = self.model.operations().map(|o| o.name.as_str()).collect();
        names.sort_unstable();
        tracing::debug!(
            service = %self.model.service().name,
            operations = names.len(),
            "starting generation run"
        );
        let mut report = GenerationReport::default();
        for name in names {
            match self.compile_operation(name) {
                Ok(method) => {
                    report.methods.insert(name.to_string(), method);
                }
                Err(error) => {
                    tracing::warn!(operation = name, error = %error, "failed to compile operation");
                    report.failures.push(OperationFailure {
                        operation: name.to_string(),
                        error,
                    });
                }
            }
        }
        tracing::debug!(
            compiled = report.methods.len(),
            failed = report.failures.len(),
            shapes = self.cache.shape_count(),
            "finished generation run"
        );
        report
    }
}
