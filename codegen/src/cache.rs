/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Per-run memoization of compiled shapes and operations.

use crate::emit::{Artifact, EmissionSink, WriteOutcome};
use crate::enum_gen::EnumArtifact;
use crate::error::{EmitError, ModelError};
use crate::model::ServiceModel;
use crate::naming::{Identifier, NameResolver};
use crate::operation::ClientMethod;
use crate::plan::StructurePlan;
use crate::settings::CodegenSettings;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything compiled so far in one generation run.
///
/// The cache is created empty for each run and only grows: a shape is compiled on its first
/// visit and every later visit, from any operation, observes the same result.
#[derive(Debug)]
pub struct GenerationCache {
    names: NameResolver,
    enums: HashMap<String, Arc<EnumArtifact>>,
    structures: HashMap<String, Arc<StructurePlan>>,
    operations: HashMap<String, Arc<ClientMethod>>,
    visiting: Vec<String>,
    hits: usize,
}

impl GenerationCache {
    /// Creates an empty cache for a run over `model`.
    pub fn new(model: &ServiceModel) -> Self {
        GenerationCache {
            names: NameResolver::new(model),
            enums: HashMap::new(),
            structures: HashMap::new(),
            operations: HashMap::new(),
            visiting: Vec::new(),
            hits: 0,
        }
    }

    /// The run's name resolver.
    pub fn names(&mut self) -> &mut NameResolver {
        &mut self.names
    }

    /// Number of lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Number of compiled shapes.
    pub fn shape_count(&self) -> usize {
        self.enums.len() + self.structures.len()
    }

    pub(crate) fn enum_artifact(&mut self, shape: &str) -> Option<Arc<EnumArtifact>> {
        let hit = self.enums.get(shape).cloned();
        self.record(shape, hit.is_some());
        hit
    }

    pub(crate) fn insert_enum(&mut self, artifact: Arc<EnumArtifact>) {
        self.enums.insert(artifact.shape().to_string(), artifact);
    }

    pub(crate) fn structure(&mut self, shape: &str) -> Option<Arc<StructurePlan>> {
        let hit = self.structures.get(shape).cloned();
        self.record(shape, hit.is_some());
        hit
    }

    pub(crate) fn insert_structure(&mut self, plan: Arc<StructurePlan>) {
        self.structures.insert(plan.shape.clone(), plan);
    }

    pub(crate) fn operation(&mut self, name: &str) -> Option<Arc<ClientMethod>> {
        let hit = self.operations.get(name).cloned();
        self.record(name, hit.is_some());
        hit
    }

    pub(crate) fn insert_operation(&mut self, method: Arc<ClientMethod>) {
        self.operations.insert(method.name().to_string(), method);
    }

    fn record(&mut self, key: &str, hit: bool) {
        if hit {
            self.hits += 1;
            tracing::trace!(shape = key, "generation cache hit");
        }
    }

    /// Marks `shape` as being compiled. Fails if it is already on the stack.
    pub(crate) fn enter(&mut self, shape: &str) -> Result<(), ModelError> {
        if self.visiting.iter().any(|s| s == shape) {
            return Err(ModelError::RecursiveShape(shape.to_string()));
        }
        self.visiting.push(shape.to_string());
        Ok(())
    }

    pub(crate) fn leave(&mut self, shape: &str) {
        if let Some(pos) = self.visiting.iter().rposition(|s| s == shape) {
            self.visiting.remove(pos);
        }
    }
}

/// State borrowed by every compiler component during a run.
pub struct Context<'a> {
    /// The model being compiled
    pub model: &'a ServiceModel,
    /// Settings of the run
    pub settings: &'a CodegenSettings,
    /// Artifacts compiled so far
    pub cache: &'a mut GenerationCache,
    /// Destination of rendered artifacts
    pub sink: &'a mut dyn EmissionSink,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("service", &self.model.service().name)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<'a> Context<'a> {
    /// Bundles the state of a run.
    pub fn new(
        model: &'a ServiceModel,
        settings: &'a CodegenSettings,
        cache: &'a mut GenerationCache,
        sink: &'a mut dyn EmissionSink,
    ) -> Self {
        Context {
            model,
            settings,
            cache,
            sink,
        }
    }

    pub(crate) fn emit(&mut self, ident: Identifier, source: String) -> Result<(), EmitError> {
        let artifact = Artifact::new(self.settings.service_module.clone(), ident, source);
        match self.sink.write(&artifact)? {
            WriteOutcome::Written => tracing::debug!(artifact = %artifact.ident(), "emitted"),
            WriteOutcome::Unchanged => {
                tracing::trace!(artifact = %artifact.ident(), "artifact unchanged")
            }
        }
        Ok(())
    }
}
