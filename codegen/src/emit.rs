/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Destinations for generated artifacts.
//!
//! A sink receives every artifact of a run. Writing the same artifact twice is a no-op; writing
//! different content under an identifier that was already written is a conflict.

use crate::error::EmitError;
use crate::naming::{file_stem, Identifier, ModuleKind};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A generated source item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    service_module: String,
    ident: Identifier,
    source: String,
}

impl Artifact {
    /// Creates an artifact emitted under `service_module`.
    pub fn new(service_module: impl Into<String>, ident: Identifier, source: String) -> Self {
        Artifact {
            service_module: service_module.into(),
            ident,
            source,
        }
    }

    /// Module and name of the artifact.
    pub fn ident(&self) -> &Identifier {
        &self.ident
    }

    /// Rendered Rust source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Path of the artifact relative to the output root,
    /// e.g. `s3/enums/storage_class.rs`.
    pub fn relative_path(&self) -> PathBuf {
        let stem = file_stem(&self.ident.name);
        Path::new(&self.service_module)
            .join(self.ident.module.as_str())
            .join(format!("{}.rs", stem))
    }
}

/// Outcome of a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The artifact was written
    Written,
    /// Identical content was already present
    Unchanged,
}

/// Receives generated artifacts.
pub trait EmissionSink {
    /// Writes `artifact`, or confirms that identical content is already in place.
    fn write(&mut self, artifact: &Artifact) -> Result<WriteOutcome, EmitError>;
}

fn conflict(ident: &Identifier) -> EmitError {
    EmitError::Conflict {
        module: ident.module.to_string(),
        name: ident.name.clone(),
    }
}

/// Keeps artifacts in memory, grouped by module.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: IndexMap<Identifier, Artifact>,
    attempts: HashMap<Identifier, usize>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All artifacts in first-write order.
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }

    /// Artifacts of one module in first-write order.
    pub fn module(&self, module: ModuleKind) -> impl Iterator<Item = &Artifact> {
        self.artifacts
            .values()
            .filter(move |artifact| artifact.ident.module == module)
    }

    /// Looks up an artifact by module and name.
    pub fn get(&self, module: ModuleKind, name: &str) -> Option<&Artifact> {
        self.artifacts.get(&Identifier {
            module,
            name: name.to_string(),
        })
    }

    /// Number of distinct artifacts written.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Returns true if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// How many times an artifact was handed to the sink, including no-op writes.
    pub fn attempts(&self, ident: &Identifier) -> usize {
        self.attempts.get(ident).copied().unwrap_or(0)
    }
}

impl EmissionSink for MemorySink {
    fn write(&mut self, artifact: &Artifact) -> Result<WriteOutcome, EmitError> {
        *self.attempts.entry(artifact.ident.clone()).or_default() += 1;
        match self.artifacts.get(&artifact.ident) {
            Some(existing) if existing.source == artifact.source => Ok(WriteOutcome::Unchanged),
            Some(_) => Err(conflict(&artifact.ident)),
            None => {
                self.artifacts
                    .insert(artifact.ident.clone(), artifact.clone());
                Ok(WriteOutcome::Written)
            }
        }
    }
}

/// Writes artifacts as files below a root directory.
///
/// Files whose content is already up to date are left untouched.
#[derive(Debug)]
pub struct FileSink {
    root: PathBuf,
    written: HashMap<PathBuf, String>,
}

impl FileSink {
    /// Writes below `root`, creating directories as needed.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSink {
            root: root.into(),
            written: HashMap::new(),
        }
    }

    /// Output root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl EmissionSink for FileSink {
    fn write(&mut self, artifact: &Artifact) -> Result<WriteOutcome, EmitError> {
        let path = self.root.join(artifact.relative_path());
        if let Some(existing) = self.written.get(&path) {
            return if *existing == artifact.source {
                Ok(WriteOutcome::Unchanged)
            } else {
                Err(conflict(&artifact.ident))
            };
        }
        let outcome = match fs::read_to_string(&path) {
            Ok(current) if current == artifact.source => WriteOutcome::Unchanged,
            _ => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, &artifact.source)?;
                WriteOutcome::Written
            }
        };
        tracing::trace!(path = %path.display(), ?outcome, "emitted artifact");
        self.written.insert(path, artifact.source.clone());
        Ok(outcome)
    }
}

#[cfg(test)]
mod test {
    use super::{Artifact, EmissionSink, FileSink, MemorySink, WriteOutcome};
    use crate::error::EmitError;
    use crate::naming::{Identifier, ModuleKind};

    fn artifact(name: &str, source: &str) -> Artifact {
        Artifact::new(
            "s3",
            Identifier {
                module: ModuleKind::Enums,
                name: name.to_string(),
            },
            source.to_string(),
        )
    }

    #[test]
    fn memory_sink_is_idempotent() {
        let mut sink = MemorySink::new();
        let first = artifact("StorageClass", "pub struct StorageClass;");
        assert_eq!(sink.write(&first).unwrap(), WriteOutcome::Written);
        assert_eq!(sink.write(&first).unwrap(), WriteOutcome::Unchanged);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.attempts(first.ident()), 2);
        assert!(matches!(
            sink.write(&artifact("StorageClass", "pub struct Other;")),
            Err(EmitError::Conflict { .. })
        ));
        assert_eq!(sink.module(ModuleKind::Enums).count(), 1);
        assert_eq!(sink.module(ModuleKind::Types).count(), 0);
    }

    #[test]
    fn file_sink_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path());
        let first = artifact("StorageClass", "pub struct StorageClass;\n");
        assert_eq!(
            first.relative_path(),
            std::path::Path::new("s3/enums/storage_class.rs")
        );
        assert_eq!(sink.write(&first).unwrap(), WriteOutcome::Written);
        assert_eq!(sink.write(&first).unwrap(), WriteOutcome::Unchanged);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("s3/enums/storage_class.rs")).unwrap(),
            "pub struct StorageClass;\n"
        );

        // A new run over the same output directory finds the file up to date.
        let mut rerun = FileSink::new(dir.path());
        assert_eq!(rerun.write(&first).unwrap(), WriteOutcome::Unchanged);
    }
}
