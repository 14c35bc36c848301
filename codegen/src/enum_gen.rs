/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Compilation of enum shapes into closed sets of named constants.

use crate::cache::Context;
use crate::error::{CompileError, ModelError};
use crate::model::{Shape, ShapeKind};
use crate::naming::Identifier;
use crate::render;
use crate::settings::EnumCollisionPolicy;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Returns the constant name for an enum value.
///
/// A `_` is inserted between a lowercase letter and a following uppercase letter or digit, the
/// result is uppercased, and every run of characters outside `[A-Z0-9 ]` becomes a single `_`.
///
/// ```
/// use awsgen_codegen::enum_gen::canonicalize_name;
/// assert_eq!(canonicalize_name("ObjectLockLegalHoldStatus"), "OBJECT_LOCK_LEGAL_HOLD_STATUS");
/// assert_eq!(canonicalize_name("us-east-1"), "US_EAST_1");
/// ```
pub fn canonicalize_name(value: &str) -> String {
    let mut split = String::with_capacity(value.len() + 4);
    let mut prev: Option<char> = None;
    for c in value.chars() {
        if let Some(p) = prev {
            if p.is_ascii_lowercase() && (c.is_ascii_uppercase() || c.is_ascii_digit()) {
                split.push('_');
            }
        }
        split.push(c);
        prev = Some(c);
    }

    let mut out = String::with_capacity(split.len());
    let mut in_run = false;
    for c in split.chars().map(|c| c.to_ascii_uppercase()) {
        if c.is_ascii_uppercase() || c.is_ascii_digit() || c == ' ' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// A named constant of an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    /// Canonicalized constant name
    pub name: String,
    /// The literal value from the model
    pub value: String,
}

/// A compiled enum: constants ordered by name plus a membership test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumArtifact {
    ident: Identifier,
    shape: String,
    constants: Vec<EnumConstant>,
}

impl EnumArtifact {
    /// Where the enum is emitted.
    pub fn ident(&self) -> &Identifier {
        &self.ident
    }

    /// Name of the enum shape.
    pub fn shape(&self) -> &str {
        &self.shape
    }

    /// Constants in lexicographic order of their names.
    pub fn constants(&self) -> &[EnumConstant] {
        &self.constants
    }

    /// Returns true if `value` is one of the enum's values.
    pub fn exists(&self, value: &str) -> bool {
        self.constants.iter().any(|c| c.value == value)
    }
}

/// Compiles `shape`, or returns the artifact compiled earlier in this run.
pub fn compile_enum(ctx: &mut Context<'_>, shape: &Shape) -> Result<Arc<EnumArtifact>, CompileError> {
    let ShapeKind::Enum(values) = &shape.kind else {
        return Err(ModelError::WrongShapeKind {
            shape: shape.name.clone(),
            expected: "enum",
            found: shape.kind.name(),
        }
        .into());
    };
    if let Some(artifact) = ctx.cache.enum_artifact(&shape.name) {
        return Ok(artifact);
    }

    let mut constants: BTreeMap<String, String> = BTreeMap::new();
    for value in values {
        match constants.entry(canonicalize_name(value)) {
            Entry::Vacant(entry) => {
                entry.insert(value.clone());
            }
            Entry::Occupied(mut entry) => match ctx.settings.enum_collision {
                EnumCollisionPolicy::Reject => {
                    return Err(ModelError::EnumCollision {
                        shape: shape.name.clone(),
                        constant: entry.key().clone(),
                        first: entry.get().clone(),
                        second: value.clone(),
                    }
                    .into())
                }
                EnumCollisionPolicy::Overwrite => {
                    tracing::warn!(
                        shape = %shape.name,
                        constant = %entry.key(),
                        dropped = %entry.get(),
                        kept = %value,
                        "enum values collide"
                    );
                    entry.insert(value.clone());
                }
            },
        }
    }

    let artifact = Arc::new(EnumArtifact {
        ident: ctx.cache.names().resolve(shape),
        shape: shape.name.clone(),
        constants: constants
            .into_iter()
            .map(|(name, value)| EnumConstant { name, value })
            .collect(),
    });
    ctx.emit(artifact.ident.clone(), render::render_enum(&artifact))?;
    ctx.cache.insert_enum(artifact.clone());
    Ok(artifact)
}

#[cfg(test)]
mod test {
    use super::{canonicalize_name, compile_enum};
    use crate::cache::{Context, GenerationCache};
    use crate::emit::MemorySink;
    use crate::error::{CompileError, ModelError};
    use crate::model::ServiceModel;
    use crate::naming::ModuleKind;
    use crate::settings::{CodegenSettings, EnumCollisionPolicy};
    use pretty_assertions::assert_eq;

    fn model() -> ServiceModel {
        ServiceModel::from_json(
            r#"{"metadata": {"protocol": "rest-xml", "apiVersion": "1"},
                "shapes": {
                    "Letters": {"type": "string", "enum": ["B", "a", "AA"]},
                    "Region": {"type": "string", "enum": ["us-east-1", "eu-west-1", "EU"]},
                    "Clash": {"type": "string", "enum": ["us-east-1", "US_EAST_1", "other"]}
                }}"#,
        )
        .unwrap()
    }

    #[test]
    fn canonicalization() {
        assert_eq!(
            canonicalize_name("ObjectLockLegalHoldStatus"),
            "OBJECT_LOCK_LEGAL_HOLD_STATUS"
        );
        assert_eq!(canonicalize_name("us-east-1"), "US_EAST_1");
        assert_eq!(canonicalize_name("s3:ObjectCreated:*"), "S_3_OBJECT_CREATED_");
        assert_eq!(canonicalize_name("ml.m5.large"), "ML_M_5_LARGE");
        assert_eq!(canonicalize_name("a--b"), "A_B");
        assert_eq!(canonicalize_name("Two Words"), "TWO WORDS");
        assert_eq!(canonicalize_name("GLACIER_IR"), "GLACIER_IR");
    }

    #[test]
    fn constants_are_sorted_by_name() {
        let model = model();
        let settings = CodegenSettings::default();
        let mut cache = GenerationCache::new(&model);
        let mut sink = MemorySink::new();
        let mut ctx = Context::new(&model, &settings, &mut cache, &mut sink);

        let letters = compile_enum(&mut ctx, model.shape("Letters").unwrap()).unwrap();
        let names: Vec<_> = letters.constants().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["A", "AA", "B"]);
        assert!(letters.exists("a"));
        assert!(!letters.exists("A"));

        let region = compile_enum(&mut ctx, model.shape("Region").unwrap()).unwrap();
        let names: Vec<_> = region.constants().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["EU", "EU_WEST_1", "US_EAST_1"]);
        assert!(region.exists("us-east-1"));
        assert!(!region.exists("US_EAST_1"));
    }

    #[test]
    fn compiled_once_per_run() {
        let model = model();
        let settings = CodegenSettings::default();
        let mut cache = GenerationCache::new(&model);
        let mut sink = MemorySink::new();
        let mut ctx = Context::new(&model, &settings, &mut cache, &mut sink);
        let first = compile_enum(&mut ctx, model.shape("Letters").unwrap()).unwrap();
        let second = compile_enum(&mut ctx, model.shape("Letters").unwrap()).unwrap();
        assert!(std::sync::Arc::ptr_eq(&first, &second));
        assert_eq!(cache.hits(), 1);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.attempts(first.ident()), 1);
        assert_eq!(first.ident().module, ModuleKind::Enums);
    }

    #[test]
    fn collisions_are_rejected_by_default() {
        let model = model();
        let settings = CodegenSettings::default();
        let mut cache = GenerationCache::new(&model);
        let mut sink = MemorySink::new();
        let mut ctx = Context::new(&model, &settings, &mut cache, &mut sink);
        let err = compile_enum(&mut ctx, model.shape("Clash").unwrap()).unwrap_err();
        match err {
            CompileError::Model(ModelError::EnumCollision {
                constant,
                first,
                second,
                ..
            }) => {
                assert_eq!(constant, "US_EAST_1");
                assert_eq!(first, "us-east-1");
                assert_eq!(second, "US_EAST_1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn collisions_can_overwrite() {
        let model = model();
        let settings = CodegenSettings {
            enum_collision: EnumCollisionPolicy::Overwrite,
            ..Default::default()
        };
        let mut cache = GenerationCache::new(&model);
        let mut sink = MemorySink::new();
        let mut ctx = Context::new(&model, &settings, &mut cache, &mut sink);
        let clash = compile_enum(&mut ctx, model.shape("Clash").unwrap()).unwrap();
        assert_eq!(clash.constants().len(), 2);
        assert!(clash.exists("US_EAST_1"));
        assert!(!clash.exists("us-east-1"));
        assert!(clash.exists("other"));
    }
}
