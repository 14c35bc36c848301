/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Compiled structure plans.
//!
//! A plan is a resolved view of a structure shape: every member carries its wire placement and
//! a compiled target, so serializers, deserializers and validation never look shapes up in the
//! model again. Structure plans are shared: each structure shape is compiled once per run.

use crate::cache::Context;
use crate::enum_gen::{compile_enum, EnumArtifact};
use crate::error::CompileError;
use crate::model::{Location, ScalarKind, Shape, ShapeKind, Structure, XmlNamespace};
use crate::naming::{member_ident, Identifier};
use crate::render;
use awsgen_types::date_time::Format;
use std::sync::Arc;

/// Compiled target of a member, list entry or map value.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetPlan {
    /// A scalar value
    Scalar {
        /// Value kind
        kind: ScalarKind,
        /// Format override from the member or the shape
        timestamp_format: Option<Format>,
        /// Blob read from a content source
        streaming: bool,
    },
    /// A string checked against an enum
    Enum(Arc<EnumArtifact>),
    /// A list
    List(Box<ListPlan>),
    /// A map with string keys
    Map(Box<MapPlan>),
    /// A nested structure
    Structure(Arc<StructurePlan>),
}

impl TargetPlan {
    /// Short name of the expected value kind, for error messages.
    pub fn expected(&self) -> &'static str {
        match self {
            TargetPlan::Scalar { kind, .. } => kind.name(),
            TargetPlan::Enum(_) => "enum string",
            TargetPlan::List(_) => "list",
            TargetPlan::Map(_) => "map",
            TargetPlan::Structure(_) => "structure",
        }
    }

    pub(crate) fn timestamp_format(&self) -> Option<Format> {
        match self {
            TargetPlan::Scalar {
                timestamp_format, ..
            } => *timestamp_format,
            _ => None,
        }
    }
}

/// Compiled list shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPlan {
    /// List shape name
    pub shape: String,
    /// Target of the entries
    pub member: TargetPlan,
    /// Element name of list entries, `member` when unset
    pub member_name: Option<String>,
    /// Entries are written without a wrapping element or `.member` segment
    pub flattened: bool,
}

/// Compiled map shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPlan {
    /// Map shape name
    pub shape: String,
    /// Target of the keys
    pub key: TargetPlan,
    /// Target of the values
    pub value: TargetPlan,
    /// Element name of entry keys, `key` when unset
    pub key_name: Option<String>,
    /// Element name of entry values, `value` when unset
    pub value_name: Option<String>,
    /// Entries are written without a wrapping element or `.entry` segment
    pub flattened: bool,
}

impl MapPlan {
    /// Element name of entry keys.
    pub fn key_name(&self) -> &str {
        self.key_name.as_deref().unwrap_or("key")
    }

    /// Element name of entry values.
    pub fn value_name(&self) -> &str {
        self.value_name.as_deref().unwrap_or("value")
    }
}

/// Compiled structure member.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberPlan {
    /// Member name in the model
    pub name: String,
    /// Rust field identifier
    pub field: String,
    /// Key, element, header or label name on the wire
    pub wire_name: String,
    /// Checked for presence before serialization
    pub required: bool,
    /// Wire location
    pub location: Location,
    /// Written as an attribute of the enclosing element
    pub xml_attribute: bool,
    /// Namespace declared on the member's element
    pub xml_namespace: Option<XmlNamespace>,
    /// Compiled target shape
    pub target: TargetPlan,
}

/// Compiled structure shape, shared by validation, serialization and deserialization.
#[derive(Debug, Clone, PartialEq)]
pub struct StructurePlan {
    /// Structure shape name
    pub shape: String,
    /// Where the structure is emitted
    pub ident: Identifier,
    /// Members in declaration order
    pub members: Vec<MemberPlan>,
    /// Root element name of XML bodies
    pub location_name: Option<String>,
    /// Namespace declared on the root element
    pub xml_namespace: Option<XmlNamespace>,
    payload: Option<usize>,
}

impl StructurePlan {
    /// Looks up a member by its model name.
    pub fn member(&self, name: &str) -> Option<&MemberPlan> {
        self.members.iter().find(|m| m.name == name)
    }

    /// The member bound to the whole body, if any.
    pub fn payload_member(&self) -> Option<&MemberPlan> {
        self.payload.map(|i| &self.members[i])
    }

    /// Members placed at `location`, in declaration order.
    pub fn members_at(&self, location: Location) -> impl Iterator<Item = &MemberPlan> {
        self.members.iter().filter(move |m| m.location == location)
    }
}

/// Compiles the structure shape `name`, or returns the plan compiled earlier in this run.
pub fn compile_structure(
    ctx: &mut Context<'_>,
    name: &str,
) -> Result<Arc<StructurePlan>, CompileError> {
    if let Some(plan) = ctx.cache.structure(name) {
        return Ok(plan);
    }
    let model = ctx.model;
    let shape = model.shape(name)?;
    let structure = shape.as_structure()?;

    ctx.cache.enter(name)?;
    let plan = build_structure(ctx, shape, structure);
    ctx.cache.leave(name);
    let plan = Arc::new(plan?);

    ctx.emit(plan.ident.clone(), render::render_structure(&plan))?;
    ctx.cache.insert_structure(plan.clone());
    Ok(plan)
}

fn build_structure(
    ctx: &mut Context<'_>,
    shape: &Shape,
    structure: &Structure,
) -> Result<StructurePlan, CompileError> {
    tracing::trace!(shape = %shape.name, "compiling structure");
    let model = ctx.model;
    let ident = ctx.cache.names().resolve(shape);
    let mut members = Vec::with_capacity(structure.members.len());
    let mut payload = None;
    for member in &structure.members {
        let target_shape = model.shape(&member.target)?;
        let target =
            compile_target(ctx, target_shape, member.timestamp_format, member.flattened)?;
        if member.location == Location::Payload {
            payload = Some(members.len());
        }
        // Flattened list entries take the list member's name unless the member renames them.
        let wire_name = match (&member.location_name, &target) {
            (None, TargetPlan::List(list)) if list.flattened => list
                .member_name
                .clone()
                .unwrap_or_else(|| member.name.clone()),
            _ => member.wire_name().to_string(),
        };
        members.push(MemberPlan {
            name: member.name.clone(),
            field: member_ident(&member.name),
            wire_name,
            required: member.required,
            location: member.location,
            xml_attribute: member.xml_attribute,
            xml_namespace: member.xml_namespace.clone(),
            target,
        });
    }
    Ok(StructurePlan {
        shape: shape.name.clone(),
        ident,
        members,
        location_name: shape.location_name.clone(),
        xml_namespace: shape.xml_namespace.clone(),
        payload,
    })
}

fn compile_target(
    ctx: &mut Context<'_>,
    shape: &Shape,
    timestamp_format: Option<Format>,
    flattened: bool,
) -> Result<TargetPlan, CompileError> {
    Ok(match &shape.kind {
        ShapeKind::Scalar(kind) => TargetPlan::Scalar {
            kind: *kind,
            timestamp_format: timestamp_format.or(shape.timestamp_format),
            streaming: shape.streaming,
        },
        ShapeKind::Enum(_) => TargetPlan::Enum(compile_enum(ctx, shape)?),
        ShapeKind::Structure(_) => TargetPlan::Structure(compile_structure(ctx, &shape.name)?),
        ShapeKind::List {
            member,
            flattened: list_flattened,
        } => {
            ctx.cache.enter(&shape.name)?;
            let entry = compile_ref(ctx, &member.target);
            ctx.cache.leave(&shape.name);
            TargetPlan::List(Box::new(ListPlan {
                shape: shape.name.clone(),
                member: entry?,
                member_name: member.location_name.clone(),
                flattened: flattened || *list_flattened,
            }))
        }
        ShapeKind::Map {
            key,
            value,
            flattened: map_flattened,
        } => {
            ctx.cache.enter(&shape.name)?;
            let entry = compile_ref(ctx, &key.target)
                .and_then(|key| Ok((key, compile_ref(ctx, &value.target)?)));
            ctx.cache.leave(&shape.name);
            let (key_target, value_target) = entry?;
            TargetPlan::Map(Box::new(MapPlan {
                shape: shape.name.clone(),
                key: key_target,
                value: value_target,
                key_name: key.location_name.clone(),
                value_name: value.location_name.clone(),
                flattened: flattened || *map_flattened,
            }))
        }
    })
}

fn compile_ref(ctx: &mut Context<'_>, target: &str) -> Result<TargetPlan, CompileError> {
    let model = ctx.model;
    compile_target(ctx, model.shape(target)?, None, false)
}
