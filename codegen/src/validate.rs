/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Checks run on an operation input before any request is built.

use crate::error::ValidationError;
use crate::plan::{StructurePlan, TargetPlan};
use crate::value::{StructValue, Value};

/// Validates `value` against `plan`.
///
/// Members are checked depth-first in declaration order and the first violation is returned:
/// required members must be present and enum members must hold one of the enum's values.
pub fn validate(plan: &StructurePlan, value: &StructValue) -> Result<(), ValidationError> {
    for member in &plan.members {
        match value.get(&member.name) {
            None if member.required => {
                return Err(ValidationError::MissingRequiredField {
                    field: member.name.clone(),
                    structure: plan.shape.clone(),
                })
            }
            None => {}
            Some(field) => validate_value(&member.name, &member.target, field)?,
        }
    }
    Ok(())
}

fn validate_value(field: &str, target: &TargetPlan, value: &Value) -> Result<(), ValidationError> {
    match (target, value) {
        (TargetPlan::Enum(artifact), Value::String(s)) if !artifact.exists(s) => {
            Err(ValidationError::InvalidEnumValue {
                field: field.to_string(),
                value: s.clone(),
                enum_name: artifact.shape().to_string(),
            })
        }
        (TargetPlan::Structure(plan), Value::Structure(nested)) => validate(plan, nested),
        (TargetPlan::List(list), Value::List(items)) => items
            .iter()
            .try_for_each(|item| validate_value(field, &list.member, item)),
        (TargetPlan::Map(map), Value::Map(entries)) => {
            for (key, entry) in entries {
                validate_value(field, &map.key, &Value::String(key.clone()))?;
                validate_value(field, &map.value, entry)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
