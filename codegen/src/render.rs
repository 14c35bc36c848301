/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Rust source for compiled artifacts.
//!
//! Rendering is a pure function of the compiled artifact, so rendering the same artifact twice
//! yields identical source and re-emission is a no-op.

use crate::enum_gen::EnumArtifact;
use crate::model::ScalarKind;
use crate::naming::Identifier;
use crate::operation::ClientMethod;
use crate::plan::{StructurePlan, TargetPlan};
use std::collections::HashSet;

const RUNTIME: &str = "awsgen_codegen";

fn path(ident: &Identifier) -> String {
    format!("crate::{}::{}", ident.module, ident.name)
}

/// Makes a canonicalized enum value usable as a constant name.
fn constant_name(name: &str, taken: &mut HashSet<String>) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.chars().all(|c| c == '_') {
        out = format!("VALUE{}", out);
    }
    let base = out.clone();
    let mut suffix = 2;
    while !taken.insert(out.clone()) {
        out = format!("{}_{}", base, suffix);
        suffix += 1;
    }
    out
}

pub(crate) fn render_enum(artifact: &EnumArtifact) -> String {
    let name = &artifact.ident().name;
    let mut taken = HashSet::new();
    let mut out = format!(
        "/// Values of `{}`.\n#[derive(Debug, Clone, Copy, PartialEq, Eq)]\npub struct {};\n\nimpl {} {{\n",
        artifact.shape(),
        name,
        name
    );
    for constant in artifact.constants() {
        out.push_str(&format!(
            "    pub const {}: &'static str = {:?};\n",
            constant_name(&constant.name, &mut taken),
            constant.value
        ));
    }
    let values: Vec<String> = artifact
        .constants()
        .iter()
        .map(|c| format!("{:?}", c.value))
        .collect();
    out.push_str(&format!(
        "\n    /// All values, ordered by constant name.\n    pub fn values() -> &'static [&'static str] {{\n        &[{}]\n    }}\n",
        values.join(", ")
    ));
    let test = if values.is_empty() {
        "false".to_string()
    } else {
        format!("matches!(value, {})", values.join(" | "))
    };
    out.push_str(&format!(
        "\n    pub fn exists(value: &str) -> bool {{\n        {}\n    }}\n}}\n",
        test
    ));
    out
}

fn rust_type(target: &TargetPlan) -> String {
    match target {
        TargetPlan::Scalar {
            streaming: true, ..
        } => "awsgen_http::content::ContentSource".to_string(),
        TargetPlan::Scalar { kind, .. } => match kind {
            ScalarKind::String => "String",
            ScalarKind::Boolean => "bool",
            ScalarKind::Integer => "i64",
            ScalarKind::Float => "f64",
            ScalarKind::Timestamp => "awsgen_types::DateTime",
            ScalarKind::Blob => "awsgen_types::Blob",
        }
        .to_string(),
        TargetPlan::Enum(_) => "String".to_string(),
        TargetPlan::List(list) => format!("Vec<{}>", rust_type(&list.member)),
        TargetPlan::Map(map) => format!("indexmap::IndexMap<String, {}>", rust_type(&map.value)),
        TargetPlan::Structure(plan) => path(&plan.ident),
    }
}

/// Expression converting `expr` of the rendered type of `target` into a runtime value.
fn to_value(target: &TargetPlan, expr: &str, depth: usize) -> String {
    let item = format!("v{}", depth);
    match target {
        TargetPlan::List(list) => format!(
            "{}::Value::List({}.into_iter().map(|{}| {}).collect())",
            RUNTIME,
            expr,
            item,
            to_value(&list.member, &item, depth + 1)
        ),
        TargetPlan::Map(map) => format!(
            "{}::Value::Map({}.into_iter().map(|(k{}, {})| (k{}, {})).collect())",
            RUNTIME,
            expr,
            depth,
            item,
            depth,
            to_value(&map.value, &item, depth + 1)
        ),
        TargetPlan::Structure(_) => format!(
            "{rt}::Value::from({rt}::StructValue::from({}))",
            expr,
            rt = RUNTIME
        ),
        _ => format!("{}::Value::from({})", RUNTIME, expr),
    }
}

pub(crate) fn render_structure(plan: &StructurePlan) -> String {
    let name = &plan.ident.name;
    let mut out = format!(
        "#[derive(Debug, Clone, Default, PartialEq)]\npub struct {} {{\n",
        name
    );
    for member in &plan.members {
        out.push_str(&format!(
            "    pub {}: Option<{}>,\n",
            member.field,
            rust_type(&member.target)
        ));
    }
    out.push_str("}\n");

    let required: Vec<String> = plan
        .members
        .iter()
        .filter(|m| m.required)
        .map(|m| format!("{:?}", m.name))
        .collect();
    if !required.is_empty() {
        out.push_str(&format!(
            "\nimpl {} {{\n    pub const REQUIRED: &'static [&'static str] = &[{}];\n}}\n",
            name,
            required.join(", ")
        ));
    }

    out.push_str(&format!(
        "\nimpl From<{name}> for {rt}::StructValue {{\n    fn from(value: {name}) -> Self {{\n        let mut out = {rt}::StructValue::new({shape:?});\n",
        name = name,
        rt = RUNTIME,
        shape = plan.shape
    ));
    for member in &plan.members {
        out.push_str(&format!(
            "        if let Some(v) = value.{} {{\n            out.set({:?}, {});\n        }}\n",
            member.field,
            member.name,
            to_value(&member.target, "v", 0)
        ));
    }
    out.push_str("        out\n    }\n}\n");
    out
}

pub(crate) fn render_operation(method: &ClientMethod) -> String {
    let ident = &method.ident().name;
    let input = path(&method.input().ident);
    let mut out = format!(
        "/// Invokes `{op}`.\npub fn {ident}(\n    client: &{rt}::Client,\n    input: {input},\n) -> Result<{rt}::OperationOutput, {rt}::InvocationError> {{\n    client.invoke({op:?}, {rt}::StructValue::from(input))\n}}\n",
        op = method.name(),
        ident = ident,
        input = input,
        rt = RUNTIME
    );
    if let Some(pagination) = method.pagination() {
        out.push_str(&format!(
            "\n/// Pages of `{op}`, following `{output}` into `{input_token}`.\npub fn {ident}_pages(\n    client: &{rt}::Client,\n    input: {input},\n) -> Result<{rt}::PaginationStream, {rt}::InvocationError> {{\n    client.paginate({op:?}, {rt}::StructValue::from(input))\n}}\n",
            op = method.name(),
            output = pagination.output_token,
            input_token = pagination.input_token,
            ident = ident.trim_start_matches("r#"),
            input = input,
            rt = RUNTIME
        ));
    }
    out
}
