/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Stable, collision-free Rust identifiers for shapes and operations.

use crate::model::{ServiceModel, Shape, ShapeKind};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Module a generated artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleKind {
    /// Operation inputs
    Input,
    /// Operation outputs
    Output,
    /// Structures nested in inputs or outputs
    Types,
    /// Enum shapes
    Enums,
    /// Client operation methods
    Client,
}

impl ModuleKind {
    /// Directory name of the module.
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleKind::Input => "input",
            ModuleKind::Output => "output",
            ModuleKind::Types => "types",
            ModuleKind::Enums => "enums",
            ModuleKind::Client => "client",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of a generated item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// Module the item is generated into
    pub module: ModuleKind,
    /// Rust name of the item
    pub name: String,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.name)
    }
}

/// Type names that would shadow the prelude or the runtime in generated code.
const RESERVED_TYPE_NAMES: &[&str] = &[
    "Box", "Clone", "Default", "Err", "Error", "None", "Object", "Ok", "Option", "Result",
    "Self", "Some", "String", "Vec",
];

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// Keywords that cannot be used as raw identifiers.
const NON_RAW_KEYWORDS: &[&str] = &["crate", "self", "super", "Self"];

/// Converts a shape name to PascalCase.
pub fn to_pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for segment in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Converts a member or operation name to snake_case.
///
/// Acronyms stay together: `ACLPolicy` becomes `acl_policy` and `MFA` becomes `mfa`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 && !out.is_empty() && !out.ends_with('_') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    let trimmed = out.trim_end_matches('_');
    let mut out = trimmed.to_string();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// File name, without extension, of the artifact named `name`.
pub fn file_stem(name: &str) -> String {
    to_snake_case(name.trim_start_matches("r#"))
}

/// Returns a field or method identifier for `name`, escaping keywords.
pub fn member_ident(name: &str) -> String {
    let snake = to_snake_case(name);
    if NON_RAW_KEYWORDS.contains(&snake.as_str()) {
        format!("{}_", snake)
    } else if KEYWORDS.contains(&snake.as_str()) {
        format!("r#{}", snake)
    } else {
        snake
    }
}

/// Maps shapes and operations to identifiers.
///
/// Lookups are memoized: resolving the same shape twice yields the same identifier, and two
/// different shapes never share one.
#[derive(Debug, Default)]
pub struct NameResolver {
    roles: HashMap<String, ModuleKind>,
    shapes: HashMap<String, Identifier>,
    operations: HashMap<String, Identifier>,
    taken: HashSet<(ModuleKind, String)>,
}

impl NameResolver {
    /// Creates a resolver for `model`. Shapes used as an operation input live in `input`,
    /// otherwise shapes used as an operation output live in `output`.
    pub fn new(model: &ServiceModel) -> Self {
        let mut roles = HashMap::new();
        for operation in model.operations() {
            roles.insert(operation.input.clone(), ModuleKind::Input);
        }
        for operation in model.operations() {
            if let Some(output) = &operation.output {
                roles.entry(output.clone()).or_insert(ModuleKind::Output);
            }
        }
        NameResolver {
            roles,
            ..Default::default()
        }
    }

    /// Returns the identifier of `shape`.
    pub fn resolve(&mut self, shape: &Shape) -> Identifier {
        if let Some(ident) = self.shapes.get(&shape.name) {
            return ident.clone();
        }
        let module = match (&shape.kind, self.roles.get(&shape.name)) {
            (ShapeKind::Enum(_), _) => ModuleKind::Enums,
            (_, Some(role)) => *role,
            _ => ModuleKind::Types,
        };
        let mut base = to_pascal_case(&shape.name);
        if RESERVED_TYPE_NAMES.contains(&base.as_str()) {
            base = format!("Aws{}", base);
        }
        let ident = self.claim(module, base);
        self.shapes.insert(shape.name.clone(), ident.clone());
        ident
    }

    /// Returns the identifier of the client method for operation `name`.
    pub fn operation(&mut self, name: &str) -> Identifier {
        if let Some(ident) = self.operations.get(name) {
            return ident.clone();
        }
        let ident = self.claim(ModuleKind::Client, member_ident(name));
        self.operations.insert(name.to_string(), ident.clone());
        ident
    }

    /// Reserves `base`, or the first free suffixed variant of it, in `module`.
    ///
    /// Names are compared by file stem, so `ACLPolicy` and `AclPolicy` cannot both claim
    /// `acl_policy.rs`.
    fn claim(&mut self, module: ModuleKind, base: String) -> Identifier {
        let mut name = base.clone();
        let mut suffix = 2;
        while !self.taken.insert((module, file_stem(&name))) {
            name = format!("{}{}", base, suffix);
            suffix += 1;
        }
        Identifier { module, name }
    }
}

#[cfg(test)]
mod test {
    use super::{
        file_stem, member_ident, to_pascal_case, to_snake_case, ModuleKind, NameResolver,
    };
    use crate::model::ServiceModel;

    fn model() -> ServiceModel {
        ServiceModel::from_json(
            r#"{"metadata": {"protocol": "rest-xml", "apiVersion": "1"},
                "operations": {
                    "GetObject": {"input": {"shape": "GetObjectRequest"}, "output": {"shape": "GetObjectOutput"}},
                    "CopyObject": {"input": {"shape": "CopyObjectRequest"}, "output": {"shape": "GetObjectRequest"}}
                },
                "shapes": {
                    "GetObjectRequest": {"type": "structure", "members": {}},
                    "GetObjectOutput": {"type": "structure", "members": {}},
                    "CopyObjectRequest": {"type": "structure", "members": {}},
                    "Object": {"type": "structure", "members": {}},
                    "object": {"type": "structure", "members": {}},
                    "ACLPolicy": {"type": "structure", "members": {}},
                    "AclPolicy": {"type": "structure", "members": {}},
                    "StorageClass": {"type": "string", "enum": ["STANDARD"]}
                }}"#,
        )
        .unwrap()
    }

    #[test]
    fn case_conversion() {
        assert_eq!(to_pascal_case("get-object_request"), "GetObjectRequest");
        assert_eq!(to_pascal_case("ObjectList"), "ObjectList");
        assert_eq!(to_snake_case("ACLPolicy"), "acl_policy");
        assert_eq!(to_snake_case("MFA"), "mfa");
        assert_eq!(to_snake_case("VersionId"), "version_id");
        assert_eq!(to_snake_case("SSECustomerKeyMD5"), "sse_customer_key_md5");
        assert_eq!(to_snake_case("ListObjectsV2"), "list_objects_v2");
        assert_eq!(member_ident("Type"), "r#type");
        assert_eq!(member_ident("Self"), "self_");
    }

    #[test]
    fn modules_follow_roles() {
        let model = model();
        let mut resolver = NameResolver::new(&model);
        let ident = |resolver: &mut NameResolver, name: &str| {
            resolver.resolve(model.shape(name).unwrap())
        };
        assert_eq!(ident(&mut resolver, "GetObjectRequest").module, ModuleKind::Input);
        assert_eq!(ident(&mut resolver, "GetObjectOutput").module, ModuleKind::Output);
        assert_eq!(ident(&mut resolver, "Object").module, ModuleKind::Types);
        assert_eq!(ident(&mut resolver, "StorageClass").module, ModuleKind::Enums);
    }

    #[test]
    fn reserved_and_colliding_names() {
        let model = model();
        let mut resolver = NameResolver::new(&model);
        let first = resolver.resolve(model.shape("Object").unwrap());
        let second = resolver.resolve(model.shape("object").unwrap());
        assert_eq!(first.name, "AwsObject");
        assert_eq!(second.name, "AwsObject2");
        assert_eq!(resolver.resolve(model.shape("Object").unwrap()), first);
        assert_eq!(first.to_string(), "types::AwsObject");
    }

    #[test]
    fn names_differing_in_case_get_distinct_files() {
        let model = model();
        let mut resolver = NameResolver::new(&model);
        let upper = resolver.resolve(model.shape("ACLPolicy").unwrap());
        let lower = resolver.resolve(model.shape("AclPolicy").unwrap());
        assert_eq!(upper.name, "ACLPolicy");
        assert_eq!(lower.name, "AclPolicy2");
        assert_eq!(file_stem(&upper.name), "acl_policy");
        assert_eq!(file_stem(&lower.name), "acl_policy2");
        assert_eq!(file_stem("r#type"), "type");
    }

    #[test]
    fn operations_are_snake_case_methods() {
        let mut resolver = NameResolver::new(&model());
        let ident = resolver.operation("GetObject");
        assert_eq!(ident.module, ModuleKind::Client);
        assert_eq!(ident.name, "get_object");
        assert_eq!(resolver.operation("GetObject"), ident);
    }
}
