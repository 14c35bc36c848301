/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Settings of a generation run.

use serde::Deserialize;

/// What to do when two enum values canonicalize to the same constant name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumCollisionPolicy {
    /// Fail compilation of the enum with `ModelError::EnumCollision`.
    #[default]
    Reject,
    /// Keep the value declared last, dropping the earlier one from the enum.
    Overwrite,
}

/// Settings of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CodegenSettings {
    /// Name of the generated crate module that emitted artifacts are placed under.
    pub service_module: String,
    /// Handling of enum values that share a constant name.
    pub enum_collision: EnumCollisionPolicy,
}

impl Default for CodegenSettings {
    fn default() -> Self {
        CodegenSettings {
            service_module: "service".to_string(),
            enum_collision: EnumCollisionPolicy::default(),
        }
    }
}

impl CodegenSettings {
    /// Reads settings from JSON. Missing fields take their defaults.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

#[cfg(test)]
mod test {
    use super::{CodegenSettings, EnumCollisionPolicy};

    #[test]
    fn defaults() {
        let settings = CodegenSettings::from_json("{}").unwrap();
        assert_eq!(settings, CodegenSettings::default());
        assert_eq!(settings.enum_collision, EnumCollisionPolicy::Reject);
        assert_eq!(settings.service_module, "service");
    }

    #[test]
    fn overrides() {
        let settings =
            CodegenSettings::from_json(r#"{"service_module": "s3", "enum_collision": "overwrite"}"#)
                .unwrap();
        assert_eq!(settings.service_module, "s3");
        assert_eq!(settings.enum_collision, EnumCollisionPolicy::Overwrite);
    }
}
