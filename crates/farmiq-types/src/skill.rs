//! Skill system domain types.
//!
//! Defines the descriptors a skill exposes to callers, the variable bag a
//! function is invoked with, and the SKILL.md manifest format used by
//! semantic (prompt-template) skills.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the variable holding a function's primary input.
pub const INPUT_VARIABLE: &str = "input";

// ---------------------------------------------------------------------------
// Function descriptors
// ---------------------------------------------------------------------------

/// A parameter accepted by a skill function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillParameter {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// A callable function exposed by a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillFunction {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<SkillParameter>,
}

impl SkillFunction {
    /// Function with no parameters beyond the implicit input.
    pub fn simple(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: Vec::new(),
        }
    }
}

/// Summary of a registered skill, as listed by the kernel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillInfo {
    pub name: String,
    pub description: String,
    pub functions: Vec<SkillFunction>,
}

// ---------------------------------------------------------------------------
// Invocation variables
// ---------------------------------------------------------------------------

/// Named string variables passed to a skill function.
///
/// The `input` variable carries the primary argument; other names are
/// function-specific (for example `session_id` for chat).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextVariables(BTreeMap<String, String>);

impl ContextVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variables with only `input` set.
    pub fn with_input(input: impl Into<String>) -> Self {
        let mut vars = Self::new();
        vars.set(INPUT_VARIABLE, input);
        vars
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// The `input` variable, or the empty string when unset.
    pub fn input(&self) -> &str {
        self.get(INPUT_VARIABLE).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for ContextVariables {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

// ---------------------------------------------------------------------------
// Manifest types
// ---------------------------------------------------------------------------

/// Parsed SKILL.md YAML frontmatter of a semantic skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillManifest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub metadata: Option<SkillMetadata>,
}

/// Optional extensions under `metadata` in the frontmatter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillMetadata {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub parameters: Vec<SkillParameter>,
    #[serde(default)]
    pub completion: Option<CompletionSettings>,
}

/// Per-skill overrides for the completion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionSettings {
    #[serde(default, rename = "max-tokens")]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
}
