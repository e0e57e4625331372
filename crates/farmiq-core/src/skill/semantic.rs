//! Prompt-template skills.
//!
//! A `SemanticSkill` is built from a validated SKILL.md manifest and its
//! template. Its single `invoke` function renders the template with the
//! caller's variables and sends the result to the completion provider.

use farmiq_types::error::SkillError;
use farmiq_types::llm::{CompletionRequest, Message};
use farmiq_types::skill::{ContextVariables, SkillFunction, SkillManifest, SkillParameter};

use super::template;
use super::{Skill, SkillContext, function_not_found};

/// Name of the only function a semantic skill exposes.
pub const INVOKE_FUNCTION: &str = "invoke";

const DEFAULT_MAX_TOKENS: u32 = 256;

pub struct SemanticSkill {
    manifest: SkillManifest,
    template: String,
}

impl SemanticSkill {
    /// Build a skill from a manifest that already passed validation.
    pub fn new(manifest: SkillManifest, template: String) -> Self {
        Self { manifest, template }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Declared parameters, followed by any template variables not declared.
    fn parameters(&self) -> Vec<SkillParameter> {
        let mut params: Vec<SkillParameter> = self
            .manifest
            .metadata
            .as_ref()
            .map(|m| m.parameters.clone())
            .unwrap_or_default();
        for name in template::variables(&self.template) {
            if !params.iter().any(|p| p.name == name) {
                params.push(SkillParameter {
                    name,
                    description: String::new(),
                    default_value: None,
                });
            }
        }
        params
    }

    /// Caller variables with declared defaults filled in.
    fn resolve_variables(&self, variables: &ContextVariables) -> ContextVariables {
        let mut resolved = variables.clone();
        for param in self.parameters() {
            if resolved.get(&param.name).is_none() {
                if let Some(default) = param.default_value {
                    resolved.set(param.name, default);
                }
            }
        }
        resolved
    }

    /// The prompt that `invoke` would send for these variables.
    pub fn render_prompt(&self, variables: &ContextVariables) -> String {
        template::render(&self.template, &self.resolve_variables(variables))
    }
}

impl Skill for SemanticSkill {
    fn name(&self) -> &str {
        &self.manifest.name
    }

    fn description(&self) -> &str {
        &self.manifest.description
    }

    fn functions(&self) -> Vec<SkillFunction> {
        vec![SkillFunction {
            name: INVOKE_FUNCTION.to_string(),
            description: self.manifest.description.clone(),
            parameters: self.parameters(),
        }]
    }

    async fn invoke(
        &self,
        function: &str,
        context: &SkillContext<'_>,
    ) -> Result<String, SkillError> {
        if function != INVOKE_FUNCTION {
            return Err(function_not_found(self.name(), function));
        }

        let prompt = self.render_prompt(&context.variables);
        let settings = self
            .manifest
            .metadata
            .as_ref()
            .and_then(|m| m.completion.clone())
            .unwrap_or_default();
        let completion = &context.services.completion;
        let request = CompletionRequest {
            model: completion.model().to_string(),
            messages: vec![Message::user(prompt)],
            max_tokens: settings.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: settings.temperature,
        };

        tracing::debug!(skill = %self.manifest.name, "invoking semantic skill");
        let response = completion.complete(&request).await?;
        Ok(response.content)
    }
}
