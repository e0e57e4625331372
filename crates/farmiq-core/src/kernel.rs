//! The FarmIQ kernel.
//!
//! A `Kernel` bundles semantic memory, the completion provider and the
//! registered skills. It is assembled once from a `KernelConfig` and is
//! immutable afterwards; request handlers share it behind an `Arc`.

use std::sync::Arc;

use farmiq_types::error::SkillError;
use farmiq_types::skill::{ContextVariables, SkillInfo};

use crate::llm::BoxLlmProvider;
use crate::memory::SemanticTextMemory;
use crate::skill::{BoxSkill, KernelServices, SkillContext};

/// Everything needed to assemble a kernel.
pub struct KernelConfig {
    pub memory: Arc<SemanticTextMemory>,
    pub completion: Arc<BoxLlmProvider>,
    pub skills: Vec<BoxSkill>,
}

pub struct Kernel {
    services: KernelServices,
    skills: Vec<BoxSkill>,
}

/// Assemble a kernel, rejecting duplicate skill names (case-insensitive).
pub fn build_kernel(config: KernelConfig) -> Result<Kernel, SkillError> {
    let mut seen: Vec<String> = Vec::with_capacity(config.skills.len());
    for skill in &config.skills {
        let name = skill.name().to_lowercase();
        if seen.contains(&name) {
            return Err(SkillError::Duplicate(skill.name().to_string()));
        }
        seen.push(name);
    }

    tracing::info!(
        skills = config.skills.len(),
        completion = config.completion.name(),
        model = config.completion.model(),
        memory = config.memory.store().name(),
        "Kernel built"
    );

    Ok(Kernel {
        services: KernelServices {
            memory: config.memory,
            completion: config.completion,
        },
        skills: config.skills,
    })
}

impl Kernel {
    /// Invoke `function` on the skill named `skill` (case-insensitive).
    pub async fn run(
        &self,
        skill: &str,
        function: &str,
        variables: ContextVariables,
    ) -> Result<String, SkillError> {
        let target = self
            .skill(skill)
            .ok_or_else(|| SkillError::NotFound(skill.to_string()))?;
        let context = SkillContext {
            services: &self.services,
            variables,
        };
        tracing::debug!(skill = target.name(), function, "Running skill function");
        target.invoke(function, &context).await
    }

    /// Registered skills in registration order.
    pub fn skills(&self) -> Vec<SkillInfo> {
        self.skills.iter().map(BoxSkill::info).collect()
    }

    pub fn skill(&self, name: &str) -> Option<&BoxSkill> {
        self.skills.iter().find(|s| s.name().eq_ignore_ascii_case(name))
    }

    pub fn memory(&self) -> &Arc<SemanticTextMemory> {
        &self.services.memory
    }

    pub fn completion(&self) -> &Arc<BoxLlmProvider> {
        &self.services.completion
    }

    pub fn services(&self) -> &KernelServices {
        &self.services
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::TimeSkill;
    use crate::testing::{StaticSkill, services_with_echo};

    fn config(skills: Vec<BoxSkill>) -> KernelConfig {
        let services = services_with_echo();
        KernelConfig {
            memory: services.memory,
            completion: services.completion,
            skills,
        }
    }

    #[tokio::test]
    async fn test_run_dispatches_to_skill() {
        let kernel = build_kernel(config(vec![BoxSkill::new(StaticSkill::new("greet", "hello"))]))
            .unwrap();
        let out = kernel
            .run("Greet", "say", ContextVariables::with_input("x"))
            .await
            .unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_run_unknown_skill() {
        let kernel = build_kernel(config(vec![])).unwrap();
        let err = kernel.run("nope", "x", ContextVariables::new()).await.unwrap_err();
        assert!(matches!(err, SkillError::NotFound(ref name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_run_unknown_function() {
        let kernel = build_kernel(config(vec![BoxSkill::new(TimeSkill::new())])).unwrap();
        let err = kernel.run("time", "fortnight", ContextVariables::new()).await.unwrap_err();
        assert!(matches!(err, SkillError::FunctionNotFound { .. }));
    }

    #[test]
    fn test_duplicate_skill_names_rejected() {
        let result = build_kernel(config(vec![
            BoxSkill::new(StaticSkill::new("time", "a")),
            BoxSkill::new(TimeSkill::new()),
        ]));
        assert!(matches!(result, Err(SkillError::Duplicate(ref name)) if name == "time"));
    }

    #[test]
    fn test_skills_listed_in_order() {
        let kernel = build_kernel(config(vec![
            BoxSkill::new(StaticSkill::new("chat", "a")),
            BoxSkill::new(TimeSkill::new()),
        ]))
        .unwrap();
        let names: Vec<String> = kernel.skills().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["chat", "time"]);
        assert_eq!(kernel.completion().name(), "echo");
    }
}
