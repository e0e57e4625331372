//! Skill system for FarmIQ.
//!
//! A skill is a named group of functions invoked with a bag of string
//! variables. Native skills (`TimeSkill`, `ChatSkill`) are written in Rust;
//! semantic skills are prompt templates loaded from SKILL.md files and
//! executed through the completion provider.

pub mod chat;
pub mod manifest;
pub mod semantic;
pub mod template;
pub mod time;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use farmiq_types::error::SkillError;
use farmiq_types::skill::{ContextVariables, SkillFunction, SkillInfo};

use crate::llm::BoxLlmProvider;
use crate::memory::SemanticTextMemory;

pub use chat::{CHAT_SKILL, ChatReply, ChatSkill};
pub use semantic::SemanticSkill;
pub use time::{TIME_SKILL, TimeSkill};

/// Names taken by the skills `register_skills` always adds.
pub const BUILTIN_SKILLS: &[&str] = &[CHAT_SKILL, TIME_SKILL];

/// Shared services every skill invocation can reach.
#[derive(Clone)]
pub struct KernelServices {
    pub memory: Arc<SemanticTextMemory>,
    pub completion: Arc<BoxLlmProvider>,
}

/// Everything a single function invocation receives.
pub struct SkillContext<'a> {
    pub services: &'a KernelServices,
    pub variables: ContextVariables,
}

/// Trait for skills registered with the kernel.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait Skill: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn functions(&self) -> Vec<SkillFunction>;

    /// Run `function` with the given context, returning its text output.
    fn invoke(
        &self,
        function: &str,
        context: &SkillContext<'_>,
    ) -> impl Future<Output = Result<String, SkillError>> + Send;
}

/// Object-safe version of [`Skill`] with boxed futures.
pub trait SkillDyn: Send + Sync {
    fn name_dyn(&self) -> &str;

    fn description_dyn(&self) -> &str;

    fn functions_dyn(&self) -> Vec<SkillFunction>;

    fn invoke_boxed<'a>(
        &'a self,
        function: &'a str,
        context: &'a SkillContext<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<String, SkillError>> + Send + 'a>>;
}

impl<T: Skill> SkillDyn for T {
    fn name_dyn(&self) -> &str {
        self.name()
    }

    fn description_dyn(&self) -> &str {
        self.description()
    }

    fn functions_dyn(&self) -> Vec<SkillFunction> {
        self.functions()
    }

    fn invoke_boxed<'a>(
        &'a self,
        function: &'a str,
        context: &'a SkillContext<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<String, SkillError>> + Send + 'a>> {
        Box::pin(self.invoke(function, context))
    }
}

/// Type-erased skill so native and semantic skills share one registry.
pub struct BoxSkill {
    inner: Box<dyn SkillDyn + Send + Sync>,
}

impl BoxSkill {
    pub fn new<T: Skill + 'static>(skill: T) -> Self {
        Self {
            inner: Box::new(skill),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name_dyn()
    }

    pub fn description(&self) -> &str {
        self.inner.description_dyn()
    }

    pub fn functions(&self) -> Vec<SkillFunction> {
        self.inner.functions_dyn()
    }

    pub fn info(&self) -> SkillInfo {
        SkillInfo {
            name: self.name().to_string(),
            description: self.description().to_string(),
            functions: self.functions(),
        }
    }

    pub async fn invoke(
        &self,
        function: &str,
        context: &SkillContext<'_>,
    ) -> Result<String, SkillError> {
        self.inner.invoke_boxed(function, context).await
    }
}

/// Assemble the kernel's skill list: the chat skill, the built-in time
/// skill, then any semantic skills discovered on disk.
pub fn register_skills(chat: BoxSkill, semantic: Vec<BoxSkill>) -> Vec<BoxSkill> {
    let mut skills = Vec::with_capacity(semantic.len() + 2);
    skills.push(chat);
    skills.push(BoxSkill::new(TimeSkill::new()));
    skills.extend(semantic);
    skills
}

/// Error for a function name the skill does not expose.
pub(crate) fn function_not_found(skill: &str, function: &str) -> SkillError {
    SkillError::FunctionNotFound {
        skill: skill.to_string(),
        function: function.to_string(),
    }
}
