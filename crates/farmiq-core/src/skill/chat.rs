//! Retrieval-augmented chat skill.
//!
//! `chat` answers a user message using the farm summaries stored in
//! semantic memory and the recent history of the session:
//!
//! 1. optional content-safety gate on the input
//! 2. resolve (or start) the session and load recent history
//! 3. recall relevant farm records from memory
//! 4. ask the completion provider for a reply
//! 5. persist both turns and return the reply

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use farmiq_types::chat::{ChatMessage, ChatSession, MessageRole};
use farmiq_types::config::PromptsConfig;
use farmiq_types::error::{RepositoryError, SkillError};
use farmiq_types::llm::{CompletionRequest, Message};
use farmiq_types::memory::MemoryQueryResult;
use farmiq_types::skill::{SkillFunction, SkillParameter};

use super::{KernelServices, Skill, SkillContext, function_not_found};
use crate::chat::ChatRepository;
use crate::safety::BoxContentSafety;
use crate::seed::FARM_COLLECTION;

/// Name of the chat function.
/// Registered name of the chat skill.
pub const CHAT_SKILL: &str = "chat";

pub const CHAT_FUNCTION: &str = "chat";

/// Variable carrying an existing session id.
pub const SESSION_VARIABLE: &str = "session_id";

const TITLE_MAX_CHARS: usize = 60;

/// Outcome of one chat turn.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub session_id: Uuid,
    pub reply: String,
    pub memories_used: usize,
}

pub struct ChatSkill<R> {
    repository: Arc<R>,
    safety: Option<Arc<BoxContentSafety>>,
    prompts: PromptsConfig,
}

impl<R> Clone for ChatSkill<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            safety: self.safety.clone(),
            prompts: self.prompts.clone(),
        }
    }
}

impl<R: ChatRepository> ChatSkill<R> {
    pub fn new(
        repository: Arc<R>,
        safety: Option<Arc<BoxContentSafety>>,
        prompts: PromptsConfig,
    ) -> Self {
        Self {
            repository,
            safety,
            prompts,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Run one chat turn. Without `session_id` a new session is started.
    pub async fn chat(
        &self,
        services: &KernelServices,
        input: &str,
        session_id: Option<Uuid>,
    ) -> Result<ChatReply, SkillError> {
        if let Some(safety) = &self.safety {
            if let Some(categories) = safety.check(input).await? {
                tracing::warn!(categories = %categories, "Chat input rejected by content safety");
                return Err(SkillError::ContentViolation { categories });
            }
        }

        let session = match session_id {
            Some(id) => self
                .repository
                .get_session(&id)
                .await?
                .ok_or(RepositoryError::NotFound)?,
            None => {
                let session = ChatSession::new(Some(session_title(input)));
                self.repository.create_session(&session).await?
            }
        };

        let span = tracing::info_span!("chat_skill.chat", session_id = %session.id);
        self.respond(services, &session, input).instrument(span).await
    }

    async fn respond(
        &self,
        services: &KernelServices,
        session: &ChatSession,
        input: &str,
    ) -> Result<ChatReply, SkillError> {
        let history = self
            .repository
            .get_messages(&session.id, Some(self.prompts.history_message_limit))
            .await?;
        self.repository
            .save_message(&ChatMessage::new(session.id, MessageRole::User, input))
            .await?;

        let memories = services
            .memory
            .search(
                FARM_COLLECTION,
                input,
                self.prompts.memory_result_limit,
                self.prompts.memory_min_relevance,
            )
            .await?;
        tracing::debug!(count = memories.len(), "Recalled farm memories");

        let request = self.build_request(services, input, &history, &memories);
        let response = services.completion.complete(&request).await?;

        self.repository
            .save_message(&ChatMessage::new(
                session.id,
                MessageRole::Assistant,
                response.content.as_str(),
            ))
            .await?;

        Ok(ChatReply {
            session_id: session.id,
            reply: response.content,
            memories_used: memories.len(),
        })
    }

    fn build_request(
        &self,
        services: &KernelServices,
        input: &str,
        history: &[ChatMessage],
        memories: &[MemoryQueryResult],
    ) -> CompletionRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(system_prompt(
            &self.prompts.system_description,
            memories,
        )));
        messages.extend(history.iter().map(|m| Message {
            role: m.role.clone(),
            content: m.content.clone(),
        }));
        messages.push(Message::user(input));

        CompletionRequest {
            model: services.completion.model().to_string(),
            messages,
            max_tokens: self.prompts.response_token_limit,
            temperature: Some(self.prompts.temperature),
        }
    }
}

impl<R: ChatRepository + 'static> Skill for ChatSkill<R> {
    fn name(&self) -> &str {
        CHAT_SKILL
    }

    fn description(&self) -> &str {
        "Answer farm questions using stored farm data and the session history"
    }

    fn functions(&self) -> Vec<SkillFunction> {
        vec![SkillFunction {
            name: CHAT_FUNCTION.to_string(),
            description: self.description().to_string(),
            parameters: vec![
                SkillParameter {
                    name: "input".to_string(),
                    description: "The user message".to_string(),
                    default_value: None,
                },
                SkillParameter {
                    name: SESSION_VARIABLE.to_string(),
                    description: "Existing session to continue".to_string(),
                    default_value: None,
                },
            ],
        }]
    }

    async fn invoke(
        &self,
        function: &str,
        context: &SkillContext<'_>,
    ) -> Result<String, SkillError> {
        if function != CHAT_FUNCTION {
            return Err(function_not_found(self.name(), function));
        }
        let input = context.variables.input();
        if input.trim().is_empty() {
            return Err(SkillError::MissingVariable("input".to_string()));
        }
        let session_id = match context.variables.get(SESSION_VARIABLE) {
            Some(raw) => Some(
                raw.parse::<Uuid>()
                    .map_err(|_| SkillError::MissingVariable(SESSION_VARIABLE.to_string()))?,
            ),
            None => None,
        };
        let reply = self.chat(context.services, input, session_id).await?;
        Ok(reply.reply)
    }
}

/// System prompt followed by the recalled farm records, if any.
fn system_prompt(description: &str, memories: &[MemoryQueryResult]) -> String {
    if memories.is_empty() {
        return description.to_string();
    }
    let mut prompt = format!("{description}\n\nRelevant farm data:\n");
    for memory in memories {
        prompt.push_str("- ");
        prompt.push_str(memory.metadata.text.trim_end());
        prompt.push('\n');
    }
    prompt
}

fn session_title(input: &str) -> String {
    let title: String = input.trim().chars().take(TITLE_MAX_CHARS).collect();
    if input.trim().chars().count() > TITLE_MAX_CHARS {
        format!("{title}...")
    } else {
        title
    }
}
