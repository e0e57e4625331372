//! Hand-written test doubles for the core ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use uuid::Uuid;

use farmiq_types::chat::{ChatMessage, ChatSession};
use farmiq_types::error::{LlmError, RepositoryError, SafetyError, SkillError};
use farmiq_types::llm::{CompletionRequest, CompletionResponse, ProviderCapabilities, Usage};
use farmiq_types::memory::{MemoryQueryResult, MemoryRecord};
use farmiq_types::safety::{CategoryAnalysis, SafetyAnalysis};
use farmiq_types::skill::SkillFunction;

use crate::chat::ChatRepository;
use crate::llm::{BoxLlmProvider, LlmProvider};
use crate::memory::store::cosine_similarity;
use crate::memory::{BoxEmbedder, BoxMemoryStore, Embedder, MemoryStore, SemanticTextMemory};
use crate::safety::ContentSafety;
use crate::skill::{KernelServices, Skill, SkillContext};

/// Embeds text as letter frequencies, so similar spellings score close.
pub struct LetterEmbedder;

impl Embedder for LetterEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RepositoryError> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut v = vec![0.0f32; 26];
                for c in text.to_ascii_lowercase().bytes() {
                    if c.is_ascii_lowercase() {
                        v[(c - b'a') as usize] += 1.0;
                    }
                }
                v
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "letters"
    }

    fn dimension(&self) -> usize {
        26
    }
}

pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, RepositoryError> {
        Err(RepositoryError::Embedding("service unavailable".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }

    fn dimension(&self) -> usize {
        0
    }
}

/// Memory store over a shared map, cloneable so tests can inspect it.
#[derive(Clone, Default)]
pub struct MockMemoryStore {
    collections: Arc<DashMap<String, DashMap<String, MemoryRecord>>>,
    upserts: Arc<AtomicUsize>,
}

impl MockMemoryStore {
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map(|c| c.len()).unwrap_or(0)
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

impl MemoryStore for MockMemoryStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn create_collection(&self, collection: &str) -> Result<(), RepositoryError> {
        self.collections.entry(collection.to_string()).or_default();
        Ok(())
    }

    async fn does_collection_exist(&self, collection: &str) -> Result<bool, RepositoryError> {
        Ok(self.collections.contains_key(collection))
    }

    async fn upsert(
        &self,
        collection: &str,
        record: &MemoryRecord,
    ) -> Result<String, RepositoryError> {
        let records = self
            .collections
            .get(collection)
            .ok_or(RepositoryError::NotFound)?;
        records.insert(record.key.clone(), record.clone());
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(record.key.clone())
    }

    async fn get(
        &self,
        collection: &str,
        key: &str,
        _with_embedding: bool,
    ) -> Result<Option<MemoryRecord>, RepositoryError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|c| c.get(key).map(|r| r.clone())))
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<(), RepositoryError> {
        if let Some(records) = self.collections.get(collection) {
            records.remove(key);
        }
        Ok(())
    }

    async fn get_nearest_matches(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        min_relevance: f32,
        _with_embeddings: bool,
    ) -> Result<Vec<MemoryQueryResult>, RepositoryError> {
        let Some(records) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };
        let mut results: Vec<MemoryQueryResult> = records
            .iter()
            .map(|r| MemoryQueryResult {
                metadata: r.metadata.clone(),
                relevance: cosine_similarity(embedding, &r.embedding),
                embedding: None,
            })
            .filter(|r| r.relevance >= min_relevance)
            .collect();
        results.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        results.truncate(limit);
        Ok(results)
    }
}

fn capabilities() -> ProviderCapabilities {
    ProviderCapabilities {
        max_context_tokens: 4096,
        max_output_tokens: 1024,
    }
}

/// Replies with "echo: " plus the last message.
pub struct EchoProvider {
    capabilities: ProviderCapabilities,
}

impl Default for EchoProvider {
    fn default() -> Self {
        Self {
            capabilities: capabilities(),
        }
    }
}

impl LlmProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo-model"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let last = request.messages.last().ok_or(LlmError::EmptyResponse)?;
        Ok(CompletionResponse {
            id: "echo-1".to_string(),
            content: format!("echo: {}", last.content),
            model: request.model.clone(),
            finish_reason: Some("stop".to_string()),
            usage: Usage::default(),
        })
    }
}

/// Returns a fixed reply and remembers the last request.
#[derive(Clone)]
pub struct RecordingProvider {
    reply: String,
    last: Arc<Mutex<Option<CompletionRequest>>>,
    capabilities: ProviderCapabilities,
}

impl RecordingProvider {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            last: Arc::new(Mutex::new(None)),
            capabilities: capabilities(),
        }
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last.lock().unwrap().clone()
    }
}

impl LlmProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    fn model(&self) -> &str {
        "recording-model"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        *self.last.lock().unwrap() = Some(request.clone());
        Ok(CompletionResponse {
            id: "rec-1".to_string(),
            content: self.reply.clone(),
            model: request.model.clone(),
            finish_reason: Some("stop".to_string()),
            usage: Usage::default(),
        })
    }
}

/// Content safety returning a fixed analysis.
pub struct FixedSafety {
    threshold: u8,
    analysis: SafetyAnalysis,
}

impl FixedSafety {
    pub fn new(threshold: u8, categories: &[(&str, u8)]) -> Self {
        Self {
            threshold,
            analysis: SafetyAnalysis {
                categories: categories
                    .iter()
                    .map(|(category, severity)| CategoryAnalysis {
                        category: category.to_string(),
                        severity: *severity,
                    })
                    .collect(),
            },
        }
    }
}

impl ContentSafety for FixedSafety {
    fn violation_threshold(&self) -> u8 {
        self.threshold
    }

    async fn analyze_text(&self, _text: &str) -> Result<SafetyAnalysis, SafetyError> {
        Ok(self.analysis.clone())
    }
}

#[derive(Default)]
pub struct MockChatRepository {
    sessions: Mutex<HashMap<Uuid, ChatSession>>,
    messages: Mutex<Vec<ChatMessage>>,
}

impl MockChatRepository {
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

impl ChatRepository for MockChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id, session.clone());
        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let all: Vec<ChatMessage> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.session_id == session_id)
            .cloned()
            .collect();
        let skip = limit.map(|l| all.len().saturating_sub(l)).unwrap_or(0);
        Ok(all.into_iter().skip(skip).collect())
    }
}

/// Skill with one function that always returns the same text.
pub struct StaticSkill {
    name: String,
    output: String,
}

impl StaticSkill {
    pub fn new(name: &str, output: &str) -> Self {
        Self {
            name: name.to_string(),
            output: output.to_string(),
        }
    }
}

impl Skill for StaticSkill {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "static test skill"
    }

    fn functions(&self) -> Vec<SkillFunction> {
        vec![SkillFunction::simple("say", "Return the fixed output")]
    }

    async fn invoke(
        &self,
        _function: &str,
        _context: &SkillContext<'_>,
    ) -> Result<String, SkillError> {
        Ok(self.output.clone())
    }
}

/// Kernel services over a fresh mock store, letter embedder and `provider`.
pub fn services_with<P: LlmProvider + 'static>(provider: P) -> KernelServices {
    KernelServices {
        memory: Arc::new(SemanticTextMemory::new(
            Arc::new(BoxMemoryStore::new(MockMemoryStore::default())),
            BoxEmbedder::new(LetterEmbedder),
        )),
        completion: Arc::new(BoxLlmProvider::new(provider)),
    }
}

pub fn services_with_echo() -> KernelServices {
    services_with(EchoProvider::default())
}
