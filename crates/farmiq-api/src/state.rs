//! Application state wiring all services together.
//!
//! Composition runs once, in order: configuration, memory store, embedder,
//! semantic memory, seed ingestion, completion provider, content safety,
//! chat store, skills, kernel. Any failure aborts startup.

use std::path::Path;
use std::sync::Arc;

use farmiq_core::kernel::{Kernel, KernelConfig, build_kernel};
use farmiq_core::memory::SemanticTextMemory;
use farmiq_core::seed::{farm_records, seed_farm_data};
use farmiq_core::skill::{BUILTIN_SKILLS, BoxSkill, ChatSkill, register_skills};
use farmiq_types::config::{AppConfig, PromptsConfig, ServiceConfig};
use farmiq_types::farm::SeedReport;
use farmiq_infra::chat::ChatStore;
use farmiq_infra::config::{apply_env_overrides, load_config, resolve_config_path};
use farmiq_infra::llm::{create_completion_provider, create_embedder};
use farmiq_infra::memory::create_memory_store;
use farmiq_infra::safety::create_content_safety;
use farmiq_infra::skill::SkillDirectory;

/// The chat skill pinned to the configured chat store.
pub type ConcreteChatSkill = ChatSkill<ChatStore>;

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub kernel: Arc<Kernel>,
    pub chat: ConcreteChatSkill,
    pub prompts: Arc<PromptsConfig>,
    pub seed_report: Arc<SeedReport>,
}

/// Load `config.toml` (explicit path or data-dir default) and apply
/// `FARMIQ_*` environment overrides.
pub async fn load_app_config(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    let path = resolve_config_path(explicit);
    let mut config = load_config(&path).await?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Build semantic memory from `[memory_store]` and `[ai_service]`.
pub fn build_memory(config: &AppConfig) -> anyhow::Result<Arc<SemanticTextMemory>> {
    let store = create_memory_store(&config.memory_store)?;
    let embedder = create_embedder(&config.ai_service)?;
    Ok(Arc::new(SemanticTextMemory::new(Arc::new(store), embedder)))
}

/// Seed the farm records into `memory`.
pub async fn seed_memory(memory: &SemanticTextMemory) -> anyhow::Result<SeedReport> {
    let records = farm_records()?;
    Ok(seed_farm_data(memory, &records).await?)
}

/// Semantic skills from `service.semantic_skills_directory`, if configured.
///
/// Directories claiming a built-in skill name are skipped.
pub fn load_semantic_skills(service: &ServiceConfig) -> anyhow::Result<Vec<BoxSkill>> {
    let Some(dir) = &service.semantic_skills_directory else {
        return Ok(Vec::new());
    };
    let load = SkillDirectory::new(dir.clone())
        .with_reserved(BUILTIN_SKILLS)
        .load()?;
    Ok(load.skills.into_iter().map(BoxSkill::new).collect())
}

impl AppState {
    /// Compose every service from `config`.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let memory = build_memory(config)?;
        let seed_report = seed_memory(&memory).await?;

        let completion = create_completion_provider(&config.ai_service, &config.ai_service.models.completion)?;
        let safety = create_content_safety(&config.content_safety)?.map(Arc::new);

        let chat_store = ChatStore::from_config(&config.chat_store).await?;
        tracing::info!(chat_store = chat_store.name(), "Chat store ready");

        let chat = ChatSkill::new(Arc::new(chat_store), safety, config.prompts.clone());
        let semantic = load_semantic_skills(&config.service)?;
        let skills = register_skills(BoxSkill::new(chat.clone()), semantic);

        let kernel = build_kernel(KernelConfig {
            memory,
            completion: Arc::new(completion),
            skills,
        })?;

        Ok(Self::from_parts(kernel, chat, config.prompts.clone(), seed_report))
    }

    pub fn from_parts(
        kernel: Kernel,
        chat: ConcreteChatSkill,
        prompts: PromptsConfig,
        seed_report: SeedReport,
    ) -> Self {
        Self {
            kernel: Arc::new(kernel),
            chat,
            prompts: Arc::new(prompts),
            seed_report: Arc::new(seed_report),
        }
    }
}
