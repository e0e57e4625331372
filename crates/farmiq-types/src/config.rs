//! Configuration types for FarmIQ.
//!
//! `AppConfig` represents the top-level `config.toml`. Every section has
//! serde defaults so a missing file or a partial file still yields a usable
//! configuration; the backend discriminators are kept as raw strings and
//! parsed at composition time so an invalid value can be reported verbatim.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level configuration for the FarmIQ service.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub ai_service: AiServiceConfig,
    #[serde(default)]
    pub memory_store: MemoryStoreConfig,
    #[serde(default)]
    pub content_safety: ContentSafetyConfig,
    #[serde(default)]
    pub chat_store: ChatStoreConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// HTTP listener and skill discovery settings.
#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory whose sub-directories each hold one SKILL.md semantic skill.
    #[serde(default)]
    pub semantic_skills_directory: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    40443
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            semantic_skills_directory: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AI service (completion + embedding provider)
// ---------------------------------------------------------------------------

/// Which OpenAI-style API backs completion and embedding generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiServiceType {
    AzureOpenAi,
    OpenAi,
}

impl fmt::Display for AiServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiServiceType::AzureOpenAi => write!(f, "azure_openai"),
            AiServiceType::OpenAi => write!(f, "openai"),
        }
    }
}

impl FromStr for AiServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "azure_openai" | "azureopenai" => Ok(AiServiceType::AzureOpenAi),
            "openai" => Ok(AiServiceType::OpenAi),
            other => Err(format!("invalid AI service type: '{other}'")),
        }
    }
}

/// Model (or Azure deployment) names per use.
#[derive(Debug, Clone, Deserialize)]
pub struct AiModelsConfig {
    #[serde(default = "default_completion_model")]
    pub completion: String,
    #[serde(default = "default_embedding_model")]
    pub embedding: String,
    #[serde(default = "default_completion_model")]
    pub planner: String,
}

fn default_completion_model() -> String {
    "gpt-35-turbo".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

impl Default for AiModelsConfig {
    fn default() -> Self {
        Self {
            completion: default_completion_model(),
            embedding: default_embedding_model(),
            planner: default_completion_model(),
        }
    }
}

/// Completion and embedding provider settings.
#[derive(Debug, Deserialize)]
pub struct AiServiceConfig {
    /// Raw discriminator, parsed with [`AiServiceConfig::service_type`].
    #[serde(rename = "type", default = "default_ai_service_type")]
    pub service_type: String,
    /// Resource endpoint. Required for Azure OpenAI, optional base URL override for OpenAI.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub key: Option<SecretString>,
    #[serde(default)]
    pub models: AiModelsConfig,
}

fn default_ai_service_type() -> String {
    "openai".to_string()
}

impl Default for AiServiceConfig {
    fn default() -> Self {
        Self {
            service_type: default_ai_service_type(),
            endpoint: None,
            key: None,
            models: AiModelsConfig::default(),
        }
    }
}

impl AiServiceConfig {
    /// Parse the discriminator, naming the raw value on failure.
    pub fn service_type(&self) -> Result<AiServiceType, ConfigError> {
        self.service_type
            .parse()
            .map_err(|_| ConfigError::InvalidAiServiceType(self.service_type.clone()))
    }
}

// ---------------------------------------------------------------------------
// Memory store
// ---------------------------------------------------------------------------

/// Vector memory backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryStoreType {
    /// Process-local, non-persistent.
    Volatile,
    Qdrant,
    AzureCognitiveSearch,
    Chroma,
    Postgres,
}

impl fmt::Display for MemoryStoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryStoreType::Volatile => write!(f, "volatile"),
            MemoryStoreType::Qdrant => write!(f, "qdrant"),
            MemoryStoreType::AzureCognitiveSearch => write!(f, "azure_cognitive_search"),
            MemoryStoreType::Chroma => write!(f, "chroma"),
            MemoryStoreType::Postgres => write!(f, "postgres"),
        }
    }
}

impl FromStr for MemoryStoreType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "volatile" | "in_memory" | "none" => Ok(MemoryStoreType::Volatile),
            "qdrant" => Ok(MemoryStoreType::Qdrant),
            "azure_cognitive_search" | "azurecognitivesearch" => {
                Ok(MemoryStoreType::AzureCognitiveSearch)
            }
            "chroma" => Ok(MemoryStoreType::Chroma),
            "postgres" => Ok(MemoryStoreType::Postgres),
            other => Err(format!("invalid memory store type: '{other}'")),
        }
    }
}

/// Memory store discriminator plus one optional settings block per backend.
///
/// Only the block matching `type` is consulted.
#[derive(Debug, Deserialize)]
pub struct MemoryStoreConfig {
    #[serde(rename = "type", default = "default_memory_store_type")]
    pub store_type: String,
    #[serde(default)]
    pub qdrant: Option<QdrantConfig>,
    #[serde(default)]
    pub azure_cognitive_search: Option<AzureCognitiveSearchConfig>,
    #[serde(default)]
    pub chroma: Option<ChromaConfig>,
    #[serde(default)]
    pub postgres: Option<PostgresConfig>,
}

fn default_memory_store_type() -> String {
    "volatile".to_string()
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            store_type: default_memory_store_type(),
            qdrant: None,
            azure_cognitive_search: None,
            chroma: None,
            postgres: None,
        }
    }
}

impl MemoryStoreConfig {
    /// Parse the discriminator, naming the raw value on failure.
    pub fn store_type(&self) -> Result<MemoryStoreType, ConfigError> {
        self.store_type
            .parse()
            .map_err(|_| ConfigError::InvalidMemoryStoreType(self.store_type.clone()))
    }
}

#[derive(Debug, Deserialize)]
pub struct QdrantConfig {
    pub host: String,
    #[serde(default = "default_qdrant_port")]
    pub port: u16,
    #[serde(default)]
    pub key: Option<SecretString>,
    #[serde(default = "default_vector_size")]
    pub vector_size: usize,
    /// PEM certificate revocation lists checked on every TLS handshake.
    #[serde(default)]
    pub crl_files: Vec<PathBuf>,
}

fn default_qdrant_port() -> u16 {
    6333
}

#[derive(Debug, Deserialize)]
pub struct AzureCognitiveSearchConfig {
    pub endpoint: String,
    pub key: SecretString,
    #[serde(default = "default_vector_size")]
    pub vector_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct ChromaConfig {
    pub host: String,
    #[serde(default = "default_chroma_port")]
    pub port: u16,
    /// PEM certificate revocation lists checked on every TLS handshake.
    #[serde(default)]
    pub crl_files: Vec<PathBuf>,
}

fn default_chroma_port() -> u16 {
    8000
}

#[derive(Debug, Deserialize)]
pub struct PostgresConfig {
    pub connection_string: SecretString,
    #[serde(default = "default_vector_size")]
    pub vector_size: usize,
}

fn default_vector_size() -> usize {
    1536
}

// ---------------------------------------------------------------------------
// Content safety
// ---------------------------------------------------------------------------

/// Optional content-safety gate in front of the chat skill.
#[derive(Debug, Deserialize)]
pub struct ContentSafetyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub key: Option<SecretString>,
    /// Severity at or above which a category counts as a violation.
    #[serde(default = "default_violation_threshold")]
    pub violation_threshold: u8,
}

fn default_violation_threshold() -> u8 {
    4
}

impl Default for ContentSafetyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            key: None,
            violation_threshold: default_violation_threshold(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStoreType {
    Volatile,
    Sqlite,
}

impl fmt::Display for ChatStoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatStoreType::Volatile => write!(f, "volatile"),
            ChatStoreType::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for ChatStoreType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "volatile" => Ok(ChatStoreType::Volatile),
            "sqlite" => Ok(ChatStoreType::Sqlite),
            other => Err(format!("invalid chat store type: '{other}'")),
        }
    }
}

/// Where chat sessions and messages are persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatStoreConfig {
    #[serde(rename = "type", default = "default_chat_store_type")]
    pub store_type: String,
    #[serde(default)]
    pub sqlite: Option<SqliteStoreConfig>,
}

fn default_chat_store_type() -> String {
    "volatile".to_string()
}

impl Default for ChatStoreConfig {
    fn default() -> Self {
        Self {
            store_type: default_chat_store_type(),
            sqlite: None,
        }
    }
}

impl ChatStoreConfig {
    pub fn store_type(&self) -> Result<ChatStoreType, ConfigError> {
        self.store_type
            .parse()
            .map_err(|_| ConfigError::InvalidChatStoreType(self.store_type.clone()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    pub path: PathBuf,
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// Prompt and retrieval tuning for the chat skill.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptsConfig {
    #[serde(default = "default_system_description")]
    pub system_description: String,
    #[serde(default = "default_response_token_limit")]
    pub response_token_limit: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_memory_result_limit")]
    pub memory_result_limit: usize,
    #[serde(default = "default_memory_min_relevance")]
    pub memory_min_relevance: f32,
    #[serde(default = "default_history_message_limit")]
    pub history_message_limit: usize,
}

fn default_system_description() -> String {
    "This is a chat between an intelligent AI bot named FarmIQ and one or more \
     participants. FarmIQ helps farmers decide which crops to grow using soil and \
     weather data. Answer concisely and cite the farm data you were given."
        .to_string()
}

fn default_response_token_limit() -> u32 {
    1024
}

fn default_temperature() -> f64 {
    0.7
}

fn default_memory_result_limit() -> usize {
    3
}

fn default_memory_min_relevance() -> f32 {
    0.7
}

fn default_history_message_limit() -> usize {
    10
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            system_description: default_system_description(),
            response_token_limit: default_response_token_limit(),
            temperature: default_temperature(),
            memory_result_limit: default_memory_result_limit(),
            memory_min_relevance: default_memory_min_relevance(),
            history_message_limit: default_history_message_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_app_config_deserialize_with_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.service.port, 40443);
        assert_eq!(config.memory_store.store_type, "volatile");
        assert_eq!(
            config.memory_store.store_type().unwrap(),
            MemoryStoreType::Volatile
        );
        assert_eq!(config.ai_service.service_type().unwrap(), AiServiceType::OpenAi);
        assert!(!config.content_safety.enabled);
        assert_eq!(config.content_safety.violation_threshold, 4);
        assert_eq!(config.prompts.memory_result_limit, 3);
    }

    #[test]
    fn test_app_config_deserialize_with_values() {
        let toml_str = r#"
[service]
port = 8080
semantic_skills_directory = "./skills"

[ai_service]
type = "azure_openai"
endpoint = "https://farmiq.openai.azure.com"
key = "azure-key"

[ai_service.models]
completion = "gpt-4"
embedding = "text-embedding-ada-002"

[memory_store]
type = "qdrant"

[memory_store.qdrant]
host = "http://localhost"
port = 6333
key = "qdrant-key"
vector_size = 1536
crl_files = ["/etc/farmiq/qdrant-ca.crl.pem"]

[content_safety]
enabled = true
endpoint = "https://safety.cognitiveservices.azure.com"
key = "safety-key"
violation_threshold = 2
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.service.port, 8080);
        assert_eq!(
            config.service.semantic_skills_directory,
            Some(PathBuf::from("./skills"))
        );
        assert_eq!(
            config.ai_service.service_type().unwrap(),
            AiServiceType::AzureOpenAi
        );
        assert_eq!(config.ai_service.models.completion, "gpt-4");
        assert_eq!(config.ai_service.models.planner, "gpt-35-turbo");
        assert_eq!(
            config.memory_store.store_type().unwrap(),
            MemoryStoreType::Qdrant
        );
        let qdrant = config.memory_store.qdrant.as_ref().unwrap();
        assert_eq!(qdrant.host, "http://localhost");
        assert_eq!(qdrant.key.as_ref().unwrap().expose_secret(), "qdrant-key");
        assert_eq!(qdrant.crl_files, vec![PathBuf::from("/etc/farmiq/qdrant-ca.crl.pem")]);
        assert!(config.memory_store.chroma.is_none());
        assert!(config.content_safety.enabled);
        assert_eq!(config.content_safety.violation_threshold, 2);
    }

    #[test]
    fn test_memory_store_type_roundtrip() {
        for store_type in [
            MemoryStoreType::Volatile,
            MemoryStoreType::Qdrant,
            MemoryStoreType::AzureCognitiveSearch,
            MemoryStoreType::Chroma,
            MemoryStoreType::Postgres,
        ] {
            let parsed: MemoryStoreType = store_type.to_string().parse().unwrap();
            assert_eq!(parsed, store_type);
        }
    }

    #[test]
    fn test_memory_store_type_aliases_and_case() {
        assert_eq!("Qdrant".parse::<MemoryStoreType>(), Ok(MemoryStoreType::Qdrant));
        assert_eq!("in_memory".parse::<MemoryStoreType>(), Ok(MemoryStoreType::Volatile));
        assert_eq!(
            "AzureCognitiveSearch".parse::<MemoryStoreType>(),
            Ok(MemoryStoreType::AzureCognitiveSearch)
        );
    }

    #[test]
    fn test_invalid_memory_store_type_names_value() {
        let config = MemoryStoreConfig {
            store_type: "redis".to_string(),
            ..Default::default()
        };
        let err = config.store_type().unwrap_err();
        assert!(err.to_string().contains("redis"));
    }

    #[test]
    fn test_invalid_ai_service_type_names_value() {
        let config = AiServiceConfig {
            service_type: "anthropic".to_string(),
            ..Default::default()
        };
        let err = config.service_type().unwrap_err();
        assert!(err.to_string().contains("anthropic"));
    }

    #[test]
    fn test_chat_store_type_parse() {
        assert_eq!("SQLite".parse::<ChatStoreType>(), Ok(ChatStoreType::Sqlite));
        assert!("cosmos".parse::<ChatStoreType>().is_err());
    }
}
