//! Memory store selection.
//!
//! Reads `[memory_store]`, parses the `type` discriminator and constructs
//! exactly one backend. Selection happens once at startup; there is no
//! fallback to another backend when construction fails.

use farmiq_core::memory::BoxMemoryStore;
use farmiq_types::config::{MemoryStoreConfig, MemoryStoreType};
use farmiq_types::error::ConfigError;

use super::{
    AzureCognitiveSearchMemoryStore, ChromaMemoryStore, PostgresMemoryStore, QdrantMemoryStore,
    VolatileMemoryStore,
};

fn missing_section(store_type: MemoryStoreType, section: &str) -> ConfigError {
    ConfigError::MissingSection {
        store_type: store_type.to_string(),
        section: format!("memory_store.{section}"),
    }
}

/// Build the memory store named by `config.store_type`.
///
/// External backends require their settings block. Construction performs
/// no network I/O; connection problems surface on first use.
pub fn create_memory_store(config: &MemoryStoreConfig) -> Result<BoxMemoryStore, ConfigError> {
    let store_type = config.store_type()?;

    let store = match store_type {
        MemoryStoreType::Volatile => BoxMemoryStore::new(VolatileMemoryStore::new()),
        MemoryStoreType::Qdrant => {
            let qdrant = config
                .qdrant
                .as_ref()
                .ok_or_else(|| missing_section(store_type, "qdrant"))?;
            let store = QdrantMemoryStore::new(qdrant)?;
            tracing::debug!(endpoint = %store.base_url(), "Qdrant endpoint resolved");
            BoxMemoryStore::new(store)
        }
        MemoryStoreType::AzureCognitiveSearch => {
            let azure = config
                .azure_cognitive_search
                .as_ref()
                .ok_or_else(|| missing_section(store_type, "azure_cognitive_search"))?;
            let store = AzureCognitiveSearchMemoryStore::new(azure)?;
            tracing::debug!(endpoint = %store.endpoint(), "Azure Cognitive Search endpoint resolved");
            BoxMemoryStore::new(store)
        }
        MemoryStoreType::Chroma => {
            let chroma = config
                .chroma
                .as_ref()
                .ok_or_else(|| missing_section(store_type, "chroma"))?;
            let store = ChromaMemoryStore::new(chroma)?;
            tracing::debug!(endpoint = %store.base_url(), "Chroma endpoint resolved");
            BoxMemoryStore::new(store)
        }
        MemoryStoreType::Postgres => {
            let postgres = config
                .postgres
                .as_ref()
                .ok_or_else(|| missing_section(store_type, "postgres"))?;
            BoxMemoryStore::new(PostgresMemoryStore::new(postgres)?)
        }
    };

    tracing::info!(store_type = %store_type, backend = store.name(), "Memory store selected");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> MemoryStoreConfig {
        toml::from_str(toml_str).unwrap()
    }

    #[tokio::test]
    async fn test_each_type_with_section_builds() {
        let cases = [
            ("type = \"volatile\"", "volatile"),
            ("type = \"qdrant\"\n[qdrant]\nhost = \"localhost\"", "qdrant"),
            (
                "type = \"azure_cognitive_search\"\n[azure_cognitive_search]\nendpoint = \"https://farmiq.search.windows.net\"\nkey = \"k\"",
                "azure_cognitive_search",
            ),
            ("type = \"chroma\"\n[chroma]\nhost = \"localhost\"", "chroma"),
            (
                "type = \"postgres\"\n[postgres]\nconnection_string = \"postgres://u:p@localhost/farmiq\"",
                "postgres",
            ),
        ];
        for (toml_str, expected) in cases {
            let store = create_memory_store(&parse(toml_str)).unwrap();
            assert_eq!(store.name(), expected, "config: {toml_str}");
        }
    }

    #[test]
    fn test_external_types_without_section_fail() {
        for (store_type, section) in [
            ("qdrant", "memory_store.qdrant"),
            ("azure_cognitive_search", "memory_store.azure_cognitive_search"),
            ("chroma", "memory_store.chroma"),
            ("postgres", "memory_store.postgres"),
        ] {
            let config = parse(&format!("type = \"{store_type}\""));
            match create_memory_store(&config) {
                Err(ConfigError::MissingSection { store_type: t, section: s }) => {
                    assert_eq!(t, store_type);
                    assert_eq!(s, section);
                }
                Err(other) => panic!("unexpected error for {store_type}: {other}"),
                Ok(_) => panic!("{store_type} without section should fail"),
            }
        }
    }

    #[test]
    fn test_unknown_type_names_value() {
        let err = create_memory_store(&parse("type = \"pinecone\"")).err().unwrap();
        assert!(matches!(err, ConfigError::InvalidMemoryStoreType(ref v) if v == "pinecone"));
        assert!(err.to_string().contains("pinecone"));
    }

    #[test]
    fn test_default_and_aliases_are_volatile() {
        assert_eq!(create_memory_store(&MemoryStoreConfig::default()).unwrap().name(), "volatile");
        assert_eq!(create_memory_store(&parse("type = \"NONE\"")).unwrap().name(), "volatile");
        assert_eq!(create_memory_store(&parse("type = \"in_memory\"")).unwrap().name(), "volatile");
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = parse("type = \"chroma\"\n[chroma]\nhost = \"bad host\"");
        assert!(matches!(
            create_memory_store(&config),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
    }
}
