//! `farmiq check-config` - build every component that can be built
//! without network access and report what failed.

use anyhow::{Result, bail};
use console::style;

use farmiq_infra::llm::{create_completion_provider, create_embedder};
use farmiq_infra::memory::create_memory_store;
use farmiq_infra::safety::create_content_safety;
use farmiq_types::config::{AppConfig, ChatStoreType};
use farmiq_types::error::ConfigError;

/// Outcome of checking one configuration section.
#[derive(Debug, serde::Serialize)]
pub struct SectionCheck {
    pub section: &'static str,
    pub ok: bool,
    pub detail: String,
}

fn check<T>(
    section: &'static str,
    result: Result<T, impl std::fmt::Display>,
    describe: impl FnOnce(T) -> String,
) -> SectionCheck {
    match result {
        Ok(value) => SectionCheck {
            section,
            ok: true,
            detail: describe(value),
        },
        Err(e) => SectionCheck {
            section,
            ok: false,
            detail: e.to_string(),
        },
    }
}

/// Validate each section. Must run inside a tokio runtime; the Postgres
/// store builds a lazy pool.
pub fn check_sections(config: &AppConfig) -> Vec<SectionCheck> {
    let models = &config.ai_service.models;
    let mut checks = vec![
        check("memory_store", create_memory_store(&config.memory_store), |s| {
            s.name().to_string()
        }),
        check("ai_service.embedding", create_embedder(&config.ai_service), |e| {
            format!("{} ({} dims)", e.model_name(), e.dimension())
        }),
        check(
            "ai_service.completion",
            create_completion_provider(&config.ai_service, &models.completion),
            |p| format!("{} / {}", p.name(), p.model()),
        ),
        check("content_safety", create_content_safety(&config.content_safety), |s| {
            if s.is_some() { "enabled" } else { "disabled" }.to_string()
        }),
    ];

    let chat_store = config
        .chat_store
        .store_type()
        .and_then(|t| match (t, &config.chat_store.sqlite) {
            (ChatStoreType::Sqlite, None) => Err(ConfigError::MissingSection {
                store_type: t.to_string(),
                section: "chat_store.sqlite".to_string(),
            }),
            _ => Ok(t),
        });
    checks.push(check("chat_store", chat_store, |t| t.to_string()));
    checks
}

pub fn check_config(config: &AppConfig, json: bool) -> Result<()> {
    let checks = check_sections(config);
    let failed = checks.iter().filter(|c| !c.ok).count();

    if json {
        println!("{}", serde_json::to_string_pretty(&checks)?);
    } else {
        println!();
        for c in &checks {
            let mark = if c.ok {
                style("✓").green()
            } else {
                style("✗").red()
            };
            println!("  {mark} {:<24} {}", c.section, c.detail);
        }
        println!();
    }

    if failed > 0 {
        bail!("{failed} configuration section(s) invalid");
    }
    Ok(())
}
