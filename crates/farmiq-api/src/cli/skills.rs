//! `farmiq skills` - list the skills the kernel would register.

use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};

use farmiq_core::skill::{BoxSkill, ChatSkill, register_skills};
use farmiq_infra::chat::{ChatStore, InMemoryChatRepository};
use farmiq_types::config::AppConfig;
use farmiq_types::skill::SkillInfo;

use crate::state::load_semantic_skills;

/// Skill listing without any provider or store connection.
pub fn skill_infos(config: &AppConfig) -> Result<Vec<SkillInfo>> {
    let chat = ChatSkill::new(
        Arc::new(ChatStore::Volatile(InMemoryChatRepository::new())),
        None,
        config.prompts.clone(),
    );
    let skills = register_skills(BoxSkill::new(chat), load_semantic_skills(&config.service)?);
    Ok(skills.iter().map(BoxSkill::info).collect())
}

pub fn list_skills(config: &AppConfig, json: bool) -> Result<()> {
    let skills = skill_infos(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&skills)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Skill").fg(Color::Cyan),
            Cell::new("Functions"),
            Cell::new("Description"),
        ]);

    for skill in &skills {
        let functions: Vec<&str> = skill.functions.iter().map(|f| f.name.as_str()).collect();
        table.add_row(vec![
            Cell::new(&skill.name).fg(Color::Cyan),
            Cell::new(functions.join(", ")),
            Cell::new(&skill.description),
        ]);
    }

    println!("{table}");
    Ok(())
}
