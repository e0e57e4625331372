//! Filesystem loader for semantic skills.
//!
//! Each sub-directory of the configured skills directory that contains a
//! `SKILL.md` becomes one semantic skill:
//!
//! ```text
//! {semantic_skills_directory}/
//!   crop-advice/
//!     SKILL.md
//!   soil-report/
//!     SKILL.md
//! ```
//!
//! Loading is best-effort. A skill that cannot be read, parsed or
//! validated is logged and skipped; the rest still load. So is a skill
//! whose name is reserved or already taken by an earlier directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use farmiq_core::skill::manifest::{parse_skill_md, validate_manifest};
use farmiq_core::skill::Skill;
use farmiq_core::skill::semantic::SemanticSkill;

pub const SKILL_FILE: &str = "SKILL.md";

/// Outcome of scanning a skills directory.
pub struct SkillLoad {
    pub skills: Vec<SemanticSkill>,
    /// Directory names that held a SKILL.md but failed to load.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SkillDirectory {
    root: PathBuf,
    reserved: Vec<String>,
}

impl SkillDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            reserved: Vec::new(),
        }
    }

    /// Skill names registered elsewhere; a SKILL.md claiming one is skipped.
    pub fn with_reserved<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.reserved = names.iter().map(|n| n.as_ref().to_lowercase()).collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every valid skill, in directory-name order.
    ///
    /// Fails only when the root itself cannot be listed. A missing root
    /// yields no skills.
    pub fn load(&self) -> anyhow::Result<SkillLoad> {
        let mut load = SkillLoad {
            skills: Vec::new(),
            skipped: Vec::new(),
        };
        if !self.root.exists() {
            tracing::warn!(path = %self.root.display(), "Semantic skills directory does not exist");
            return Ok(load);
        }

        let entries = std::fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read skills directory: {}", self.root.display()))?;

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_dir() && path.join(SKILL_FILE).exists())
            .collect();
        dirs.sort();

        let mut taken: HashSet<String> = self.reserved.iter().cloned().collect();
        for dir in dirs {
            let name = dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();

            match load_skill(&dir) {
                Ok(skill) if !taken.insert(skill.name().to_lowercase()) => {
                    tracing::warn!(
                        skill = %name,
                        name = skill.name(),
                        "Skipping skill with a name that is already registered"
                    );
                    load.skipped.push(name);
                }
                Ok(skill) => {
                    tracing::debug!(skill = %name, "Loaded semantic skill");
                    load.skills.push(skill);
                }
                Err(e) => {
                    tracing::warn!(skill = %name, error = %format!("{e:#}"), "Skipping invalid skill");
                    load.skipped.push(name);
                }
            }
        }

        tracing::info!(
            path = %self.root.display(),
            loaded = load.skills.len(),
            skipped = load.skipped.len(),
            "Semantic skills loaded"
        );
        Ok(load)
    }
}

fn load_skill(dir: &Path) -> anyhow::Result<SemanticSkill> {
    let path = dir.join(SKILL_FILE);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let (manifest, template) = parse_skill_md(&content)?;
    validate_manifest(&manifest, &template)?;
    Ok(SemanticSkill::new(manifest, template))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_skill(root: &Path, dir: &str, content: &str) {
        let path = root.join(dir);
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join(SKILL_FILE), content).unwrap();
    }

    fn valid(name: &str) -> String {
        format!("---\nname: {name}\ndescription: Advice for farmers\n---\nAdvise on {{{{$input}}}}.\n")
    }

    #[test]
    fn test_valid_skills_load_and_invalid_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "crop-advice", &valid("crop-advice"));
        write_skill(tmp.path(), "soil-report", &valid("soil-report"));
        write_skill(tmp.path(), "broken", "no frontmatter here");
        std::fs::create_dir_all(tmp.path().join("empty-dir")).unwrap();
        std::fs::write(tmp.path().join("stray.txt"), "ignored").unwrap();

        let load = SkillDirectory::new(tmp.path()).load().unwrap();
        let names: Vec<&str> = load.skills.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["crop-advice", "soil-report"]);
        assert_eq!(load.skipped, vec!["broken".to_string()]);
    }

    #[test]
    fn test_manifest_that_fails_validation_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "a", &valid("Bad Name"));
        write_skill(tmp.path(), "b", "---\nname: empty-body\ndescription: d\n---\n   \n");

        let load = SkillDirectory::new(tmp.path()).load().unwrap();
        assert!(load.skills.is_empty());
        assert_eq!(load.skipped.len(), 2);
    }

    #[test]
    fn test_reserved_and_repeated_names_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "a-good", &valid("crop-advice"));
        write_skill(tmp.path(), "b-time", &valid("time"));
        write_skill(tmp.path(), "c-copy", &valid("crop-advice"));

        let load = SkillDirectory::new(tmp.path())
            .with_reserved(farmiq_core::skill::BUILTIN_SKILLS)
            .load()
            .unwrap();
        let names: Vec<&str> = load.skills.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["crop-advice"]);
        assert_eq!(load.skipped, vec!["b-time".to_string(), "c-copy".to_string()]);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let load = SkillDirectory::new(tmp.path().join("nope")).load().unwrap();
        assert!(load.skills.is_empty());
        assert!(load.skipped.is_empty());
    }
}
