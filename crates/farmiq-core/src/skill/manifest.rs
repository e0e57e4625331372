//! SKILL.md manifest parsing and validation.
//!
//! A semantic skill is a SKILL.md file: YAML frontmatter delimited by `---`
//! followed by the prompt template body.

use anyhow::{Context, bail};
use farmiq_types::skill::SkillManifest;

/// Extract YAML frontmatter and body from a SKILL.md file.
///
/// Content must start with `---`, and a closing `\n---` separates the YAML
/// from the body. Returns `(yaml_str, body_str)` with leading newlines of
/// the body trimmed.
pub fn extract_frontmatter(content: &str) -> anyhow::Result<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    if !content.starts_with("---") {
        bail!("SKILL.md must start with YAML frontmatter delimiter '---'");
    }

    let after_open = &content[3..];
    let after_open = after_open
        .strip_prefix("\r\n")
        .or_else(|| after_open.strip_prefix('\n'))
        .unwrap_or(after_open);

    let closing_pos = after_open
        .find("\n---")
        .context("SKILL.md missing closing frontmatter delimiter '---'")?;

    let yaml_str = &after_open[..closing_pos];
    let remainder = &after_open[closing_pos + 4..];
    let body_str = remainder.trim_start_matches(['\r', '\n']);

    Ok((yaml_str, body_str))
}

/// Parse a SKILL.md file into a `SkillManifest` and its prompt template.
pub fn parse_skill_md(content: &str) -> anyhow::Result<(SkillManifest, String)> {
    let (yaml_str, body_str) = extract_frontmatter(content)?;

    let manifest: SkillManifest =
        serde_yaml_ng::from_str(yaml_str).context("Failed to parse SKILL.md YAML frontmatter")?;

    Ok((manifest, body_str.to_owned()))
}

/// Validate a parsed manifest and its template.
///
/// - `name` is a non-empty slug (lowercase letters, digits, hyphens, no
///   leading or trailing hyphen)
/// - `description` is non-empty
/// - `metadata.version`, when present, parses as semver
/// - the template body is not blank
pub fn validate_manifest(manifest: &SkillManifest, template: &str) -> anyhow::Result<()> {
    if manifest.name.is_empty() {
        bail!("Skill name must not be empty");
    }

    let is_valid_slug = manifest
        .name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !is_valid_slug {
        bail!(
            "Skill name '{}' must contain only lowercase letters, digits, and hyphens",
            manifest.name
        );
    }
    if manifest.name.starts_with('-') || manifest.name.ends_with('-') {
        bail!(
            "Skill name '{}' must not start or end with a hyphen",
            manifest.name
        );
    }

    if manifest.description.trim().is_empty() {
        bail!("Skill description must not be empty");
    }

    if let Some(version_str) = manifest.metadata.as_ref().and_then(|m| m.version.as_ref()) {
        version_str
            .parse::<semver::Version>()
            .with_context(|| format!("Invalid semver version '{version_str}'"))?;
    }

    if template.trim().is_empty() {
        bail!("Skill '{}' has an empty prompt template", manifest.name);
    }

    Ok(())
}
