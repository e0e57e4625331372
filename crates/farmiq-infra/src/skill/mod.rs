//! Semantic skill discovery on disk.

pub mod loader;

pub use loader::{SkillDirectory, SkillLoad};
