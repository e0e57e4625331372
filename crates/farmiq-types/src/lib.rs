//! Shared domain types for FarmIQ.
//!
//! Configuration records, farm seed records, vector memory records, LLM
//! request/response shapes, chat storage types, and the error enums used
//! across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, secrecy.

pub mod chat;
pub mod config;
pub mod error;
pub mod farm;
pub mod llm;
pub mod memory;
pub mod safety;
pub mod skill;
