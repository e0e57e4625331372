//! Infrastructure layer for FarmIQ.
//!
//! Contains implementations of the ports defined in `farmiq-core`: the
//! vector memory backends and their selector, OpenAI / Azure OpenAI
//! embedding and completion clients, the Azure Content Safety client, the
//! SKILL.md directory loader, chat storage (in-memory and SQLite), and the
//! configuration file loader.

pub mod chat;
pub mod config;
pub mod http;
pub mod llm;
pub mod memory;
pub mod safety;
pub mod skill;
pub mod sqlite;
