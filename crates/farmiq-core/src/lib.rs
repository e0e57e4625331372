//! Business logic and port definitions for FarmIQ.
//!
//! This crate defines the "ports" (memory store, embedder, LLM provider,
//! content safety and chat repository traits) that the infrastructure layer
//! implements, together with the logic built on top of them: semantic
//! memory, farm data seeding, skills and the kernel. It depends only on
//! `farmiq-types` -- never on `farmiq-infra` or any database/IO crate.

pub mod chat;
pub mod kernel;
pub mod llm;
pub mod memory;
pub mod safety;
pub mod seed;
pub mod skill;

#[cfg(test)]
pub(crate) mod testing;
