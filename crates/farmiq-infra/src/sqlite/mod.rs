//! SQLite persistence for chat sessions and messages.

pub mod chat;
pub mod pool;
