//! HTTP request handlers, one module per resource.

pub mod chat;
pub mod memory;
pub mod session;
pub mod skill;
