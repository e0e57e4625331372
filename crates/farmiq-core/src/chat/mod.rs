//! Chat session and message persistence abstractions for FarmIQ.
//!
//! This module defines the `ChatRepository` trait that the infrastructure
//! layer implements (in-memory and SQLite).

pub mod repository;

pub use repository::ChatRepository;
