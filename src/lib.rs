//! taskdeck: a personal task manager.
//!
//! The `engine` holds storage, domain types and the task view pipeline;
//! `config` loads layered settings.

pub mod config;
pub mod engine;
