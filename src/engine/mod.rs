//! Core engine modules for taskdeck.

pub mod dates;
pub mod db;
pub mod error;
pub mod labels;
pub mod pipeline;
pub mod repo;
pub mod resolver;
pub mod types;
