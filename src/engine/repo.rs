//! Repositories: all database reads and writes live here.

pub mod profiles;
pub mod tasks;

pub use profiles::ProfileRepo;
pub use tasks::{TaskRepo, TASK_SELECT};
