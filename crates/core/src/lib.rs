//! Core library for the todo app
//!
//! This crate contains the task list business logic, including:
//! - Task model and validation
//! - Collection operations and derived views
//! - Storage slot persistence and file export/import

pub mod error;
pub mod session;
pub mod storage;
pub mod task;
pub mod transfer;
pub mod view;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
