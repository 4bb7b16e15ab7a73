//! Task module
//!
//! This module contains the task entity, its validation rules and the pure
//! operations over a task collection.

pub mod collection;
mod model;
mod sample;
mod validation;

pub use model::*;
pub use sample::sample_tasks;
pub use validation::{normalize_priority, validate, Validation, ValidationError, MAX_TEXT_LEN};
