//! Core library for the tasks service
//!
//! This crate contains everything below the HTTP layer:
//! - Task model and request payloads
//! - The `TaskRepository` contract
//! - In-memory and PostgreSQL backends
//! - Per-operation cancellation context

pub mod context;
pub mod error;
pub mod task;

pub use context::OpContext;
pub use error::{Error, ErrorKind};
pub type Result<T> = std::result::Result<T, Error>;
