//! Task module
//!
//! This module contains the task model, the repository contract and its
//! two backends.

mod memory_store;
mod model;
mod pg_store;
mod repository;

pub use memory_store::MemoryTaskStore;
pub use model::*;
pub use pg_store::{PgStoreConfig, PgTaskStore, DEFAULT_OP_TIMEOUT};
pub use repository::{Page, TaskKey, TaskRepository};
