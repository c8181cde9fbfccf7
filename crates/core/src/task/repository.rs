//! Task repository trait
//!
//! Defines the interface for task storage operations. The service layer
//! depends only on this trait, never on a concrete backend.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::model::{NewTask, Task, UpdateTask};
use crate::{OpContext, Result};

/// Identity type of a backend
///
/// Parsed from URL path segments and rendered back into responses.
pub trait TaskKey:
    Copy + Eq + Hash + Debug + Display + FromStr + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> TaskKey for T where
    T: Copy
        + Eq
        + Hash
        + Debug
        + Display
        + FromStr
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// Window into a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u64,
}

impl Page {
    pub const fn new(limit: u32, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// Every record.
    pub const fn all() -> Self {
        Self {
            limit: u32::MAX,
            offset: 0,
        }
    }

    /// The 1-based `page` of `page_size` records. Page 0 is treated as page 1.
    pub fn number(page: u32, page_size: u32) -> Self {
        let index = u64::from(page.max(1) - 1);
        Self {
            limit: page_size,
            offset: index.saturating_mul(u64::from(page_size)),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::all()
    }
}

/// Repository interface for task CRUD operations
#[async_trait]
pub trait TaskRepository: Send + Sync {
    type Id: TaskKey;

    /// Short backend label for logs and health output
    fn backend_name(&self) -> &'static str;

    /// Persist a new task and return its freshly assigned identity.
    ///
    /// The stored record always starts in `TaskStatus::New`.
    async fn create(&self, ctx: &OpContext, task: NewTask) -> Result<Self::Id>;

    /// Get a task by ID
    async fn get(&self, ctx: &OpContext, id: Self::Id) -> Result<Task<Self::Id>>;

    /// List tasks, oldest first. An empty store yields an empty `Vec`.
    async fn list(&self, ctx: &OpContext, page: Page) -> Result<Vec<Task<Self::Id>>>;

    /// Remove a task. Removing an unknown ID is not an error.
    async fn delete(&self, ctx: &OpContext, id: Self::Id) -> Result<()>;

    /// Overwrite title, description and status, refreshing `updated_at`.
    async fn update(&self, ctx: &OpContext, id: Self::Id, update: UpdateTask) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_offsets() {
        assert_eq!(Page::number(1, 20), Page::new(20, 0));
        assert_eq!(Page::number(3, 20), Page::new(20, 40));
        assert_eq!(Page::number(0, 20), Page::new(20, 0));
    }

    #[test]
    fn test_page_number_does_not_overflow() {
        let page = Page::number(u32::MAX, u32::MAX);
        assert_eq!(page.offset, u64::from(u32::MAX - 1) * u64::from(u32::MAX));
    }

    #[test]
    fn test_default_page_is_unbounded() {
        assert_eq!(Page::default(), Page::all());
    }
}
