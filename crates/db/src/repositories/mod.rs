use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use almanac_core::domain::event::{Event, EventId, NewEvent};

pub mod event;
pub mod memory;

pub use event::SqlEventRepository;
pub use memory::InMemoryEventRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Persistent event collection. Listings come back in insertion order.
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert(&self, event: NewEvent) -> Result<EventId, RepositoryError>;

    /// Moves the oldest record named `name` to `date`; returns rows affected (0 or 1).
    async fn update_first_date_by_name(
        &self,
        name: &str,
        date: NaiveDate,
    ) -> Result<u64, RepositoryError>;

    async fn find_by_name(&self, name: &str) -> Result<Vec<Event>, RepositoryError>;

    async fn list_on_or_before(&self, date: NaiveDate) -> Result<Vec<Event>, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<Event>, RepositoryError>;

    async fn delete_on_or_before(&self, date: NaiveDate) -> Result<u64, RepositoryError>;

    async fn ping(&self) -> Result<(), RepositoryError>;
}
