//! Event store operations as seen from chat: every call answers with reply text.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use almanac_core::domain::event::{Event, NewEvent};
use almanac_core::{Clock, DomainError};
use almanac_db::{EventRepository, RepositoryError};

pub const EVENT_ADDED: &str = "Event added successfully";
pub const EVENT_UPDATED: &str = "Event updated successfully";
pub const EVENT_NOT_FOUND: &str = "Event not found.";
pub const EVENTS_DELETED: &str = "Events deleted successfully.";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error("event store failure: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct EventStore {
    repository: Arc<dyn EventRepository>,
    clock: Arc<dyn Clock>,
}

impl EventStore {
    pub fn new(repository: Arc<dyn EventRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Every record, one line each; empty when the store is empty.
    pub async fn list_all(&self) -> Result<String, StoreError> {
        let events = self.repository.list_all().await?;
        Ok(format_event_lines(&events))
    }

    pub async fn add(&self, name: &str, date: NaiveDate) -> Result<String, StoreError> {
        let event = NewEvent::new(name, date)?;
        let id = self.repository.insert(event).await?;
        info!(event_name = "agent.store.event_added", event_id = id.0, "event added");
        Ok(EVENT_ADDED.to_string())
    }

    /// Moves the oldest record with this exact name to `date`.
    pub async fn update(&self, name: &str, date: NaiveDate) -> Result<String, StoreError> {
        let affected = self.repository.update_first_date_by_name(name, date).await?;
        if affected == 0 {
            info!(event_name = "agent.store.update_missed", "no event with that name");
            return Ok(EVENT_NOT_FOUND.to_string());
        }
        Ok(EVENT_UPDATED.to_string())
    }

    /// Records dated on or before `date`. Dates before today are refused
    /// without reading the store.
    pub async fn get_before_date(&self, date: NaiveDate) -> Result<String, StoreError> {
        let today = self.today();
        if date < today {
            return Err(DomainError::DateInPast { date, today }.into());
        }
        let events = self.repository.list_on_or_before(date).await?;
        Ok(format_event_lines(&events))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<String, StoreError> {
        let events = self.repository.find_by_name(name).await?;
        if events.is_empty() {
            return Ok(EVENT_NOT_FOUND.to_string());
        }
        Ok(events
            .iter()
            .map(|event| format!("Date: {}", event.display_date()))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub async fn delete_before(&self, date: NaiveDate) -> Result<String, StoreError> {
        let deleted = self.repository.delete_on_or_before(date).await?;
        info!(event_name = "agent.store.events_deleted", deleted, "past events deleted");
        Ok(EVENTS_DELETED.to_string())
    }
}

fn format_event_lines(events: &[Event]) -> String {
    events
        .iter()
        .map(|event| format!("Event: {} | Date: {}", event.name, event.display_date()))
        .collect::<Vec<_>>()
        .join("\n")
}
