use chrono::NaiveDate;
use tokio::sync::RwLock;

use almanac_core::domain::event::{Event, EventId, NewEvent};

use super::{EventRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryEventRepository {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    events: Vec<Event>,
}

impl InMemoryEventRepository {
    pub fn with_events(events: impl IntoIterator<Item = NewEvent>) -> Self {
        let mut state = MemoryState::default();
        for event in events {
            state.push(event);
        }
        Self { state: RwLock::new(state) }
    }
}

impl MemoryState {
    fn push(&mut self, event: NewEvent) -> EventId {
        self.next_id += 1;
        let id = EventId(self.next_id);
        self.events.push(Event { id, name: event.name, date: event.date });
        id
    }
}

#[async_trait::async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn insert(&self, event: NewEvent) -> Result<EventId, RepositoryError> {
        let mut state = self.state.write().await;
        Ok(state.push(event))
    }

    async fn update_first_date_by_name(
        &self,
        name: &str,
        date: NaiveDate,
    ) -> Result<u64, RepositoryError> {
        let mut state = self.state.write().await;
        match state.events.iter_mut().find(|event| event.name == name) {
            Some(event) => {
                event.date = date;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Event>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.events.iter().filter(|event| event.name == name).cloned().collect())
    }

    async fn list_on_or_before(&self, date: NaiveDate) -> Result<Vec<Event>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.events.iter().filter(|event| event.date <= date).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<Event>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.events.clone())
    }

    async fn delete_on_or_before(&self, date: NaiveDate) -> Result<u64, RepositoryError> {
        let mut state = self.state.write().await;
        let before = state.events.len();
        state.events.retain(|event| event.date > date);
        Ok((before - state.events.len()) as u64)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use almanac_core::domain::event::NewEvent;

    use crate::repositories::{EventRepository, InMemoryEventRepository};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn event(name: &str, when: NaiveDate) -> NewEvent {
        NewEvent::new(name, when).expect("new event")
    }

    #[tokio::test]
    async fn in_memory_repo_matches_sql_ordering_and_update_rules() {
        let repo = InMemoryEventRepository::with_events([
            event("review", date(2025, 3, 1)),
            event("review", date(2025, 3, 8)),
        ]);

        let affected =
            repo.update_first_date_by_name("review", date(2025, 4, 1)).await.expect("update");
        assert_eq!(affected, 1);

        let found = repo.find_by_name("review").await.expect("find");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].date, date(2025, 4, 1));
        assert_eq!(found[1].date, date(2025, 3, 8));
        assert!(found[0].id < found[1].id);
    }

    #[tokio::test]
    async fn delete_on_or_before_reports_removed_count() {
        let repo = InMemoryEventRepository::default();
        repo.insert(event("old", date(2024, 1, 1))).await.expect("insert");
        repo.insert(event("today", date(2025, 6, 1))).await.expect("insert");
        repo.insert(event("later", date(2025, 7, 1))).await.expect("insert");

        assert_eq!(repo.delete_on_or_before(date(2025, 6, 1)).await.expect("delete"), 2);
        assert_eq!(repo.delete_on_or_before(date(2025, 6, 1)).await.expect("delete"), 0);
        assert_eq!(repo.list_all().await.expect("list").len(), 1);
    }
}
