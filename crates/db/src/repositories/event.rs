use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::Row;

use almanac_core::domain::event::{format_iso_date, parse_iso_date, Event, EventId, NewEvent};

use super::{EventRepository, RepositoryError};
use crate::DbPool;

pub struct SqlEventRepository {
    pool: DbPool,
}

impl SqlEventRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<Event, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let date_str: String =
        row.try_get("event_date").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let date = parse_iso_date(&date_str).map_err(|e| {
        RepositoryError::Decode(format!("event {id} has unreadable event_date: {e}"))
    })?;

    Ok(Event { id: EventId(id), name, date })
}

fn rows_to_events(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<Event>, RepositoryError> {
    rows.iter().map(row_to_event).collect()
}

#[async_trait]
impl EventRepository for SqlEventRepository {
    async fn insert(&self, event: NewEvent) -> Result<EventId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO event (name, event_date, created_at) VALUES (?, ?, ?)",
        )
        .bind(&event.name)
        .bind(format_iso_date(event.date))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(EventId(result.last_insert_rowid()))
    }

    async fn update_first_date_by_name(
        &self,
        name: &str,
        date: NaiveDate,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE event SET event_date = ?
             WHERE id = (SELECT id FROM event WHERE name = ? ORDER BY id LIMIT 1)",
        )
        .bind(format_iso_date(date))
        .bind(name)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Event>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, event_date FROM event WHERE name = ? ORDER BY id")
            .bind(name)
            .fetch_all(&self.pool)
            .await?;

        rows_to_events(rows)
    }

    async fn list_on_or_before(&self, date: NaiveDate) -> Result<Vec<Event>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, event_date FROM event WHERE event_date <= ? ORDER BY id",
        )
        .bind(format_iso_date(date))
        .fetch_all(&self.pool)
        .await?;

        rows_to_events(rows)
    }

    async fn list_all(&self) -> Result<Vec<Event>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, event_date FROM event ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows_to_events(rows)
    }

    async fn delete_on_or_before(&self, date: NaiveDate) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM event WHERE event_date <= ?")
            .bind(format_iso_date(date))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        crate::connection::ping(&self.pool).await.map_err(RepositoryError::from)
    }
}
