use std::sync::Arc;

use almanac_agent::{EventStore, StoreError};
use almanac_core::domain::event::parse_iso_date;
use almanac_core::SystemClock;
use almanac_db::{connect_with_settings, migrations, SqlEventRepository};

use crate::commands::{prepare, CommandResult};

const NO_EVENTS: &str = "No events found.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventsQuery {
    pub before: Option<String>,
    pub name: Option<String>,
}

/// Same listings the bot answers with, read straight from the configured store.
pub fn run(query: EventsQuery) -> CommandResult {
    let before = match query.before.as_deref().map(parse_iso_date).transpose() {
        Ok(before) => before,
        Err(error) => {
            return CommandResult::failure("events", "invalid_argument", error.user_message(), 2);
        }
    };

    let (config, runtime) = match prepare("events") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let store =
            EventStore::new(Arc::new(SqlEventRepository::new(pool.clone())), Arc::new(SystemClock));
        let listing = match (before, query.name.as_deref()) {
            (Some(date), _) => store.get_before_date(date).await,
            (None, Some(name)) => store.find_by_name(name).await,
            (None, None) => store.list_all().await,
        }
        .map_err(|error| match error {
            StoreError::Validation(error) => {
                ("invalid_argument", error.user_message().to_string(), 2u8)
            }
            StoreError::Repository(error) => ("db_query", error.to_string(), 4u8),
        })?;

        pool.close().await;
        Ok::<String, (&'static str, String, u8)>(listing)
    });

    match result {
        Ok(listing) if listing.is_empty() => CommandResult::success("events", NO_EVENTS),
        Ok(listing) => CommandResult::success("events", listing),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("events", error_class, message, exit_code)
        }
    }
}
