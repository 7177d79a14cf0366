use std::collections::HashSet;

use almanac_db::{connect_with_settings, migrations, ping, DbPool};

use crate::commands::{prepare, CommandResult};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("start") {
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
        ping(&pool).await.map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        let pending = pending_migrations(&pool).await;
        pool.close().await;
        Ok::<usize, (&'static str, String, u8)>(pending)
    });

    match result {
        Ok(pending) => CommandResult::success(
            "start",
            format!(
                "preflight passed: configuration valid, database reachable, {pending} pending \
                 migration(s) will be applied when almanac-server starts"
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("start", error_class, message, exit_code)
        }
    }
}

async fn pending_migrations(pool: &DbPool) -> usize {
    // A missing bookkeeping table means nothing has been applied yet.
    let applied: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await
            .map(|versions| versions.into_iter().collect())
            .unwrap_or_default();

    migrations::MIGRATOR
        .iter()
        .filter(|migration| migration.migration_type.is_up_migration())
        .filter(|migration| !applied.contains(&migration.version))
        .count()
}
