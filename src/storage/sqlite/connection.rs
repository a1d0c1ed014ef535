//! Connection handling for the `SQLite` handle.
//!
//! Mutex acquisition with poison recovery and per-connection pragmas.

use crate::config::ConnectionSettings;
use crate::{Error, Result};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Helper to acquire mutex lock with poison recovery.
///
/// If the mutex is poisoned (a previous holder panicked), the inner
/// connection is recovered and a warning is logged. The connection itself
/// is still usable after a panic in caller code.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("SQLite mutex was poisoned, recovering");
            metrics::counter!("litestore_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Configures a `SQLite` connection.
///
/// # Configuration Applied
///
/// - **`busy_timeout`**: waits on a locked database instead of failing at once
/// - **WAL mode** (when enabled): concurrent readers with a single writer
/// - **NORMAL synchronous** (with WAL): balances durability with performance
///
/// In-memory databases silently keep their `memory` journal mode.
///
/// # Errors
///
/// Returns [`Error::Connection`] if the busy timeout cannot be set.
pub fn configure_connection(conn: &Connection, settings: &ConnectionSettings) -> Result<()> {
    conn.busy_timeout(Duration::from_millis(settings.busy_timeout_ms))
        .map_err(|e| Error::Connection {
            path: conn.path().unwrap_or(":memory:").to_string(),
            cause: e.to_string(),
        })?;

    if settings.wal {
        // journal_mode returns the resulting mode as a row, so pragma_update
        // is used and its result ignored.
        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    }

    Ok(())
}
