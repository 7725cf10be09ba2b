//! Opening and closing connections.
use std::time::Duration;

use anyhow::Result;
use log::*;
use rusqlite::Connection;

use crate::DbSettings;

/// SQL that we run as part of opening a connection.
///
/// - Raises the default cache size, which sqlite keeps small so that it works on phones.
/// - Enables foreign key enforcement (though we don't expect foreign keys to be used).
const INITIAL_SQL: &str = r#"
PRAGMA cache_size = -100000;
PRAGMA foreign_keys = 1;
"#;

/// Only for databases on disk; in-memory databases can't use WAL.
const FILE_SQL: &str = r#"
PRAGMA journal_mode = WAL;
"#;

/// Open a connection with our pragmas applied.
///
/// Dropping the connection closes it.  Prefer [with_connection], which also reports errors from closing.
pub fn open_connection(settings: &DbSettings) -> Result<Connection> {
    let conn = match settings.path.as_ref() {
        Some(path) => {
            info!("Opening database at {}", path.display());
            let conn = Connection::open(path)?;
            conn.execute_batch(FILE_SQL)?;
            conn
        }
        None => {
            info!("Opening in-memory database");
            Connection::open_in_memory()?
        }
    };

    conn.busy_timeout(Duration::from_millis(settings.busy_timeout_ms))?;
    conn.execute_batch(INITIAL_SQL)?;
    Ok(conn)
}

/// Open a connection, run `work` with it, and close it whether or not `work` succeeded.
///
/// An error from `work` wins over an error from closing.
pub fn with_connection<R>(
    settings: &DbSettings,
    work: impl FnOnce(&mut Connection) -> Result<R>,
) -> Result<R> {
    let mut conn = open_connection(settings)?;
    let out = work(&mut conn);

    let closed = conn.close().map_err(|(_, e)| e);
    debug!("Closed database");

    let out = out?;
    closed?;
    Ok(out)
}
