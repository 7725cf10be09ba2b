//! Inserting fake users with every load strategy.
use anyhow::Result;
use log::*;
use rusqlite::Connection;

use slides_datastore::users::*;
use slides_datastore::{InsertMapping, LoadStrategy, Loader};
use slides_logging::profile;

use super::SEPARATOR_WIDTH;

/// Load `size` fake users with each strategy in turn, emptying the table in between.
///
/// The table is dropped afterwards even if a strategy fails.
pub fn run(conn: &mut Connection, size: usize, chunk_size: usize, seed: u64) -> Result<()> {
    let loader = Loader::new(chunk_size)?;
    let mapping = new_user_mapping()?;

    with_users_table(conn, |conn| {
        for strategy in runnable(&loader, size, &mapping) {
            let users = fake_new_users(size, seed);
            let loaded = profile(strategy.name(), || {
                loader.load_with(strategy, conn, users, &mapping)
            })?;
            debug!("{} left {} rows behind", strategy.name(), count_users(conn)?);
            truncate_users_table(conn)?;

            info!("{}: {} users", strategy.name(), loaded);
            info!("{}", "-".repeat(SEPARATOR_WIDTH));
        }
        Ok(())
    })
}

/// The strategies that can load `size` rows, warning about the rest.
fn runnable<T>(loader: &Loader, size: usize, mapping: &InsertMapping<T>) -> Vec<LoadStrategy> {
    LoadStrategy::ALL
        .into_iter()
        .filter(|s| {
            let fits = loader.fits(*s, size, mapping);
            if !fits {
                warn!(
                    "Skipping {}: {} users need more variables than one statement can bind",
                    s.name(),
                    size
                );
            }
            fits
        })
        .collect()
}
