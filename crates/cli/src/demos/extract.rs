//! Reading users back with every fetch strategy.
use anyhow::Result;
use log::*;
use rusqlite::Connection;

use slides_datastore::users::*;
use slides_datastore::{extract, FetchStrategy, Loader};
use slides_logging::profile;

use super::SEPARATOR_WIDTH;

/// Load `size` fake users, then read them all back with each strategy.
///
/// Returns how many users each strategy saw, in [FetchStrategy::ALL] order.
pub fn run(conn: &mut Connection, size: usize, chunk_size: usize, seed: u64) -> Result<Vec<usize>> {
    let select = stored_user_mapping()?;

    with_users_table(conn, |conn| {
        let loader = Loader::new(chunk_size)?;
        profile("loading", || {
            loader.load(conn, fake_new_users(size, seed), &new_user_mapping()?)
        })?;
        info!("{}", "-".repeat(SEPARATOR_WIDTH));

        let mut counts = vec![];
        for strategy in FetchStrategy::ALL {
            let count = profile(strategy.name(), || {
                extract(conn, &select, strategy, chunk_size, |users| {
                    let mut count = 0;
                    for u in users {
                        u?;
                        count += 1;
                    }
                    Ok(count)
                })
            })?;

            info!("{}: {} users", strategy.name(), count);
            info!("{}", "-".repeat(SEPARATOR_WIDTH));
            counts.push(count);
        }
        Ok(counts)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_strategy_sees_every_user() {
        let mut conn = Connection::open_in_memory().unwrap();
        let counts = run(&mut conn, 42, 5, 3).unwrap();
        assert_eq!(counts, vec![42; FetchStrategy::ALL.len()]);
    }
}
