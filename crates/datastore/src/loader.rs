//! Inserting lazy sequences of records.
use anyhow::Result;
use log::*;
use rusqlite::{params_from_iter, Connection};

use slides_streams::ichunked;

use crate::InsertMapping;

/// The ways of getting rows into a table.
///
/// All of them insert exactly the records they are given; they differ in how many statements are prepared, how many
/// round trips are made, and how often we commit.  The chunked strategies commit once per chunk, so a failure leaves
/// earlier chunks in the table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum LoadStrategy {
    /// Prepare and run a single-row insert for every record; commit at the end.
    Single,
    /// Prepare one single-row insert and run it for every record; commit at the end.
    Many,
    /// Collect every record and insert them with one multi-row statement.
    SingleQuery,
    /// [LoadStrategy::Single], committing after every chunk.
    SingleChunks,
    /// [LoadStrategy::Many], committing after every chunk.
    ManyChunks,
    /// One multi-row statement per chunk, committing after every chunk.
    SingleQueryChunks,
}

impl LoadStrategy {
    pub const ALL: [LoadStrategy; 6] = [
        LoadStrategy::Single,
        LoadStrategy::Many,
        LoadStrategy::SingleQuery,
        LoadStrategy::SingleChunks,
        LoadStrategy::ManyChunks,
        LoadStrategy::SingleQueryChunks,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LoadStrategy::Single => "execute single",
            LoadStrategy::Many => "execute many",
            LoadStrategy::SingleQuery => "execute single query",
            LoadStrategy::SingleChunks => "execute single, chunked",
            LoadStrategy::ManyChunks => "execute many, chunked",
            LoadStrategy::SingleQueryChunks => "execute single query, chunked",
        }
    }
}

/// Loads records in chunks of a fixed size.
#[derive(Copy, Clone, Debug)]
pub struct Loader {
    chunk_size: usize,
}

impl Loader {
    pub fn new(chunk_size: usize) -> Result<Loader> {
        if chunk_size == 0 {
            anyhow::bail!("Chunk size must be at least 1");
        }
        Ok(Loader { chunk_size })
    }

    pub fn get_chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Whether `strategy` can load `rows` records through `mapping` without a statement going over SQLite's variable
    /// cap.  Only the multi-row strategies can.
    pub fn fits<T>(&self, strategy: LoadStrategy, rows: usize, mapping: &InsertMapping<T>) -> bool {
        let per_statement = match strategy {
            LoadStrategy::SingleQuery => rows,
            LoadStrategy::SingleQueryChunks => rows.min(self.chunk_size),
            _ => return true,
        };
        per_statement <= mapping.max_rows_per_statement()
    }

    /// Insert `records` with one prepared statement, committing once per chunk.
    ///
    /// Returns how many rows were inserted.  On error, chunks committed before the failing one stay committed.
    pub fn load<T>(
        &self,
        conn: &mut Connection,
        records: impl IntoIterator<Item = T>,
        mapping: &InsertMapping<T>,
    ) -> Result<usize> {
        self.load_with(LoadStrategy::ManyChunks, conn, records, mapping)
    }

    /// Insert `records` using `strategy`, returning how many rows were inserted.
    pub fn load_with<T>(
        &self,
        strategy: LoadStrategy,
        conn: &mut Connection,
        records: impl IntoIterator<Item = T>,
        mapping: &InsertMapping<T>,
    ) -> Result<usize> {
        let records = records.into_iter();
        let inserted = match strategy {
            LoadStrategy::Single => {
                let tx = conn.transaction()?;
                let count = execute_single(&tx, records, mapping)?;
                tx.commit()?;
                count
            }
            LoadStrategy::Many => {
                let tx = conn.transaction()?;
                let count = execute_many(&tx, records, mapping)?;
                tx.commit()?;
                count
            }
            LoadStrategy::SingleQuery => {
                let tx = conn.transaction()?;
                let count = execute_single_query(&tx, records.collect(), mapping)?;
                tx.commit()?;
                count
            }
            LoadStrategy::SingleChunks => {
                self.per_chunk(conn, records, |tx, chunk| execute_single(tx, chunk, mapping))?
            }
            LoadStrategy::ManyChunks => {
                self.per_chunk(conn, records, |tx, chunk| execute_many(tx, chunk, mapping))?
            }
            LoadStrategy::SingleQueryChunks => self.per_chunk(conn, records, |tx, chunk| {
                execute_single_query(tx, chunk.collect(), mapping)
            })?,
        };

        info!(
            "Loaded {} rows into {} with {}",
            inserted,
            mapping.get_table(),
            strategy.name()
        );
        Ok(inserted)
    }

    /// Run `insert` over each lazy chunk of `records` in its own transaction.
    fn per_chunk<T, I: Iterator<Item = T>>(
        &self,
        conn: &mut Connection,
        records: I,
        mut insert: impl FnMut(&Connection, &mut dyn Iterator<Item = T>) -> Result<usize>,
    ) -> Result<usize> {
        let mut total = 0;
        let mut batches = 0;

        ichunked(records, self.chunk_size)?.try_for_each_chunk(|mut chunk| -> Result<()> {
            let tx = conn.transaction()?;
            let count = insert(&*tx, &mut chunk)?;
            tx.commit()?;

            total += count;
            batches += 1;
            debug!("Committed batch {} ({} rows)", batches, count);
            Ok(())
        })?;

        Ok(total)
    }
}

/// Prepare a fresh statement for every record.
fn execute_single<T>(
    conn: &Connection,
    records: impl Iterator<Item = T>,
    mapping: &InsertMapping<T>,
) -> Result<usize> {
    let sql = mapping.insert_sql()?;
    let mut count = 0;
    for r in records {
        conn.execute(&sql, params_from_iter(mapping.values(&r)?))?;
        count += 1;
    }
    Ok(count)
}

/// Prepare once and rebind for every record.
fn execute_many<T>(
    conn: &Connection,
    records: impl Iterator<Item = T>,
    mapping: &InsertMapping<T>,
) -> Result<usize> {
    let mut statement = conn.prepare(&mapping.insert_sql()?)?;
    let mut count = 0;
    for r in records {
        statement.execute(params_from_iter(mapping.values(&r)?))?;
        count += 1;
    }
    Ok(count)
}

/// Insert everything in `records` with one statement.
fn execute_single_query<T>(
    conn: &Connection,
    records: Vec<T>,
    mapping: &InsertMapping<T>,
) -> Result<usize> {
    if records.is_empty() {
        return Ok(0);
    }

    let sql = mapping.multi_insert_sql(records.len())?;
    let mut values = Vec::with_capacity(records.len() * mapping.iter_columns().count());
    for r in records.iter() {
        values.extend(mapping.values(r)?);
    }

    conn.execute(&sql, params_from_iter(values))?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rusqlite::types::Value;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t(v INTEGER NOT NULL CHECK (v < 10), label TEXT NOT NULL)")
            .unwrap();
        conn
    }

    fn mapping() -> InsertMapping<i64> {
        InsertMapping::new("t", &["v", "label"], |v| {
            vec![Value::Integer(*v), Value::Text(format!("row{}", v))]
        })
        .unwrap()
    }

    fn stored(conn: &Connection) -> Vec<(i64, String)> {
        let mut stmt = conn.prepare("SELECT v, label FROM t ORDER BY rowid").unwrap();
        let rows = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        rows
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(Loader::new(0).is_err());
    }

    #[test]
    fn every_strategy_loads_everything() {
        for strategy in LoadStrategy::ALL {
            let mut conn = test_conn();
            let loaded = Loader::new(3)
                .unwrap()
                .load_with(strategy, &mut conn, 0..8, &mapping())
                .unwrap();
            assert_eq!(loaded, 8, "{}", strategy.name());
            assert_eq!(
                stored(&conn),
                (0..8).map(|v| (v, format!("row{}", v))).collect::<Vec<_>>(),
                "{}",
                strategy.name()
            );
        }
    }

    #[test]
    fn empty_input_loads_nothing() {
        for strategy in LoadStrategy::ALL {
            let mut conn = test_conn();
            let loaded = Loader::new(3)
                .unwrap()
                .load_with(strategy, &mut conn, std::iter::empty(), &mapping())
                .unwrap();
            assert_eq!(loaded, 0);
            assert!(stored(&conn).is_empty());
        }
    }

    #[test]
    fn failed_chunk_keeps_earlier_chunks() {
        let mut conn = test_conn();
        // 10 violates the check constraint, so the third chunk (8..12) fails.
        let res = Loader::new(4).unwrap().load(&mut conn, 0..20, &mapping());
        assert!(res.is_err());
        assert_eq!(
            stored(&conn).into_iter().map(|x| x.0).collect::<Vec<_>>(),
            (0..8).collect::<Vec<_>>()
        );
    }

    #[test]
    fn failure_without_chunks_keeps_nothing() {
        let mut conn = test_conn();
        let res = Loader::new(4)
            .unwrap()
            .load_with(LoadStrategy::Many, &mut conn, 0..20, &mapping());
        assert!(res.is_err());
        assert!(stored(&conn).is_empty());
    }

    #[test]
    fn single_query_over_the_variable_cap_fails_cleanly() {
        let mut conn = test_conn();
        let rows = mapping().max_rows_per_statement() + 1;
        let loader = Loader::new(500).unwrap();
        assert!(!loader.fits(LoadStrategy::SingleQuery, rows, &mapping()));
        assert!(loader.fits(LoadStrategy::SingleQueryChunks, rows, &mapping()));
        assert!(loader.fits(LoadStrategy::Many, rows, &mapping()));

        let res = loader.load_with(LoadStrategy::SingleQuery, &mut conn, 0..rows as i64, &mapping());
        assert!(res.is_err());
        assert!(stored(&conn).is_empty());
    }

    #[test]
    fn huge_chunks_do_not_fit() {
        let loader = Loader::new(20_000).unwrap();
        assert!(loader.fits(LoadStrategy::SingleQueryChunks, 100, &mapping()));
        assert!(!loader.fits(LoadStrategy::SingleQueryChunks, 20_000, &mapping()));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]
        #[test]
        fn strategies_are_interchangeable(strategy: LoadStrategy, count in 0..10i64, chunk_size in 1..5usize) {
            let mut conn = test_conn();
            let loaded = Loader::new(chunk_size).unwrap().load_with(strategy, &mut conn, 0..count, &mapping()).unwrap();
            prop_assert_eq!(loaded, count as usize);
            prop_assert_eq!(stored(&conn).into_iter().map(|x| x.0).collect::<Vec<_>>(), (0..count).collect::<Vec<_>>());
        }
    }
}
