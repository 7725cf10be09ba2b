//! Reading tables back as lazy sequences.
//!
//! Every strategy hands the caller the same rows in key order; they differ in how many rows are held in memory at once
//! and how many queries are run.  Cursors only live as long as the callback given to [extract], so a consumer that
//! stops early still releases them.
use anyhow::Result;
use log::*;
use rusqlite::{params, Connection, Row, Rows};

use crate::{SelectMapping, SelectShape};

/// The ways of reading a table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum FetchStrategy {
    /// Read every row into memory, then iterate.
    All,
    /// Step one open cursor one row at a time.
    One,
    /// Step one open cursor, buffering a batch of rows per refill.
    Many,
    /// One query per page using `LIMIT` and `OFFSET`.
    LimitOffset,
    /// One query per page, resuming after the last key seen.
    Keyset,
}

impl FetchStrategy {
    pub const ALL: [FetchStrategy; 5] = [
        FetchStrategy::All,
        FetchStrategy::One,
        FetchStrategy::Many,
        FetchStrategy::LimitOffset,
        FetchStrategy::Keyset,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FetchStrategy::All => "fetch all",
            FetchStrategy::One => "fetch one",
            FetchStrategy::Many => "fetch many",
            FetchStrategy::LimitOffset => "limit/offset",
            FetchStrategy::Keyset => "keyset",
        }
    }
}

/// The sequences handed to [extract]'s callback.
pub type RecordIter<'a, T> = dyn Iterator<Item = Result<T>> + 'a;

/// Read `mapping`'s table using `strategy` and give the records to `consume`.
///
/// `batch_size` is the number of rows per refill for [FetchStrategy::Many] and per page for the paging strategies, and
/// must be at least 1 regardless of strategy.  Whatever `consume` returns is returned; the cursor is released before
/// this function returns, however much of the sequence was read.
pub fn extract<T, R>(
    conn: &Connection,
    mapping: &SelectMapping<T>,
    strategy: FetchStrategy,
    batch_size: usize,
    consume: impl FnOnce(&mut RecordIter<'_, T>) -> Result<R>,
) -> Result<R> {
    if batch_size == 0 {
        anyhow::bail!("Batch size must be at least 1");
    }

    debug!("Extracting {} with {}", mapping.get_table(), strategy.name());

    match strategy {
        FetchStrategy::All => {
            let mut statement = conn.prepare(&mapping.select_sql(SelectShape::All)?)?;
            let records = statement
                .query_map([], mapping.reader())?
                .collect::<rusqlite::Result<Vec<T>>>()?;
            consume(&mut records.into_iter().map(Ok::<T, anyhow::Error>))
        }
        FetchStrategy::One => {
            let mut statement = conn.prepare(&mapping.select_sql(SelectShape::All)?)?;
            let mut records = statement
                .query_map([], mapping.reader())?
                .map(|r| r.map_err(anyhow::Error::from));
            consume(&mut records)
        }
        FetchStrategy::Many => {
            let mut statement = conn.prepare(&mapping.select_sql(SelectShape::All)?)?;
            let mut records = Batched {
                rows: statement.query([])?,
                from_row: mapping.reader(),
                batch_size,
                buffer: Vec::new().into_iter(),
                error: None,
                done: false,
            };
            consume(&mut records)
        }
        FetchStrategy::LimitOffset => {
            let mut records = Paged {
                conn,
                mapping,
                page_size: batch_size,
                position: PagePosition::Offset(0),
                buffer: Vec::new().into_iter(),
                done: false,
            };
            consume(&mut records)
        }
        FetchStrategy::Keyset => {
            let mut records = Paged {
                conn,
                mapping,
                page_size: batch_size,
                position: PagePosition::After(None),
                buffer: Vec::new().into_iter(),
                done: false,
            };
            consume(&mut records)
        }
    }
}

/// Pulls rows from one open cursor a batch at a time.
struct Batched<'stmt, T> {
    rows: Rows<'stmt>,
    from_row: fn(&Row<'_>) -> rusqlite::Result<T>,
    batch_size: usize,
    buffer: std::vec::IntoIter<T>,
    /// Reported once the rows read before it have been handed out.
    error: Option<anyhow::Error>,
    done: bool,
}

impl<'stmt, T> Batched<'stmt, T> {
    fn refill(&mut self) {
        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            let failure = match self.rows.next() {
                Ok(Some(row)) => match (self.from_row)(row) {
                    Ok(x) => {
                        batch.push(x);
                        continue;
                    }
                    Err(e) => Some(e),
                },
                Ok(None) => None,
                Err(e) => Some(e),
            };

            self.error = failure.map(Into::into);
            self.done = true;
            break;
        }

        trace!("Fetched a batch of {} rows", batch.len());
        self.buffer = batch.into_iter();
    }
}

impl<'stmt, T> Iterator for Batched<'stmt, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        loop {
            if let Some(x) = self.buffer.next() {
                return Some(Ok(x));
            }
            if let Some(e) = self.error.take() {
                return Some(Err(e));
            }
            if self.done {
                return None;
            }
            self.refill();
        }
    }
}

enum PagePosition {
    /// Rows already read.
    Offset(usize),
    /// Key of the last row read, if any.
    After(Option<i64>),
}

/// Runs one query per page.  No cursor stays open between pages.
struct Paged<'a, T> {
    conn: &'a Connection,
    mapping: &'a SelectMapping<T>,
    page_size: usize,
    position: PagePosition,
    buffer: std::vec::IntoIter<T>,
    done: bool,
}

impl<'a, T> Paged<'a, T> {
    fn fetch_page(&mut self) -> Result<Vec<T>> {
        let limit = i64::try_from(self.page_size)?;
        let reader = self.mapping.reader();

        let page = match &mut self.position {
            PagePosition::Offset(offset) => {
                let sql = self.mapping.select_sql(SelectShape::LimitOffset)?;
                let mut statement = self.conn.prepare_cached(&sql)?;
                let page = statement
                    .query_map(params![limit, i64::try_from(*offset)?], reader)?
                    .collect::<rusqlite::Result<Vec<T>>>()?;
                *offset += page.len();
                page
            }
            PagePosition::After(last) => {
                let page = match *last {
                    None => {
                        let sql = self.mapping.select_sql(SelectShape::KeysetFirst)?;
                        let mut statement = self.conn.prepare_cached(&sql)?;
                        let page = statement
                            .query_map(params![limit], reader)?
                            .collect::<rusqlite::Result<Vec<T>>>()?;
                        page
                    }
                    Some(key) => {
                        let sql = self.mapping.select_sql(SelectShape::KeysetAfter)?;
                        let mut statement = self.conn.prepare_cached(&sql)?;
                        let page = statement
                            .query_map(params![key, limit], reader)?
                            .collect::<rusqlite::Result<Vec<T>>>()?;
                        page
                    }
                };
                if let Some(x) = page.last() {
                    *last = Some(self.mapping.key_of(x));
                }
                page
            }
        };

        trace!("Fetched a page of {} rows", page.len());
        Ok(page)
    }
}

impl<'a, T> Iterator for Paged<'a, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        if let Some(x) = self.buffer.next() {
            return Some(Ok(x));
        }
        if self.done {
            return None;
        }

        match self.fetch_page() {
            Ok(page) => {
                // Only an empty page ends the sequence, so a full last page costs one extra query.
                if page.is_empty() {
                    self.done = true;
                }
                self.buffer = page.into_iter();
                self.buffer.next().map(Ok)
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
