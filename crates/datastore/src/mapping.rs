//! Statically declared mappings between record types and table columns.
//!
//! A mapping is written once per record type and handed to the loader or to extraction by the caller.  Table and column
//! names end up inside SQL, so they must be plain identifiers.
use anyhow::Result;
use itertools::Itertools;
use lazy_static::lazy_static;
use log::*;
use rusqlite::types::Value;
use rusqlite::Row;

lazy_static! {
    static ref IDENTIFIER: regex::Regex =
        regex::Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").expect("Identifier regex should compile");
}

fn check_identifier(kind: &str, name: &str) -> Result<()> {
    if !IDENTIFIER.is_match(name) {
        anyhow::bail!("{} {:?} is not a valid identifier", kind, name);
    }
    Ok(())
}

fn check_columns(columns: &[&str]) -> Result<Vec<String>> {
    if columns.is_empty() {
        anyhow::bail!("A mapping needs at least one column");
    }

    for c in columns {
        check_identifier("Column", c)?;
    }
    if !columns.iter().all_unique() {
        anyhow::bail!("Duplicate column names not allowed");
    }
    Ok(columns.iter().map(|c| c.to_string()).collect())
}

const INSERT_TEMPLATE: &str = r#"
INSERT INTO {{ table }}(
    {{ columns | join(sep=", ") }}
) VALUES
{%- for r in range(end=rows) %}
({% for c in columns %}?{% if not loop.last %}, {% endif %}{% endfor %}){% if not loop.last %},{% endif %}
{%- endfor %}
"#;

/// SQLite's default cap on bound parameters in one statement.
pub const MAX_VARIABLES: usize = 32766;

/// How to insert values of type `T`.
pub struct InsertMapping<T> {
    table: String,
    columns: Vec<String>,
    values: fn(&T) -> Vec<Value>,
}

impl<T> InsertMapping<T> {
    /// Map `T` onto `columns` of `table`.  `values` must return one value per column, in the same order.
    pub fn new(table: &str, columns: &[&str], values: fn(&T) -> Vec<Value>) -> Result<Self> {
        check_identifier("Table", table)?;
        Ok(InsertMapping {
            table: table.to_string(),
            columns: check_columns(columns)?,
            values,
        })
    }

    pub fn get_table(&self) -> &str {
        &self.table
    }

    pub fn iter_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|x| x.as_str())
    }

    /// The values of `item`, one per column.
    pub fn values(&self, item: &T) -> Result<Vec<Value>> {
        let values = (self.values)(item);
        if values.len() != self.columns.len() {
            anyhow::bail!(
                "Mapping for {} produced {} values for {} columns",
                self.table,
                values.len(),
                self.columns.len()
            );
        }
        Ok(values)
    }

    /// An insert of one row.
    pub fn insert_sql(&self) -> Result<String> {
        self.multi_insert_sql(1)
    }

    /// The most rows one multi-row insert can bind without going over [MAX_VARIABLES].
    pub fn max_rows_per_statement(&self) -> usize {
        MAX_VARIABLES / self.columns.len()
    }

    /// One insert statement carrying `rows` rows.
    pub fn multi_insert_sql(&self, rows: usize) -> Result<String> {
        if rows == 0 {
            anyhow::bail!("An insert needs at least one row");
        }
        if rows > self.max_rows_per_statement() {
            anyhow::bail!(
                "{} rows of {} columns need more than {} variables",
                rows,
                self.columns.len(),
                MAX_VARIABLES
            );
        }

        let mut context = tera::Context::new();
        context.insert("table", &self.table);
        context.insert("columns", &self.columns);
        context.insert("rows", &rows);

        let stmt = tera::Tera::one_off(INSERT_TEMPLATE, &context, false)?;
        if rows == 1 {
            debug!("Insert statement for {}: {}", self.table, stmt);
        } else {
            trace!("Insert statement for {} ({} rows): {}", self.table, rows, stmt);
        }
        Ok(stmt)
    }
}

const SELECT_TEMPLATE: &str = r#"
SELECT {{ columns | join(sep=", ") }}
FROM {{ table }}
{%- if after %}
WHERE {{ key }} > ?
{%- endif %}
ORDER BY {{ key }}
{%- if paged %}
LIMIT ?
{%- endif %}
{%- if offset %}
OFFSET ?
{%- endif %}
"#;

/// The kinds of select statement extraction needs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SelectShape {
    /// Everything, in key order.
    All,
    /// One page; parameters are `(limit, offset)`.
    LimitOffset,
    /// The first page of a keyset scan; the parameter is `limit`.
    KeysetFirst,
    /// A following page of a keyset scan; parameters are `(last_key, limit)`.
    KeysetAfter,
}

/// How to read values of type `T` back out of a table.
pub struct SelectMapping<T> {
    table: String,
    key: String,
    columns: Vec<String>,
    from_row: fn(&Row<'_>) -> rusqlite::Result<T>,
    key_of: fn(&T) -> i64,
}

impl<T> SelectMapping<T> {
    /// Read `columns` of `table` ordered by the integer column `key`.
    ///
    /// `from_row` sees the columns in the order given; `key_of` must return the value of `key` for a record, which is
    /// what keyset pagination resumes from.
    pub fn new(
        table: &str,
        key: &str,
        columns: &[&str],
        from_row: fn(&Row<'_>) -> rusqlite::Result<T>,
        key_of: fn(&T) -> i64,
    ) -> Result<Self> {
        check_identifier("Table", table)?;
        check_identifier("Key column", key)?;
        Ok(SelectMapping {
            table: table.to_string(),
            key: key.to_string(),
            columns: check_columns(columns)?,
            from_row,
            key_of,
        })
    }

    pub fn get_table(&self) -> &str {
        &self.table
    }

    pub fn get_key(&self) -> &str {
        &self.key
    }

    pub fn reader(&self) -> fn(&Row<'_>) -> rusqlite::Result<T> {
        self.from_row
    }

    pub fn key_of(&self, item: &T) -> i64 {
        (self.key_of)(item)
    }

    pub fn select_sql(&self, shape: SelectShape) -> Result<String> {
        let mut context = tera::Context::new();
        context.insert("table", &self.table);
        context.insert("key", &self.key);
        context.insert("columns", &self.columns);
        context.insert("after", &(shape == SelectShape::KeysetAfter));
        context.insert("paged", &(shape != SelectShape::All));
        context.insert("offset", &(shape == SelectShape::LimitOffset));

        let stmt = tera::Tera::one_off(SELECT_TEMPLATE, &context, false)?;
        debug!("Select statement for {} ({:?}): {}", self.table, shape, stmt);
        Ok(stmt)
    }
}
