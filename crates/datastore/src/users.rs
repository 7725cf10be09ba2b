//! The `users` table the load and extract demos share, and the records that go in and out of it.
use anyhow::Result;
use log::*;
use rusqlite::types::Value;
use rusqlite::Connection;

use slides_streams::fake::Faker;

use crate::{InsertMapping, SelectMapping};

pub const USERS_TABLE: &str = "users";

/// A user about to be inserted; the database assigns the id.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NewUser {
    pub name: String,
    pub description: String,
}

/// A user read back out of the database.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoredUser {
    pub id: i64,
    pub name: String,
    pub description: String,
}

pub fn new_user_mapping() -> Result<InsertMapping<NewUser>> {
    InsertMapping::new(USERS_TABLE, &["name", "description"], |u| {
        vec![
            Value::Text(u.name.clone()),
            Value::Text(u.description.clone()),
        ]
    })
}

pub fn stored_user_mapping() -> Result<SelectMapping<StoredUser>> {
    SelectMapping::new(
        USERS_TABLE,
        "id",
        &["id", "name", "description"],
        |r| {
            Ok(StoredUser {
                id: r.get(0)?,
                name: r.get(1)?,
                description: r.get(2)?,
            })
        },
        |u| u.id,
    )
}

/// `count` fake users, generated lazily.
pub fn fake_new_users(count: usize, seed: u64) -> impl Iterator<Item = NewUser> {
    let mut faker = Faker::new(seed);
    (0..count).map(move |_| NewUser {
        name: faker.name(),
        description: faker.text(),
    })
}

pub fn create_users_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users(
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL
        )
        "#,
    )?;
    Ok(())
}

/// Delete every row, keeping the table.
pub fn truncate_users_table(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM users", [])?;
    Ok(())
}

pub fn drop_users_table(conn: &Connection) -> Result<()> {
    conn.execute("DROP TABLE IF EXISTS users", [])?;
    Ok(())
}

pub fn count_users(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT count(*) FROM users", [], |r| r.get(0))?)
}

/// Create the users table, run `work`, and drop the table again whether or not `work` succeeded.
///
/// An error from `work` wins over an error from dropping.
pub fn with_users_table<R>(
    conn: &mut Connection,
    work: impl FnOnce(&mut Connection) -> Result<R>,
) -> Result<R> {
    create_users_table(conn)?;
    debug!("Created the {} table", USERS_TABLE);

    let out = work(conn);
    let dropped = drop_users_table(conn);
    debug!("Dropped the {} table", USERS_TABLE);

    let out = out?;
    dropped?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::{extract, FetchStrategy, Loader};

    fn table_exists(conn: &Connection) -> bool {
        conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'users'")
            .unwrap()
            .exists([])
            .unwrap()
    }

    #[test]
    fn load_then_extract() {
        let mut conn = Connection::open_in_memory().unwrap();
        let users = fake_new_users(25, 4).collect::<Vec<_>>();

        let stored = with_users_table(&mut conn, |conn| {
            Loader::new(10)?.load(conn, users.clone(), &new_user_mapping()?)?;
            assert_eq!(count_users(conn)?, 25);

            extract(
                conn,
                &stored_user_mapping()?,
                FetchStrategy::Keyset,
                7,
                |items| items.collect::<Result<Vec<_>>>(),
            )
        })
        .unwrap();

        assert_eq!(
            stored
                .into_iter()
                .map(|u| NewUser {
                    name: u.name,
                    description: u.description,
                })
                .collect::<Vec<_>>(),
            users
        );
        assert!(!table_exists(&conn));
    }

    #[test]
    fn table_is_dropped_on_failure() {
        let mut conn = Connection::open_in_memory().unwrap();
        let res: Result<()> = with_users_table(&mut conn, |conn| {
            assert!(table_exists(conn));
            anyhow::bail!("demo failed")
        });
        assert_eq!(res.unwrap_err().to_string(), "demo failed");
        assert!(!table_exists(&conn));
    }

    #[test]
    fn truncate_keeps_the_table() {
        let mut conn = Connection::open_in_memory().unwrap();
        create_users_table(&conn).unwrap();
        Loader::new(2)
            .unwrap()
            .load(&mut conn, fake_new_users(5, 0), &new_user_mapping().unwrap())
            .unwrap();
        truncate_users_table(&conn).unwrap();
        assert_eq!(count_users(&conn).unwrap(), 0);
        assert!(table_exists(&conn));
    }

    #[test]
    fn fake_users_look_real_enough() {
        let users = fake_new_users(3, 11).collect::<Vec<_>>();
        assert_eq!(users.len(), 3);
        assert!(users.iter().all(|u| u.name.contains(' ') && u.description.ends_with('.')));
        assert_eq!(users, fake_new_users(3, 11).collect::<Vec<_>>());
    }
}
