//! Lazy transforms over user records.
//!
//! Output goes to the given writer as one JSON value per line, with a line of dashes between runs.
use std::io::Write;

use anyhow::Result;

use slides_streams::fake::{fake_user_emails, fake_users};
use slides_streams::{
    chunked, drop_even_ids, flatten_users, ichunked, merge_emails, merge_users, reassemble,
};

use super::{TransformDemo, SEPARATOR_WIDTH};

/// Users per fake source.
const USERS: i64 = 5;

pub fn run(demo: TransformDemo, seed: u64, out: &mut dyn Write) -> Result<()> {
    match demo {
        TransformDemo::Unpack => {
            let users = fake_users(USERS, seed).collect::<Vec<_>>();
            print_iterable(out, &users)?;
            separator(out)?;
            print_iterable(out, flatten_users(users))?;
        }
        TransformDemo::Pack => {
            let emails = fake_user_emails(USERS, seed).collect::<Vec<_>>();
            print_iterable(out, &emails)?;
            separator(out)?;
            print_iterable(out, reassemble(emails))?;
        }
        TransformDemo::Chunk => {
            print_iterable(out, chunked(0..95, 20)?)?;
            separator(out)?;

            let mut chunks = ichunked(0..95, 20)?;
            while let Some(chunk) = chunks.next_chunk() {
                print_iterable(out, [chunk.collect::<Vec<_>>()])?;
            }
        }
        TransformDemo::Chain => {
            print_iterable(out, chunked(0..7, 3)?)?;
            separator(out)?;

            print_iterable(out, chunked(0..7, 3)?.flatten())?;
            separator(out)?;

            // Lazy chunks can only be chained by draining each one before asking for the next.
            ichunked(0..7, 3)?.try_for_each_chunk(|chunk| print_iterable(out, chunk))?;
            separator(out)?;

            // Having every lazy chunk in hand before reading any means holding them all in memory.
            let mut held = Vec::new();
            let mut chunks = ichunked(0..7, 3)?;
            while let Some(chunk) = chunks.next_chunk() {
                held.push(chunk.collect::<Vec<_>>());
            }
            print_iterable(out, held.into_iter().flatten())?;
        }
        TransformDemo::Filter => {
            let users = fake_users(USERS, seed).collect::<Vec<_>>();
            print_iterable(out, &users)?;
            separator(out)?;
            print_iterable(out, drop_even_ids(users))?;
        }
        TransformDemo::MergeIterators => {
            let emails = merge_emails(
                fake_user_emails(USERS, seed),
                fake_user_emails(USERS, seed.wrapping_add(1)),
            );
            print_iterable(out, emails)?;
        }
        TransformDemo::MergeObjects => {
            let users = merge_users(
                fake_users(USERS, seed),
                fake_users(USERS, seed.wrapping_add(1)),
            );
            print_iterable(out, users)?;
        }
    }
    Ok(())
}

fn print_iterable<T: serde::Serialize>(
    out: &mut dyn Write,
    items: impl IntoIterator<Item = T>,
) -> Result<()> {
    for item in items {
        serde_json::to_writer(&mut *out, &item)?;
        writeln!(out)?;
    }
    Ok(())
}

fn separator(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use slides_streams::{User, UserEmail};

    fn output_of(demo: TransformDemo) -> Vec<String> {
        let mut buf = vec![];
        run(demo, 7, &mut buf).unwrap();
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(|x| x.to_string())
            .collect()
    }

    /// Split output into runs at the separators.
    fn runs(lines: &[String]) -> Vec<Vec<String>> {
        lines
            .split(|l| l.starts_with("---"))
            .map(|r| r.to_vec())
            .collect()
    }

    #[test]
    fn chain_prints_the_same_sequence_three_more_ways() {
        let lines = output_of(TransformDemo::Chain);
        let runs = runs(&lines);
        assert_eq!(runs[0], vec!["[0,1,2]", "[3,4,5]", "[6]"]);
        let flat = (0..7).map(|x| x.to_string()).collect::<Vec<_>>();
        assert_eq!(runs.len(), 4);
        assert_eq!(runs[1], flat);
        assert_eq!(runs[2], flat);
        assert_eq!(runs[3], flat);
    }

    #[test]
    fn chunk_prints_five_chunks_twice() {
        let lines = output_of(TransformDemo::Chunk);
        let runs = runs(&lines);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], runs[1]);
        assert_eq!(runs[0].len(), 5);
    }

    #[test]
    fn pack_reverses_unpack() {
        let unpacked = runs(&output_of(TransformDemo::Unpack));
        let users = unpacked[0]
            .iter()
            .map(|l| serde_json::from_str::<User>(l).unwrap())
            .collect::<Vec<_>>();
        let emails = unpacked[1]
            .iter()
            .map(|l| serde_json::from_str::<UserEmail>(l).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(reassemble(emails).collect::<Vec<_>>(), users);
    }

    #[test]
    fn filter_keeps_odd_ids() {
        let runs = runs(&output_of(TransformDemo::Filter));
        let ids = runs[1]
            .iter()
            .map(|l| serde_json::from_str::<User>(l).unwrap().id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn merged_users_are_unique_and_ordered() {
        let lines = output_of(TransformDemo::MergeObjects);
        let users = lines
            .iter()
            .map(|l| serde_json::from_str::<User>(l).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), (0..USERS).collect::<Vec<_>>());
        assert!(users.iter().all(|u| (6..9).contains(&u.emails.len())));
    }

    #[test]
    fn merged_emails_are_ordered() {
        let lines = output_of(TransformDemo::MergeIterators);
        let ids = lines
            .iter()
            .map(|l| serde_json::from_str::<UserEmail>(l).unwrap().user_id)
            .collect::<Vec<_>>();
        assert!(ids.windows(2).all(|w| w[0] <= w[1]));
        assert!(ids.len() >= 30);
    }
}
