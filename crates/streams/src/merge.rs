//! Two-way streaming merges.
//!
//! Both merges assume their inputs are already ordered by key and only interleave them; they never sort.  Out of order
//! input produces out of order output rather than an error.  Each side buffers at most one element, pulled only when a
//! comparison needs it, and once one side runs dry the other is passed through without further comparisons.
use std::cmp::Ordering;
use std::iter::Fuse;

use crate::{User, UserEmail};

/// One input of a merge plus the element we pulled from it but haven't emitted yet.
struct Side<I: Iterator> {
    source: Fuse<I>,
    head: Option<I::Item>,
}

impl<I: Iterator> Side<I> {
    fn new(source: I) -> Self {
        Side {
            source: source.fuse(),
            head: None,
        }
    }

    /// Make sure the head is filled, if there is anything left.
    fn peek(&mut self) -> Option<&I::Item> {
        if self.head.is_none() {
            self.head = self.source.next();
        }
        self.head.as_ref()
    }

    /// Take the head if there is one, otherwise the next element.
    fn pop(&mut self) -> Option<I::Item> {
        self.head.take().or_else(|| self.source.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.source.size_hint();
        let buffered = usize::from(self.head.is_some());
        (
            lower.saturating_add(buffered),
            upper.and_then(|x| x.checked_add(buffered)),
        )
    }
}

/// Merge two sequences of emails, each non-decreasing by `user_id`.
///
/// When the heads have equal ids the right side goes first, so all of the right side's emails for an id come out before
/// any of the left side's.  Emails sharing an id are never combined.
pub fn merge_emails<L, R>(left: L, right: R) -> MergeEmails<L::IntoIter, R::IntoIter>
where
    L: IntoIterator<Item = UserEmail>,
    R: IntoIterator<Item = UserEmail>,
{
    MergeEmails {
        left: Side::new(left.into_iter()),
        right: Side::new(right.into_iter()),
    }
}

/// Iterator returned by [merge_emails].
pub struct MergeEmails<L: Iterator, R: Iterator> {
    left: Side<L>,
    right: Side<R>,
}

impl<L, R> Iterator for MergeEmails<L, R>
where
    L: Iterator<Item = UserEmail>,
    R: Iterator<Item = UserEmail>,
{
    type Item = UserEmail;

    fn next(&mut self) -> Option<UserEmail> {
        let left_key = match self.left.peek() {
            Some(e) => e.user_id,
            None => return self.right.pop(),
        };
        let right_key = match self.right.peek() {
            Some(e) => e.user_id,
            None => return self.left.pop(),
        };

        if right_key > left_key {
            self.left.pop()
        } else {
            self.right.pop()
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (l_lower, l_upper) = self.left.size_hint();
        let (r_lower, r_upper) = self.right.size_hint();
        let upper = match (l_upper, r_upper) {
            (Some(l), Some(r)) => l.checked_add(r),
            _ => None,
        };
        (l_lower.saturating_add(r_lower), upper)
    }
}

/// Merge two sequences of users, each strictly increasing by `id`.
///
/// A user present on both sides comes out once, with the left side's emails followed by the right side's.
pub fn merge_users<L, R>(left: L, right: R) -> MergeUsers<L::IntoIter, R::IntoIter>
where
    L: IntoIterator<Item = User>,
    R: IntoIterator<Item = User>,
{
    MergeUsers {
        left: Side::new(left.into_iter()),
        right: Side::new(right.into_iter()),
    }
}

/// Iterator returned by [merge_users].
pub struct MergeUsers<L: Iterator, R: Iterator> {
    left: Side<L>,
    right: Side<R>,
}

impl<L, R> Iterator for MergeUsers<L, R>
where
    L: Iterator<Item = User>,
    R: Iterator<Item = User>,
{
    type Item = User;

    fn next(&mut self) -> Option<User> {
        let left_id = match self.left.peek() {
            Some(u) => u.id,
            None => return self.right.pop(),
        };
        let right_id = match self.right.peek() {
            Some(u) => u.id,
            None => return self.left.pop(),
        };

        match left_id.cmp(&right_id) {
            Ordering::Less => self.left.pop(),
            Ordering::Greater => self.right.pop(),
            Ordering::Equal => {
                let mut combined = self.left.head.take()?;
                let right = self.right.head.take()?;
                combined.emails.extend(right.emails);
                Some(combined)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Every shared id collapses two users into one.
        let (l_lower, l_upper) = self.left.size_hint();
        let (r_lower, r_upper) = self.right.size_hint();
        let upper = match (l_upper, r_upper) {
            (Some(l), Some(r)) => l.checked_add(r),
            _ => None,
        };
        (l_lower.max(r_lower), upper)
    }
}
