//! Folding [UserEmail]s back into [User]s.
use std::iter::Fuse;

use crate::{User, UserEmail};

/// Reassemble users from a sequence of emails in which each user's emails are contiguous.
///
/// Only adjacent runs are grouped.  Emails for user 1, then user 2, then user 1 again produce two separate users with
/// id 1; nothing is remembered about ids once their run ends.
pub fn reassemble<I>(emails: I) -> Reassemble<I::IntoIter>
where
    I: IntoIterator<Item = UserEmail>,
{
    Reassemble {
        source: emails.into_iter().fuse(),
        pending: None,
    }
}

/// Iterator returned by [reassemble].
#[derive(Debug)]
pub struct Reassemble<I> {
    source: Fuse<I>,
    /// The user whose run we are in the middle of.
    pending: Option<User>,
}

impl<I: Iterator<Item = UserEmail>> Iterator for Reassemble<I> {
    type Item = User;

    fn next(&mut self) -> Option<User> {
        for UserEmail { user_id, email } in self.source.by_ref() {
            match self.pending.as_mut() {
                Some(user) if user.id == user_id => user.emails.push(email),
                _ => {
                    let finished = self.pending.replace(User {
                        id: user_id,
                        emails: vec![email],
                    });
                    if finished.is_some() {
                        return finished;
                    }
                }
            }
        }

        self.pending.take()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.source.size_hint();
        let pending = usize::from(self.pending.is_some());
        (
            usize::from(lower > 0 || pending > 0),
            upper.and_then(|x| x.checked_add(pending)),
        )
    }
}
