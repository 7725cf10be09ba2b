//! Stateless per-element stages.
use crate::{User, UserEmail};

/// Unpack each user into one [UserEmail] per address, keeping the user's order and then the address order.
///
/// Users without addresses vanish.
pub fn flatten_users(users: impl IntoIterator<Item = User>) -> impl Iterator<Item = UserEmail> {
    users.into_iter().flat_map(|user| {
        let id = user.id;
        user.emails
            .into_iter()
            .map(move |email| UserEmail { user_id: id, email })
    })
}

/// Drop every user whose id is even.
pub fn drop_even_ids(users: impl IntoIterator<Item = User>) -> impl Iterator<Item = User> {
    users.into_iter().filter(|user| user.id % 2 != 0)
}
