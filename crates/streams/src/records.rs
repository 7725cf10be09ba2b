//! The values flowing through the pipelines.

/// One email address belonging to a user.
///
/// Sequences of these are ordered by `user_id`, which is not unique: a user with three addresses shows up three times.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct UserEmail {
    pub user_id: i64,
    pub email: String,
}

/// A user and all of their addresses, in the order they were found.
///
/// Sequences of these are ordered by `id`, which is unique.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct User {
    pub id: i64,
    pub emails: Vec<String>,
}

impl UserEmail {
    pub fn new(user_id: i64, email: impl Into<String>) -> UserEmail {
        UserEmail {
            user_id,
            email: email.into(),
        }
    }
}

impl User {
    pub fn new<S: Into<String>>(id: i64, emails: impl IntoIterator<Item = S>) -> User {
        User {
            id,
            emails: emails.into_iter().map(Into::into).collect(),
        }
    }
}
