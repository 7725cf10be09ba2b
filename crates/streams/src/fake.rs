//! Seeded fake data for the demos.
//!
//! Everything is generated from static word lists and a seeded [StdRng], so the same seed always gives the same data.
//! Sources are lazy and can't be rewound: call the function again to start over.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::{User, UserEmail};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Claude", "Dennis", "Edsger", "Frances", "Grace", "Guido", "Hedy", "Ken", "Linus",
    "Margaret", "Niklaus", "Radia", "Sophie", "Tony", "Whitfield",
];

const LAST_NAMES: &[&str] = &[
    "Allen", "Backus", "Dijkstra", "Hamilton", "Hoare", "Hopper", "Kernighan", "Lamarr", "Liskov", "Lovelace",
    "Perlman", "Ritchie", "Shannon", "Thompson", "Torvalds", "Turing", "Wilson", "Wirth",
];

const DOMAINS: &[&str] = &["example.com", "example.net", "example.org", "mail.test", "inbox.test"];

const WORDS: &[&str] = &[
    "batch", "buffer", "chunk", "commit", "cursor", "demand", "drain", "element", "fetch", "generator", "group", "insert",
    "iterator", "key", "lazy", "layer", "load", "memory", "merge", "offset", "order", "page", "pipeline", "pull",
    "query", "range", "record", "row", "sequence", "source", "stream", "table", "transform", "yield",
];

/// Generates fake names, emails, and text.
pub struct Faker {
    rng: StdRng,
}

impl Faker {
    pub fn new(seed: u64) -> Faker {
        Faker {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick(&mut self, words: &[&'static str]) -> &'static str {
        words.choose(&mut self.rng).copied().unwrap_or_default()
    }

    pub fn name(&mut self) -> String {
        format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
    }

    pub fn email(&mut self) -> String {
        let first = self.pick(FIRST_NAMES).to_lowercase();
        let last = self.pick(LAST_NAMES).to_lowercase();
        let suffix: u16 = self.rng.gen_range(0..1000);
        format!("{}.{}{}@{}", first, last, suffix, self.pick(DOMAINS))
    }

    /// A few sentences of filler, like a profile description.
    pub fn text(&mut self) -> String {
        let sentences = self.rng.gen_range(2..5);
        let mut out = String::new();

        for s in 0..sentences {
            if s > 0 {
                out.push(' ');
            }
            let words = self.rng.gen_range(4..10);
            for w in 0..words {
                let word = self.pick(WORDS);
                if w == 0 {
                    let mut chars = word.chars();
                    if let Some(c) = chars.next() {
                        out.extend(c.to_uppercase());
                        out.push_str(chars.as_str());
                    }
                } else {
                    out.push(' ');
                    out.push_str(word);
                }
            }
            out.push('.');
        }

        out
    }

    /// How many emails the next user gets: 3 or 4.
    fn email_count(&mut self) -> usize {
        self.rng.gen_range(3..5)
    }
}

/// `count` users with ids `0..count`, each with 3 or 4 emails.
pub fn fake_users(count: i64, seed: u64) -> impl Iterator<Item = User> {
    let mut faker = Faker::new(seed);
    (0..count).map(move |id| {
        let emails = (0..faker.email_count()).map(|_| faker.email()).collect();
        User { id, emails }
    })
}

/// Emails for `count` users with ids `0..count`, 3 or 4 per user, grouped and ordered by user id.
pub fn fake_user_emails(count: i64, seed: u64) -> FakeUserEmails {
    FakeUserEmails {
        faker: Faker::new(seed),
        next_user: 0,
        count,
        current_user: 0,
        left_for_user: 0,
    }
}

/// Iterator returned by [fake_user_emails].
pub struct FakeUserEmails {
    faker: Faker,
    next_user: i64,
    count: i64,
    current_user: i64,
    left_for_user: usize,
}

impl Iterator for FakeUserEmails {
    type Item = UserEmail;

    fn next(&mut self) -> Option<UserEmail> {
        if self.left_for_user == 0 {
            if self.next_user >= self.count {
                return None;
            }
            self.current_user = self.next_user;
            self.next_user += 1;
            self.left_for_user = self.faker.email_count();
        }

        self.left_for_user -= 1;
        Some(UserEmail {
            user_id: self.current_user,
            email: self.faker.email(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use itertools::Itertools;

    #[test]
    fn same_seed_same_data() {
        assert_eq!(
            fake_users(5, 3).collect::<Vec<_>>(),
            fake_users(5, 3).collect::<Vec<_>>()
        );
        assert_eq!(Faker::new(9).text(), Faker::new(9).text());
    }

    #[test]
    fn users_are_ordered_with_three_or_four_emails() {
        let users = fake_users(20, 1).collect::<Vec<_>>();
        assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), (0..20).collect::<Vec<_>>());
        assert!(users.iter().all(|u| (3..5).contains(&u.emails.len())));
    }

    #[test]
    fn emails_are_grouped_by_user() {
        let emails = fake_user_emails(10, 2).collect::<Vec<_>>();
        let groups = emails
            .iter()
            .group_by(|e| e.user_id)
            .into_iter()
            .map(|(id, group)| (id, group.count()))
            .collect::<Vec<_>>();

        assert_eq!(groups.iter().map(|g| g.0).collect::<Vec<_>>(), (0..10).collect::<Vec<_>>());
        assert!(groups.iter().all(|g| (3..5).contains(&g.1)));
        assert!(emails.iter().all(|e| e.email.contains('@')));
    }

    #[test]
    fn empty_sources() {
        assert_eq!(fake_users(0, 0).count(), 0);
        assert_eq!(fake_user_emails(0, 0).count(), 0);
    }
}
