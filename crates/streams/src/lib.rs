//! Lazy, pull-based pipelines over user records.
//!
//! Every stage here is an [Iterator] wrapping another iterator: nothing downstream is computed until a consumer asks
//! for it, and each stage owns at most one or two buffered elements.  The stages are:
//!
//! - Flattening [User]s into [UserEmail]s and filtering, in [transform].
//! - Folding contiguous runs of [UserEmail]s back into [User]s, in [group].
//! - Two-way merges of ordered sequences, in [merge].
//! - Splitting a sequence into bounded chunks, either materialized or lazy, in [chunk].
//!
//! [layers] holds the adapters the iteration slides use to show what stacking lazy stages costs, and [fake] holds the
//! seeded generators that feed everything.
pub mod chunk;
mod errors;
pub mod fake;
pub mod group;
pub mod layers;
pub mod merge;
mod records;
pub mod transform;

pub use chunk::{chunked, ichunked};
pub use errors::*;
pub use group::reassemble;
pub use merge::{merge_emails, merge_users};
pub use records::*;
pub use transform::{drop_even_ids, flatten_users};
