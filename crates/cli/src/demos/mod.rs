//! The demos, one module per slide.
pub mod extract;
pub mod iterators;
pub mod load;
pub mod transform;

/// Which iterator demo to run.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum IteratorsDemo {
    /// A plain loop, then the same range consumed through the generic consumer
    Basic,
    /// Five nested layers in each layering style
    Styles,
    /// A lazy range against a materialized list
    RangeVsList,
}

/// Which transform demo to run.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum TransformDemo {
    /// Users into user emails
    Unpack,
    /// User emails back into users
    Pack,
    /// Materialized and lazy chunks
    Chunk,
    /// Concatenating chunks back together
    Chain,
    /// Dropping users with even ids
    Filter,
    /// Merging two ordered email sources
    MergeIterators,
    /// Merging two ordered user sources, combining shared ids
    MergeObjects,
}

/// Printed between runs so the output of each is easy to find.
pub(crate) const SEPARATOR_WIDTH: usize = 100;
