//! How much layering lazy iterators costs.
use anyhow::Result;
use log::*;

use slides_logging::profile;
use slides_streams::layers::{five_layers, list_source, range_source, run_through, LayerStyle};

use super::{IteratorsDemo, SEPARATOR_WIDTH};

pub fn run(demo: IteratorsDemo, size: u64) -> Result<()> {
    baseline(size);
    match demo {
        IteratorsDemo::Basic => {
            consume("range", range_source(size));
        }
        IteratorsDemo::Styles => {
            for style in LayerStyle::ALL {
                let name = format!("range with 5 {} layers", style.name());
                consume(&name, five_layers(style, range_source(size)));
            }
        }
        IteratorsDemo::RangeVsList => {
            let range = profile("building a range", || range_source(size));
            consume("range", range);

            let list = profile("building a list", || list_source(size));
            consume("list", list);
        }
    }
    Ok(())
}

/// A loop with nothing in the way, to compare everything else against.
fn baseline(size: u64) -> u64 {
    let count = profile("plain loop", || {
        let mut count = 0u64;
        for i in 0..size {
            std::hint::black_box(i);
            count += 1;
        }
        count
    });
    info!("{}", "-".repeat(SEPARATOR_WIDTH));
    count
}

fn consume<I: IntoIterator>(name: &str, items: I) -> usize {
    let count = profile(name, || run_through(items.into_iter().map(std::hint::black_box)));
    info!("{}: {} elements", name, count);
    info!("{}", "-".repeat(SEPARATOR_WIDTH));
    count
}
