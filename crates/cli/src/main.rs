//! The `slides` binary: every demo from the talk, one subcommand each.
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::*;

use slides_datastore::{with_connection, DbSettings};

mod demos;

use demos::{IteratorsDemo, TransformDemo};

#[derive(Parser)]
#[command(name = "slides")]
#[command(about = "Demos comparing iteration styles and bulk load/extract patterns")]
#[command(version)]
struct Cli {
    /// Database file for the load and extract demos; in-memory if not given
    #[arg(long, global = true, env = "SLIDES_DATABASE")]
    database: Option<PathBuf>,

    /// JSON file with database settings; --database overrides its path
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// How much layering lazy iterators costs
    Iterators {
        #[arg(value_enum, default_value_t = IteratorsDemo::Styles)]
        demo: IteratorsDemo,

        /// Elements per run
        #[arg(long, default_value_t = 10_000_000)]
        size: u64,
    },
    /// Insert fake users with every load strategy
    Load {
        /// Users per strategy
        #[arg(long, default_value_t = 10_000)]
        size: usize,

        #[arg(long, default_value_t = 500)]
        chunk_size: usize,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Read users back with every fetch strategy
    Extract {
        /// Users to load before reading
        #[arg(long, default_value_t = 50_000)]
        size: usize,

        /// Rows per batch or page
        #[arg(long, default_value_t = 500)]
        chunk_size: usize,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Lazy transforms over user records, printed as JSON lines
    Transform {
        #[arg(value_enum)]
        demo: TransformDemo,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

impl Cli {
    fn db_settings(&self) -> Result<DbSettings> {
        let mut settings = match self.settings.as_ref() {
            Some(path) => DbSettings::from_json_file(path)?,
            None => DbSettings::in_memory(),
        };
        if let Some(path) = self.database.as_ref() {
            settings.path = Some(path.clone());
        }
        Ok(settings)
    }
}

fn main() -> Result<()> {
    slides_logging::log_to_stderr();
    let cli = Cli::parse();

    match cli.command {
        Commands::Iterators { demo, size } => demos::iterators::run(demo, size),
        Commands::Load {
            size,
            chunk_size,
            seed,
        } => {
            let settings = cli.db_settings()?;
            with_connection(&settings, |conn| {
                demos::load::run(conn, size, chunk_size, seed)
            })
        }
        Commands::Extract {
            size,
            chunk_size,
            seed,
        } => {
            let settings = cli.db_settings()?;
            with_connection(&settings, |conn| {
                demos::extract::run(conn, size, chunk_size, seed)?;
                Ok(())
            })
        }
        Commands::Transform { demo, seed } => {
            debug!("Running the {:?} transform demo", demo);
            let mut out = std::io::stdout().lock();
            demos::transform::run(demo, seed, &mut out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_defaults() {
        let cli = Cli::try_parse_from(["slides", "load"]).unwrap();
        match cli.command {
            Commands::Load {
                size, chunk_size, ..
            } => {
                assert_eq!(size, 10_000);
                assert_eq!(chunk_size, 500);
            }
            _ => panic!("Expected the load command"),
        }
    }

    #[test]
    fn database_overrides_settings_path() {
        let cli =
            Cli::try_parse_from(["slides", "--database", "x.sqlite", "transform", "pack"]).unwrap();
        assert_eq!(
            cli.db_settings().unwrap(),
            DbSettings::at_path("x.sqlite")
        );
    }

    #[test]
    fn transform_needs_a_demo() {
        assert!(Cli::try_parse_from(["slides", "transform"]).is_err());
        assert!(Cli::try_parse_from(["slides", "transform", "merge-objects"]).is_ok());
    }
}
