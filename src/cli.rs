use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::catalog::DEFAULT_CATALOG_URL;
use crate::pipeline::DEFAULT_PAGES;

#[derive(Parser, Debug)]
#[command(name = "bookstore-seeder")]
#[command(version, about = "Scrape a book catalog and seed a SQLite bookstore database")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a fresh database, scrape the catalog and seed everything
    Run {
        /// Output SQLite database path (an existing file is replaced)
        output_db: PathBuf,

        /// Number of catalog pages to scrape
        #[arg(short, long, default_value_t = DEFAULT_PAGES)]
        pages: u32,

        /// Catalog listing URL; the page number is appended as a query
        #[arg(short, long, default_value = DEFAULT_CATALOG_URL)]
        base_url: String,

        /// Directory cover images are written into (default: current dir)
        #[arg(short, long)]
        image_dir: Option<PathBuf>,

        /// Fix the random seed for reproducible stock and genre draws
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Create an empty database with the full schema and exit
    Init {
        /// Output SQLite database path (an existing file is replaced)
        output_db: PathBuf,
    },

    /// List all table names
    ListTables,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
