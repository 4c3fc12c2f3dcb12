use anyhow::Result;
use bookstore_seeder::{
    catalog::CatalogClient,
    cli::{Cli, Commands},
    pipeline::{run_pipeline, PipelineConfig},
    schema::table_names,
    store::BookStore,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Run {
            output_db,
            pages,
            base_url,
            image_dir,
            seed,
        } => {
            let start = Instant::now();

            let mut store = BookStore::create(&output_db)?;
            let client = CatalogClient::new(&base_url)?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let config = PipelineConfig {
                pages,
                image_dir: image_dir.unwrap_or_else(|| PathBuf::from(".")),
            };

            let summary = run_pipeline(&mut store, &client, &config, &mut rng)?;
            store.finalize()?;

            let elapsed = start.elapsed();
            println!(
                "\nCreated {:?} ({} genres, {} books, {} covers, {} genre links) in {:.1}s",
                output_db,
                summary.genres_seeded,
                summary.books_inserted,
                summary.covers_downloaded,
                summary.genre_links,
                elapsed.as_secs_f64()
            );
        }

        Commands::Init { output_db } => {
            let store = BookStore::create(&output_db)?;
            store.finalize()?;
            println!("Created empty schema at {:?}", output_db);
        }

        Commands::ListTables => {
            println!("Tables:\n");
            for name in table_names() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}
