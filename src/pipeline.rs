//! The seeding pipeline: seed genres, scrape the catalog page range, then
//! run the genre enrichment pass. One sequential flow, one process.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::PathBuf;

use crate::catalog::{parse_listing, CatalogClient};
use crate::store::{BookStore, NewBook};

/// Genre vocabulary seeded on every run, kept verbatim from the source
/// catalog's storefront
pub const GENRES: &[&str] = &[
    "Проза",
    "Детектив",
    "Боевик",
    "Триллер",
    "фантастика",
    "Фэнтези",
    "Романтика",
    "Поэзия",
    "Мемуары",
    "Приключения",
    "Комиксы",
    "Юмор",
    "Афоризмы",
    "Фольклор",
];

/// Default number of catalog pages to scrape
pub const DEFAULT_PAGES: u32 = 5;

pub struct PipelineConfig {
    /// Pages 1..=pages are fetched
    pub pages: u32,
    /// Directory cover images are written into
    pub image_dir: PathBuf,
}

/// Counts reported after a completed run
#[derive(Debug, Default)]
pub struct PipelineSummary {
    pub genres_seeded: usize,
    pub books_inserted: usize,
    pub covers_downloaded: usize,
    pub genre_links: usize,
}

/// Run the full pipeline against an already-created store.
///
/// Any failure (network, parse, filesystem, database) propagates immediately;
/// pages committed before the failure stay in the database.
pub fn run_pipeline(
    store: &mut BookStore,
    client: &CatalogClient,
    config: &PipelineConfig,
    rng: &mut impl Rng,
) -> Result<PipelineSummary> {
    let mut summary = PipelineSummary::default();

    println!("Seeding {} genres...", GENRES.len());
    summary.genres_seeded = store.seed_genres(GENRES)?;

    let pb = ProgressBar::new(config.pages as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:30} [{bar:40.cyan/blue}] {pos}/{len} pages")
            .unwrap()
            .progress_chars("=>-"),
    );
    pb.set_message("Scraping catalog");

    for page in 1..=config.pages {
        let html = client.fetch_page(page)?;
        let listings =
            parse_listing(&html).with_context(|| format!("Failed to parse catalog page {}", page))?;

        let mut books = Vec::with_capacity(listings.len());
        for listing in &listings {
            let dest = config.image_dir.join(&listing.image_file);
            client.download_image(&listing.image_url, &dest)?;
            summary.covers_downloaded += 1;

            books.push(NewBook {
                title: listing.title.clone(),
                price: listing.price.clone(),
                // Stock is not on the page; draw it
                amount: rng.gen_range(10..=100),
                image_path: listing.image_file.clone(),
                author_name: listing.author.clone(),
            });
        }

        // One transaction per page; a failing card rolls the page back
        summary.books_inserted += store.insert_books(&books)?;
        pb.inc(1);
    }
    pb.finish_with_message(format!("Scraped {} books", summary.books_inserted));

    println!("Enriching books with genres...");
    let book_ids = store.book_ids()?;
    let genre_ids = store.genre_ids()?;
    let links = assign_genres(&book_ids, &genre_ids, rng);
    summary.genre_links = store.attach_genres(&links)?;

    Ok(summary)
}

/// Compute random genre assignments for the enrichment pass.
///
/// Each book gets one uniformly random genre; in one case out of five a
/// second uniform draw is attached as well, but only if it differs from the
/// first. Pure function of the id lists and the RNG.
pub fn assign_genres(
    book_ids: &[i64],
    genre_ids: &[i64],
    rng: &mut impl Rng,
) -> Vec<(i64, i64)> {
    let mut links = Vec::with_capacity(book_ids.len());

    for &book_id in book_ids {
        if let Some(&first) = genre_ids.choose(rng) {
            links.push((book_id, first));

            if rng.gen_range(1..=5) == 1 {
                if let Some(&second) = genre_ids.choose(rng) {
                    if second != first {
                        links.push((book_id, second));
                    }
                }
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_every_book_gets_one_or_two_distinct_genres() {
        let books: Vec<i64> = (1..=500).collect();
        let genres: Vec<i64> = (1..=14).collect();
        let mut rng = StdRng::seed_from_u64(42);

        let links = assign_genres(&books, &genres, &mut rng);

        let mut per_book: HashMap<i64, Vec<i64>> = HashMap::new();
        for (book, genre) in links {
            per_book.entry(book).or_default().push(genre);
        }

        assert_eq!(per_book.len(), books.len());
        for (book, attached) in &per_book {
            assert!(
                (1..=2).contains(&attached.len()),
                "book {} has {} genres",
                book,
                attached.len()
            );
            if attached.len() == 2 {
                assert_ne!(attached[0], attached[1], "book {} has duplicate genres", book);
            }
        }
    }

    #[test]
    fn test_second_genre_rate_converges_to_one_fifth() {
        let books: Vec<i64> = (1..=20_000).collect();
        let genres: Vec<i64> = (1..=14).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let links = assign_genres(&books, &genres, &mut rng);
        let doubles = links.len() - books.len();
        let rate = doubles as f64 / books.len() as f64;

        // 1/5 chance of a second draw, kept only when distinct from the
        // first: expected rate is 0.2 * 13/14
        assert!((rate - 0.2 * 13.0 / 14.0).abs() < 0.01, "rate was {}", rate);
    }

    #[test]
    fn test_no_genres_yields_no_links() {
        let books: Vec<i64> = vec![1, 2, 3];
        let mut rng = StdRng::seed_from_u64(0);
        assert!(assign_genres(&books, &[], &mut rng).is_empty());
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let books: Vec<i64> = (1..=100).collect();
        let genres: Vec<i64> = (1..=14).collect();

        let a = assign_genres(&books, &genres, &mut StdRng::seed_from_u64(9));
        let b = assign_genres(&books, &genres, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
