use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::path::Path;

/// Default catalog listing URL (fiction section, paginated)
pub const DEFAULT_CATALOG_URL: &str =
    "https://www.chitai-gorod.ru/catalog/books/khudozhestvennaya_literatura-9657/";

/// Blocking HTTP client for the catalog site and its image host.
///
/// No timeout is configured; the whole run blocks on each request.
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent("bookstore-seeder")
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Fetch one catalog listing page and return its HTML body
    pub fn fetch_page(&self, page: u32) -> Result<String> {
        let url = format!("{}?page={}", self.base_url, page);

        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Failed to fetch catalog page {}", page))?
            .error_for_status()
            .with_context(|| format!("Catalog page {} returned an error status", page))?;

        let body = response
            .text()
            .with_context(|| format!("Failed to read body of catalog page {}", page))?;

        Ok(body)
    }

    /// Download a cover image and write the raw bytes to `dest`, overwriting
    /// any existing file
    pub fn download_image(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch cover image: {}", url))?
            .error_for_status()
            .with_context(|| format!("Cover image returned an error status: {}", url))?;

        let bytes = response
            .bytes()
            .with_context(|| format!("Failed to read cover image body: {}", url))?;

        std::fs::write(dest, &bytes)
            .with_context(|| format!("Failed to write cover image to {:?}", dest))?;

        Ok(())
    }
}
