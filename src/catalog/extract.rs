//! Item-card extraction from catalog listing pages.
//!
//! Every field lookup is fallible: a card missing an expected element or
//! attribute produces a named error instead of a blind panic, and that error
//! aborts the page (and the run) when propagated.

use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};

/// Fields extracted from one item card
#[derive(Debug, Clone, PartialEq)]
pub struct BookListing {
    pub title: String,
    /// Author name, text before the first comma of the author line
    pub author: String,
    /// First whitespace-delimited token of the price text, kept as a string
    pub price: String,
    /// Detail-image URL, rewritten from the preview variant
    pub image_url: String,
    /// Local file name derived from the image URL
    pub image_file: String,
}

struct CardSelectors {
    card: Selector,
    title: Selector,
    author: Selector,
    price: Selector,
    image: Selector,
}

impl CardSelectors {
    fn new() -> Self {
        // Static selectors, parse cannot fail
        Self {
            card: Selector::parse("div.product-card").unwrap(),
            title: Selector::parse("div.product-card__title").unwrap(),
            author: Selector::parse("div.product-card__author").unwrap(),
            price: Selector::parse("span.product-price__value").unwrap(),
            image: Selector::parse("img").unwrap(),
        }
    }
}

/// Extract all item cards from a listing page body.
///
/// A page with zero cards is a normal empty result, not an error.
pub fn parse_listing(html: &str) -> Result<Vec<BookListing>> {
    let document = Html::parse_document(html);
    let selectors = CardSelectors::new();

    let mut listings = Vec::new();
    for (index, card) in document.select(&selectors.card).enumerate() {
        let listing = parse_card(card, &selectors)
            .with_context(|| format!("Failed to extract item card {}", index + 1))?;
        listings.push(listing);
    }

    Ok(listings)
}

fn parse_card(card: ElementRef, selectors: &CardSelectors) -> Result<BookListing> {
    let title = element_text(card, &selectors.title).context("Missing title element")?;

    let author_line = element_text(card, &selectors.author).context("Missing author element")?;
    let author = author_line
        .split(',')
        .next()
        .unwrap_or(&author_line)
        .trim()
        .to_string();

    let price_text = element_text(card, &selectors.price).context("Missing price element")?;
    let price = price_text
        .split_whitespace()
        .next()
        .context("Price text is empty")?
        .to_string();

    let image = card
        .select(&selectors.image)
        .next()
        .context("Missing cover image element")?;
    let preview_url = image
        .value()
        .attr("data-src")
        .context("Cover image has no data-src attribute")?;

    let image_url = detail_image_url(preview_url);
    let image_file = derive_image_name(&image_url);

    Ok(BookListing {
        title,
        author,
        price,
        image_url,
        image_file,
    })
}

/// Collect and trim the text of the first element matching the selector
fn element_text(card: ElementRef, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

/// Rewrite the preview-image URL into its detail (high resolution) variant
fn detail_image_url(preview_url: &str) -> String {
    preview_url.replace("preview", "detail")
}

/// Derive a local file name from an image URL: the last path segment up to
/// its first underscore, with a `.jpg` extension
fn derive_image_name(url: &str) -> String {
    let last_segment = url.rsplit('/').next().unwrap_or(url);
    let stem = last_segment.split('_').next().unwrap_or(last_segment);
    format!("{}.jpg", stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_html(title: &str, author: &str, price: &str, img: &str) -> String {
        format!(
            r#"<div class="product-card">
                 <img data-src="{img}">
                 <div class="product-card__title">{title}</div>
                 <div class="product-card__author">{author}</div>
                 <span class="product-price__value">{price}</span>
               </div>"#
        )
    }

    fn page_html(cards: &[String]) -> String {
        format!("<html><body>{}</body></html>", cards.join("\n"))
    }

    #[test]
    fn test_extracts_all_fields() {
        let page = page_html(&[card_html(
            " Мастер и Маргарита ",
            "Булгаков Михаил Афанасьевич, редактор Иванов И.",
            "612 ₽",
            "https://cdn.example.com/covers/preview/2843718_detail2.jpg",
        )]);

        let listings = parse_listing(&page).unwrap();
        assert_eq!(listings.len(), 1);

        let listing = &listings[0];
        assert_eq!(listing.title, "Мастер и Маргарита");
        assert_eq!(listing.author, "Булгаков Михаил Афанасьевич");
        assert_eq!(listing.price, "612");
        assert_eq!(
            listing.image_url,
            "https://cdn.example.com/covers/detail/2843718_detail2.jpg"
        );
        assert_eq!(listing.image_file, "2843718.jpg");
    }

    #[test]
    fn test_author_without_comma_kept_whole() {
        let page = page_html(&[card_html(
            "Title",
            "  Пушкин А. С.  ",
            "100 ₽",
            "https://cdn.example.com/preview/1_a.jpg",
        )]);

        let listings = parse_listing(&page).unwrap();
        assert_eq!(listings[0].author, "Пушкин А. С.");
    }

    #[test]
    fn test_price_takes_first_token() {
        let page = page_html(&[card_html(
            "Title",
            "Author",
            "1 024 ₽",
            "https://cdn.example.com/preview/1_a.jpg",
        )]);

        // Thousands separators are whitespace on the site, so only the first
        // token survives; this matches the source behavior
        let listings = parse_listing(&page).unwrap();
        assert_eq!(listings[0].price, "1");
    }

    #[test]
    fn test_preview_to_detail_round_trip() {
        assert_eq!(
            detail_image_url("https://host/img/preview/name_suffix.jpg"),
            "https://host/img/detail/name_suffix.jpg"
        );
        assert_eq!(
            derive_image_name("https://host/img/detail/name_suffix.jpg"),
            "name.jpg"
        );
    }

    #[test]
    fn test_zero_cards_is_empty_not_error() {
        let listings = parse_listing("<html><body><p>no results</p></body></html>").unwrap();
        assert!(listings.is_empty());
    }

    #[test]
    fn test_missing_price_element_is_an_error() {
        let card = r#"<div class="product-card">
                        <img data-src="https://cdn.example.com/preview/1_a.jpg">
                        <div class="product-card__title">Title</div>
                        <div class="product-card__author">Author</div>
                      </div>"#;
        let err = parse_listing(&page_html(&[card.to_string()])).unwrap_err();
        assert!(format!("{:#}", err).contains("Missing price element"));
    }

    #[test]
    fn test_missing_data_src_is_an_error() {
        let card = r#"<div class="product-card">
                        <img src="https://cdn.example.com/preview/1_a.jpg">
                        <div class="product-card__title">Title</div>
                        <div class="product-card__author">Author</div>
                        <span class="product-price__value">10 ₽</span>
                      </div>"#;
        let err = parse_listing(&page_html(&[card.to_string()])).unwrap_err();
        assert!(format!("{:#}", err).contains("data-src"));
    }

    #[test]
    fn test_error_names_the_failing_card() {
        let good = card_html(
            "Title",
            "Author",
            "10 ₽",
            "https://cdn.example.com/preview/1_a.jpg",
        );
        let bad = r#"<div class="product-card"></div>"#.to_string();
        let err = parse_listing(&page_html(&[good, bad])).unwrap_err();
        assert!(format!("{:#}", err).contains("item card 2"));
    }
}
