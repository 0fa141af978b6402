//! Static extraction pass: images discovered in the originally served HTML
//!
//! Fetches the page over plain HTTP with browser-like headers, parses the
//! markup without executing any scripts, resolves each `img` source to an
//! absolute URL, fetches the bytes, and decodes the pixel dimensions. The
//! whole pass degrades to an empty result on a page-level failure; a single
//! bad image is skipped, never fatal for the batch.

use crate::directive::document_has_directive;
use crate::{AnalyzerConfig, Error, ImageObservation, ImageSource, ObservationMap, Result};
use image::GenericImageView;
use log::{error, warn};
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use url::Url;

/// Everything the static pass learned about one page
#[derive(Debug, Default)]
pub struct StaticExtraction {
    /// Absolute image URL → observation
    pub images: ObservationMap,
    pub directive_found: bool,
    /// False when the page fetch or parse itself failed
    pub succeeded: bool,
}

/// Run the static pass against `page_url`.
///
/// Never raises past its own boundary: failures are logged and collapse to a
/// default (empty, `succeeded = false`) extraction.
pub fn extract_static(config: &AnalyzerConfig, page_url: &str) -> StaticExtraction {
    match run(config, page_url) {
        Ok(extraction) => extraction,
        Err(e) => {
            error!("static extraction failed for {}: {}", page_url, e);
            StaticExtraction::default()
        }
    }
}

fn run(config: &AnalyzerConfig, page_url: &str) -> Result<StaticExtraction> {
    let client = build_client(config)?;

    let response = client
        .get(page_url)
        .timeout(config.page_timeout)
        .send()
        .map_err(|e| Error::Fetch(format!("page request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Fetch(format!("page returned status {}", status)));
    }

    let body = response
        .text()
        .map_err(|e| Error::Fetch(format!("failed to read page body: {}", e)))?;

    let document = Html::parse_document(&body);
    let directive_found = document_has_directive(&document);

    let img_selector = Selector::parse("img")
        .map_err(|e| Error::Internal(format!("img selector: {:?}", e)))?;

    let mut images = ObservationMap::new();
    for element in document.select(&img_selector) {
        let src = element.value().attr("src").unwrap_or("").trim();
        if src.is_empty() {
            continue;
        }

        let img_url = match resolve_src(page_url, src) {
            Some(u) => u,
            None => {
                warn!("skipping unresolvable image source {:?} on {}", src, page_url);
                continue;
            }
        };

        match probe_image(&client, config, &img_url) {
            Ok((width, height)) => {
                images.insert(
                    img_url.clone(),
                    ImageObservation {
                        url: img_url,
                        width,
                        height,
                        source: ImageSource::Static,
                    },
                );
            }
            Err(e) => {
                // Per-image isolation: one bad image never aborts the batch.
                warn!("skipping image {}: {}", img_url, e);
            }
        }
    }

    Ok(StaticExtraction {
        images,
        directive_found,
        succeeded: true,
    })
}

fn build_client(config: &AnalyzerConfig) -> Result<Client> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};

    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(config.page_timeout)
        .build()
        .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))
}

/// Resolve an `img src` attribute to an absolute URL against the page URL.
///
/// Protocol-relative sources get an `https:` scheme; everything else that is
/// not already absolute is joined against the page's base.
pub fn resolve_src(page_url: &str, src: &str) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }

    if src.starts_with("http://") || src.starts_with("https://") {
        return Some(src.to_string());
    }

    if let Some(rest) = src.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }

    let base = Url::parse(page_url).ok()?;
    base.join(src).ok().map(|u| u.to_string())
}

/// Fetch one image and decode its pixel dimensions.
fn probe_image(client: &Client, config: &AnalyzerConfig, img_url: &str) -> Result<(u32, u32)> {
    let response = client
        .get(img_url)
        .timeout(config.image_timeout)
        .send()
        .map_err(|e| Error::Fetch(format!("image request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Fetch(format!("image returned status {}", status)));
    }

    let bytes = response
        .bytes()
        .map_err(|e| Error::Fetch(format!("failed to read image bytes: {}", e)))?;

    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| Error::Fetch(format!("decode failed: {}", e)))?;

    Ok(decoded.dimensions())
}
