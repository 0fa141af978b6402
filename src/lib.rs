//! Discoverlens
//!
//! Fetches a web page, discovers candidate images through two independent
//! passes — a static HTML parse and a rendered-DOM browser pass — reconciles
//! the two observation sets into one record per image, and reports whether the
//! page qualifies for large search previews: at least one sufficiently wide
//! image plus the `max-image-preview:large` meta-robots directive.
//!
//! # Features
//!
//! - **CDP Backend** (default): drives headless Chrome for the rendered pass
//! - **Degraded Mode**: without the `cdp` feature the dynamic pass reports
//!   empty results and the static pass carries the report alone
//!
//! # Example
//!
//! ```no_run
//! use discoverlens::{analyzer, AnalyzerConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AnalyzerConfig::default();
//! let report = analyzer::analyze(&config, "https://example.com")?;
//! println!("compatible: {}", report.discover_compatibility.compatible);
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

pub mod error;
pub use error::{Error, Result};

pub mod analyzer;
pub mod directive;
pub mod dynamic;
pub mod merge;
pub mod render;
pub mod server;
pub mod static_probe;
pub mod urlnorm;

#[cfg(feature = "cdp")]
pub mod cdp;

/// Configuration for one analysis pipeline
///
/// Defaults mirror what real browsers send and what lazy-loading pages need:
/// a desktop Chrome user agent and an oversized viewport so responsive and
/// lazy-loaded images materialize at their natural size during the rendered
/// pass.
///
/// # Examples
///
/// ```
/// let cfg = discoverlens::AnalyzerConfig::default();
/// assert_eq!(cfg.max_render_attempts, 3);
/// assert_eq!(cfg.viewport.width, 4000);
/// ```
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// User agent sent with every outbound request, static and rendered
    pub user_agent: String,
    /// Viewport for the rendering pass
    pub viewport: Viewport,
    /// Timeout for loading the target page (both passes)
    pub page_timeout: Duration,
    /// Timeout for each individual image fetch in the static pass
    pub image_timeout: Duration,
    /// Extra settle delay after navigation, lets late network activity finish
    pub settle: Duration,
    /// Retry budget for the rendering pass
    pub max_render_attempts: u32,
    /// Fixed delay between rendering attempts
    pub retry_backoff: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            viewport: Viewport::default(),
            page_timeout: Duration::from_secs(30),
            image_timeout: Duration::from_secs(10),
            settle: Duration::from_millis(500),
            max_render_attempts: 3,
            retry_backoff: Duration::from_secs(2),
        }
    }
}

/// Viewport dimensions for the rendering pass
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 4000,
            height: 4000,
        }
    }
}

/// Which extraction pass produced an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Static,
    Dynamic,
}

/// A single image sighting from one extraction pass
///
/// Never mutated after creation; the same image URL may be observed once per
/// pass and the merger reconciles the two.
#[derive(Debug, Clone)]
pub struct ImageObservation {
    /// Absolute image URL
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub source: ImageSource,
}

/// One canonical record per distinct image URL, built by the merger
///
/// Invariant: `width` and `height` are strictly positive — candidates failing
/// this are dropped before a record is built. When both passes observed the
/// URL, the rendered pass's dimensions win (rendering reflects final, possibly
/// lazy-loaded geometry).
#[derive(Debug, Clone, Serialize)]
pub struct MergedImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "static")]
    pub seen_static: bool,
    #[serde(rename = "dynamic")]
    pub seen_dynamic: bool,
    pub area: u64,
}

/// Whether the `max-image-preview:large` directive was seen, and where
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DirectiveVerdict {
    pub max_image_preview_large_found: bool,
    pub found_in_static: bool,
    pub found_in_dynamic: bool,
}

impl DirectiveVerdict {
    pub fn new(found_in_static: bool, found_in_dynamic: bool) -> Self {
        Self {
            max_image_preview_large_found: found_in_static || found_in_dynamic,
            found_in_static,
            found_in_dynamic,
        }
    }
}

/// Pass/fail judgment against the fixed preview policy
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CompatibilityVerdict {
    pub has_large_images: bool,
    pub minimum_width_required: u32,
    pub compatible: bool,
}

/// Request-level metadata: per-pass success flags and counts
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ExtractionStats {
    pub static_succeeded: bool,
    pub dynamic_succeeded: bool,
    pub static_image_count: usize,
    pub dynamic_image_count: usize,
    /// Merged records before truncation to the top ranks
    pub merged_image_count: usize,
    pub render_attempts: u32,
}

/// The externally visible result of one analysis request
///
/// Owns copies of all nested records; built once per request, no state is
/// shared across requests.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub url: String,
    pub robots_meta: DirectiveVerdict,
    pub discover_compatibility: CompatibilityVerdict,
    /// Top-ranked images, largest area first
    pub largest_images: Vec<MergedImage>,
    pub stats: ExtractionStats,
}

/// Per-URL observation map produced by one extraction pass
pub type ObservationMap = HashMap<String, ImageObservation>;
