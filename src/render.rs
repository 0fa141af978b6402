//! Rendering capability seam
//!
//! The dynamic pass only needs one thing from a browser: load a page, let the
//! network settle, and read back the rendered image geometry plus the
//! directive verdict. `RenderBackend` captures exactly that, so the retry
//! loop in [`crate::dynamic`] stays testable without a real browser and the
//! concrete engine remains an external collaborator.

use crate::Result;
use serde::Deserialize;

/// One rendered `img` element, as reported by the live DOM
#[derive(Debug, Clone, Deserialize)]
pub struct RenderedImage {
    /// Current source URL (the browser resolves these to absolute form)
    pub src: String,
    /// Natural pixel width, zero when not yet loaded
    #[serde(default)]
    pub width: u32,
    /// Natural pixel height, zero when not yet loaded
    #[serde(default)]
    pub height: u32,
}

/// Snapshot of the post-render DOM state the pipeline cares about
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    pub directive_found: bool,
    pub images: Vec<RenderedImage>,
}

/// A disposable rendering context
///
/// One backend instance serves exactly one attempt: open, `load_and_wait`,
/// `close`. Implementations must release every browser resource in `close`;
/// the retry loop calls it on every exit path of an attempt.
pub trait RenderBackend {
    /// Navigate to `url`, wait for the page to settle, and read back the
    /// rendered state.
    fn load_and_wait(&mut self, url: &str) -> Result<RenderedPage>;

    /// Tear down the rendering context and any processes it owns.
    fn close(self) -> Result<()>;
}
