//! Dynamic extraction pass: images read back from the rendered DOM
//!
//! Runs the rendering backend inside a bounded retry loop. Each attempt gets
//! a fresh backend from the factory and the backend is torn down on every
//! exit path, success or failure, before the loop sleeps or returns.
//! Exhausting the budget degrades to an empty result; it is never a pipeline
//! failure.

use crate::render::RenderBackend;
use crate::{AnalyzerConfig, Error, ImageObservation, ImageSource, ObservationMap, Result};
use log::{info, warn};

/// Everything the rendered pass learned about one page
#[derive(Debug, Default)]
pub struct DynamicExtraction {
    /// Absolute image URL → observation
    pub images: ObservationMap,
    pub directive_found: bool,
    /// False when every attempt failed (or the backend is unavailable)
    pub succeeded: bool,
    /// Attempts actually made, for request metadata
    pub attempts: u32,
    /// Last attempt's error, kept for diagnostic logging
    pub last_error: Option<Error>,
}

/// Retry loop state. Explicit so the progression is auditable: attempts are
/// strictly sequential with a fixed backoff, no hidden recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptState {
    /// Running attempt `n` (1-based)
    Attempting(u32),
    /// Attempt `n` failed; sleeping before the next one
    Backoff(u32),
    Succeeded,
    Exhausted,
}

/// Run the rendered pass against `page_url`, opening one backend per attempt
/// through `open_backend`.
///
/// Never raises past its own boundary.
pub fn extract_dynamic<B, F>(
    config: &AnalyzerConfig,
    page_url: &str,
    mut open_backend: F,
) -> DynamicExtraction
where
    B: RenderBackend,
    F: FnMut() -> Result<B>,
{
    let budget = config.max_render_attempts.max(1);
    let mut extraction = DynamicExtraction::default();
    let mut state = AttemptState::Attempting(1);

    loop {
        match state {
            AttemptState::Attempting(n) => {
                info!("rendered pass attempt {}/{} for {}", n, budget, page_url);
                extraction.attempts = n;

                match run_attempt(&mut open_backend, page_url) {
                    Ok(page) => {
                        extraction.directive_found = page.directive_found;
                        for img in page.images {
                            // Keep only fully materialized entries.
                            if img.src.is_empty() || img.width == 0 || img.height == 0 {
                                continue;
                            }
                            extraction.images.insert(
                                img.src.clone(),
                                ImageObservation {
                                    url: img.src,
                                    width: img.width,
                                    height: img.height,
                                    source: ImageSource::Dynamic,
                                },
                            );
                        }
                        extraction.succeeded = true;
                        state = AttemptState::Succeeded;
                    }
                    Err(e) => {
                        warn!("rendered pass attempt {} failed: {}", n, e);
                        extraction.last_error = Some(e);
                        state = if n >= budget {
                            AttemptState::Exhausted
                        } else {
                            AttemptState::Backoff(n)
                        };
                    }
                }
            }
            AttemptState::Backoff(n) => {
                std::thread::sleep(config.retry_backoff);
                state = AttemptState::Attempting(n + 1);
            }
            AttemptState::Succeeded => {
                info!(
                    "rendered pass succeeded on attempt {} with {} images",
                    extraction.attempts,
                    extraction.images.len()
                );
                return extraction;
            }
            AttemptState::Exhausted => {
                warn!(
                    "rendered pass gave up after {} attempts; last error: {}",
                    extraction.attempts,
                    extraction
                        .last_error
                        .as_ref()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "unknown".to_string())
                );
                return extraction;
            }
        }
    }
}

/// One attempt: open, load, and always tear the backend down before
/// returning the load result.
fn run_attempt<B, F>(open_backend: &mut F, page_url: &str) -> Result<crate::render::RenderedPage>
where
    B: RenderBackend,
    F: FnMut() -> Result<B>,
{
    let mut backend = open_backend()?;
    let result = backend.load_and_wait(page_url);
    if let Err(e) = backend.close() {
        warn!("backend teardown failed: {}", e);
    }
    result
}
