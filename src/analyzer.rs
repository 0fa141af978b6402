//! The per-request pipeline: normalize → extract twice → merge → evaluate
//!
//! The two extraction passes have no data dependency and run on scoped
//! threads; both must finish (or exhaust retries) before the merger runs. A
//! failed pass degrades the report, it never aborts the request — only an
//! invalid URL or a panicked pass thread does.

use crate::dynamic::DynamicExtraction;
use crate::merge::{self, TOP_IMAGE_COUNT};
use crate::static_probe::{self, StaticExtraction};
use crate::{
    AnalysisReport, AnalyzerConfig, DirectiveVerdict, Error, ExtractionStats, Result,
};
use log::info;

/// Analyze one target URL and build the full report.
pub fn analyze(config: &AnalyzerConfig, raw_url: &str) -> Result<AnalysisReport> {
    let url = crate::urlnorm::normalize_url(raw_url)?;
    info!("analyzing {}", url);

    let (static_pass, dynamic_pass) = run_passes(config, &url)?;
    info!(
        "static pass: {} images, directive={}, ok={}; rendered pass: {} images, directive={}, ok={} ({} attempts)",
        static_pass.images.len(),
        static_pass.directive_found,
        static_pass.succeeded,
        dynamic_pass.images.len(),
        dynamic_pass.directive_found,
        dynamic_pass.succeeded,
        dynamic_pass.attempts,
    );

    let merged = merge::merge_observations(&static_pass.images, &dynamic_pass.images);
    let merged_image_count = merged.len();

    let robots_meta =
        DirectiveVerdict::new(static_pass.directive_found, dynamic_pass.directive_found);

    let mut largest_images = merged;
    largest_images.truncate(TOP_IMAGE_COUNT);

    let discover_compatibility = merge::evaluate_compatibility(&largest_images, &robots_meta);

    Ok(AnalysisReport {
        url,
        robots_meta,
        discover_compatibility,
        largest_images,
        stats: ExtractionStats {
            static_succeeded: static_pass.succeeded,
            dynamic_succeeded: dynamic_pass.succeeded,
            static_image_count: static_pass.images.len(),
            dynamic_image_count: dynamic_pass.images.len(),
            merged_image_count,
            render_attempts: dynamic_pass.attempts,
        },
    })
}

fn run_passes(
    config: &AnalyzerConfig,
    url: &str,
) -> Result<(StaticExtraction, DynamicExtraction)> {
    std::thread::scope(|scope| {
        let static_handle = scope.spawn(|| static_probe::extract_static(config, url));
        let dynamic_handle = scope.spawn(|| run_dynamic(config, url));

        let static_pass = static_handle
            .join()
            .map_err(|_| Error::Internal("static extraction thread panicked".into()))?;
        let dynamic_pass = dynamic_handle
            .join()
            .map_err(|_| Error::Internal("dynamic extraction thread panicked".into()))?;
        Ok((static_pass, dynamic_pass))
    })
}

#[cfg(feature = "cdp")]
fn run_dynamic(config: &AnalyzerConfig, url: &str) -> DynamicExtraction {
    crate::dynamic::extract_dynamic(config, url, || crate::cdp::CdpRenderer::open(config))
}

#[cfg(not(feature = "cdp"))]
fn run_dynamic(_config: &AnalyzerConfig, url: &str) -> DynamicExtraction {
    log::warn!(
        "no rendering backend compiled in; skipping rendered pass for {}",
        url
    );
    DynamicExtraction::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_rejected_before_any_network() {
        // None of these resolve anywhere; a network attempt would hang or
        // error differently. The normalizer must bounce them immediately.
        for bad in ["", "javascript:alert(1)", "notaurl", "ftp://e.com"] {
            let result = analyze(&AnalyzerConfig::default(), bad);
            assert!(
                matches!(result, Err(Error::InvalidUrl(_))),
                "expected InvalidUrl for {:?}",
                bad
            );
        }
    }
}
