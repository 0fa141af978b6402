//! Reconciliation of the two observation sets and the compatibility verdict
//!
//! Pure logic: the union of URLs seen by either pass becomes one record per
//! image, rendered dimensions win over static ones, zero-dimension candidates
//! are dropped, and the survivors are ranked by area. The evaluator then
//! reduces the ranking plus the directive verdict to a single pass/fail.

use crate::{CompatibilityVerdict, DirectiveVerdict, MergedImage, ObservationMap};
use std::collections::BTreeSet;

/// Minimum width (px) an image must reach for large-preview eligibility.
pub const MIN_IMAGE_WIDTH: u32 = 1200;

/// How many top-ranked images the report retains.
pub const TOP_IMAGE_COUNT: usize = 3;

/// Merge the per-pass observation maps into ranked records.
///
/// Records are sorted by area descending; equal areas are ordered by URL
/// ascending so the ranking is deterministic. The caller truncates to
/// [`TOP_IMAGE_COUNT`] for the report.
pub fn merge_observations(
    static_images: &ObservationMap,
    dynamic_images: &ObservationMap,
) -> Vec<MergedImage> {
    let all_urls: BTreeSet<&str> = static_images
        .keys()
        .chain(dynamic_images.keys())
        .map(String::as_str)
        .collect();

    let mut merged = Vec::new();
    for url in all_urls {
        let static_obs = static_images.get(url);
        let dynamic_obs = dynamic_images.get(url);

        // Rendered geometry is authoritative when both passes saw the URL.
        let (width, height) = match (dynamic_obs, static_obs) {
            (Some(d), _) => (d.width, d.height),
            (None, Some(s)) => (s.width, s.height),
            (None, None) => continue,
        };

        if width == 0 || height == 0 {
            continue;
        }

        merged.push(MergedImage {
            url: url.to_string(),
            width,
            height,
            seen_static: static_obs.is_some(),
            seen_dynamic: dynamic_obs.is_some(),
            area: u64::from(width) * u64::from(height),
        });
    }

    merged.sort_by(|a, b| b.area.cmp(&a.area).then_with(|| a.url.cmp(&b.url)));
    merged
}

/// Judge the ranked top images against the fixed preview policy.
pub fn evaluate_compatibility(
    top_images: &[MergedImage],
    directive: &DirectiveVerdict,
) -> CompatibilityVerdict {
    let has_large_images = top_images.iter().any(|img| img.width >= MIN_IMAGE_WIDTH);
    CompatibilityVerdict {
        has_large_images,
        minimum_width_required: MIN_IMAGE_WIDTH,
        compatible: has_large_images && directive.max_image_preview_large_found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImageObservation, ImageSource};
    use std::collections::HashMap;

    fn obs(url: &str, width: u32, height: u32, source: ImageSource) -> (String, ImageObservation) {
        (
            url.to_string(),
            ImageObservation {
                url: url.to_string(),
                width,
                height,
                source,
            },
        )
    }

    fn map(entries: Vec<(String, ImageObservation)>) -> ObservationMap {
        entries.into_iter().collect()
    }

    #[test]
    fn test_merge_is_idempotent_over_identical_inputs() {
        let source = map(vec![obs("https://e.com/a.png", 800, 600, ImageSource::Static)]);
        let merged = merge_observations(&source, &source);

        assert_eq!(merged.len(), 1);
        let record = &merged[0];
        assert!(record.seen_static);
        assert!(record.seen_dynamic);
        assert_eq!((record.width, record.height), (800, 600));
        assert_eq!(record.area, 480_000);
    }

    #[test]
    fn test_dynamic_dimensions_take_precedence() {
        let static_map = map(vec![obs("https://e.com/a.png", 800, 600, ImageSource::Static)]);
        let dynamic_map = map(vec![obs("https://e.com/a.png", 1600, 1200, ImageSource::Dynamic)]);

        let merged = merge_observations(&static_map, &dynamic_map);
        assert_eq!(merged.len(), 1);
        assert_eq!((merged[0].width, merged[0].height), (1600, 1200));
        assert!(merged[0].seen_static && merged[0].seen_dynamic);
    }

    #[test]
    fn test_zero_dimension_records_are_dropped() {
        let static_map = map(vec![
            obs("https://e.com/flat.png", 100, 0, ImageSource::Static),
            obs("https://e.com/ok.png", 10, 10, ImageSource::Static),
        ]);
        let dynamic_map = map(vec![obs("https://e.com/thin.png", 0, 100, ImageSource::Dynamic)]);

        let merged = merge_observations(&static_map, &dynamic_map);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].url, "https://e.com/ok.png");
    }

    #[test]
    fn test_ranking_by_area_descending() {
        // Areas 10, 50, 5, 100, 20 → top three are 100, 50, 20.
        let static_map = map(vec![
            obs("https://e.com/1.png", 10, 1, ImageSource::Static),
            obs("https://e.com/2.png", 50, 1, ImageSource::Static),
            obs("https://e.com/3.png", 5, 1, ImageSource::Static),
            obs("https://e.com/4.png", 100, 1, ImageSource::Static),
            obs("https://e.com/5.png", 20, 1, ImageSource::Static),
        ]);
        let dynamic_map = ObservationMap::new();

        let merged = merge_observations(&static_map, &dynamic_map);
        let areas: Vec<u64> = merged.iter().take(TOP_IMAGE_COUNT).map(|m| m.area).collect();
        assert_eq!(areas, vec![100, 50, 20]);
    }

    #[test]
    fn test_equal_areas_tie_break_on_url() {
        let static_map = map(vec![
            obs("https://e.com/b.png", 10, 10, ImageSource::Static),
            obs("https://e.com/a.png", 10, 10, ImageSource::Static),
        ]);
        let merged = merge_observations(&static_map, &HashMap::new());
        assert_eq!(merged[0].url, "https://e.com/a.png");
        assert_eq!(merged[1].url, "https://e.com/b.png");
    }

    #[test]
    fn test_union_keeps_single_source_records() {
        let static_map = map(vec![obs("https://e.com/s.png", 10, 10, ImageSource::Static)]);
        let dynamic_map = map(vec![obs("https://e.com/d.png", 20, 20, ImageSource::Dynamic)]);

        let merged = merge_observations(&static_map, &dynamic_map);
        assert_eq!(merged.len(), 2);
        let s = merged.iter().find(|m| m.url.ends_with("s.png")).unwrap();
        assert!(s.seen_static && !s.seen_dynamic);
        let d = merged.iter().find(|m| m.url.ends_with("d.png")).unwrap();
        assert!(!d.seen_static && d.seen_dynamic);
    }

    fn record(width: u32) -> MergedImage {
        MergedImage {
            url: format!("https://e.com/{}.png", width),
            width,
            height: 1,
            seen_static: true,
            seen_dynamic: false,
            area: u64::from(width),
        }
    }

    #[test]
    fn test_compatibility_requires_both_clauses() {
        let wide = vec![record(1600)];
        let narrow = vec![record(640)];
        let found = DirectiveVerdict::new(true, false);
        let missing = DirectiveVerdict::new(false, false);

        assert!(evaluate_compatibility(&wide, &found).compatible);
        assert!(!evaluate_compatibility(&wide, &missing).compatible);
        assert!(!evaluate_compatibility(&narrow, &found).compatible);
        assert!(!evaluate_compatibility(&narrow, &missing).compatible);
    }

    #[test]
    fn test_width_threshold_is_inclusive() {
        let exactly = vec![record(MIN_IMAGE_WIDTH)];
        let verdict = evaluate_compatibility(&exactly, &DirectiveVerdict::new(true, true));
        assert!(verdict.has_large_images);
        assert!(verdict.compatible);
        assert_eq!(verdict.minimum_width_required, 1200);
    }

    #[test]
    fn test_empty_ranking_is_incompatible() {
        let verdict = evaluate_compatibility(&[], &DirectiveVerdict::new(true, true));
        assert!(!verdict.has_large_images);
        assert!(!verdict.compatible);
    }
}
