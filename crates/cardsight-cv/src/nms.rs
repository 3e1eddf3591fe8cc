//! Non-maximum suppression over raw template matches

use crate::bbox::{Detection, RawMatch};

/// Default IoU threshold above which two candidates are considered
/// duplicates of the same physical card.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.3;

/// Greedy non-maximum suppression.
///
/// Candidates are ordered by score descending; the best remaining candidate
/// is kept and every other candidate whose box reaches `iou_threshold`
/// against it is discarded. Candidates with equal scores keep their input
/// order, so the first-seen one wins.
///
/// Note that two detections with different boxes may carry the same card
/// code; suppression resolves geometry, not identity.
pub fn suppress(matches: Vec<RawMatch>, iou_threshold: f64) -> Vec<Detection> {
    if matches.is_empty() {
        return Vec::new();
    }

    let mut candidates = matches;
    // sort_by is stable: equal scores preserve input order
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Detection> = Vec::new();
    let mut suppressed = vec![false; candidates.len()];

    for i in 0..candidates.len() {
        if suppressed[i] {
            continue;
        }

        for j in (i + 1)..candidates.len() {
            if !suppressed[j] && candidates[i].bbox.overlaps(&candidates[j].bbox, iou_threshold) {
                suppressed[j] = true;
            }
        }

        let best = &candidates[i];
        kept.push(Detection::new(best.code.clone(), best.bbox));
    }

    kept
}
