//! Heuristic split of detections into board and hero rows
//!
//! Assumes board cards render above hero cards and that each group forms a
//! roughly horizontal row. This is a position heuristic, not a layout-aware
//! assignment.

use serde::Serialize;

use crate::bbox::Detection;

/// Card codes split into the two table rows, each left-to-right
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowSplit {
    pub board_codes: Vec<String>,
    pub hero_codes: Vec<String>,
}

/// Partition detections by vertical position and order each row by x.
///
/// The separator is the median of top-left y values, taken at index
/// `n / 2` of the y-sorted list (the lower-middle element, not an
/// interpolated median). Detections with `y <= median_y` are board, the
/// rest hero. The boundary convention is inclusive on purpose; changing it
/// moves borderline detections between rows.
pub fn split_rows(detections: &[Detection]) -> RowSplit {
    if detections.is_empty() {
        return RowSplit::default();
    }

    let mut ys: Vec<i32> = detections.iter().map(|d| d.bbox.y).collect();
    ys.sort_unstable();
    let median_y = ys[ys.len() / 2];

    let mut board: Vec<&Detection> = Vec::new();
    let mut hero: Vec<&Detection> = Vec::new();
    for det in detections {
        if det.bbox.y <= median_y {
            board.push(det);
        } else {
            hero.push(det);
        }
    }

    board.sort_by_key(|d| (d.bbox.x, d.bbox.y));
    hero.sort_by_key(|d| (d.bbox.x, d.bbox.y));

    RowSplit {
        board_codes: board.into_iter().map(|d| d.code.clone()).collect(),
        hero_codes: hero.into_iter().map(|d| d.code.clone()).collect(),
    }
}
