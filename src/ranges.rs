//! Turns boundary page numbers into contiguous page ranges.

use log::warn;
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;

/// An inclusive span of pages assigned to one output file.
///
/// `part` is the 1-based position of the section in the document. Two
/// markers on the same page produce an empty range, represented with
/// `start == end + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    pub part: usize,
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn len(&self) -> u32 {
        if self.is_empty() { 0 } else { self.end - self.start + 1 }
    }

    pub fn pages(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "part {} (empty)", self.part)
        } else {
            write!(f, "part {} (pages {}-{})", self.part, self.start, self.end)
        }
    }
}

/// Forces scanned boundaries into a non-decreasing sequence within
/// `[0, total_pages]`.
///
/// The renderer emits markers in reading order, so this only changes
/// anything when the log carried stray or stale marker lines.
fn normalize_boundaries(boundaries: &[u32], total_pages: u32) -> Vec<u32> {
    let mut previous = 0;
    boundaries
        .iter()
        .map(|&page| {
            let clamped = page.clamp(previous, total_pages);
            if clamped != page {
                warn!("Boundary at page {} is out of order or past the last page ({}); using {}", page, total_pages, clamped);
            }
            previous = clamped;
            clamped
        })
        .collect()
}

/// Computes one range per section: before the first boundary, between each
/// pair of boundaries, and after the last one up to `total_pages`.
///
/// Always returns `boundaries.len() + 1` ranges. Together the non-empty ones
/// cover `1..=total_pages` exactly once.
pub fn compute_ranges(boundaries: &[u32], total_pages: u32) -> Vec<PageRange> {
    let mut points = Vec::with_capacity(boundaries.len() + 2);
    points.push(0);
    points.extend(normalize_boundaries(boundaries, total_pages));
    points.push(total_pages);

    points
        .windows(2)
        .enumerate()
        .map(|(index, pair)| PageRange { part: index + 1, start: pair[0] + 1, end: pair[1] })
        .collect()
}
