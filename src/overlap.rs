//! Exact suffix/prefix overlap detection between fragments.
//!
//! Two fragments overlap when a suffix of the first equals a prefix of the
//! second and that shared span covers more than half of *both* fragments.
//! The half-length floor keeps true overlaps unique for chains built from a
//! single ground-truth sequence and rejects short coincidental matches.

use serde::Serialize;

/// A directed overlap relation between two fragments, addressed by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Overlap {
    /// Index of the fragment whose suffix participates in the overlap.
    #[serde(rename = "source")]
    pub from: usize,
    /// Index of the fragment whose prefix participates in the overlap.
    #[serde(rename = "target")]
    pub to: usize,
    /// Length of the shared span, always `< min(len(from), len(to))`.
    #[serde(rename = "overlap")]
    pub len: usize,
}

/// Smallest overlap span accepted between fragments of the given lengths.
///
/// `max(x_len / 2 + 1, y_len / 2 + 1)`, so always at least 1.
#[inline]
pub fn overlap_threshold(x_len: usize, y_len: usize) -> usize {
    (x_len / 2 + 1).max(y_len / 2 + 1)
}

/// Length of the longest suffix of `x` that is also a prefix of `y`, subject
/// to [`overlap_threshold`]. Returns `None` when no span qualifies.
///
/// Candidate spans are scanned from `min(len(x), len(y)) - 1` downwards, so a
/// fragment is never reported as fully contained in its neighbour.
///
/// ```
/// use genseq::overlap_length;
///
/// assert_eq!(overlap_length("ATTAGACCTG", "AGACCTGCCG"), Some(7));
/// assert_eq!(overlap_length("ATTAGACCTG", "CCTGCCGGAA"), None);
/// ```
pub fn overlap_length(x: &str, y: &str) -> Option<usize> {
    let x = x.as_bytes();
    let y = y.as_bytes();
    let lower = overlap_threshold(x.len(), y.len());
    let upper = x.len().min(y.len());

    // An empty range here means no span can satisfy the threshold.
    for n in (lower..upper).rev() {
        let offset = x.len() - n;
        let mut matched = true;
        for i in 0..n {
            if x[offset + i] != y[i] {
                matched = false;
                break;
            }
        }
        if matched {
            return Some(n);
        }
    }
    None
}

/// Same contract as [`overlap_length`], comparing whole slices per span
/// instead of walking bytes by hand. Kept for benchmarking the two.
pub fn overlap_length_by_slices(x: &str, y: &str) -> Option<usize> {
    let lower = overlap_threshold(x.len(), y.len());
    let upper = x.len().min(y.len());

    (lower..upper)
        .rev()
        .find(|&n| x.as_bytes()[x.len() - n..] == y.as_bytes()[..n])
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASES: &[(&str, &str, Option<usize>)] = &[
        ("ATC", "TCG", Some(2)),
        ("CAAAA", "AAAAC", Some(4)),
        ("ATTAGACCTG", "AGACCTGCCG", Some(7)),
        ("AAC", "AAC", None),
        ("A", "ATC", None),
        ("ATTAGACCTG", "CCTGCCGGAA", None),
    ];

    #[test]
    fn byte_loop_matches_known_overlaps() {
        for (i, &(x, y, expected)) in CASES.iter().enumerate() {
            assert_eq!(overlap_length(x, y), expected, "case {i}: {x} vs {y}");
        }
    }

    #[test]
    fn slice_comparison_matches_known_overlaps() {
        for (i, &(x, y, expected)) in CASES.iter().enumerate() {
            assert_eq!(
                overlap_length_by_slices(x, y),
                expected,
                "case {i}: {x} vs {y}"
            );
        }
    }

    #[test]
    fn threshold_uses_the_longer_fragment() {
        assert_eq!(overlap_threshold(10, 10), 6);
        assert_eq!(overlap_threshold(3, 10), 6);
        assert_eq!(overlap_threshold(1, 1), 1);
        // "GCCGGAA" (7) clears the 10/2 + 1 floor.
        assert_eq!(overlap_length("CCTGCCGGAA", "GCCGGAATAC"), Some(7));
    }

    #[test]
    fn prefers_the_longest_qualifying_span() {
        // Both 4 and 3 qualify; the scan starts high.
        assert_eq!(overlap_length("CAAAA", "AAAAC"), Some(4));
        assert_eq!(overlap_length("GAAAA", "AAAAT"), Some(4));
    }

    #[test]
    fn never_reports_containment_or_short_spans() {
        // y is wholly contained in x, which is not an overlap.
        assert_eq!(overlap_length("ACGTAC", "ACG"), None);
        // Only a 2-base overlap exists, below the floor of 4.
        assert_eq!(overlap_length("AAAAGT", "GTCCCC"), None);
        assert_eq!(overlap_length("", "ACGT"), None);
    }

    #[test]
    fn is_case_sensitive() {
        assert_eq!(overlap_length("ATC", "tcg"), None);
        assert_eq!(overlap_length("ATC", "TCG"), Some(2));
    }

    #[test]
    fn periodic_fragment_overlaps_an_equal_copy() {
        // Duplicate content at different indices is compared by value.
        assert_eq!(overlap_length("AAAA", "AAAA"), Some(3));
        assert_eq!(overlap_length_by_slices("AAAA", "AAAA"), Some(3));
    }

    #[test]
    fn serialises_as_edge_list_entry() {
        let value = serde_json::to_value(Overlap {
            from: 0,
            to: 2,
            len: 7,
        })
        .unwrap();
        assert_eq!(value["source"], 0);
        assert_eq!(value["target"], 2);
        assert_eq!(value["overlap"], 7);
    }
}
