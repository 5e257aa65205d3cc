//! Overlap graph over an ordered fragment list.
//!
//! Relations are kept as two index-keyed maps (successor and predecessor),
//! so fragments are referenced by position only and the graph never owns
//! fragment data.

use std::collections::HashMap;

use log::{debug, trace};

use crate::assembly::AssemblyError;
use crate::overlap::{overlap_length, Overlap};

/// How [`OverlapGraph::head`] treats more than one fragment without a
/// predecessor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeadPolicy {
    /// Pick the first head in input order without checking for others.
    #[default]
    FirstFound,
    /// Reject graphs with more than one head.
    Unique,
}

/// Directed overlap graph in which each fragment has at most one outgoing
/// relation. Built once per assembly and dropped after traversal.
#[derive(Debug, Clone)]
pub struct OverlapGraph<'a> {
    fragments: &'a [String],
    successors: HashMap<usize, Overlap>,
    predecessors: HashMap<usize, usize>,
}

impl<'a> OverlapGraph<'a> {
    /// Test every ordered pair of distinct fragments and record the overlaps.
    ///
    /// Fails with [`AssemblyError::AmbiguousOverlap`] as soon as a fragment
    /// overlaps a second successor. The inner scan never stops at the first
    /// match, so a fragment with several successors is always rejected.
    pub fn build(fragments: &'a [String]) -> Result<Self, AssemblyError> {
        let mut graph = Self::empty(fragments);

        for (i, x) in fragments.iter().enumerate() {
            for (j, y) in fragments.iter().enumerate() {
                if i == j {
                    continue;
                }
                if let Some(len) = overlap_length(x, y) {
                    graph.insert(Overlap { from: i, to: j, len })?;
                }
            }
        }

        debug!(
            "Built overlap graph: {} fragments, {} overlaps",
            fragments.len(),
            graph.successors.len()
        );
        Ok(graph)
    }

    /// Assemble a graph from precomputed relations, applying the same
    /// one-successor rule as [`OverlapGraph::build`].
    ///
    /// Each relation must join two distinct fragments in range, and its
    /// length must be shorter than both of them.
    pub fn from_overlaps<I>(fragments: &'a [String], overlaps: I) -> Result<Self, AssemblyError>
    where
        I: IntoIterator<Item = Overlap>,
    {
        let mut graph = Self::empty(fragments);
        for overlap in overlaps {
            check_overlap(fragments, &overlap)?;
            graph.insert(overlap)?;
        }
        Ok(graph)
    }

    fn empty(fragments: &'a [String]) -> Self {
        Self {
            fragments,
            successors: HashMap::with_capacity(fragments.len()),
            predecessors: HashMap::with_capacity(fragments.len()),
        }
    }

    fn insert(&mut self, overlap: Overlap) -> Result<(), AssemblyError> {
        if let Some(existing) = self.successors.get(&overlap.from) {
            return Err(AssemblyError::AmbiguousOverlap {
                fragment: overlap.from,
                first: existing.to,
                second: overlap.to,
            });
        }
        trace!(
            "overlap {} -> {} ({} bp)",
            overlap.from,
            overlap.to,
            overlap.len
        );
        self.successors.insert(overlap.from, overlap);
        self.predecessors.insert(overlap.to, overlap.from);
        Ok(())
    }

    /// The fragments this graph was built over.
    pub fn fragments(&self) -> &'a [String] {
        self.fragments
    }

    /// Number of fragments (nodes), including isolated ones.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn successor(&self, index: usize) -> Option<&Overlap> {
        self.successors.get(&index)
    }

    pub fn predecessor(&self, index: usize) -> Option<usize> {
        self.predecessors.get(&index).copied()
    }

    /// All relations, ordered by source index.
    pub fn edges(&self) -> Vec<Overlap> {
        let mut edges: Vec<Overlap> = self.successors.values().copied().collect();
        edges.sort_by_key(|edge| edge.from);
        edges
    }

    /// Indices without a predecessor, in input order.
    pub fn heads(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|idx| !self.predecessors.contains_key(idx))
            .collect()
    }

    /// Index of the chain start.
    ///
    /// Under [`HeadPolicy::FirstFound`] the first fragment without a
    /// predecessor wins even if others exist; a disconnected graph is then
    /// caught by the traversal count instead.
    pub fn head(&self, policy: HeadPolicy) -> Result<usize, AssemblyError> {
        match policy {
            HeadPolicy::FirstFound => (0..self.len())
                .find(|idx| !self.predecessors.contains_key(idx))
                .ok_or(AssemblyError::NoHeadFound),
            HeadPolicy::Unique => {
                let heads = self.heads();
                match heads.as_slice() {
                    [] => Err(AssemblyError::NoHeadFound),
                    [head] => Ok(*head),
                    _ => Err(AssemblyError::MultipleHeads { heads }),
                }
            }
        }
    }
}

fn check_overlap(fragments: &[String], overlap: &Overlap) -> Result<(), AssemblyError> {
    let invalid = || AssemblyError::InvalidOverlap {
        from: overlap.from,
        to: overlap.to,
        len: overlap.len,
    };
    if overlap.from == overlap.to {
        return Err(invalid());
    }
    let (from, to) = match (fragments.get(overlap.from), fragments.get(overlap.to)) {
        (Some(from), Some(to)) => (from, to),
        _ => return Err(invalid()),
    };
    if overlap.len >= from.len().min(to.len()) {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments(seqs: &[&str]) -> Vec<String> {
        seqs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn links_each_fragment_to_its_successor() {
        let reads = fragments(&["ATTAGACCTG", "CCTGCCGGAA", "AGACCTGCCG", "GCCGGAATAC"]);
        let graph = OverlapGraph::build(&reads).expect("graph");

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.successor(0), Some(&Overlap { from: 0, to: 2, len: 7 }));
        assert_eq!(graph.successor(2), Some(&Overlap { from: 2, to: 1, len: 7 }));
        assert_eq!(graph.successor(1), Some(&Overlap { from: 1, to: 3, len: 7 }));
        assert_eq!(graph.successor(3), None);
        assert_eq!(graph.predecessor(0), None);
        assert_eq!(graph.predecessor(1), Some(2));
        assert_eq!(graph.edges().len(), 3);
        assert_eq!(graph.head(HeadPolicy::FirstFound).unwrap(), 0);
        assert_eq!(graph.head(HeadPolicy::Unique).unwrap(), 0);
    }

    #[test]
    fn rejects_fragment_with_two_successors() {
        // "AACCGG" overlaps both "CCGGTT" and "CCGGAA" by 4.
        let reads = fragments(&["AACCGG", "CCGGTT", "CCGGAA"]);
        let err = OverlapGraph::build(&reads).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::AmbiguousOverlap {
                fragment: 0,
                first: 1,
                second: 2
            }
        );
    }

    #[test]
    fn cycle_leaves_no_head() {
        // "ACA" -> "CAC" -> "ACA" with 2-base overlaps.
        let reads = fragments(&["ACA", "CAC"]);
        let graph = OverlapGraph::build(&reads).expect("graph");
        assert_eq!(graph.heads(), Vec::<usize>::new());
        assert_eq!(
            graph.head(HeadPolicy::FirstFound),
            Err(AssemblyError::NoHeadFound)
        );
        assert_eq!(graph.head(HeadPolicy::Unique), Err(AssemblyError::NoHeadFound));
    }

    #[test]
    fn head_policy_decides_on_multiple_heads() {
        let reads = fragments(&["AAAAC", "TTTTG", "AAACG"]);
        let graph = OverlapGraph::build(&reads).expect("graph");
        assert_eq!(graph.heads(), vec![0, 1]);
        assert_eq!(graph.head(HeadPolicy::FirstFound), Ok(0));
        assert_eq!(
            graph.head(HeadPolicy::Unique),
            Err(AssemblyError::MultipleHeads { heads: vec![0, 1] })
        );
    }

    #[test]
    fn empty_input_has_no_head() {
        let reads: Vec<String> = Vec::new();
        let graph = OverlapGraph::build(&reads).expect("graph");
        assert!(graph.is_empty());
        assert_eq!(
            graph.head(HeadPolicy::FirstFound),
            Err(AssemblyError::NoHeadFound)
        );
    }

    #[test]
    fn from_overlaps_enforces_single_successor() {
        let reads = fragments(&["AC", "CA", "CG"]);
        let err = OverlapGraph::from_overlaps(
            &reads,
            [
                Overlap { from: 0, to: 1, len: 1 },
                Overlap { from: 0, to: 2, len: 1 },
            ],
        )
        .unwrap_err();
        assert!(matches!(err, AssemblyError::AmbiguousOverlap { fragment: 0, .. }));
    }

    #[test]
    fn from_overlaps_rejects_relations_outside_the_fragments() {
        let reads = fragments(&["ACGT", "CGTA"]);
        let out_of_range = Overlap { from: 0, to: 5, len: 3 };
        assert_eq!(
            OverlapGraph::from_overlaps(&reads, [out_of_range]).unwrap_err(),
            AssemblyError::InvalidOverlap { from: 0, to: 5, len: 3 }
        );

        let too_long = Overlap { from: 0, to: 1, len: 4 };
        assert_eq!(
            OverlapGraph::from_overlaps(&reads, [too_long]).unwrap_err(),
            AssemblyError::InvalidOverlap { from: 0, to: 1, len: 4 }
        );

        let self_loop = Overlap { from: 1, to: 1, len: 2 };
        assert!(matches!(
            OverlapGraph::from_overlaps(&reads, [self_loop]),
            Err(AssemblyError::InvalidOverlap { .. })
        ));

        let fine = Overlap { from: 0, to: 1, len: 3 };
        let graph = OverlapGraph::from_overlaps(&reads, [fine]).unwrap();
        assert_eq!(graph.successor(0), Some(&fine));
    }
}
