//! Sequence reconstruction by walking the overlap chain.

use log::{debug, info};

use crate::graph::{HeadPolicy, OverlapGraph};

/// Failures that end an assembly attempt. None of them are retried.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error(
        "fragment {fragment} overlaps more than one successor (fragments {first} and {second})"
    )]
    AmbiguousOverlap {
        fragment: usize,
        first: usize,
        second: usize,
    },
    #[error("no head fragment found: every fragment has a predecessor")]
    NoHeadFound,
    #[error("more than one head fragment found: {heads:?}")]
    MultipleHeads { heads: Vec<usize> },
    #[error("traversal visited {visited} of {total} fragments")]
    IncompleteTraversal { visited: usize, total: usize },
    #[error("traversal returned to fragment {fragment}, the overlap chain contains a cycle")]
    CycleDetected { fragment: usize },
    #[error("overlap {from} -> {to} of {len} bp does not fit the fragments")]
    InvalidOverlap { from: usize, to: usize, len: usize },
}

/// Options for a single assembly run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyConfig {
    /// How to pick the chain start when several fragments lack a predecessor.
    pub head_policy: HeadPolicy,
}

/// An assembled sequence together with the fragment order that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub sequence: String,
    /// Fragment indices from head to tail.
    pub path: Vec<usize>,
}

/// Walk the chain from its head, appending the non-overlapping tail of each
/// successor. Every fragment must be visited exactly once.
pub fn traverse(
    graph: &OverlapGraph<'_>,
    config: AssemblyConfig,
) -> Result<Assembly, AssemblyError> {
    let fragments = graph.fragments();
    let total = fragments.len();
    let head = graph.head(config.head_policy)?;

    let mut visited = vec![false; total];
    let mut path = Vec::with_capacity(total);
    let mut sequence = String::with_capacity(fragments.iter().map(String::len).sum());

    sequence.push_str(&fragments[head]);
    visited[head] = true;
    path.push(head);

    let mut current = head;
    while let Some(edge) = graph.successor(current) {
        if visited[edge.to] {
            debug!("Chain from fragment {} loops back to fragment {}", head, edge.to);
            // A loop that strands other fragments is still an incomplete walk.
            if path.len() < total {
                return Err(AssemblyError::IncompleteTraversal {
                    visited: path.len(),
                    total,
                });
            }
            return Err(AssemblyError::CycleDetected { fragment: edge.to });
        }
        sequence.push_str(&fragments[edge.to][edge.len..]);
        visited[edge.to] = true;
        path.push(edge.to);
        current = edge.to;
    }

    if path.len() != total {
        debug!("Chain from fragment {} stopped at fragment {}", head, current);
        return Err(AssemblyError::IncompleteTraversal {
            visited: path.len(),
            total,
        });
    }

    Ok(Assembly { sequence, path })
}

/// Build the overlap graph and traverse it. The first failure is returned
/// unchanged and no partial sequence is produced.
pub fn assemble_with_config(
    fragments: &[String],
    config: AssemblyConfig,
) -> Result<Assembly, AssemblyError> {
    let graph = OverlapGraph::build(fragments)?;
    let assembly = traverse(&graph, config)?;
    info!(
        "Assembled {} fragments into {} bp",
        fragments.len(),
        assembly.sequence.len()
    );
    Ok(assembly)
}

/// Assemble `fragments` with the default configuration.
///
/// ```
/// let fragments: Vec<String> = ["ATTAGACCTG", "CCTGCCGGAA", "AGACCTGCCG", "GCCGGAATAC"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
/// assert_eq!(genseq::assemble(&fragments).unwrap(), "ATTAGACCTGCCGGAATAC");
/// ```
pub fn assemble(fragments: &[String]) -> Result<String, AssemblyError> {
    assemble_with_config(fragments, AssemblyConfig::default()).map(|assembly| assembly.sequence)
}
