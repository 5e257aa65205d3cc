//! Writing assembled sequences and describing the overlap graph.

use std::io::{self, Write};

use bio::alignment::distance::levenshtein;
use serde_json::{json, Value};

use crate::graph::OverlapGraph;

/// Longest sequences (either side) for which an edit distance is computed.
pub const MAX_DISTANCE_LEN: usize = 20_000;

/// Write `sequence` as one FASTA record, wrapping at `line_width` bases
/// (0 keeps the whole sequence on one line).
pub fn write_fasta<W: Write>(
    writer: &mut W,
    header: &str,
    sequence: &str,
    line_width: usize,
) -> io::Result<()> {
    writeln!(writer, ">{header}")?;
    if line_width == 0 {
        writeln!(writer, "{sequence}")?;
    } else {
        for chunk in sequence.as_bytes().chunks(line_width) {
            writer.write_all(chunk)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// JSON edge list with node attributes.
pub fn graph_to_json(graph: &OverlapGraph<'_>) -> Value {
    let nodes: Vec<Value> = graph
        .fragments()
        .iter()
        .enumerate()
        .map(|(idx, fragment)| json!({"id": idx, "sequence": fragment}))
        .collect();
    json!({"nodes": nodes, "edges": graph.edges()})
}

/// Outcome of comparing an assembly with a known reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceCheck {
    Identical { len: usize },
    EditDistance { distance: u32 },
    Skipped { assembled_len: usize, reference_len: usize },
}

pub fn compare_to_reference(assembled: &str, reference: &str) -> ReferenceCheck {
    if assembled == reference {
        ReferenceCheck::Identical {
            len: assembled.len(),
        }
    } else if assembled.len() <= MAX_DISTANCE_LEN && reference.len() <= MAX_DISTANCE_LEN {
        ReferenceCheck::EditDistance {
            distance: levenshtein(assembled.as_bytes(), reference.as_bytes()),
        }
    } else {
        ReferenceCheck::Skipped {
            assembled_len: assembled.len(),
            reference_len: reference.len(),
        }
    }
}
