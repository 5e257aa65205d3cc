//! genseq library
//!
//! Reconstructs a single sequence from DNA fragments whose suffix/prefix
//! overlaps cover more than half of each fragment: exact overlap detection,
//! an index-keyed overlap graph, and the chain traversal that stitches the
//! fragments together. Fragment loading and validation live in
//! [`fragment_source`].

pub mod assembly;
pub mod fragment_source;
pub mod graph;
pub mod output;
pub mod overlap;

pub use assembly::{
    assemble, assemble_with_config, traverse, Assembly, AssemblyConfig, AssemblyError,
};
pub use fragment_source::{
    load_fragments, validate, FileFragmentSource, FragmentFormat, FragmentSource,
    FragmentSourceError, InMemoryFragmentSource, SourceLimits,
};
pub use graph::{HeadPolicy, OverlapGraph};
pub use overlap::{overlap_length, overlap_length_by_slices, overlap_threshold, Overlap};
