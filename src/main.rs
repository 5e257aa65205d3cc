use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info, warn};

use genseq::fragment_source::{infer_format, open_reader, parse_fragments, sniff_format};
use genseq::output::{compare_to_reference, graph_to_json, write_fasta, ReferenceCheck};
use genseq::{
    traverse, AssemblyConfig, FileFragmentSource, FragmentSource, HeadPolicy, OverlapGraph,
    SourceLimits,
};

/// Assemble overlapping DNA fragments into one sequence
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// FASTA/FASTQ/plain-text file with one record per fragment (optionally gzipped)
    input: String,

    /// Optional output FASTA path for the assembled sequence (default: print to stdout)
    #[arg(long)]
    output_fasta: Option<String>,

    /// Wrap assembled FASTA lines to this width (0 = no-wrap)
    #[arg(long, default_value_t = 60)]
    fasta_line_width: usize,

    /// Optional output file for the overlap graph (JSON edge list with node attributes)
    #[arg(long)]
    export_graph_json: Option<String>,

    /// Optional reference sequence file used for post-assembly confirmation
    #[arg(long)]
    reference: Option<String>,

    /// Maximum number of fragments accepted from the input
    #[arg(long, default_value_t = genseq::fragment_source::DEFAULT_MAX_FRAGMENTS)]
    max_fragments: usize,

    /// Maximum length of a single fragment
    #[arg(long, default_value_t = genseq::fragment_source::DEFAULT_MAX_FRAGMENT_LEN)]
    max_fragment_len: usize,

    /// Fail when more than one fragment lacks a predecessor instead of starting from the first
    #[arg(long)]
    unique_head: bool,

    /// Verbose/info output (default: quiet)
    #[arg(long, short = 'v', alias = "info")]
    verbose: bool,

    /// Debug output
    #[arg(long)]
    debug: bool,

    /// Trace output
    #[arg(long)]
    trace: bool,
}

fn main() {
    let args = Args::parse();
    let log_level = if args.trace {
        log::LevelFilter::Trace
    } else if args.debug {
        log::LevelFilter::Debug
    } else if args.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Error
    };
    env_logger::Builder::new().filter_level(log_level).init();

    info!("input: {}", args.input);

    match run_pipeline(&args) {
        Ok(assembled) => {
            if args.output_fasta.is_none() {
                println!("{assembled}");
            }
        }
        Err(error) => {
            eprintln!("Assembly failed: {error:?}");
            std::process::exit(1);
        }
    }
}

fn load_reference(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("Reference path {} does not exist", path.display());
    }
    let mut reader =
        open_reader(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let format = match infer_format(path) {
        Some(format) => format,
        None => sniff_format(&mut reader)?,
    };
    let sequences = parse_fragments(reader, format)
        .with_context(|| format!("Failed to parse reference {}", path.display()))?;
    Ok(sequences.concat())
}

fn run_pipeline(args: &Args) -> Result<String> {
    let limits = SourceLimits {
        max_fragments: args.max_fragments,
        max_fragment_len: args.max_fragment_len,
    };
    let source = FileFragmentSource::open(&args.input, limits)
        .with_context(|| format!("Failed to load fragments from {}", args.input))?;
    let fragments = source.fragments();

    let config = AssemblyConfig {
        head_policy: if args.unique_head {
            HeadPolicy::Unique
        } else {
            HeadPolicy::FirstFound
        },
    };

    info!("Creating overlap graph...");
    let graph = OverlapGraph::build(fragments).context("Failed to build overlap graph")?;
    info!("Overlap graph created with {} edges.", graph.edges().len());

    if let Some(graph_path) = &args.export_graph_json {
        create_parent_dir(Path::new(graph_path))?;
        let mut file = File::create(graph_path)
            .with_context(|| format!("Failed to create {}", graph_path))?;
        writeln!(file, "{}", serde_json::to_string_pretty(&graph_to_json(&graph))?)?;
        info!("Overlap graph written to {}", graph_path);
    }

    let assembly = traverse(&graph, config).context("Failed to traverse overlap graph")?;
    debug!("Assembly path: {:?}", assembly.path);
    let assembled = assembly.sequence;

    if let Some(path) = &args.output_fasta {
        create_parent_dir(Path::new(path))?;
        let file = File::create(path).with_context(|| format!("Failed to create {}", path))?;
        let mut writer = BufWriter::new(file);
        let header = format!(
            "assembled_from_{}",
            source
                .path()
                .file_name()
                .unwrap_or_else(|| "fragments".as_ref())
                .to_string_lossy()
        );
        write_fasta(&mut writer, &header, &assembled, args.fasta_line_width)?;
        writer.flush()?;
        info!("Assembled sequence written to {}", path);
    }

    if let Some(reference_path) = &args.reference {
        let reference = load_reference(Path::new(reference_path))?;
        match compare_to_reference(&assembled, &reference) {
            ReferenceCheck::Identical { len } => info!(
                "Assembled sequence matches the reference sequence exactly ({} bp).",
                len
            ),
            ReferenceCheck::EditDistance { distance } => warn!(
                "Edit distance to reference (len {} vs {}): {}",
                assembled.len(),
                reference.len(),
                distance
            ),
            ReferenceCheck::Skipped {
                assembled_len,
                reference_len,
            } => info!(
                "Reference check skipped: assembled length {} or reference length {} exceeds {} bp threshold.",
                assembled_len,
                reference_len,
                genseq::output::MAX_DISTANCE_LEN
            ),
        }
    }

    Ok(assembled)
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}
