//! Loading and validating the fragments handed to the assembler.
//!
//! Input may be FASTA (records start at a `>` descriptor line and may span
//! several sequence lines), FASTQ, or plain text with one fragment per line.
//! Any of these may be gzip-compressed.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use bio::io::{fasta, fastq};
use flate2::read::MultiGzDecoder;
use log::{debug, info};

/// Default cap on the number of fragments per input.
pub const DEFAULT_MAX_FRAGMENTS: usize = 50;

/// Default cap on the length of a single fragment.
pub const DEFAULT_MAX_FRAGMENT_LEN: usize = 1000;

const ALPHABET: &[u8] = b"ACGT";

/// Errors returned while reading or validating fragments.
#[derive(thiserror::Error, Debug)]
pub enum FragmentSourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed {format} input: {source}")]
    Malformed {
        format: FragmentFormat,
        source: std::io::Error,
    },
    #[error("no sequence is found")]
    NoFragments,
    #[error("too many sequences are found: {found} > {max}")]
    TooManyFragments { found: usize, max: usize },
    #[error("sequence {index} must have at least one character")]
    EmptyFragment { index: usize },
    #[error("too long sequence found at {index}: {len} > {max}")]
    FragmentTooLong { index: usize, len: usize, max: usize },
    #[error("unexpected character {character:?} in sequence {index}")]
    UnexpectedCharacter { index: usize, character: char },
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Bounds a fragment set must respect before it reaches the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLimits {
    pub max_fragments: usize,
    pub max_fragment_len: usize,
}

impl Default for SourceLimits {
    fn default() -> Self {
        Self {
            max_fragments: DEFAULT_MAX_FRAGMENTS,
            max_fragment_len: DEFAULT_MAX_FRAGMENT_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentFormat {
    Fasta,
    Fastq,
    Lines,
}

impl std::fmt::Display for FragmentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Fasta => "FASTA",
            Self::Fastq => "FASTQ",
            Self::Lines => "line-delimited",
        };
        f.write_str(name)
    }
}

/// One parsed record. Plain-text input carries no names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRecord {
    pub name: Option<String>,
    pub sequence: String,
}

/// Trait that abstracts indexed access to a fragment set.
pub trait FragmentSource {
    fn num_fragments(&self) -> usize;
    fn get_name(&self, id: usize) -> Option<&str>;
    fn get_fragment(&self, id: usize) -> Result<&str, FragmentSourceError>;
    /// All fragments in input order, ready for the assembler.
    fn fragments(&self) -> &[String];
}

/// A simple in-memory adapter over `Vec<String>`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFragmentSource {
    fragments: Vec<String>,
    names: Option<Vec<String>>,
}

impl InMemoryFragmentSource {
    pub fn new(fragments: Vec<String>, names: Option<Vec<String>>) -> Self {
        InMemoryFragmentSource { fragments, names }
    }

    /// Same as [`InMemoryFragmentSource::new`] but rejects sets that break
    /// `limits` or contain characters outside `ACGT`.
    pub fn validated(
        fragments: Vec<String>,
        names: Option<Vec<String>>,
        limits: SourceLimits,
    ) -> Result<Self, FragmentSourceError> {
        validate(&fragments, limits)?;
        Ok(Self::new(fragments, names))
    }

    fn from_records(records: Vec<FragmentRecord>) -> Self {
        let named = records.iter().all(|r| r.name.is_some()) && !records.is_empty();
        let mut fragments = Vec::with_capacity(records.len());
        let mut names = Vec::with_capacity(records.len());
        for record in records {
            fragments.push(record.sequence);
            names.push(record.name.unwrap_or_default());
        }
        Self::new(fragments, named.then_some(names))
    }
}

impl FragmentSource for InMemoryFragmentSource {
    fn num_fragments(&self) -> usize {
        self.fragments.len()
    }

    fn get_name(&self, id: usize) -> Option<&str> {
        self.names
            .as_ref()
            .and_then(|names| names.get(id))
            .map(String::as_str)
    }

    fn get_fragment(&self, id: usize) -> Result<&str, FragmentSourceError> {
        self.fragments
            .get(id)
            .map(String::as_str)
            .ok_or(FragmentSourceError::NotFound(format!("id {}", id)))
    }

    fn fragments(&self) -> &[String] {
        &self.fragments
    }
}

/// Fragments loaded and validated from a file on disk.
#[derive(Debug, Clone)]
pub struct FileFragmentSource {
    path: PathBuf,
    format: FragmentFormat,
    inner: InMemoryFragmentSource,
}

impl FileFragmentSource {
    pub fn open<P: AsRef<Path>>(
        path: P,
        limits: SourceLimits,
    ) -> Result<Self, FragmentSourceError> {
        let path = path.as_ref();
        let (format, records) = read_records(path)?;
        let inner = InMemoryFragmentSource::from_records(records);
        validate(inner.fragments(), limits)?;
        info!(
            "Loaded {} {} fragments from {}",
            inner.num_fragments(),
            format,
            path.display()
        );
        Ok(FileFragmentSource {
            path: path.to_path_buf(),
            format,
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> FragmentFormat {
        self.format
    }
}

impl FragmentSource for FileFragmentSource {
    fn num_fragments(&self) -> usize {
        self.inner.num_fragments()
    }

    fn get_name(&self, id: usize) -> Option<&str> {
        self.inner.get_name(id)
    }

    fn get_fragment(&self, id: usize) -> Result<&str, FragmentSourceError> {
        self.inner.get_fragment(id)
    }

    fn fragments(&self) -> &[String] {
        self.inner.fragments()
    }
}

/// Read, parse and validate the fragments stored at `path`.
pub fn load_fragments<P: AsRef<Path>>(
    path: P,
    limits: SourceLimits,
) -> Result<Vec<String>, FragmentSourceError> {
    let (_, records) = read_records(path.as_ref())?;
    let fragments: Vec<String> = records.into_iter().map(|r| r.sequence).collect();
    validate(&fragments, limits)?;
    Ok(fragments)
}

fn read_records(
    path: &Path,
) -> Result<(FragmentFormat, Vec<FragmentRecord>), FragmentSourceError> {
    let mut reader = open_reader(path)?;
    let format = match infer_format(path) {
        Some(format) => format,
        None => sniff_format(&mut reader)?,
    };
    debug!("Reading {} as {}", path.display(), format);
    let records = parse_records(reader, format)?;
    Ok((format, records))
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("bgz"))
        .unwrap_or(false)
}

/// Guess the record format from the file extension, looking through a
/// trailing `.gz`/`.bgz`. Returns `None` for unrecognised extensions.
pub fn infer_format(path: &Path) -> Option<FragmentFormat> {
    let mut ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    if ext == "gz" || ext == "bgz" {
        if let Some(stem) = path.file_stem() {
            ext = Path::new(stem)
                .extension()
                .and_then(|e| e.to_str())
                .map(|s| s.to_ascii_lowercase())
                .unwrap_or_default();
        }
    }

    match ext.as_str() {
        "fastq" | "fq" => Some(FragmentFormat::Fastq),
        "fasta" | "fa" | "fna" => Some(FragmentFormat::Fasta),
        _ => None,
    }
}

/// Decide the format from the first non-blank byte without consuming input.
pub fn sniff_format<R: BufRead + ?Sized>(
    reader: &mut R,
) -> Result<FragmentFormat, FragmentSourceError> {
    let buf = reader.fill_buf()?;
    let format = match buf.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'>') => FragmentFormat::Fasta,
        Some(b'@') => FragmentFormat::Fastq,
        _ => FragmentFormat::Lines,
    };
    Ok(format)
}

/// Open `path` for buffered reading, decompressing `.gz`/`.bgz` files.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead>, FragmentSourceError> {
    let file = File::open(path)?;
    if is_gzip(path) {
        let decoder = MultiGzDecoder::new(file);
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn skip_leading_whitespace<R: BufRead + ?Sized>(reader: &mut R) -> std::io::Result<()> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(());
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(pos) => {
                reader.consume(pos);
                return Ok(());
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

/// Split `reader` into records of the given format. No validation happens
/// here; see [`validate`].
pub fn parse_records<R: BufRead>(
    mut reader: R,
    format: FragmentFormat,
) -> Result<Vec<FragmentRecord>, FragmentSourceError> {
    let malformed = |source| FragmentSourceError::Malformed { format, source };
    // bio expects the first record marker on the very first line.
    skip_leading_whitespace(&mut reader)?;

    match format {
        FragmentFormat::Fasta => {
            let mut records = Vec::new();
            for record in fasta::Reader::new(reader).records() {
                let record = record.map_err(malformed)?;
                records.push(FragmentRecord {
                    name: Some(record.id().to_string()),
                    sequence: String::from_utf8_lossy(record.seq()).into_owned(),
                });
            }
            Ok(records)
        }
        FragmentFormat::Fastq => {
            let mut records = Vec::new();
            for record in fastq::Reader::new(reader).records() {
                let record = record.map_err(|e| {
                    malformed(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
                })?;
                records.push(FragmentRecord {
                    name: Some(record.id().to_string()),
                    sequence: String::from_utf8_lossy(record.seq()).into_owned(),
                });
            }
            Ok(records)
        }
        FragmentFormat::Lines => {
            let mut records = Vec::new();
            for line in reader.lines() {
                let line = line?;
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                records.push(FragmentRecord {
                    name: None,
                    sequence: trimmed.to_string(),
                });
            }
            Ok(records)
        }
    }
}

/// Parse fragment sequences from `reader` without names.
pub fn parse_fragments<R: BufRead>(
    reader: R,
    format: FragmentFormat,
) -> Result<Vec<String>, FragmentSourceError> {
    Ok(parse_records(reader, format)?
        .into_iter()
        .map(|r| r.sequence)
        .collect())
}

/// Check count, length and alphabet of a fragment set, in that order.
/// Bases are matched case-sensitively.
pub fn validate(fragments: &[String], limits: SourceLimits) -> Result<(), FragmentSourceError> {
    if fragments.is_empty() {
        return Err(FragmentSourceError::NoFragments);
    }
    if fragments.len() > limits.max_fragments {
        return Err(FragmentSourceError::TooManyFragments {
            found: fragments.len(),
            max: limits.max_fragments,
        });
    }

    for (index, fragment) in fragments.iter().enumerate() {
        if fragment.is_empty() {
            return Err(FragmentSourceError::EmptyFragment { index });
        }
        if fragment.len() > limits.max_fragment_len {
            return Err(FragmentSourceError::FragmentTooLong {
                index,
                len: fragment.len(),
                max: limits.max_fragment_len,
            });
        }
        if let Some(character) = fragment
            .chars()
            .find(|c| !c.is_ascii() || !ALPHABET.contains(&(*c as u8)))
        {
            return Err(FragmentSourceError::UnexpectedCharacter { index, character });
        }
    }
    Ok(())
}
