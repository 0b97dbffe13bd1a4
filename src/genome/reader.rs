//! K-mer file reader.
//!
//! One record per line: `<KMER> <BF>`, where `B` is the backward and `F` the
//! forward extension (`A`, `C`, `G`, `T` or the terminator `F`). Every worker
//! reads its own contiguous slice of lines; the last worker also takes the
//! remainder.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

use super::codec::CodecError;
use super::types::Record;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected `<kmer> <backward><forward>`")]
    Malformed { line: usize },
    #[error("line {line}: {source}")]
    Codec { line: usize, source: CodecError },
    #[error("input file is empty")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, ReaderError>;

/// Parses a single input line.
pub fn parse_line(line: &str, line_no: usize) -> Result<Record> {
    let mut parts = line.split_whitespace();
    let (Some(kmer), Some(ext), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ReaderError::Malformed { line: line_no });
    };

    let mut ext_chars = ext.chars();
    let (Some(backward), Some(forward), None) =
        (ext_chars.next(), ext_chars.next(), ext_chars.next())
    else {
        return Err(ReaderError::Malformed { line: line_no });
    };

    Record::parse(kmer, forward, backward).map_err(|source| ReaderError::Codec {
        line: line_no,
        source,
    })
}

/// Length of the k-mers in the file, taken from its first non-blank line.
pub fn kmer_size(path: &Path) -> Result<usize> {
    let reader = BufReader::new(File::open(path)?);
    for line in reader.lines() {
        let line = line?;
        if let Some(kmer) = line.split_whitespace().next() {
            return Ok(kmer.chars().count());
        }
    }
    Err(ReaderError::EmptyInput)
}

pub fn line_count(path: &Path) -> Result<usize> {
    let reader = BufReader::new(File::open(path)?);
    let mut count = 0;
    for line in reader.lines() {
        if !line?.trim().is_empty() {
            count += 1;
        }
    }
    Ok(count)
}

/// Line range owned by `rank` when `total` lines are split across `workers`.
pub fn partition_range(total: usize, workers: usize, rank: usize) -> Range<usize> {
    let workers = workers.max(1);
    let split = total / workers;
    let start = split * rank;
    let end = if rank + 1 == workers {
        total
    } else {
        start + split
    };
    start.min(total)..end.min(total)
}

/// Reads the slice of `path` that belongs to `rank`.
pub fn read_kmers(path: &Path, workers: usize, rank: usize) -> Result<Vec<Record>> {
    let total = line_count(path)?;
    let range = partition_range(total, workers, rank);
    let reader = BufReader::new(File::open(path)?);

    let mut records = Vec::with_capacity(range.len());
    let lines = reader
        .lines()
        .enumerate()
        .filter(|(_, line)| line.as_ref().map(|l| !l.trim().is_empty()).unwrap_or(true));

    for (idx, (line_no, line)) in lines.enumerate() {
        if idx < range.start {
            continue;
        }
        if idx >= range.end {
            break;
        }
        records.push(parse_line(&line?, line_no + 1)?);
    }

    tracing::debug!(
        "Worker {} read {} k-mers (lines {}..{} of {})",
        rank,
        records.len(),
        range.start,
        range.end,
        total
    );

    Ok(records)
}

/// Reads every record in the file, used by the in-process cluster which
/// splits the input itself.
pub fn read_all(path: &Path) -> Result<Vec<Record>> {
    read_kmers(path, 1, 0)
}
