use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::common::io::create_writer;
use crate::error::{Result, WordmillError};
use crate::lock::CorpusLock;
use crate::scatter;
use crate::transform::{self, TransformOptions};

/// Tunables for a generation run. The three memory-bounding knobs are the
/// transform chunk size, the scatter batch size and the aggregate flush
/// threshold; the defaults target an 8GB host with abundant disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Bytes read from the source per transform step. Small keeps the
    /// n-gram expansion of a chunk cheap; raise it for throughput.
    pub chunk_size: usize,
    /// Inclusive word-window range for n-gram expansion.
    pub ngram_min: usize,
    pub ngram_max: usize,
    /// Candidate length bounds, inclusive.
    pub min_len: usize,
    pub max_len: usize,
    /// Lines held in memory per scatter-sort batch. Larger values mean
    /// fewer chunk files (less inode pressure) at the cost of peak memory.
    pub batch_lines: usize,
    /// Distinct keys held in the frequency table before a flush. Raise on
    /// hosts with more RAM for stronger deduplication.
    pub flush_threshold: usize,
    /// Scratch directory; defaults to `temp_chunks` next to the output file.
    /// Created at run start and removed unconditionally at run end.
    pub temp_dir: Option<PathBuf>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            chunk_size: 256 * 1024,
            ngram_min: 1,
            ngram_max: 5,
            min_len: 4,
            max_len: 32,
            batch_lines: 25_000_000,
            flush_threshold: 50_000_000,
            temp_dir: None,
        }
    }
}

impl GenerateOptions {
    fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            ngram_min: self.ngram_min,
            ngram_max: self.ngram_max,
            min_len: self.min_len,
            max_len: self.max_len,
        }
    }
}

/// Counters from a completed generation run.
#[derive(Debug, Clone, Copy)]
pub struct GenerateReport {
    /// Candidates emitted by the transform stage.
    pub candidates: u64,
    /// Temporary chunk files produced by the scatter-sort stage.
    pub chunk_files: usize,
    /// Frequency-table flushes, the final one included.
    pub flushes: u64,
    /// Lines in the final ranked corpus.
    pub lines_ranked: u64,
}

/// Scratch directory that is removed on drop, success or failure.
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn create(path: PathBuf) -> Result<Self> {
        fs::create_dir_all(&path).map_err(WordmillError::io("scratch", &path))?;
        Ok(Self { path })
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Run the whole generation pipeline synchronously: stream `source` through
/// the transform/filter chain into `output`, then scatter-sort and aggregate
/// `output` in place into the final ranked corpus.
///
/// Single-threaded and all-or-nothing: the first I/O error aborts the run
/// and propagates with stage context; the caller decides whether to retry
/// on its next scheduled interval. The `&CorpusLock` parameter is proof that
/// the caller holds the exclusive corpus lock, so no append can interleave
/// with the run. The output file is rewritten in place, so a failed run can
/// leave it partial; the scratch directory is removed either way.
pub fn generate(
    source: &Path,
    output: &Path,
    opts: &GenerateOptions,
    _lock: &CorpusLock,
) -> Result<GenerateReport> {
    let started = Instant::now();
    let scratch = ScratchDir::create(scratch_path(output, opts))?;

    let candidates = expand_source(source, output, opts)?;
    info!(
        "expanded {} candidates from {} in {:.2?}",
        candidates,
        source.display(),
        started.elapsed()
    );

    let scatter_started = Instant::now();
    let chunks = scatter::scatter_sort(output, &scratch.path, opts.batch_lines)?;
    info!(
        "scatter-sorted into {} chunk files in {:.2?}",
        chunks.len(),
        scatter_started.elapsed()
    );

    let aggregate_started = Instant::now();
    let stats = aggregate::aggregate(&chunks, output, opts.flush_threshold)?;
    info!(
        "aggregated {} lines into {} ranked entries over {} flushes in {:.2?}",
        stats.lines_consumed,
        stats.lines_written,
        stats.flushes,
        aggregate_started.elapsed()
    );

    Ok(GenerateReport {
        candidates,
        chunk_files: chunks.len(),
        flushes: stats.flushes,
        lines_ranked: stats.lines_written,
    })
}

fn scratch_path(output: &Path, opts: &GenerateOptions) -> PathBuf {
    match &opts.temp_dir {
        Some(dir) => dir.clone(),
        None => output
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("temp_chunks"),
    }
}

/// Stream the source file in fixed-size byte chunks through the transform
/// stage, writing candidates to `target`. The trailing partial line of each
/// chunk is carried into the next read, so tokens never split at chunk
/// boundaries; memory stays bounded by the chunk size plus one line.
fn expand_source(source: &Path, target: &Path, opts: &GenerateOptions) -> Result<u64> {
    let transform_opts = opts.transform_options();
    let mut file = File::open(source).map_err(WordmillError::io("transform", source))?;
    let mut writer = create_writer(target).map_err(WordmillError::io("transform", target))?;

    let mut buf = vec![0u8; opts.chunk_size.max(1)];
    let mut carry: Vec<u8> = Vec::new();
    let mut emitted: u64 = 0;

    loop {
        let n = file
            .read(&mut buf)
            .map_err(WordmillError::io("transform", source))?;
        if n == 0 {
            break;
        }
        carry.extend_from_slice(&buf[..n]);

        // Hold back everything after the last newline for the next chunk.
        let cut = match memchr::memrchr(b'\n', &carry) {
            Some(pos) => pos + 1,
            None => continue,
        };
        let rest = carry.split_off(cut);
        emitted += transform::expand_chunk(&carry, &transform_opts, &mut writer)
            .map_err(WordmillError::io("transform", target))?;
        carry = rest;
    }

    if !carry.is_empty() {
        emitted += transform::expand_chunk(&carry, &transform_opts, &mut writer)
            .map_err(WordmillError::io("transform", target))?;
    }

    writer.flush().map_err(WordmillError::io("transform", target))?;
    Ok(emitted)
}
