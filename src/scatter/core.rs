use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::common::io::{create_writer, open_reader, read_line_into};
use crate::error::{Result, WordmillError};

/// Split a line-oriented file into disk-resident, internally sorted chunk
/// files, returning their paths in creation order.
///
/// Lines are batched up to `batch_lines`, sorted in place (byte order) and
/// spilled to numbered files under `temp_dir`. Each chunk file is sorted on
/// its own; there is no cross-file ordering. The sort exists to cluster
/// duplicate lines so the counting stage that follows sees them together,
/// not to feed a multi-way merge.
pub fn scatter_sort(input: &Path, temp_dir: &Path, batch_lines: usize) -> Result<Vec<PathBuf>> {
    let mut reader = open_reader(input).map_err(WordmillError::io("scatter", input))?;

    let mut chunks = Vec::new();
    let mut batch: Vec<Vec<u8>> = Vec::new();
    let mut line = Vec::new();

    while read_line_into(&mut reader, &mut line).map_err(WordmillError::io("scatter", input))? {
        batch.push(line.clone());
        if batch.len() >= batch_lines {
            chunks.push(spill_batch(&mut batch, temp_dir, chunks.len())?);
        }
    }

    if !batch.is_empty() {
        chunks.push(spill_batch(&mut batch, temp_dir, chunks.len())?);
    }

    Ok(chunks)
}

/// Sort one batch and write it to the next numbered chunk file. Clearing the
/// batch afterwards drops every line's allocation before the next batch
/// starts filling.
fn spill_batch(batch: &mut Vec<Vec<u8>>, temp_dir: &Path, index: usize) -> Result<PathBuf> {
    batch.sort_unstable();

    // Zero-padded so that directory name order matches creation order.
    let path = temp_dir.join(format!("chunk_{index:06}.txt"));
    let mut writer = create_writer(&path).map_err(WordmillError::io("scatter", &path))?;
    for line in batch.iter() {
        writer
            .write_all(line)
            .map_err(WordmillError::io("scatter", &path))?;
        writer
            .write_all(b"\n")
            .map_err(WordmillError::io("scatter", &path))?;
    }
    writer.flush().map_err(WordmillError::io("scatter", &path))?;

    debug!("spilled chunk {} ({} lines)", index, batch.len());
    batch.clear();
    Ok(path)
}
