use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::common::io::{create_writer, open_reader, read_line_into};
use crate::error::{Result, WordmillError};

/// Counters reported by the aggregation stage.
#[derive(Debug, Default, Clone, Copy)]
pub struct AggregateStats {
    /// Lines consumed across all chunk files.
    pub lines_consumed: u64,
    /// Lines written to the output (distinct keys, summed over windows).
    pub lines_written: u64,
    /// Number of table flushes, the final one included.
    pub flushes: u64,
}

/// Consume the chunk files strictly sequentially (each one fully read and
/// closed before the next opens), counting occurrences in a single bounded
/// table that is flushed (descending by count) whenever its distinct-key
/// cardinality exceeds `flush_threshold`, and once more at the end.
///
/// The table resets on every flush, so a token seen on both sides of a flush
/// is ranked independently in two output regions: the output is only locally
/// deduplicated and locally frequency-ordered. That windowed approximation
/// is what bounds memory on corpora with more distinct tokens than RAM.
/// Ties within a flush batch are written in unspecified order.
pub fn aggregate(chunks: &[PathBuf], output: &Path, flush_threshold: usize) -> Result<AggregateStats> {
    let mut writer = create_writer(output).map_err(WordmillError::io("aggregate", output))?;
    let mut table: HashMap<Vec<u8>, u64> = HashMap::new();
    let mut stats = AggregateStats::default();
    let mut line = Vec::new();

    for chunk in chunks {
        let mut reader = open_reader(chunk).map_err(WordmillError::io("aggregate", chunk))?;
        while read_line_into(&mut reader, &mut line).map_err(WordmillError::io("aggregate", chunk))? {
            stats.lines_consumed += 1;
            match table.get_mut(line.as_slice()) {
                Some(count) => *count += 1,
                None => {
                    table.insert(line.clone(), 1);
                }
            }
            if table.len() > flush_threshold {
                stats.lines_written += flush_table(&mut table, &mut writer, output)?;
                stats.flushes += 1;
            }
        }
        // The chunk handle drops here, before the next file opens.
        drop(reader);
        debug!("consumed chunk {}", chunk.display());
    }

    if !table.is_empty() {
        stats.lines_written += flush_table(&mut table, &mut writer, output)?;
        stats.flushes += 1;
    }

    writer.flush().map_err(WordmillError::io("aggregate", output))?;
    Ok(stats)
}

/// Drain the table: order entries by descending count, write one key per
/// line, then clear. The table keeps its allocation for the next window.
fn flush_table(
    table: &mut HashMap<Vec<u8>, u64>,
    writer: &mut impl Write,
    output: &Path,
) -> Result<u64> {
    let mut pairs: Vec<(&[u8], u64)> = table.iter().map(|(k, &c)| (k.as_slice(), c)).collect();
    pairs.sort_unstable_by(|a, b| b.1.cmp(&a.1));

    let written = pairs.len() as u64;
    for (key, _) in pairs {
        writer
            .write_all(key)
            .map_err(WordmillError::io("aggregate", output))?;
        writer
            .write_all(b"\n")
            .map_err(WordmillError::io("aggregate", output))?;
    }

    debug!("flushed {} entries", written);
    table.clear();
    Ok(written)
}
