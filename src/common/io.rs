use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::Path;

/// Buffer size for streaming readers. Every consumer in this crate reads
/// forward-only, line by line, so a moderate buffer amortizes syscalls
/// without holding meaningful memory.
pub const READ_BUF_SIZE: usize = 256 * 1024;

/// 4MB output buffer keeps flushes rare when writing millions of lines.
pub const WRITE_BUF_SIZE: usize = 4 * 1024 * 1024;

/// Open `path` for buffered, forward-only reading.
pub fn open_reader(path: &Path) -> io::Result<BufReader<File>> {
    let file = File::open(path)?;
    Ok(BufReader::with_capacity(READ_BUF_SIZE, file))
}

/// Create (truncate) `path` behind a large write buffer.
pub fn create_writer(path: &Path) -> io::Result<BufWriter<File>> {
    let file = File::create(path)?;
    Ok(BufWriter::with_capacity(WRITE_BUF_SIZE, file))
}

/// Read the next newline-delimited line into `buf`, stripping the trailing
/// `\n` and any `\r` before it. Returns false at end of input.
pub fn read_line_into<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    buf.clear();
    let n = reader.read_until(b'\n', buf)?;
    if n == 0 {
        return Ok(false);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(true)
}
