use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::info;
use regex::Regex;

use crate::common::io::{open_reader, read_line_into};
use crate::error::{Result, WordmillError};
use crate::filter;
use crate::lock::CorpusLock;

/// Bytes per streaming read of an uploaded or imported file.
const INGEST_BUF_SIZE: usize = 4 * 1024 * 1024;

/// `$HEX[...]` spans as emitted by cracking tools for non-printable plains.
static HEX_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$HEX\[(.*?)\]").expect("hex span pattern compiles"));

/// Create an empty file at `path` if none exists yet.
pub fn ensure_file(path: &Path) -> Result<()> {
    if !path.exists() {
        File::create(path).map_err(WordmillError::io("ingest", path))?;
    }
    Ok(())
}

/// Replace every `$HEX[...]` span in `line` with its decoded plaintext.
/// Returns None when any span holds invalid hex, in which case the caller
/// falls back to the raw line. Decoded bytes are interpreted lossily; any
/// non-ASCII output is rejected by the quality filter downstream anyway.
pub fn decode_hex_spans(line: &str) -> Option<String> {
    if !HEX_SPAN.is_match(line) {
        return Some(line.to_string());
    }

    let mut decoded = String::with_capacity(line.len());
    let mut last = 0;
    for caps in HEX_SPAN.captures_iter(line) {
        let whole = caps.get(0)?;
        let inner = caps.get(1)?;
        decoded.push_str(&line[last..whole.start()]);
        let bytes = hex::decode(inner.as_str()).ok()?;
        decoded.push_str(&String::from_utf8_lossy(&bytes));
        last = whole.end();
    }
    decoded.push_str(&line[last..]);
    Some(decoded)
}

/// Prepare one uploaded line for the source corpus: decode `$HEX[...]` spans
/// (falling back to the raw line on bad hex), apply the quality filter, then
/// trim surrounding whitespace and lower-case. None means the line is
/// dropped.
pub fn prepare_ingest_line(raw: &str) -> Option<String> {
    let line = decode_hex_spans(raw).unwrap_or_else(|| raw.to_string());
    if !filter::is_quality_candidate(&line) {
        return None;
    }
    Some(line.trim().to_ascii_lowercase())
}

/// Counters from an append run.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppendReport {
    pub lines_read: u64,
    pub lines_kept: u64,
}

/// Append prepared lines from `reader` to the source corpus. Lines are
/// streamed through a 4MB buffer, filtered and normalized one at a time, and
/// written newline-terminated. Requires the corpus lock: appends never
/// interleave with a generation run.
pub fn append_from_reader(
    reader: impl Read,
    source: &Path,
    _lock: &CorpusLock,
) -> Result<AppendReport> {
    let mut target = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(source)
        .map_err(WordmillError::io("ingest", source))?;

    // Keep the corpus newline-delimited across appends: older files may end
    // without a terminator.
    let size = target
        .metadata()
        .map_err(WordmillError::io("ingest", source))?
        .len();
    if size > 0 {
        let mut last = [0u8; 1];
        target
            .seek(SeekFrom::End(-1))
            .and_then(|_| target.read_exact(&mut last))
            .map_err(WordmillError::io("ingest", source))?;
        if last[0] != b'\n' {
            target
                .write_all(b"\n")
                .map_err(WordmillError::io("ingest", source))?;
        }
    }

    let mut reader = BufReader::with_capacity(INGEST_BUF_SIZE, reader);
    let mut writer = BufWriter::with_capacity(INGEST_BUF_SIZE, &mut target);
    let mut report = AppendReport::default();
    let mut buf = Vec::new();

    while read_line_into(&mut reader, &mut buf).map_err(WordmillError::io("ingest", source))? {
        report.lines_read += 1;
        let raw = String::from_utf8_lossy(&buf);
        if let Some(prepared) = prepare_ingest_line(&raw) {
            writer
                .write_all(prepared.as_bytes())
                .map_err(WordmillError::io("ingest", source))?;
            writer
                .write_all(b"\n")
                .map_err(WordmillError::io("ingest", source))?;
            report.lines_kept += 1;
        }
    }

    writer.flush().map_err(WordmillError::io("ingest", source))?;
    Ok(report)
}

/// Counters from an import sweep.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportReport {
    pub files: usize,
    pub lines_kept: u64,
}

/// Append every `*.txt` file under `dir` to the source corpus, deleting each
/// file once ingested. The directory is created if missing. Requires the
/// corpus lock.
pub fn import_directory(dir: &Path, source: &Path, lock: &CorpusLock) -> Result<ImportReport> {
    fs::create_dir_all(dir).map_err(WordmillError::io("import", dir))?;

    let mut pending: Vec<PathBuf> = Vec::new();
    let entries = fs::read_dir(dir).map_err(WordmillError::io("import", dir))?;
    for entry in entries {
        let entry = entry.map_err(WordmillError::io("import", dir))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") && path != source {
            pending.push(path);
        }
    }
    pending.sort();

    let mut report = ImportReport::default();
    for path in pending {
        let file = File::open(&path).map_err(WordmillError::io("import", &path))?;
        let appended = append_from_reader(file, source, lock)?;
        fs::remove_file(&path).map_err(WordmillError::io("import", &path))?;
        info!(
            "imported {} ({}/{} lines kept)",
            path.display(),
            appended.lines_kept,
            appended.lines_read
        );
        report.files += 1;
        report.lines_kept += appended.lines_kept;
    }

    Ok(report)
}

/// Read the first `n` lines of `path`, optionally keeping only lines that
/// contain `substring` (case-insensitive). Scans past non-matching lines
/// until `n` matches are collected or the file ends.
pub fn first_lines(path: &Path, n: usize, substring: Option<&str>) -> Result<Vec<String>> {
    let mut reader = open_reader(path).map_err(WordmillError::io("preview", path))?;
    let needle = substring.map(str::to_ascii_lowercase);

    let mut lines = Vec::new();
    let mut buf = Vec::new();
    while lines.len() < n
        && read_line_into(&mut reader, &mut buf).map_err(WordmillError::io("preview", path))?
    {
        let line = String::from_utf8_lossy(&buf);
        let keep = match &needle {
            Some(needle) => line.to_ascii_lowercase().contains(needle.as_str()),
            None => true,
        };
        if keep {
            lines.push(line.into_owned());
        }
    }
    Ok(lines)
}
