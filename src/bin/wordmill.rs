use std::fs;
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use wordmill::config::Config;
use wordmill::corpus;
use wordmill::lock::CorpusLock;
use wordmill::pipeline;

#[derive(Parser)]
#[command(
    name = "wordmill",
    about = "Derive ranked candidate wordlists from large text corpora",
    version
)]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "/etc/wordmill/config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the generation pipeline once.
    Generate,
    /// Append files (or stdin when none are given) to the source corpus.
    Ingest {
        /// Files to append.
        files: Vec<PathBuf>,
    },
    /// Sweep the import directory into the source corpus.
    Import,
    /// Print the first lines of the ranked corpus.
    Head {
        /// Number of lines to print.
        #[arg(short = 'n', long = "lines", default_value_t = 25)]
        lines: usize,
        /// Keep only lines containing this substring (case-insensitive).
        #[arg(long)]
        contains: Option<String>,
    },
    /// Regenerate whenever the source corpus is newer than the ranked corpus.
    Watch {
        /// Seconds between checks.
        #[arg(long, default_value_t = 900)]
        interval: u64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            warn!("{err}; falling back to defaults");
            Config::default()
        }
    };

    match cli.command {
        Command::Generate => generate_once(&config),
        Command::Ingest { files } => ingest(&config, &files),
        Command::Import => import(&config),
        Command::Head { lines, contains } => head(&config, lines, contains.as_deref()),
        Command::Watch { interval } => watch(&config, interval),
    }
}

fn generate_once(config: &Config) -> anyhow::Result<()> {
    let lock = CorpusLock::acquire(&config.lock_path())?;
    corpus::ensure_file(&config.source_path())?;

    let report = pipeline::generate(
        &config.source_path(),
        &config.ranked_path(),
        &config.pipeline,
        &lock,
    )?;
    info!(
        "generation finished: {} candidates, {} chunk files, {} flushes, {} ranked lines",
        report.candidates, report.chunk_files, report.flushes, report.lines_ranked
    );
    Ok(())
}

fn ingest(config: &Config, files: &[PathBuf]) -> anyhow::Result<()> {
    let lock = CorpusLock::acquire(&config.lock_path())?;
    corpus::ensure_file(&config.source_path())?;

    if files.is_empty() {
        let report = corpus::append_from_reader(io::stdin().lock(), &config.source_path(), &lock)?;
        info!(
            "ingested stdin: kept {}/{} lines",
            report.lines_kept, report.lines_read
        );
        return Ok(());
    }

    for path in files {
        let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
        let report = corpus::append_from_reader(file, &config.source_path(), &lock)?;
        info!(
            "ingested {}: kept {}/{} lines",
            path.display(),
            report.lines_kept,
            report.lines_read
        );
    }
    Ok(())
}

fn import(config: &Config) -> anyhow::Result<()> {
    let lock = CorpusLock::acquire(&config.lock_path())?;
    corpus::ensure_file(&config.source_path())?;

    let report = corpus::import_directory(&config.import_path(), &config.source_path(), &lock)?;
    info!(
        "imported {} files, kept {} lines",
        report.files, report.lines_kept
    );
    Ok(())
}

fn head(config: &Config, lines: usize, contains: Option<&str>) -> anyhow::Result<()> {
    for line in corpus::first_lines(&config.ranked_path(), lines, contains)? {
        println!("{line}");
    }
    Ok(())
}

/// The periodic trigger: regenerate when the source file has been written
/// more recently than the ranked file. The pipeline itself stays synchronous
/// and knows nothing about the timer; a failed run is logged and retried on
/// the next interval.
fn watch(config: &Config, interval: u64) -> anyhow::Result<()> {
    info!(
        "watching {} every {}s",
        config.source_path().display(),
        interval
    );
    loop {
        match needs_regeneration(config) {
            Ok(true) => {
                if let Err(err) = generate_once(config) {
                    error!("generation failed: {err:#}");
                }
            }
            Ok(false) => {}
            Err(err) => error!("stat failed: {err:#}"),
        }
        thread::sleep(Duration::from_secs(interval));
    }
}

fn needs_regeneration(config: &Config) -> anyhow::Result<bool> {
    let source = match fs::metadata(config.source_path()) {
        Ok(meta) => meta,
        Err(_) => return Ok(false),
    };
    let ranked = match fs::metadata(config.ranked_path()) {
        Ok(meta) => meta,
        Err(_) => return Ok(true),
    };
    Ok(source.modified()? > ranked.modified()?)
}
