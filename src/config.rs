use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WordmillError};
use crate::pipeline::GenerateOptions;

/// On-disk configuration. Every path defaults relative to `data_dir`, so a
/// partial (or absent) config file works.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the corpora, import drop-box and lock file.
    pub data_dir: PathBuf,
    /// Append-only raw corpus; overrides the `data_dir` default.
    pub source_wordlist: Option<PathBuf>,
    /// Ranked output corpus; overrides the `data_dir` default.
    pub ranked_wordlist: Option<PathBuf>,
    /// Directory swept by the import command.
    pub import_dir: Option<PathBuf>,
    /// Lock file shared by every corpus mutator.
    pub lock_file: Option<PathBuf>,
    /// Generation pipeline tunables.
    pub pipeline: GenerateOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/data"),
            source_wordlist: None,
            ranked_wordlist: None,
            import_dir: None,
            lock_file: None,
            pipeline: GenerateOptions::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(WordmillError::io("config", path))?;
        serde_json::from_reader(file).map_err(|source| WordmillError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn source_path(&self) -> PathBuf {
        self.source_wordlist
            .clone()
            .unwrap_or_else(|| self.data_dir.join("source-wordlist.txt"))
    }

    pub fn ranked_path(&self) -> PathBuf {
        self.ranked_wordlist
            .clone()
            .unwrap_or_else(|| self.data_dir.join("ranked-wordlist.txt"))
    }

    pub fn import_path(&self) -> PathBuf {
        self.import_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("import"))
    }

    pub fn lock_path(&self) -> PathBuf {
        self.lock_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("corpus.lock"))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::tempdir;

    use super::Config;

    #[test]
    fn paths_derive_from_data_dir() {
        let config = Config {
            data_dir: PathBuf::from("/srv/mill"),
            ..Config::default()
        };
        assert_eq!(
            config.source_path(),
            PathBuf::from("/srv/mill/source-wordlist.txt")
        );
        assert_eq!(
            config.ranked_path(),
            PathBuf::from("/srv/mill/ranked-wordlist.txt")
        );
        assert_eq!(config.import_path(), PathBuf::from("/srv/mill/import"));
        assert_eq!(config.lock_path(), PathBuf::from("/srv/mill/corpus.lock"));
    }

    #[test]
    fn explicit_paths_override_the_derived_defaults() {
        let config = Config {
            source_wordlist: Some(PathBuf::from("/elsewhere/raw.txt")),
            ..Config::default()
        };
        assert_eq!(config.source_path(), PathBuf::from("/elsewhere/raw.txt"));
        assert_eq!(
            config.ranked_path(),
            PathBuf::from("/data/ranked-wordlist.txt")
        );
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"data_dir": "/srv/mill", "pipeline": {"ngram_max": 3}}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/mill"));
        assert_eq!(config.pipeline.ngram_max, 3);
        // untouched tunables keep their defaults
        assert_eq!(config.pipeline.ngram_min, 1);
        assert_eq!(config.pipeline.chunk_size, 256 * 1024);
        assert_eq!(config.pipeline.batch_lines, 25_000_000);
        assert_eq!(config.pipeline.flush_threshold, 50_000_000);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("config"));
    }
}
