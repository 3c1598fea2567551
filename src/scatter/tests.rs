use std::fs;
use std::path::Path;

use tempfile::tempdir;

use super::core::*;

fn write_input(dir: &Path, lines: &[&str]) -> std::path::PathBuf {
    let path = dir.join("input.txt");
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&path, content).unwrap();
    path
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn batches_split_at_the_configured_line_count() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), &["echo", "delta", "alpha", "charlie", "bravo"]);

    let chunks = scatter_sort(&input, dir.path(), 2).unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(read_lines(&chunks[0]), vec!["delta", "echo"]);
    assert_eq!(read_lines(&chunks[1]), vec!["alpha", "charlie"]);
    assert_eq!(read_lines(&chunks[2]), vec!["bravo"]);
}

#[test]
fn preserves_the_input_multiset_across_chunks() {
    let dir = tempdir().unwrap();
    let lines = ["pear", "apple", "apple", "quince", "fig", "apple", "fig"];
    let input = write_input(dir.path(), &lines);

    let chunks = scatter_sort(&input, dir.path(), 3).unwrap();

    let mut gathered: Vec<String> = chunks.iter().flat_map(|c| read_lines(c)).collect();
    gathered.sort();
    let mut expected: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(gathered, expected);
}

#[test]
fn every_chunk_is_internally_sorted() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), &["zeta", "eta", "beta", "iota", "alpha", "theta"]);

    for chunk in scatter_sort(&input, dir.path(), 4).unwrap() {
        let lines = read_lines(&chunk);
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
    }
}

#[test]
fn exact_batch_boundary_produces_no_empty_chunk() {
    let dir = tempdir().unwrap();
    let input = write_input(dir.path(), &["b", "a", "d", "c"]);

    let chunks = scatter_sort(&input, dir.path(), 2).unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!(read_lines(&chunks[0]), vec!["a", "b"]);
    assert_eq!(read_lines(&chunks[1]), vec!["c", "d"]);
}

#[test]
fn empty_input_yields_no_chunks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("input.txt");
    fs::write(&path, "").unwrap();

    let chunks = scatter_sort(&path, dir.path(), 10).unwrap();
    assert!(chunks.is_empty());
}

#[test]
fn missing_input_is_an_error() {
    let dir = tempdir().unwrap();
    let err = scatter_sort(&dir.path().join("absent.txt"), dir.path(), 10).unwrap_err();
    assert!(err.to_string().contains("scatter"));
}

#[test]
fn chunk_names_sort_in_creation_order() {
    let dir = tempdir().unwrap();
    let lines: Vec<String> = (0..30).map(|i| format!("word{i:02}x")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let input = write_input(dir.path(), &refs);

    let chunks = scatter_sort(&input, dir.path(), 2).unwrap();
    assert_eq!(chunks.len(), 15);
    let mut by_name = chunks.clone();
    by_name.sort();
    assert_eq!(chunks, by_name);
}
