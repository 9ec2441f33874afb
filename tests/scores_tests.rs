//! High-score file tests

use std::fs;
use std::path::PathBuf;
use std::process;

use tokio_test::assert_ok;

use gridfall::scores::ScoreTable;

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("gridfall-scores-{}-{name}", process::id()))
        .join("scores.txt")
}

#[test]
fn test_missing_file_is_empty_table() {
    let path = scratch_path("missing");
    let table = assert_ok!(ScoreTable::load(&path));
    assert!(table.is_empty());
    assert!(table.is_high_score(1));
}

#[test]
fn test_save_writes_sorted_descending() {
    let path = scratch_path("sorted");
    let mut table = ScoreTable::default();
    table.insert("low", 10);
    table.insert("high", 900);
    table.insert("mid", 300);
    assert_ok!(table.save(&path));

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "high:900\nmid:300\nlow:10\n");

    let reloaded = assert_ok!(ScoreTable::load(&path));
    assert_eq!(reloaded, table);
    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn test_load_skips_malformed_and_keeps_top_ten() {
    let path = scratch_path("garbage");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut text = String::from("broken line\nnobody:\n");
    for i in 0..12 {
        text.push_str(&format!("p{i}:{}\n", i * 100));
    }
    fs::write(&path, text).unwrap();

    let table = assert_ok!(ScoreTable::load(&path));
    assert_eq!(table.len(), 10);
    assert_eq!(table.top(1)[0].score, 1100);
    assert_eq!(table.entries().last().map(|e| e.score), Some(200));
    assert!(!table.is_high_score(200));
    assert!(table.is_high_score(201));
    let _ = fs::remove_dir_all(path.parent().unwrap());
}
