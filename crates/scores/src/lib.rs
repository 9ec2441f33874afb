//! High-score table
//!
//! A plain text file with one `name:score` entry per line, best first. The
//! table keeps the top [`DEFAULT_CAPACITY`] entries.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

pub const DEFAULT_CAPACITY: usize = 10;
pub const DEFAULT_PATH: &str = "scores.txt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreTable {
    entries: Vec<ScoreEntry>,
    capacity: usize,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Names may not contain the separator or line breaks
fn clean_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c == ':' || c.is_control() { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        "player".to_string()
    } else {
        cleaned
    }
}

impl ScoreTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Parse file contents. Malformed lines are skipped with a warning.
    pub fn parse(text: &str, capacity: usize) -> Self {
        let mut table = Self::new(capacity);
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parsed = line
                .rsplit_once(':')
                .and_then(|(name, score)| Some((name, score.trim().parse::<u32>().ok()?)));
            match parsed {
                Some((name, score)) if !name.trim().is_empty() => table.entries.push(ScoreEntry {
                    name: name.trim().to_string(),
                    score,
                }),
                _ => warn!(line = number + 1, "skipping malformed score line"),
            }
        }
        table.sort_and_truncate();
        table
    }

    /// Load from disk. A missing file is an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text, DEFAULT_CAPACITY)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no score file yet");
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("reading scores from {}", path.display())),
        }
    }

    /// Write the table, best first, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating score directory {}", parent.display()))?;
        }
        fs::write(path, self.to_text())
            .with_context(|| format!("writing scores to {}", path.display()))
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.name);
            out.push(':');
            out.push_str(&entry.score.to_string());
            out.push('\n');
        }
        out
    }

    /// Whether `score` would make it onto the table
    pub fn is_high_score(&self, score: u32) -> bool {
        if self.entries.len() < self.capacity {
            return true;
        }
        self.entries.last().is_some_and(|lowest| score > lowest.score)
    }

    /// Add an entry. Returns its rank (0 = best) if it stayed on the table.
    pub fn insert(&mut self, name: &str, score: u32) -> Option<usize> {
        let name = clean_name(name);
        // Ties go below existing entries.
        let rank = self.entries.partition_point(|e| e.score >= score);
        if rank >= self.capacity {
            return None;
        }
        self.entries.insert(
            rank,
            ScoreEntry {
                name,
                score,
            },
        );
        self.entries.truncate(self.capacity);
        Some(rank)
    }

    pub fn top(&self, n: usize) -> &[ScoreEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sort_and_truncate(&mut self) {
        // Stable sort keeps file order among equal scores.
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(self.capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sorts_and_skips_garbage() {
        let table = ScoreTable::parse("bob:20\nnot a score\nalice:300\n:5\neve:x\n\ncarol:20\n", 10);
        let names: Vec<_> = table.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alice", "bob", "carol"]);
    }

    #[test]
    fn test_insert_ranks_and_truncates() {
        let mut table = ScoreTable::new(3);
        assert_eq!(table.insert("a", 100), Some(0));
        assert_eq!(table.insert("b", 300), Some(0));
        assert_eq!(table.insert("c", 100), Some(2));
        assert!(!table.is_high_score(100));
        assert!(table.is_high_score(101));
        assert_eq!(table.insert("d", 50), None);
        assert_eq!(table.insert("e", 200), Some(1));
        assert_eq!(table.len(), 3);
        assert_eq!(table.top(1)[0].name, "b");
        assert_eq!(table.top(10).len(), 3);
    }

    #[test]
    fn test_names_are_sanitized() {
        let mut table = ScoreTable::default();
        table.insert("  a:b\n", 1);
        table.insert("   ", 2);
        assert_eq!(table.to_text(), "player:2\na_b:1\n");
    }

    #[test]
    fn test_empty_table_accepts_anything() {
        let table = ScoreTable::default();
        assert!(table.is_empty());
        assert!(table.is_high_score(0));
    }
}
