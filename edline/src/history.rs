// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! History store: bounded, dedup'ing, searchable, persistable.
//!
//! Entries are ordered oldest to newest. The store outlives individual
//! `read_line` calls; the transient *draft* slot keeps the user's in-progress
//! line while they walk through history, so stepping past the newest entry
//! restores what they were typing.
//!
//! File format: UTF-8 text, one entry per line. Newlines inside an entry are
//! escaped as `\n` and backslashes as `\\`, so multi-line submissions
//! round-trip. Saves are atomic (temp file + rename) with mode 0600 on POSIX.

use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Default soft cap on stored entries.
pub const HISTORY_SIZE_DEFAULT: usize = 200;

/// Direction for incremental history search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchDirection {
    /// Newest to oldest (`Ctrl+R`).
    Reverse,
    /// Oldest to newest (`Ctrl+S`).
    Forward,
}

#[derive(Debug)]
pub struct History {
    entries: VecDeque<String>,
    max_entries: usize,
    allow_duplicates: bool,
    draft: Option<String>,
}

impl Default for History {
    fn default() -> Self { Self::new() }
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: HISTORY_SIZE_DEFAULT,
            allow_duplicates: false,
            draft: None,
        }
    }

    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries;
        self.enforce_cap();
    }

    pub fn set_allow_duplicates(&mut self, allow: bool) { self.allow_duplicates = allow; }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Entry at `index` (0 = oldest).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> { self.entries.get(index).map(String::as_str) }

    /// Append an entry. Empty lines are never stored; a line equal to the
    /// current newest entry is a no-op unless duplicates are allowed.
    pub fn add(&mut self, line: impl Into<String>) {
        let line = line.into();
        if line.is_empty() {
            return;
        }
        if !self.allow_duplicates && self.entries.back() == Some(&line) {
            return;
        }
        self.entries.push_back(line);
        self.enforce_cap();
    }

    /// Remove the newest entry (hosts use this to drop e.g. a failed command).
    pub fn remove_last(&mut self) -> Option<String> { self.entries.pop_back() }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.draft = None;
    }

    /// Stash the in-progress line while the user navigates history.
    pub fn save_draft(&mut self, draft: impl Into<String>) { self.draft = Some(draft.into()); }

    /// Recover (and clear) the stashed draft when navigation returns past the
    /// newest entry.
    pub fn take_draft(&mut self) -> Option<String> { self.draft.take() }

    /// Find the first entry containing `pattern` as a substring, walking from
    /// `from` (inclusive) in `direction`.
    ///
    /// Matching follows the Emacs smart-case convention: an all-lowercase
    /// pattern matches case-insensitively, any uppercase in the pattern makes
    /// the match exact.
    #[must_use]
    pub fn search(
        &self,
        pattern: &str,
        from: usize,
        direction: SearchDirection,
    ) -> Option<usize> {
        if self.entries.is_empty() || pattern.is_empty() {
            return None;
        }
        let from = from.min(self.entries.len() - 1);

        let matches = |idx: usize| entry_matches(&self.entries[idx], pattern);

        match direction {
            SearchDirection::Reverse => (0..=from).rev().find(|&idx| matches(idx)),
            SearchDirection::Forward => (from..self.entries.len()).find(|&idx| matches(idx)),
        }
    }

    /// Replace the store from a file, keeping only the last `max_entries`
    /// lines. Blank lines at either edge of the file are ignored.
    ///
    /// # Errors
    ///
    /// File read failures. The store is unchanged on error.
    pub fn load_from_file(&mut self, path: &Path, max_entries: usize) -> io::Result<()> {
        let content = fs::read_to_string(path)?;

        // Blank lines are not valid entries (empty lines are never stored),
        // so dropping them also covers the leading/trailing blank rule.
        let lines: Vec<&str> = content.lines().filter(|line| !line.is_empty()).collect();

        self.max_entries = max_entries;
        self.entries.clear();
        let skip = lines.len().saturating_sub(max_entries);
        for line in &lines[skip..] {
            self.entries.push_back(unescape_entry(line));
        }
        Ok(())
    }

    /// Write the full store atomically: a temp file in the same directory is
    /// renamed over the target, so readers never observe a torn file. On
    /// POSIX the file is created with mode 0600 (history can hold secrets).
    ///
    /// # Errors
    ///
    /// File create/write/rename failures.
    pub fn save_to_file(&self, path: &Path) -> io::Result<()> {
        let temp_path = path.with_extension(format!("tmp.{}", std::process::id()));

        {
            let mut options = fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt as _;
                options.mode(0o600);
            }
            let mut file = options.open(&temp_path)?;
            for entry in &self.entries {
                file.write_all(escape_entry(entry).as_bytes())?;
                file.write_all(b"\n")?;
            }
            file.sync_all()?;
        }

        fs::rename(&temp_path, path)
    }

    fn enforce_cap(&mut self) {
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }
}

fn entry_matches(entry: &str, pattern: &str) -> bool {
    let case_insensitive = pattern.chars().all(|ch| !ch.is_uppercase());
    if case_insensitive {
        entry.to_lowercase().contains(&pattern.to_lowercase())
    } else {
        entry.contains(pattern)
    }
}

/// Index of the first byte of the matched substring, for emphasis rendering.
#[must_use]
pub fn match_offset(entry: &str, pattern: &str) -> Option<(usize, usize)> {
    let case_insensitive = pattern.chars().all(|ch| !ch.is_uppercase());
    if case_insensitive {
        // Lowercasing can change byte lengths; scan candidate positions on
        // the original string instead.
        let pattern_lower = pattern.to_lowercase();
        for (idx, _) in entry.char_indices() {
            let tail = &entry[idx..];
            let take: String = tail.chars().take(pattern.chars().count()).collect();
            if take.to_lowercase() == pattern_lower {
                return Some((idx, idx + take.len()));
            }
        }
        None
    } else {
        entry
            .find(pattern)
            .map(|idx| (idx, idx + pattern.len()))
    }
}

fn escape_entry(entry: &str) -> String {
    entry.replace('\\', "\\\\").replace('\n', "\\n")
}

fn unescape_entry(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut iter = line.chars();
    while let Some(ch) = iter.next() {
        if ch == '\\' {
            match iter.next() {
                Some('n') => out.push('\n'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn history_of(entries: &[&str]) -> History {
        let mut history = History::new();
        history.set_allow_duplicates(true);
        for entry in entries {
            history.add(*entry);
        }
        history
    }

    #[test]
    fn test_add_dedups_against_newest() {
        let mut history = History::new();
        history.add("one");
        history.add("one");
        history.add("two");
        history.add("one");
        assert_eq!(history.len(), 3);
        assert_eq!(history.get(0), Some("one"));
        assert_eq!(history.get(2), Some("one"));
    }

    #[test]
    fn test_add_duplicates_when_allowed() {
        let mut history = History::new();
        history.set_allow_duplicates(true);
        history.add("one");
        history.add("one");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_empty_lines_never_stored() {
        let mut history = History::new();
        history.add("");
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut history = History::new();
        history.set_max_entries(2);
        history.add("a");
        history.add("b");
        history.add("c");
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0), Some("b"));
        assert_eq!(history.get(1), Some("c"));
    }

    #[test]
    fn test_draft_round_trip() {
        let mut history = History::new();
        history.save_draft("typing this");
        assert_eq!(history.take_draft(), Some("typing this".into()));
        assert_eq!(history.take_draft(), None);
    }

    #[test]
    fn test_reverse_search_finds_most_recent_first() {
        let history = history_of(&["alpha", "beta", "beta-2"]);
        assert_eq!(history.search("be", 2, SearchDirection::Reverse), Some(2));
        assert_eq!(history.search("be", 1, SearchDirection::Reverse), Some(1));
        assert_eq!(history.search("alpha", 2, SearchDirection::Reverse), Some(0));
        assert_eq!(history.search("nope", 2, SearchDirection::Reverse), None);
    }

    #[test]
    fn test_forward_search() {
        let history = history_of(&["alpha", "beta", "beta-2"]);
        assert_eq!(history.search("beta", 0, SearchDirection::Forward), Some(1));
        assert_eq!(history.search("beta", 2, SearchDirection::Forward), Some(2));
    }

    #[test]
    fn test_smart_case() {
        let history = history_of(&["Echo Hello", "echo hello"]);
        // All-lowercase pattern: case-insensitive, newest match wins.
        assert_eq!(history.search("echo", 1, SearchDirection::Reverse), Some(1));
        // Uppercase in pattern: exact match required.
        assert_eq!(history.search("Echo", 1, SearchDirection::Reverse), Some(0));
    }

    #[test]
    fn test_match_offset_case_insensitive() {
        assert_eq!(match_offset("Echo Hello", "hel"), Some((5, 8)));
        assert_eq!(match_offset("abc", "B"), None);
        assert_eq!(match_offset("aÉb", "é"), Some((1, 3)));
    }

    #[test]
    fn test_escape_round_trip() {
        let original = "line one\nline \\two\\";
        assert_eq!(unescape_entry(&escape_entry(original)), original);
        assert_eq!(escape_entry(original), "line one\\nline \\\\two\\\\");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");

        let mut history = History::new();
        history.add("first");
        history.add("multi\nline");
        history.add("back\\slash");
        history.save_to_file(&path).unwrap();

        let mut loaded = History::new();
        loaded.load_from_file(&path, 100).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.get(0), Some("first"));
        assert_eq!(loaded.get(1), Some("multi\nline"));
        assert_eq!(loaded.get(2), Some("back\\slash"));
    }

    #[test]
    fn test_load_truncates_to_last_max_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        std::fs::write(&path, "\n\none\ntwo\nthree\n\n").unwrap();

        let mut history = History::new();
        history.load_from_file(&path, 2).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0), Some("two"));
        assert_eq!(history.get(1), Some("three"));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt as _;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");

        let mut history = History::new();
        history.add("secret");
        history.save_to_file(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
