// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Tab completion: candidate sets, word extraction, quoting, filename helper.
//!
//! The editor invokes the registered [`Completer`] with the buffer prefix
//! (bytes up to the cursor) and a fresh [`CompletionSet`]; the completer
//! appends candidates, directly or through the [`complete_word`] /
//! [`complete_quoted_word`] / [`complete_filename`] helpers which handle word
//! boundary extraction and shell-style quoting.
//!
//! Every candidate shares one replacement anchor: `delete_before` bytes
//! ending at the cursor are removed before the replacement is inserted.

use std::path::{Path, PathBuf};

/// A host callback that supplies completion candidates.
///
/// Modeled as a one-method capability so closures work:
/// `|prefix, set| { ... }`.
pub trait Completer {
    fn complete(&mut self, prefix: &str, set: &mut CompletionSet);
}

impl<F> Completer for F
where
    F: FnMut(&str, &mut CompletionSet),
{
    fn complete(&mut self, prefix: &str, set: &mut CompletionSet) { self(prefix, set); }
}

/// One completion candidate: what the menu shows, what gets inserted, and how
/// many bytes before the cursor the insertion replaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub display: String,
    pub replacement: String,
    pub delete_before: usize,
}

/// How a chosen replacement is adjusted for quoting at apply time.
#[derive(Clone, Debug, PartialEq)]
pub enum QuoteStrategy {
    /// Insert the replacement as-is.
    Verbatim,
    /// The word began inside an open quote; insert raw and close the quote.
    CloseQuote(char),
    /// Bare word: wrap in `quote_char` when the replacement contains a
    /// word-break character, otherwise escape each break character.
    Requote {
        quote_char: Option<char>,
        escape_char: Option<char>,
        is_word_char: fn(char) -> bool,
    },
}

/// Candidate set built fresh per completion invocation.
#[derive(Clone, Debug)]
pub struct CompletionSet {
    candidates: Vec<Candidate>,
    default_delete_before: usize,
    quote_strategy: QuoteStrategy,
}

impl CompletionSet {
    #[must_use]
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
            default_delete_before: 0,
            quote_strategy: QuoteStrategy::Verbatim,
        }
    }

    /// Add a candidate replacing the current default anchor span.
    pub fn add(&mut self, display: impl Into<String>, replacement: impl Into<String>) {
        let delete_before = self.default_delete_before;
        self.add_with_delete_before(display, replacement, delete_before);
    }

    /// Add a candidate with an explicit anchor span.
    pub fn add_with_delete_before(
        &mut self,
        display: impl Into<String>,
        replacement: impl Into<String>,
        delete_before: usize,
    ) {
        self.candidates.push(Candidate {
            display: display.into(),
            replacement: replacement.into(),
            delete_before,
        });
    }

    /// Set the anchor span used by subsequent [`CompletionSet::add`] calls.
    pub fn set_delete_before(&mut self, delete_before: usize) {
        self.default_delete_before = delete_before;
    }

    pub fn set_quote_strategy(&mut self, strategy: QuoteStrategy) {
        self.quote_strategy = strategy;
    }

    #[must_use]
    pub fn len(&self) -> usize { self.candidates.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.candidates.is_empty() }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Candidate> { self.candidates.get(index) }

    #[must_use]
    pub fn candidates(&self) -> &[Candidate] { &self.candidates }

    /// The text to insert for `candidate`, with the set's quote strategy
    /// applied.
    #[must_use]
    pub fn quoted_replacement(&self, candidate: &Candidate) -> String {
        match &self.quote_strategy {
            QuoteStrategy::Verbatim => candidate.replacement.clone(),
            QuoteStrategy::CloseQuote(close) => {
                let mut out = candidate.replacement.clone();
                out.push(*close);
                out
            }
            QuoteStrategy::Requote {
                quote_char,
                escape_char,
                is_word_char,
            } => requote(&candidate.replacement, *quote_char, *escape_char, *is_word_char),
        }
    }
}

impl Default for CompletionSet {
    fn default() -> Self { Self::new() }
}

fn requote(
    replacement: &str,
    quote_char: Option<char>,
    escape_char: Option<char>,
    is_word_char: fn(char) -> bool,
) -> String {
    let needs_quoting = replacement.chars().any(|ch| !is_word_char(ch));
    if !needs_quoting {
        return replacement.to_string();
    }

    if let Some(quote) = quote_char {
        let mut out = String::with_capacity(replacement.len() + 2);
        out.push(quote);
        out.push_str(replacement);
        out.push(quote);
        return out;
    }

    if let Some(escape) = escape_char {
        let mut out = String::with_capacity(replacement.len() + 4);
        for ch in replacement.chars() {
            if !is_word_char(ch) {
                out.push(escape);
            }
            out.push(ch);
        }
        return out;
    }

    replacement.to_string()
}

/// Configuration for word boundary extraction and quoting.
#[derive(Clone, Debug)]
pub struct WordCompletionConfig {
    /// Word class predicate; default alphanumerics plus `_`.
    pub is_word_char: fn(char) -> bool,
    /// Escape character recognized before break characters; default `\`.
    pub escape_char: Option<char>,
    /// Quote characters, first one used for re-quoting; default `"` then `'`.
    pub quote_chars: Vec<char>,
}

impl Default for WordCompletionConfig {
    fn default() -> Self {
        Self {
            is_word_char: crate::core::line_buffer::default_is_word_char,
            escape_char: Some('\\'),
            quote_chars: vec!['"', '\''],
        }
    }
}

/// Result of locating the word to complete within the buffer prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordContext {
    /// Byte offset where the word starts within the prefix.
    pub word_start: usize,
    /// The quote that is open at the cursor, if any.
    pub open_quote: Option<char>,
}

/// Locate the word ending at the cursor.
///
/// A quote scanner runs over the whole prefix first: if a quote is open at
/// the cursor, the word starts just after it. Otherwise the scan walks left
/// over word-class and escape-prefixed characters.
#[must_use]
pub fn extract_word(prefix: &str, config: &WordCompletionConfig) -> WordContext {
    // Forward scan tracking the innermost open quote, honoring escapes.
    let mut open_quote: Option<(usize, char)> = None;
    let mut iter = prefix.char_indices();
    while let Some((idx, ch)) = iter.next() {
        if Some(ch) == config.escape_char {
            iter.next();
            continue;
        }
        match open_quote {
            Some((_, quote)) if ch == quote => open_quote = None,
            None if config.quote_chars.contains(&ch) => open_quote = Some((idx, ch)),
            _ => {}
        }
    }

    if let Some((quote_idx, quote)) = open_quote {
        return WordContext {
            word_start: quote_idx + quote.len_utf8(),
            open_quote: Some(quote),
        };
    }

    // Walk left over word-class chars and escape-prefixed break chars.
    let mut start = prefix.len();
    let chars: Vec<(usize, char)> = prefix.char_indices().collect();
    let mut idx = chars.len();
    while idx > 0 {
        let (byte_idx, ch) = chars[idx - 1];
        if (config.is_word_char)(ch) {
            start = byte_idx;
            idx -= 1;
            continue;
        }
        // An escaped break character belongs to the word.
        if idx >= 2 && Some(chars[idx - 2].1) == config.escape_char {
            start = chars[idx - 2].0;
            idx -= 2;
            continue;
        }
        break;
    }

    WordContext {
        word_start: start,
        open_quote: None,
    }
}

/// Word completion without quote handling: extract the word before the
/// cursor, anchor the set on it, and add every candidate that extends it.
/// Break characters in the chosen replacement are escaped at apply time.
pub fn complete_word<I, S>(
    set: &mut CompletionSet,
    prefix: &str,
    config: &WordCompletionConfig,
    candidates: I,
) where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let context = extract_word(
        prefix,
        &WordCompletionConfig {
            quote_chars: Vec::new(),
            ..config.clone()
        },
    );
    anchor_and_add(set, prefix, config, &context, candidates);
    set.set_quote_strategy(QuoteStrategy::Requote {
        quote_char: None,
        escape_char: config.escape_char,
        is_word_char: config.is_word_char,
    });
}

/// Word completion with quote handling: inside an open quote the replacement
/// is inserted raw and the quote closed; outside, a replacement containing
/// break characters is wrapped in the first configured quote character.
pub fn complete_quoted_word<I, S>(
    set: &mut CompletionSet,
    prefix: &str,
    config: &WordCompletionConfig,
    candidates: I,
) where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let context = extract_word(prefix, config);
    anchor_and_add(set, prefix, config, &context, candidates);
    match context.open_quote {
        Some(quote) => set.set_quote_strategy(QuoteStrategy::CloseQuote(quote)),
        None => set.set_quote_strategy(QuoteStrategy::Requote {
            quote_char: config.quote_chars.first().copied(),
            escape_char: config.escape_char,
            is_word_char: config.is_word_char,
        }),
    }
}

fn anchor_and_add<I, S>(
    set: &mut CompletionSet,
    prefix: &str,
    config: &WordCompletionConfig,
    context: &WordContext,
    candidates: I,
) where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let word = unescape_word(&prefix[context.word_start..], config.escape_char);
    set.set_delete_before(prefix.len() - context.word_start);
    for candidate in candidates {
        let candidate = candidate.into();
        if candidate.starts_with(&word) {
            set.add(candidate.clone(), candidate);
        }
    }
}

fn unescape_word(word: &str, escape_char: Option<char>) -> String {
    let Some(escape) = escape_char else {
        return word.to_string();
    };
    let mut out = String::with_capacity(word.len());
    let mut iter = word.chars();
    while let Some(ch) = iter.next() {
        if ch == escape {
            if let Some(next) = iter.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Filename completion rooted at `roots` (default: the current directory).
///
/// The word before the cursor is treated as a path: the part up to the last
/// `dir_separator` selects the directory to list, the rest filters entries by
/// prefix. Directories gain a trailing separator in both display and
/// replacement so completion can be re-invoked to descend. When `extensions`
/// is non-empty, files are filtered by extension (directories always pass).
pub fn complete_filename(
    set: &mut CompletionSet,
    prefix: &str,
    dir_separator: char,
    roots: &[PathBuf],
    extensions: &[&str],
    config: &WordCompletionConfig,
) {
    // Paths are words too: extraction must keep separators and dots, so a
    // filename-specific word class replaces the configured one.
    let filename_config = WordCompletionConfig {
        is_word_char: is_filename_char,
        ..config.clone()
    };
    let context = extract_word(prefix, &filename_config);
    let word = unescape_word(&prefix[context.word_start..], config.escape_char);

    let (dir_part, base) = match word.rfind(dir_separator) {
        Some(idx) => (&word[..=idx], &word[idx + dir_separator.len_utf8()..]),
        None => ("", word.as_str()),
    };

    set.set_delete_before(prefix.len() - context.word_start);

    let default_roots = [PathBuf::from(".")];
    let search_roots: &[PathBuf] = if roots.is_empty() { &default_roots } else { roots };

    let mut list_dir = |dir: &Path| {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        let mut names: Vec<(String, bool)> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let is_dir = entry.file_type().ok()?.is_dir();
                Some((name, is_dir))
            })
            .collect();
        names.sort();

        for (name, is_dir) in names {
            if !name.starts_with(base) {
                continue;
            }
            if !is_dir && !extensions.is_empty() {
                let matches_ext = extensions.iter().any(|ext| {
                    Path::new(&name)
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e == *ext)
                });
                if !matches_ext {
                    continue;
                }
            }
            let mut replacement = format!("{dir_part}{name}");
            let mut display = name;
            if is_dir {
                replacement.push(dir_separator);
                display.push(dir_separator);
            }
            set.add_with_delete_before(display, replacement, prefix.len() - context.word_start);
        }
    };

    if Path::new(&word).is_absolute() {
        list_dir(Path::new(dir_part));
    } else {
        for root in search_roots {
            list_dir(&root.join(dir_part));
        }
    }

    match context.open_quote {
        Some(quote) => set.set_quote_strategy(QuoteStrategy::CloseQuote(quote)),
        None => set.set_quote_strategy(QuoteStrategy::Requote {
            quote_char: config.quote_chars.first().copied(),
            escape_char: config.escape_char,
            is_word_char: is_filename_char,
        }),
    }
}

fn is_filename_char(ch: char) -> bool { !ch.is_whitespace() && ch != '"' && ch != '\'' }

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn default_config() -> WordCompletionConfig { WordCompletionConfig::default() }

    #[test]
    fn test_extract_plain_word() {
        let context = extract_word("print(fo", &default_config());
        assert_eq!(context.word_start, 6);
        assert_eq!(context.open_quote, None);
    }

    #[test]
    fn test_extract_word_at_start() {
        let context = extract_word("pr", &default_config());
        assert_eq!(context.word_start, 0);
    }

    #[test]
    fn test_extract_word_inside_quote() {
        let context = extract_word("open(\"src/ma", &default_config());
        assert_eq!(context.word_start, 6);
        assert_eq!(context.open_quote, Some('"'));
    }

    #[test]
    fn test_closed_quote_is_not_open() {
        let context = extract_word("echo \"done\" nex", &default_config());
        assert_eq!(context.open_quote, None);
        assert_eq!(context.word_start, 12);
    }

    #[test]
    fn test_escaped_quote_does_not_open() {
        let context = extract_word("say \\\"hi", &default_config());
        assert_eq!(context.open_quote, None);
    }

    #[test]
    fn test_extract_word_with_escaped_space() {
        // "my\ fi" - the escaped space belongs to the word.
        let context = extract_word("ls my\\ fi", &default_config());
        assert_eq!(context.word_start, 3);
    }

    #[test]
    fn test_complete_word_filters_by_prefix() {
        let mut set = CompletionSet::new();
        complete_word(
            &mut set,
            "pr",
            &default_config(),
            ["print", "println", "panic"],
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().replacement, "print");
        assert_eq!(set.get(1).unwrap().replacement, "println");
        assert_eq!(set.get(0).unwrap().delete_before, 2);
    }

    #[test]
    fn test_candidates_share_anchor() {
        let mut set = CompletionSet::new();
        complete_word(
            &mut set,
            "use pr",
            &default_config(),
            ["print", "println"],
        );
        assert!(set.candidates().iter().all(|c| c.delete_before == 2));
    }

    #[test]
    fn test_requote_wraps_with_first_quote_char() {
        let mut set = CompletionSet::new();
        complete_quoted_word(
            &mut set,
            "open my",
            &default_config(),
            ["my file.txt"],
        );
        let candidate = set.get(0).unwrap();
        assert_eq!(set.quoted_replacement(candidate), "\"my file.txt\"");
    }

    #[test]
    fn test_requote_escapes_without_quote_chars() {
        let config = WordCompletionConfig {
            quote_chars: Vec::new(),
            ..default_config()
        };
        let mut set = CompletionSet::new();
        complete_quoted_word(&mut set, "open my", &config, ["my file.txt"]);
        let candidate = set.get(0).unwrap();
        assert_eq!(set.quoted_replacement(candidate), "my\\ file\\.txt");
    }

    #[test]
    fn test_inside_quote_closes_quote() {
        let mut set = CompletionSet::new();
        complete_quoted_word(
            &mut set,
            "open \"my",
            &default_config(),
            ["my file.txt"],
        );
        let candidate = set.get(0).unwrap();
        assert_eq!(set.quoted_replacement(candidate), "my file.txt\"");
        assert_eq!(candidate.delete_before, 2);
    }

    #[test]
    fn test_word_without_breaks_stays_bare() {
        let mut set = CompletionSet::new();
        complete_quoted_word(&mut set, "pri", &default_config(), ["println"]);
        let candidate = set.get(0).unwrap();
        assert_eq!(set.quoted_replacement(candidate), "println");
    }

    #[test]
    fn test_complete_filename_lists_matching_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alpha.txt"), "").unwrap();
        std::fs::write(dir.path().join("alps.rs"), "").unwrap();
        std::fs::write(dir.path().join("beta.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("alcove")).unwrap();

        let mut set = CompletionSet::new();
        complete_filename(
            &mut set,
            "cat al",
            '/',
            &[dir.path().to_path_buf()],
            &[],
            &WordCompletionConfig::default(),
        );

        let displays: Vec<&str> = set.candidates().iter().map(|c| c.display.as_str()).collect();
        assert_eq!(displays, ["alcove/", "alpha.txt", "alps.rs"]);
    }

    #[test]
    fn test_complete_filename_extension_filter() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alpha.txt"), "").unwrap();
        std::fs::write(dir.path().join("alps.rs"), "").unwrap();

        let mut set = CompletionSet::new();
        complete_filename(
            &mut set,
            "cat al",
            '/',
            &[dir.path().to_path_buf()],
            &["rs"],
            &WordCompletionConfig::default(),
        );

        let displays: Vec<&str> = set.candidates().iter().map(|c| c.display.as_str()).collect();
        assert_eq!(displays, ["alps.rs"]);
    }

    #[test]
    fn test_complete_filename_descends_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "").unwrap();

        let mut set = CompletionSet::new();
        complete_filename(
            &mut set,
            "edit src/ma",
            '/',
            &[dir.path().to_path_buf()],
            &[],
            &WordCompletionConfig::default(),
        );

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).unwrap().replacement, "src/main.rs");
        // Anchor covers the whole path word, not just the basename.
        assert_eq!(set.get(0).unwrap().delete_before, "src/ma".len());
    }
}
