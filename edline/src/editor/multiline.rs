// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! "Is this input finished?" detection for multiline editing.
//!
//! Enter submits unless the line visibly continues: either the last
//! non-whitespace code point is the continuation character (default `\`), or
//! the language-agnostic balance scanner reports an unclosed bracket or
//! quote. Hosts with real grammars can replace the scanner with their own
//! predicate via [`crate::Readline::set_is_complete`].
//!
//! The scanner runs a quote tracker first, so brackets inside string literals
//! never count toward the bracket tally.

/// Host override for finish detection: returns `true` when the text is a
/// complete input ready to submit.
pub type IsCompletePredicate = dyn Fn(&str) -> bool + Send;

/// True when Enter should submit `text` rather than insert a newline.
#[must_use]
pub fn is_input_complete(text: &str, continuation_char: char, escape_char: char) -> bool {
    if ends_with_continuation(text, continuation_char) {
        return false;
    }
    brackets_and_quotes_balanced(text, escape_char)
}

/// True when the last non-whitespace code point equals `continuation_char`.
#[must_use]
pub fn ends_with_continuation(text: &str, continuation_char: char) -> bool {
    text.chars()
        .rev()
        .find(|ch| !ch.is_whitespace())
        .is_some_and(|ch| ch == continuation_char)
}

/// Balance scan over `()`, `[]`, `{}` and single/double quotes.
///
/// Inside a quote, brackets are ignored and `escape_char` skips the next
/// code point (so `"\""` does not close). A stray closer with no matching
/// opener is ignored rather than holding the input hostage.
#[must_use]
pub fn brackets_and_quotes_balanced(text: &str, escape_char: char) -> bool {
    let mut open_quote: Option<char> = None;
    let mut bracket_stack: Vec<char> = Vec::new();

    let mut iter = text.chars();
    while let Some(ch) = iter.next() {
        if ch == escape_char {
            iter.next();
            continue;
        }

        if let Some(quote) = open_quote {
            if ch == quote {
                open_quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' => open_quote = Some(ch),
            '(' => bracket_stack.push(')'),
            '[' => bracket_stack.push(']'),
            '{' => bracket_stack.push('}'),
            ')' | ']' | '}' => {
                if bracket_stack.last() == Some(&ch) {
                    bracket_stack.pop();
                }
            }
            _ => {}
        }
    }

    open_quote.is_none() && bracket_stack.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("hello", true ; "plain text")]
    #[test_case("hello \\", false ; "trailing continuation char")]
    #[test_case("hello \\  ", false ; "continuation char then whitespace")]
    #[test_case("", true ; "empty input")]
    fn test_continuation_char(text: &str, complete: bool) {
        assert_eq!(is_input_complete(text, '\\', '\\'), complete);
    }

    #[test_case("f(x)", true ; "balanced parens")]
    #[test_case("f(x", false ; "open paren")]
    #[test_case("a[1][2]", true ; "balanced brackets")]
    #[test_case("{ a: [1, 2", false ; "nested open")]
    #[test_case("f(g(h()))", true ; "deep nesting")]
    #[test_case(")", true ; "stray closer is not held open")]
    fn test_bracket_balance(text: &str, complete: bool) {
        assert_eq!(is_input_complete(text, '\\', '\\'), complete);
    }

    #[test_case("say \"hi\"", true ; "closed double quote")]
    #[test_case("say \"hi", false ; "open double quote")]
    #[test_case("it's", false ; "apostrophe opens single quote")]
    #[test_case("'it'", true ; "closed single quote")]
    fn test_quote_balance(text: &str, complete: bool) {
        assert_eq!(is_input_complete(text, '\\', '\\'), complete);
    }

    #[test]
    fn test_brackets_inside_strings_ignored() {
        // The quote tracker must gate the bracket tally.
        assert!(is_input_complete("print(\"(((\")", '\\', '\\'));
        assert!(!is_input_complete("print(\")\"", '\\', '\\'));
    }

    #[test]
    fn test_escaped_quote_stays_open() {
        assert!(!is_input_complete("say \"a\\\"b", '\\', '\\'));
        assert!(is_input_complete("say \"a\\\"b\"", '\\', '\\'));
    }
}
