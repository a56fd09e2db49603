//! Placeholder parser for `${key[:default]}` syntax
//!
//! Splits a string into literal runs and placeholder tokens in a single
//! forward scan. Braces are not balanced: a default runs to the first
//! unescaped `}`, so `${a:${b}}` has the default `${b` followed by a literal
//! `}`.

use std::borrow::Cow;
use std::iter::FusedIterator;
use std::ops::Range;

const OPEN: &str = "${";

/// A parsed `${key[:default]}` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderToken<'a> {
    raw_text: &'a str,
    key: &'a str,
    default_value: Option<Cow<'a, str>>,
    span: Range<usize>,
}

impl<'a> PlaceholderToken<'a> {
    /// The token exactly as written, including `${` and `}`.
    #[must_use]
    pub const fn raw_text(&self) -> &'a str {
        self.raw_text
    }

    /// The key (everything before the first `:` or `}`).
    #[must_use]
    pub const fn key(&self) -> &'a str {
        self.key
    }

    /// The default value, with `\}` escapes already applied.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Byte range of the token in the parsed string.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Byte offset where the token starts.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.span.start
    }

    /// Byte offset just past the closing `}`.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.span.end
    }
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied through unchanged.
    Literal(&'a str),
    /// A placeholder to resolve.
    Placeholder(PlaceholderToken<'a>),
}

enum Scan<'a> {
    Token(PlaceholderToken<'a>),
    EmptyKey,
    Unterminated,
}

fn scan_placeholder(input: &str, start: usize) -> Scan<'_> {
    let body_start = start + OPEN.len();
    let body = &input[body_start..];

    let Some(key_len) = body.find([':', '}']) else {
        return Scan::Unterminated;
    };
    if key_len == 0 {
        return Scan::EmptyKey;
    }
    let key = &body[..key_len];

    let (default_value, close) = if body.as_bytes()[key_len] == b'}' {
        (None, key_len)
    } else {
        let default_start = key_len + 1;
        match find_unescaped_close(&body[default_start..]) {
            Some(len) => {
                let raw = &body[default_start..default_start + len];
                let default = if raw.contains("\\}") {
                    Cow::Owned(raw.replace("\\}", "}"))
                } else {
                    Cow::Borrowed(raw)
                };
                (Some(default), default_start + len)
            }
            None => return Scan::Unterminated,
        }
    };

    let end = body_start + close + 1;
    Scan::Token(PlaceholderToken {
        raw_text: &input[start..end],
        key,
        default_value,
        span: start..end,
    })
}

fn find_unescaped_close(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1) == Some(&b'}') => i += 2,
            b'}' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Lazy iterator over the [`Segment`]s of a template.
///
/// Adjacent literal text is always yielded as a single segment.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    input: &'a str,
    pos: usize,
    pending: Option<PlaceholderToken<'a>>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.take() {
            self.pos = token.end();
            return Some(Segment::Placeholder(token));
        }

        let start = self.pos;
        if start >= self.input.len() {
            return None;
        }

        let mut cursor = start;
        while let Some(offset) = self.input[cursor..].find(OPEN) {
            let at = cursor + offset;
            match scan_placeholder(self.input, at) {
                Scan::Token(token) => {
                    if at == start {
                        self.pos = token.end();
                        return Some(Segment::Placeholder(token));
                    }
                    self.pos = at;
                    self.pending = Some(token);
                    return Some(Segment::Literal(&self.input[start..at]));
                }
                Scan::EmptyKey => cursor = at + OPEN.len(),
                // no closing brace anywhere ahead: the rest is literal
                Scan::Unterminated => break,
            }
        }

        self.pos = self.input.len();
        Some(Segment::Literal(&self.input[start..]))
    }
}

impl FusedIterator for Segments<'_> {}

/// Parses a template into segments.
///
/// The result is lazy and holds no state beyond the input, so parsing the
/// same string again always yields the same sequence.
///
/// # Examples
///
/// ```
/// use stratum_resolver::parser::{Segment, parse};
///
/// let segments: Vec<_> = parse("http://${host:localhost}/api").collect();
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments[0], Segment::Literal("http://"));
/// if let Segment::Placeholder(token) = &segments[1] {
///     assert_eq!(token.key(), "host");
///     assert_eq!(token.default_value(), Some("localhost"));
/// }
/// ```
#[must_use]
pub const fn parse(input: &str) -> Segments<'_> {
    Segments {
        input,
        pos: 0,
        pending: None,
    }
}

/// Returns every placeholder token in the input.
#[must_use]
pub fn placeholders(input: &str) -> Vec<PlaceholderToken<'_>> {
    parse(input)
        .filter_map(|segment| match segment {
            Segment::Placeholder(token) => Some(token),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Returns true if the input contains at least one well-formed placeholder.
#[must_use]
pub fn has_placeholders(input: &str) -> bool {
    input.contains(OPEN) && parse(input).any(|s| matches!(s, Segment::Placeholder(_)))
}

/// Extracts just the placeholder keys, in order of appearance.
#[must_use]
pub fn extract_keys(input: &str) -> Vec<&str> {
    placeholders(input).iter().map(PlaceholderToken::key).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn single(input: &str) -> PlaceholderToken<'_> {
        let tokens = placeholders(input);
        assert_eq!(tokens.len(), 1, "expected one placeholder in {input:?}");
        tokens.into_iter().next().unwrap()
    }

    #[test]
    fn test_parse_simple_placeholder() {
        let token = single("${name}");
        assert_eq!(token.key(), "name");
        assert_eq!(token.default_value(), None);
        assert_eq!(token.raw_text(), "${name}");
        assert_eq!(token.span(), 0..7);
    }

    #[test]
    fn test_parse_with_default() {
        let token = single("${port:8080}");
        assert_eq!(token.key(), "port");
        assert_eq!(token.default_value(), Some("8080"));
    }

    #[test]
    fn test_empty_default_is_present() {
        let token = single("${suffix:}");
        assert_eq!(token.default_value(), Some(""));
    }

    #[test]
    fn test_default_keeps_later_colons() {
        let token = single("${url:http://localhost:8080}");
        assert_eq!(token.key(), "url");
        assert_eq!(token.default_value(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_segments_in_order() {
        let segments: Vec<_> = parse("a${x}b${y:1}c").collect();
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0], Segment::Literal("a"));
        assert!(matches!(&segments[1], Segment::Placeholder(t) if t.key() == "x"));
        assert_eq!(segments[2], Segment::Literal("b"));
        assert!(matches!(&segments[3], Segment::Placeholder(t) if t.key() == "y"));
        assert_eq!(segments[4], Segment::Literal("c"));
    }

    #[test]
    fn test_adjacent_placeholders() {
        assert_eq!(extract_keys("${a}${b}${c}"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_placeholders() {
        let segments: Vec<_> = parse("plain text").collect();
        assert_eq!(segments, vec![Segment::Literal("plain text")]);
        assert!(!has_placeholders("plain text"));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert_eq!(parse("").count(), 0);
    }

    #[test]
    fn test_unterminated_is_literal_to_end() {
        let segments: Vec<_> = parse("x ${a}  y ${b:oops").collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2], Segment::Literal("  y ${b:oops"));
    }

    #[test]
    fn test_unterminated_without_default() {
        let segments: Vec<_> = parse("prefix ${name").collect();
        assert_eq!(segments, vec![Segment::Literal("prefix ${name")]);
    }

    #[test]
    fn test_empty_key_is_literal() {
        let segments: Vec<_> = parse("${}${:x}${ok}").collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], Segment::Literal("${}${:x}"));
        assert!(matches!(&segments[1], Segment::Placeholder(t) if t.key() == "ok"));
    }

    #[test]
    fn test_nested_default_is_not_structural() {
        let segments: Vec<_> = parse("${a:${b}}").collect();
        assert_eq!(segments.len(), 2);
        match &segments[0] {
            Segment::Placeholder(token) => {
                assert_eq!(token.key(), "a");
                assert_eq!(token.default_value(), Some("${b"));
                assert_eq!(token.raw_text(), "${a:${b}");
            }
            other => panic!("expected placeholder, got {other:?}"),
        }
        assert_eq!(segments[1], Segment::Literal("}"));
    }

    #[test]
    fn test_nested_open_inside_key_is_part_of_key() {
        let token = single("${a ${b}");
        assert_eq!(token.key(), "a ${b");
    }

    #[test]
    fn test_escaped_brace_in_default() {
        let token = single(r"${json:{\}}");
        assert_eq!(token.default_value(), Some("{}"));
        assert_eq!(token.raw_text(), r"${json:{\}}");
    }

    #[test]
    fn test_single_dollar_and_brace() {
        assert!(placeholders("$name {name} $ {").is_empty());
    }

    #[test]
    fn test_span_positions() {
        let input = "Hello ${name}, welcome!";
        let token = single(input);
        assert_eq!(&input[token.span()], "${name}");
        assert_eq!(token.start(), 6);
        assert_eq!(token.end(), 13);
    }

    #[test]
    fn test_multibyte_text() {
        let input = "héllo ${名前:世界} ✓";
        let token = single(input);
        assert_eq!(token.key(), "名前");
        assert_eq!(token.default_value(), Some("世界"));
        assert_eq!(&input[token.span()], "${名前:世界}");
    }

    #[test]
    fn test_restartable() {
        let input = "${a}-${b:2}-${c";
        let first: Vec<_> = parse(input).collect();
        let second: Vec<_> = parse(input).collect();
        assert_eq!(first, second);

        let iter = parse(input);
        let cloned = iter.clone();
        assert_eq!(iter.collect::<Vec<_>>(), cloned.collect::<Vec<_>>());
    }

    #[test]
    fn test_segments_reassemble_input() {
        let input = "x${a}y${b:c}z${}${d";
        let rebuilt: String = parse(input)
            .map(|segment| match segment {
                Segment::Literal(text) => text,
                Segment::Placeholder(token) => token.raw_text(),
            })
            .collect();
        assert_eq!(rebuilt, input);
    }

    #[test]
    fn test_has_placeholders() {
        assert!(has_placeholders("${a}"));
        assert!(has_placeholders("pre ${a:b} post"));
        assert!(!has_placeholders("${a"));
        assert!(!has_placeholders("${}"));
        assert!(!has_placeholders("a}"));
    }
}
