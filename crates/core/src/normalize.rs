//! Text normalization for slide text.
//!
//! Turns lightweight markup (emphasis, headings, links, quotes, code fences,
//! list markers) and escaped sequences into plain text suitable for a text
//! frame. Line breaks survive; runs of horizontal whitespace collapse.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// `**bold**`, keeping the enclosed text.
static BOLD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

/// `*italic*`, keeping the enclosed text.
static ITALIC_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").unwrap());

/// Heading markers at the start of a line.
static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#+[ \t]*").unwrap());

/// `[text](target)`, keeping the text.
static LINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]*)\]\([^)\n]*\)").unwrap());

/// Blockquote markers at the start of a line.
static BLOCKQUOTE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]*").unwrap());

/// Fenced code blocks, content included.
static CODE_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());

/// `1. item` style list markers.
static ORDERED_ITEM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\d+\.[ \t]+").unwrap());

/// `* item` style list markers.
static UNORDERED_ITEM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\*[ \t]+").unwrap());

/// `\uXXXX` escapes left over from double-encoded JSON.
static UNICODE_ESCAPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\u([0-9a-fA-F]{4})").unwrap());

/// Whitespace other than newlines.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// Bullet prefix every list item is rewritten to.
const BULLET: &str = "- ";

/// Upper bound on repeated passes in [`TextNormalizer::normalize`].
pub const MAX_PASSES: usize = 16;

/// Normalizer from lightweight markup to plain presentation text.
///
/// Normalization never fails: empty input yields an empty string, and the
/// result is a fixed point (normalizing it again changes nothing) unless the
/// markup is nested deeper than [`MAX_PASSES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    /// Create a new text normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Normalize raw slide text.
    ///
    /// Passes repeat until the text stops changing, so the result is stable
    /// under another call for markup nested up to [`MAX_PASSES`] levels.
    /// Deeper nesting stops at the cap with the last pass's output.
    pub fn normalize(&self, raw: &str) -> String {
        let mut current = self.normalize_once(raw);

        for _ in 1..MAX_PASSES {
            let next = self.normalize_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// Normalize optional text; absent text yields the empty string.
    pub fn normalize_opt(&self, raw: Option<&str>) -> String {
        raw.map(|text| self.normalize(text)).unwrap_or_default()
    }

    /// A single pass over the text, each step working on the previous
    /// step's output.
    fn normalize_once(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }

        let mut text = raw.replace("\r\n", "\n").replace('\r', "\n");

        text = BOLD_REGEX.replace_all(&text, "$1").into_owned();
        text = ITALIC_REGEX.replace_all(&text, "$1").into_owned();

        // Doubled escapes from double-encoded input.
        text = text.replace("\\\\n", "\n").replace("\\\\-", "-");

        text = HEADING_REGEX.replace_all(&text, "").into_owned();
        text = LINK_REGEX.replace_all(&text, "$1").into_owned();
        text = BLOCKQUOTE_REGEX.replace_all(&text, "").into_owned();
        text = CODE_FENCE_REGEX.replace_all(&text, "").into_owned();

        text = ORDERED_ITEM_REGEX.replace_all(&text, BULLET).into_owned();
        text = UNORDERED_ITEM_REGEX.replace_all(&text, BULLET).into_owned();

        text = text.replace("\\t", "\t");
        text = decode_unicode_escapes(&text).into_owned();
        text = html_escape::decode_html_entities(&text).into_owned();

        text = WHITESPACE_COLLAPSE_REGEX.replace_all(&text, " ").into_owned();
        text.trim().to_string()
    }
}

/// Normalize raw slide text with the default normalizer.
pub fn normalize(raw: &str) -> String {
    TextNormalizer::new().normalize(raw)
}

/// Decode `\uXXXX` escapes. Escapes naming a lone surrogate are left as
/// they are.
fn decode_unicode_escapes(text: &str) -> Cow<'_, str> {
    UNICODE_ESCAPE_REGEX.replace_all(text, |caps: &Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let normalizer = TextNormalizer::new();

        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize_opt(None), "");
        assert_eq!(normalizer.normalize("   \n\t "), "");
    }

    #[test]
    fn test_strip_emphasis() {
        assert_eq!(normalize("**Hi** *there*"), "Hi there");
        assert_eq!(normalize("a **bold** and *italic* word"), "a bold and italic word");
    }

    #[test]
    fn test_heading_keeps_existing_bullets() {
        assert_eq!(normalize("# Title\n- item"), "Title\n- item");
        assert_eq!(normalize("### Deep heading"), "Deep heading");
    }

    #[test]
    fn test_ordered_list_becomes_bullets() {
        assert_eq!(normalize("1. first\n2. second"), "- first\n- second");
        assert_eq!(normalize("  10. tenth"), "- tenth");
    }

    #[test]
    fn test_unordered_list_becomes_bullets() {
        assert_eq!(normalize("* one\n* two"), "- one\n- two");
    }

    #[test]
    fn test_doubled_escapes() {
        assert_eq!(normalize(r"line one\\nline two"), "line one\nline two");
        assert_eq!(normalize(r"\\- item"), "- item");
    }

    #[test]
    fn test_links_keep_text() {
        assert_eq!(
            normalize("See [the docs](https://example.com/docs) today"),
            "See the docs today"
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(normalize("> quoted\n>also"), "quoted\nalso");
    }

    #[test]
    fn test_code_fence_removed() {
        assert_eq!(normalize("before ```let x = 1;\nx``` after"), "before after");
    }

    #[test]
    fn test_escaped_tab_collapses() {
        assert_eq!(normalize(r"a\tb"), "a b");
    }

    #[test]
    fn test_unicode_escape() {
        assert_eq!(normalize(r"caf\u00e9"), "café");
        assert_eq!(normalize(r"\u2713 done"), "✓ done");
    }

    #[test]
    fn test_lone_surrogate_escape_is_kept() {
        assert_eq!(normalize(r"x\ud800y"), r"x\ud800y");
    }

    #[test]
    fn test_html_entities() {
        assert_eq!(normalize("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(normalize("it&#39;s &lt;fine&gt;"), "it's <fine>");
        assert_eq!(normalize("caf&eacute;"), "café");
    }

    #[test]
    fn test_whitespace_collapse_keeps_newlines() {
        assert_eq!(normalize("  a    b\t\tc  \n d  "), "a b c \n d");
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(normalize("one\r\ntwo\rthree"), "one\ntwo\nthree");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "**Hi** *there*",
            "# Title\n- item",
            "1. first\n2. second",
            "# # nested heading",
            "> > nested quote",
            r"**stars**",
            "&amp;lt;b&amp;gt;",
            "&#42;&#42;bold&#42;&#42;",
            "***x***",
            "* * x",
            r"tab\\ttab \\n next",
            "mixed\u{a0}\u{2003}space\u{b}here",
            "```unterminated fence",
            "[a](b) [c](d)",
        ];

        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_deep_nesting_stops_at_pass_cap() {
        let input = format!("&{}lt;", "amp;".repeat(200));
        let output = normalize(&input);

        assert!(output.len() < input.len());
        assert!(output.starts_with("&amp;"));
    }
}
