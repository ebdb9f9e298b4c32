//! HTML escaping for rendered block content.
//!
//! Both escapers find the first escapable byte with `memchr`, copy the
//! clean prefix in one go and only then walk byte by byte.

use std::borrow::Cow;

use memchr::{memchr, memchr2, memchr3};

/// Bytes escaped in text content. `"` is included to match CommonMark output.
const TEXT_ESCAPE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    table[b'<' as usize] = true;
    table[b'>' as usize] = true;
    table[b'&' as usize] = true;
    table[b'"' as usize] = true;
    table
};

/// Bytes escaped in attribute values.
const ATTR_ESCAPE_TABLE: [bool; 256] = {
    let mut table = TEXT_ESCAPE_TABLE;
    table[b'\'' as usize] = true;
    table
};

/// Escape text content into `out`.
///
/// # Example
/// ```
/// use blockmark::escape::escape_text_into;
///
/// let mut out = Vec::new();
/// escape_text_into(&mut out, b"<pre>");
/// assert_eq!(out, b"&lt;pre&gt;");
/// ```
#[inline]
pub fn escape_text_into(out: &mut Vec<u8>, input: &[u8]) {
    let first = min_opt(memchr3(b'<', b'>', b'&', input), memchr(b'"', input));
    escape_with_table(out, input, first, &TEXT_ESCAPE_TABLE);
}

/// Escape an attribute value into `out`.
///
/// # Example
/// ```
/// use blockmark::escape::escape_attr_into;
///
/// let mut out = Vec::new();
/// escape_attr_into(&mut out, b"it's \"rust\"");
/// assert_eq!(out, b"it&#39;s &quot;rust&quot;");
/// ```
#[inline]
pub fn escape_attr_into(out: &mut Vec<u8>, input: &[u8]) {
    let first = min_opt(
        memchr3(b'<', b'>', b'&', input),
        memchr2(b'"', b'\'', input),
    );
    escape_with_table(out, input, first, &ATTR_ESCAPE_TABLE);
}

fn escape_with_table(
    out: &mut Vec<u8>,
    input: &[u8],
    first: Option<usize>,
    table: &[bool; 256],
) {
    let Some(mut pos) = first else {
        out.extend_from_slice(input);
        return;
    };
    out.extend_from_slice(&input[..pos]);

    while pos < input.len() {
        let run_start = pos;
        while pos < input.len() && !table[input[pos] as usize] {
            pos += 1;
        }
        out.extend_from_slice(&input[run_start..pos]);

        if let Some(&b) = input.get(pos) {
            out.extend_from_slice(match b {
                b'<' => b"&lt;" as &[u8],
                b'>' => b"&gt;",
                b'&' => b"&amp;",
                b'"' => b"&quot;",
                _ => b"&#39;",
            });
            pos += 1;
        }
    }
}

#[inline]
fn min_opt(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Check if text content needs any escaping.
#[inline]
pub fn needs_text_escape(input: &[u8]) -> bool {
    input.iter().any(|&b| TEXT_ESCAPE_TABLE[b as usize])
}

/// Escape and return as a String.
///
/// Prefer [`escape_text_into`] to reuse buffers.
pub fn escape_text_to_string(input: &str) -> String {
    let mut out = Vec::with_capacity(input.len() + input.len() / 8);
    escape_text_into(&mut out, input.as_bytes());
    // Only ASCII entities are inserted, so valid UTF-8 stays valid.
    String::from_utf8(out).unwrap_or_default()
}

/// ASCII punctuation, the set a backslash may escape.
#[inline]
pub fn is_ascii_punctuation(b: u8) -> bool {
    b.is_ascii_punctuation()
}

/// Resolve backslash escapes and entity references in a fence info word.
///
/// The result is still raw text and must be attribute-escaped.
///
/// # Example
/// ```
/// use blockmark::escape::unescape_info_word;
///
/// assert_eq!(unescape_info_word("c\\+\\+"), "c++");
/// assert_eq!(unescape_info_word("f&ouml;&ouml;"), "föö");
/// ```
pub fn unescape_info_word(word: &str) -> Cow<'_, str> {
    if memchr2(b'\\', b'&', word.as_bytes()).is_none() {
        return Cow::Borrowed(word);
    }

    let bytes = word.as_bytes();
    let mut unescaped = String::with_capacity(word.len());
    let mut run_start = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] == b'\\' && bytes.get(pos + 1).is_some_and(|&b| is_ascii_punctuation(b)) {
            unescaped.push_str(&word[run_start..pos]);
            run_start = pos + 1;
            pos += 2;
        } else {
            pos += 1;
        }
    }
    unescaped.push_str(&word[run_start..]);

    match html_escape::decode_html_entities(&unescaped) {
        Cow::Borrowed(_) => Cow::Owned(unescaped),
        Cow::Owned(decoded) => Cow::Owned(decoded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text_basic() {
        let mut out = Vec::new();
        escape_text_into(&mut out, b"fenced code");
        assert_eq!(out, b"fenced code");
    }

    #[test]
    fn test_escape_text_mixed() {
        let mut out = Vec::new();
        escape_text_into(&mut out, b"<b class=\"x\">a & b</b>");
        assert_eq!(out, b"&lt;b class=&quot;x&quot;&gt;a &amp; b&lt;/b&gt;");
    }

    #[test]
    fn test_escape_text_keeps_single_quote() {
        let mut out = Vec::new();
        escape_text_into(&mut out, b"it's");
        assert_eq!(out, b"it's");
    }

    #[test]
    fn test_escape_attr_all() {
        let mut out = Vec::new();
        escape_attr_into(&mut out, b"<>&\"'");
        assert_eq!(out, b"&lt;&gt;&amp;&quot;&#39;");
    }

    #[test]
    fn test_escape_at_boundaries() {
        let mut out = Vec::new();
        escape_text_into(&mut out, b"<");
        assert_eq!(out, b"&lt;");

        out.clear();
        escape_text_into(&mut out, b"tail>");
        assert_eq!(out, b"tail&gt;");

        out.clear();
        escape_text_into(&mut out, b"&head");
        assert_eq!(out, b"&amp;head");
    }

    #[test]
    fn test_needs_escape() {
        assert!(!needs_text_escape(b"plain"));
        assert!(needs_text_escape(b"a < b"));
        assert!(!needs_text_escape(b""));
    }

    #[test]
    fn test_escape_to_string_unicode() {
        assert_eq!(escape_text_to_string("Grüße <tag>"), "Grüße &lt;tag&gt;");
    }

    #[test]
    fn test_unescape_info_word() {
        assert_eq!(unescape_info_word("rust"), "rust");
        assert_eq!(unescape_info_word("a\\b"), "a\\b");
        assert_eq!(unescape_info_word("\\*x"), "*x");
        assert_eq!(unescape_info_word("x&amp;y"), "x&y");
        assert_eq!(unescape_info_word("&#35;"), "#");
    }
}
