//! blockmark: CommonMark block structure as a token stream
//!
//! The parser reads a document line by line and emits a flat stream of
//! [`MarkdownToken`]s: start tokens for block quotes, lists, paragraphs,
//! headings and code blocks, each balanced by an end token, plus standalone
//! list items, thematic breaks, text and blank lines.
//!
//! The token stream can be rendered to HTML. Inline content (emphasis,
//! links, code spans) is not parsed; paragraph text is escaped as is.
//!
//! # Example
//! ```
//! let tokens = blockmark::tokenize("> - item");
//! let shown: Vec<String> = tokens.iter().map(ToString::to_string).collect();
//! assert_eq!(shown[0], "[block-quote(1,1):]");
//! assert_eq!(shown[1], "[ulist(1,3):-::2:]");
//!
//! let html = blockmark::to_html("> - item");
//! assert_eq!(html, "<blockquote>\n<ul>\n<li>item</li>\n</ul>\n</blockquote>\n");
//! ```

pub mod block;
pub mod escape;
pub mod limits;
pub mod lint;
pub mod render;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use block::helpers::{calculate_length, remove_leading_columns};
use limits::CODE_INDENT;

// Re-export primary types
pub use block::{BlockKind, BlockParser, MarkdownToken, Position};
pub use render::HtmlWriter;

/// Rendering options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Render every line ending inside a paragraph as `<br />`.
    pub hard_line_breaks: bool,
}

/// Parse a document into its block token stream.
///
/// # Example
/// ```
/// use blockmark::MarkdownToken;
///
/// let tokens = blockmark::tokenize("# Title\n\ntext");
/// assert!(matches!(tokens[0], MarkdownToken::AtxHeading { level: 1, .. }));
/// assert_eq!(tokens.last().map(MarkdownToken::name), Some("end-para"));
/// ```
pub fn tokenize(input: &str) -> Vec<MarkdownToken> {
    BlockParser::new(input).parse()
}

/// Convert Markdown to HTML.
///
/// # Example
/// ```
/// let html = blockmark::to_html("# Hello\n\nWorld");
/// assert_eq!(html, "<h1>Hello</h1>\n<p>World</p>\n");
/// ```
pub fn to_html(input: &str) -> String {
    to_html_with_options(input, &Options::default())
}

/// Convert Markdown to HTML with options.
pub fn to_html_with_options(input: &str, options: &Options) -> String {
    let tokens = tokenize(input);
    let mut writer = HtmlWriter::with_capacity_for(input.len());
    render_tokens(&tokens, &mut writer, options);
    writer.into_string()
}

/// Convert Markdown to HTML, reusing the allocation of `out`.
///
/// Previous contents of `out` are discarded.
pub fn to_html_into(input: &str, out: &mut Vec<u8>) {
    to_html_into_with_options(input, out, &Options::default());
}

/// Convert Markdown to HTML into a provided buffer with options.
pub fn to_html_into_with_options(input: &str, out: &mut Vec<u8>, options: &Options) {
    let tokens = tokenize(input);
    out.clear();
    out.reserve(input.len() + input.len() / 4);
    let mut writer = HtmlWriter::from_vec(std::mem::take(out));
    render_tokens(&tokens, &mut writer, options);
    *out = writer.into_vec();
}

/// Render a token stream produced by [`tokenize`].
pub fn render_tokens(tokens: &[MarkdownToken], writer: &mut HtmlWriter, options: &Options) {
    let mut renderer = HtmlRenderer {
        options,
        looseness: calculate_list_looseness(tokens),
        containers: SmallVec::new(),
        leaf: OpenLeaf::None,
    };
    for (index, token) in tokens.iter().enumerate() {
        renderer.render_token(index, token, writer);
    }
}

/// Decide which lists are loose, keyed by the index of their start token.
///
/// A list is loose when a blank line separates two of its items, or two
/// blocks directly inside one item. Blank lines inside fenced code, inside
/// a nested block quote, or between lines of one indented code block do not
/// count, and blank lines trailing the last item are ignored.
pub fn calculate_list_looseness(tokens: &[MarkdownToken]) -> FxHashMap<usize, bool> {
    let mut looseness = FxHashMap::default();
    let mut frames: SmallVec<[LoosenessFrame; 8]> = SmallVec::new();
    let mut in_fence = false;
    let mut in_indented_code = false;

    for (index, token) in tokens.iter().enumerate() {
        match token {
            MarkdownToken::BlankLine { .. } => {
                if in_fence {
                    continue;
                }
                if let Some(frame) = frames.last_mut() {
                    frame.pending_blank |= frame.is_list;
                }
            }
            MarkdownToken::Text { .. } => {
                if in_indented_code {
                    if let Some(frame) = frames.last_mut() {
                        frame.pending_blank = false;
                    }
                }
            }
            MarkdownToken::End { kind } => match kind {
                BlockKind::FencedCodeBlock => in_fence = false,
                BlockKind::IndentedCodeBlock => in_indented_code = false,
                kind if kind.is_container() => {
                    let Some(frame) = frames.pop() else { continue };
                    if !frame.is_list {
                        continue;
                    }
                    looseness.insert(frame.token_index, frame.loose);
                    // A blank line ending a nested list still separates
                    // whatever follows in the enclosing item.
                    if frame.pending_blank {
                        if let Some(parent) = frames.last_mut() {
                            parent.pending_blank |= parent.is_list;
                        }
                    }
                }
                _ => {}
            },
            _ => {
                if let Some(frame) = frames.last_mut() {
                    frame.loose |= frame.pending_blank;
                    frame.pending_blank = false;
                }
                match token {
                    MarkdownToken::BlockQuoteStart { .. } => {
                        frames.push(LoosenessFrame::new(index, false));
                    }
                    MarkdownToken::UnorderedListStart { .. }
                    | MarkdownToken::OrderedListStart { .. } => {
                        frames.push(LoosenessFrame::new(index, true));
                    }
                    MarkdownToken::FencedCodeBlock { .. } => in_fence = true,
                    MarkdownToken::IndentedCodeBlock { .. } => in_indented_code = true,
                    _ => {}
                }
            }
        }
    }

    for frame in frames.into_iter().filter(|frame| frame.is_list) {
        looseness.insert(frame.token_index, frame.loose);
    }
    looseness
}

struct LoosenessFrame {
    token_index: usize,
    is_list: bool,
    pending_blank: bool,
    loose: bool,
}

impl LoosenessFrame {
    fn new(token_index: usize, is_list: bool) -> Self {
        Self {
            token_index,
            is_list,
            pending_blank: false,
            loose: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum OpenContainer {
    BlockQuote,
    List { ordered: bool, tight: bool },
}

/// The leaf block whose text tokens are being rendered.
enum OpenLeaf {
    None,
    /// Tight paragraphs are written without `<p>` tags.
    Paragraph { tight: bool },
    Heading { level: u8 },
    /// Blank lines are held back until more code follows, so trailing
    /// blank lines never reach the output.
    IndentedCode { pending_blank_lines: String },
    /// Blank lines keep the whitespace beyond the fence's own indent.
    FencedCode { indent: usize },
}

struct HtmlRenderer<'o> {
    options: &'o Options,
    looseness: FxHashMap<usize, bool>,
    containers: SmallVec<[OpenContainer; 8]>,
    leaf: OpenLeaf,
}

impl HtmlRenderer<'_> {
    fn in_tight_list(&self) -> bool {
        matches!(
            self.containers.last(),
            Some(OpenContainer::List { tight: true, .. })
        )
    }

    fn is_tight(&self, list_index: usize) -> bool {
        !self.looseness.get(&list_index).copied().unwrap_or(false)
    }

    fn render_token(&mut self, index: usize, token: &MarkdownToken, writer: &mut HtmlWriter) {
        match token {
            MarkdownToken::BlockQuoteStart { .. } => {
                writer.ensure_newline();
                writer.blockquote_start();
                self.containers.push(OpenContainer::BlockQuote);
            }
            MarkdownToken::UnorderedListStart { .. } => {
                writer.ensure_newline();
                writer.ul_start();
                writer.li_start();
                self.containers.push(OpenContainer::List {
                    ordered: false,
                    tight: self.is_tight(index),
                });
            }
            MarkdownToken::OrderedListStart { list_start, .. } => {
                writer.ensure_newline();
                writer.ol_start(list_start.parse().ok());
                writer.li_start();
                self.containers.push(OpenContainer::List {
                    ordered: true,
                    tight: self.is_tight(index),
                });
            }
            MarkdownToken::NewListItem { .. } => {
                writer.li_end();
                writer.li_start();
            }
            MarkdownToken::Paragraph { .. } => {
                let tight = self.in_tight_list();
                if !tight {
                    writer.ensure_newline();
                    writer.paragraph_start();
                }
                self.leaf = OpenLeaf::Paragraph { tight };
            }
            MarkdownToken::AtxHeading { level, .. } => {
                writer.ensure_newline();
                writer.heading_start(*level);
                self.leaf = OpenLeaf::Heading { level: *level };
            }
            MarkdownToken::SetextHeading { marker, .. } => {
                let level = if *marker == '=' { 1 } else { 2 };
                writer.ensure_newline();
                writer.heading_start(level);
                self.leaf = OpenLeaf::Heading { level };
            }
            MarkdownToken::ThematicBreak { .. } => {
                writer.ensure_newline();
                writer.thematic_break();
            }
            MarkdownToken::IndentedCodeBlock { .. } => {
                writer.ensure_newline();
                writer.code_block_start(None);
                self.leaf = OpenLeaf::IndentedCode {
                    pending_blank_lines: String::new(),
                };
            }
            MarkdownToken::FencedCodeBlock {
                info,
                extracted_whitespace,
                ..
            } => {
                writer.ensure_newline();
                let lang = info
                    .split([' ', '\t'])
                    .find(|word| !word.is_empty())
                    .map(escape::unescape_info_word);
                writer.code_block_start(lang.as_deref());
                self.leaf = OpenLeaf::FencedCode {
                    indent: calculate_length(extracted_whitespace, 0),
                };
            }
            MarkdownToken::Text { text, .. } => self.render_text(text, writer),
            MarkdownToken::BlankLine {
                extracted_whitespace,
                ..
            } => match &mut self.leaf {
                OpenLeaf::IndentedCode {
                    pending_blank_lines,
                } => {
                    pending_blank_lines
                        .push_str(&remove_leading_columns(extracted_whitespace, CODE_INDENT));
                    pending_blank_lines.push('\n');
                }
                OpenLeaf::FencedCode { indent } => {
                    let kept = remove_leading_columns(extracted_whitespace, *indent);
                    writer.write_str(&kept);
                    writer.newline();
                }
                _ => {}
            },
            MarkdownToken::End { kind } => self.render_end(*kind, writer),
        }
    }

    fn render_text(&mut self, text: &str, writer: &mut HtmlWriter) {
        match &mut self.leaf {
            OpenLeaf::Paragraph { .. } | OpenLeaf::Heading { .. } => {
                write_inline_lines(writer, text, self.options.hard_line_breaks);
            }
            OpenLeaf::IndentedCode {
                pending_blank_lines,
            } => {
                writer.write_str(pending_blank_lines);
                pending_blank_lines.clear();
                writer.write_escaped_text(text.as_bytes());
                writer.newline();
            }
            OpenLeaf::FencedCode { .. } => {
                writer.write_escaped_text(text.as_bytes());
                writer.newline();
            }
            OpenLeaf::None => {
                log::warn!("text outside of a leaf block: {text:?}");
                writer.write_escaped_text(text.as_bytes());
            }
        }
    }

    fn render_end(&mut self, kind: BlockKind, writer: &mut HtmlWriter) {
        match kind {
            BlockKind::Paragraph => {
                if let OpenLeaf::Paragraph { tight: false } = self.leaf {
                    writer.paragraph_end();
                }
                self.leaf = OpenLeaf::None;
            }
            BlockKind::AtxHeading | BlockKind::SetextHeading => {
                if let OpenLeaf::Heading { level } = self.leaf {
                    writer.heading_end(level);
                }
                self.leaf = OpenLeaf::None;
            }
            BlockKind::IndentedCodeBlock | BlockKind::FencedCodeBlock => {
                writer.code_block_end();
                self.leaf = OpenLeaf::None;
            }
            BlockKind::BlockQuote => {
                writer.ensure_newline();
                writer.blockquote_end();
                self.containers.pop();
            }
            BlockKind::UnorderedList | BlockKind::OrderedList => {
                writer.li_end();
                match self.containers.pop() {
                    Some(OpenContainer::List { ordered: true, .. }) => writer.ol_end(),
                    _ => writer.ul_end(),
                }
            }
        }
    }
}

/// Write paragraph or heading lines.
///
/// Trailing spaces and tabs are dropped from every line. A line that ended
/// in two or more spaces, or any line when `hard_line_breaks` is set, is
/// followed by `<br />`.
fn write_inline_lines(writer: &mut HtmlWriter, text: &str, hard_line_breaks: bool) {
    let mut lines = text.split('\n').peekable();
    while let Some(line) = lines.next() {
        let content = line.trim_end_matches([' ', '\t']);
        writer.write_escaped_text(content.as_bytes());
        if lines.peek().is_none() {
            break;
        }
        let trailing_spaces = line.len() - line.trim_end_matches(' ').len();
        if hard_line_breaks || trailing_spaces >= 2 {
            writer.line_break();
        } else {
            writer.newline();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_paragraphs_and_headings() {
        assert_eq!(to_html("Hello"), "<p>Hello</p>\n");
        assert_eq!(to_html("a\nb\n\nc"), "<p>a\nb</p>\n<p>c</p>\n");
        assert_eq!(to_html("## Two ##"), "<h2>Two</h2>\n");
        assert_eq!(to_html("Foo\n==="), "<h1>Foo</h1>\n");
        assert_eq!(to_html("Foo\nbar\n---"), "<h2>Foo\nbar</h2>\n");
        assert_eq!(to_html("#"), "<h1></h1>\n");
    }

    #[test]
    fn test_escapes_text() {
        assert_eq!(to_html("a < b & \"c\""), "<p>a &lt; b &amp; &quot;c&quot;</p>\n");
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(to_html("a  \nb"), "<p>a<br />\nb</p>\n");
        assert_eq!(to_html("a \nb  "), "<p>a\nb</p>\n");

        let options = Options {
            hard_line_breaks: true,
        };
        assert_eq!(to_html_with_options("a\nb", &options), "<p>a<br />\nb</p>\n");
    }

    #[test]
    fn test_thematic_break() {
        assert_eq!(to_html("***\n---\n___"), "<hr />\n<hr />\n<hr />\n");
    }

    #[test]
    fn test_indented_code_drops_trailing_blank_lines() {
        assert_eq!(
            to_html("    a\n\n      b\n\n\n"),
            "<pre><code>a\n\n  b\n</code></pre>\n"
        );
    }

    #[test]
    fn test_fenced_code() {
        assert_eq!(
            to_html("```rust extra\nfn main() {}\n\n  x < y\n```"),
            "<pre><code class=\"language-rust\">fn main() {}\n\n  x &lt; y\n</code></pre>\n"
        );
        assert_eq!(
            to_html("  ~~~\n  a\n   b\nc\n  ~~~"),
            "<pre><code>a\n b\nc\n</code></pre>\n"
        );
        assert_eq!(to_html("```"), "<pre><code></code></pre>\n");
    }

    #[test]
    fn test_fence_info_entities() {
        assert_eq!(
            to_html("``` f&ouml;&ouml;\nx\n```"),
            "<pre><code class=\"language-föö\">x\n</code></pre>\n"
        );
    }

    #[test]
    fn test_block_quote() {
        assert_eq!(
            to_html("> # Foo\n> bar\n> baz"),
            "<blockquote>\n<h1>Foo</h1>\n<p>bar\nbaz</p>\n</blockquote>\n"
        );
        assert_eq!(to_html(">"), "<blockquote>\n</blockquote>\n");
    }

    #[test]
    fn test_tight_and_loose_lists() {
        assert_eq!(
            to_html("- a\n- b\n- c"),
            "<ul>\n<li>a</li>\n<li>b</li>\n<li>c</li>\n</ul>\n"
        );
        assert_eq!(
            to_html("- a\n\n- b"),
            "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
        );
        assert_eq!(
            to_html("- a\n- b\n\nc"),
            "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n<p>c</p>\n"
        );
    }

    #[test]
    fn test_ordered_list_start() {
        assert_eq!(to_html("3. a\n4. b"), "<ol start=\"3\">\n<li>a</li>\n<li>b</li>\n</ol>\n");
        assert_eq!(to_html("1) a"), "<ol>\n<li>a</li>\n</ol>\n");
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(
            to_html("- a\n  - b\n- c"),
            "<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n<li>c</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_empty_list_item() {
        assert_eq!(to_html("-"), "<ul>\n<li></li>\n</ul>\n");
    }

    #[test]
    fn test_looseness_nested_blank() {
        let tokens = tokenize("- a\n  - b\n\n    c\n- d");
        let looseness = calculate_list_looseness(&tokens);
        let outer = tokens
            .iter()
            .position(MarkdownToken::is_list_start)
            .unwrap();
        let inner = tokens
            .iter()
            .rposition(MarkdownToken::is_list_start)
            .unwrap();
        assert_ne!(outer, inner);
        assert!(!looseness[&outer]);
        assert!(looseness[&inner]);
    }

    #[test]
    fn test_looseness_ignores_blank_in_fence() {
        let tokens = tokenize("- ```\n  a\n\n  b\n  ```\n- c");
        let looseness = calculate_list_looseness(&tokens);
        assert_eq!(looseness.values().copied().collect::<Vec<_>>(), vec![false]);
    }

    #[test]
    fn test_to_html_into_reuses_buffer() {
        let mut out = b"stale".to_vec();
        to_html_into("> a", &mut out);
        assert_eq!(out, b"<blockquote>\n<p>a</p>\n</blockquote>\n");
    }
}
