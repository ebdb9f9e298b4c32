//! Leaf blocks: paragraphs, headings, thematic breaks and code blocks.
//!
//! The predicates here are also consulted by the container processors, which
//! need to know whether a line would start a new block before deciding if an
//! open container continues.

use log::trace;

use super::helpers::{
    calculate_length, collect_while_character, column_at, extract_whitespace, is_blank,
    is_character_at_index_one_of, is_whitespace, is_whitespace_or_end_at,
    remove_leading_columns,
};
use super::stack::{StackKind, StackToken};
use super::state::{CloseBlocks, ParserState};
use super::token::{BlockKind, MarkdownToken};
use crate::limits::{CODE_INDENT, MAX_HEADING_LEVEL, MAX_MARKER_INDENT, MIN_FENCE_LENGTH};

/// An opening code fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceStart {
    pub fence_character: char,
    pub fence_count: usize,
    /// Info string with surrounding whitespace removed.
    pub info: String,
}

/// An ATX heading line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtxHeading {
    pub level: u8,
    /// Content with the optional closing `#` sequence removed.
    pub text: String,
    pub text_index: usize,
}

pub struct LeafBlockProcessor;

impl LeafBlockProcessor {
    #[inline]
    fn indent_allowed(extracted_whitespace: &str, skip_whitespace_check: bool) -> bool {
        skip_whitespace_check || calculate_length(extracted_whitespace, 0) <= MAX_MARKER_INDENT
    }

    /// Three or more `-`, `_` or `*`, optionally separated by spaces or tabs.
    pub fn is_thematic_break(
        line: &str,
        start_index: usize,
        extracted_whitespace: &str,
        skip_whitespace_check: bool,
    ) -> Option<char> {
        if !Self::indent_allowed(extracted_whitespace, skip_whitespace_check)
            || !is_character_at_index_one_of(line, start_index, b"-_*")
        {
            return None;
        }
        let bytes = line.as_bytes();
        let marker = bytes[start_index];
        let mut count = 0;
        for &b in &bytes[start_index..] {
            if b == marker {
                count += 1;
            } else if !is_whitespace(b) {
                return None;
            }
        }
        (count >= 3).then_some(marker as char)
    }

    /// One to six `#` followed by whitespace or the end of the line.
    pub fn is_atx_heading(
        line: &str,
        start_index: usize,
        extracted_whitespace: &str,
        skip_whitespace_check: bool,
    ) -> Option<AtxHeading> {
        if !Self::indent_allowed(extracted_whitespace, skip_whitespace_check) {
            return None;
        }
        let level = collect_while_character(line, start_index, b'#');
        if level == 0 || level > MAX_HEADING_LEVEL {
            return None;
        }
        let after_hashes = start_index + level;
        if !is_whitespace_or_end_at(line, after_hashes) {
            return None;
        }
        let (text_index, _) = extract_whitespace(line, after_hashes);
        let text_end = Self::trim_heading_end(line.as_bytes(), text_index);
        Some(AtxHeading {
            level: level as u8,
            text: line[text_index..text_end].to_string(),
            text_index,
        })
    }

    /// End of heading content once trailing whitespace and a closing `#`
    /// sequence are dropped.
    fn trim_heading_end(bytes: &[u8], start: usize) -> usize {
        let mut pos = bytes.len();
        while pos > start && is_whitespace(bytes[pos - 1]) {
            pos -= 1;
        }
        let after_hashes = pos;
        while pos > start && bytes[pos - 1] == b'#' {
            pos -= 1;
        }
        if pos == after_hashes {
            return pos;
        }
        // Closing hashes need whitespace before them unless they are all there is.
        if pos == start || is_whitespace(bytes[pos - 1]) {
            while pos > start && is_whitespace(bytes[pos - 1]) {
                pos -= 1;
            }
            pos
        } else {
            after_hashes
        }
    }

    /// A run of `=` or `-` with nothing but whitespace after it.
    pub fn is_setext_underline(
        line: &str,
        start_index: usize,
        extracted_whitespace: &str,
    ) -> Option<char> {
        if !Self::indent_allowed(extracted_whitespace, false)
            || !is_character_at_index_one_of(line, start_index, b"=-")
        {
            return None;
        }
        let marker = line.as_bytes()[start_index];
        let run = collect_while_character(line, start_index, marker);
        is_blank(&line[start_index + run..]).then_some(marker as char)
    }

    /// Three or more backticks or tildes opening a fenced code block.
    pub fn is_fenced_code_block(
        line: &str,
        start_index: usize,
        extracted_whitespace: &str,
        skip_whitespace_check: bool,
    ) -> Option<FenceStart> {
        if !Self::indent_allowed(extracted_whitespace, skip_whitespace_check)
            || !is_character_at_index_one_of(line, start_index, b"`~")
        {
            return None;
        }
        let fence = line.as_bytes()[start_index];
        let fence_count = collect_while_character(line, start_index, fence);
        if fence_count < MIN_FENCE_LENGTH {
            return None;
        }
        let info = line[start_index + fence_count..].trim_matches([' ', '\t']);
        if fence == b'`' && info.contains('`') {
            return None;
        }
        Some(FenceStart {
            fence_character: fence as char,
            fence_count,
            info: info.to_string(),
        })
    }

    /// True if the line ends the open fence.
    fn is_fence_close(
        line: &str,
        start_index: usize,
        extracted_whitespace: &str,
        fence_character: char,
        fence_count: usize,
    ) -> bool {
        if !Self::indent_allowed(extracted_whitespace, false) {
            return false;
        }
        let run = collect_while_character(line, start_index, fence_character as u8);
        run >= fence_count && is_blank(&line[start_index + run..])
    }

    /// Would this line start a new block instead of continuing a paragraph?
    ///
    /// List and block quote starts are found by the container processors
    /// before this question is asked.
    pub fn is_paragraph_interrupt(line: &str, start_index: usize, extracted_whitespace: &str) -> bool {
        is_blank(line)
            || Self::is_thematic_break(line, start_index, extracted_whitespace, false).is_some()
            || Self::is_atx_heading(line, start_index, extracted_whitespace, false).is_some()
            || Self::is_fenced_code_block(line, start_index, extracted_whitespace, false).is_some()
    }

    /// Innermost list directly inside the `bq_level`-th block quote.
    pub fn check_for_list_in_process(state: &ParserState, bq_level: usize) -> Option<usize> {
        state.stack.innermost_list_at_level(bq_level)
    }

    /// Turn what is left of a line, after container prefixes, into leaf tokens.
    ///
    /// `column_offset` is the column of `line`'s first character in the
    /// source line. A lazy line can continue a paragraph but never underline
    /// it into a setext heading.
    pub fn parse_line_for_leaf_blocks(
        state: &mut ParserState,
        line: &str,
        column_offset: usize,
        is_lazy: bool,
    ) {
        let (start_index, extracted_whitespace) = extract_whitespace(line, 0);
        let position = state.position_at(column_at(line, start_index, column_offset));

        if let StackToken::FencedCodeBlock {
            fence_character,
            fence_count,
            indent,
        } = *state.stack.top()
        {
            if Self::is_fence_close(line, start_index, extracted_whitespace, fence_character, fence_count) {
                let tokens = state.close_open_blocks(CloseBlocks::default());
                state.document.extend(tokens);
            } else if is_blank(line) {
                let outcome = state.handle_blank_line(line, false, position);
                state.document.extend(outcome.tokens);
            } else {
                let spaces = line.bytes().take(indent).take_while(|&b| b == b' ').count();
                state.document.push(MarkdownToken::Text {
                    position: state.position_at(column_offset + spaces),
                    text: line[spaces..].to_string(),
                });
            }
            return;
        }

        if is_blank(line) {
            let outcome = state.handle_blank_line(line, false, position);
            state.document.extend(outcome.tokens);
            return;
        }

        let indent = calculate_length(extracted_whitespace, 0);
        if indent >= CODE_INDENT && !state.stack.top().is_paragraph() {
            Self::parse_indented_code_block(state, line, column_offset, extracted_whitespace);
            return;
        }
        if state.stack.top().is_indented_code_block() {
            let tokens = state.close_open_blocks(CloseBlocks::default());
            state.document.extend(tokens);
        }

        if let Some(fence) = Self::is_fenced_code_block(line, start_index, extracted_whitespace, false) {
            trace!("line {}: fence {:?}", state.line_number, fence);
            Self::close_paragraph(state);
            state.open_block(StackToken::FencedCodeBlock {
                fence_character: fence.fence_character,
                fence_count: fence.fence_count,
                indent,
            });
            state.document.push(MarkdownToken::FencedCodeBlock {
                position,
                fence_character: fence.fence_character,
                fence_count: fence.fence_count,
                info: fence.info,
                extracted_whitespace: extracted_whitespace.to_string(),
            });
            return;
        }

        if let Some(heading) = Self::is_atx_heading(line, start_index, extracted_whitespace, false) {
            Self::close_paragraph(state);
            state.document.push(MarkdownToken::AtxHeading {
                position,
                level: heading.level,
                extracted_whitespace: extracted_whitespace.to_string(),
            });
            if !heading.text.is_empty() {
                state.document.push(MarkdownToken::Text {
                    position: state.position_at(column_at(line, heading.text_index, column_offset)),
                    text: heading.text,
                });
            }
            state.document.push(MarkdownToken::End {
                kind: BlockKind::AtxHeading,
            });
            return;
        }

        if !is_lazy {
            if let StackToken::Paragraph { token_index } = *state.stack.top() {
                if let Some(marker) = Self::is_setext_underline(line, start_index, extracted_whitespace) {
                    Self::convert_to_setext(state, token_index, marker, extracted_whitespace);
                    return;
                }
            }
        }

        if let Some(marker) = Self::is_thematic_break(line, start_index, extracted_whitespace, false) {
            Self::close_paragraph(state);
            state.document.push(MarkdownToken::ThematicBreak {
                position,
                marker,
                extracted_whitespace: extracted_whitespace.to_string(),
            });
            return;
        }

        Self::parse_paragraph(state, line, start_index, extracted_whitespace, column_offset);
    }

    fn close_paragraph(state: &mut ParserState) {
        if state.stack.top().is_paragraph() {
            let tokens = state.close_open_blocks(CloseBlocks {
                only_these: Some(&[StackKind::Paragraph]),
                ..CloseBlocks::default()
            });
            state.document.extend(tokens);
        }
    }

    fn parse_indented_code_block(
        state: &mut ParserState,
        line: &str,
        column_offset: usize,
        extracted_whitespace: &str,
    ) {
        if !state.stack.top().is_indented_code_block() {
            state.open_block(StackToken::IndentedCodeBlock);
            state.document.push(MarkdownToken::IndentedCodeBlock {
                position: state.position_at(column_offset),
                extracted_whitespace: extracted_whitespace.to_string(),
            });
        }
        state.document.push(MarkdownToken::Text {
            position: state.position_at(column_offset + CODE_INDENT),
            text: remove_leading_columns(line, CODE_INDENT),
        });
    }

    /// The open paragraph becomes a setext heading.
    fn convert_to_setext(
        state: &mut ParserState,
        token_index: usize,
        marker: char,
        underline_whitespace: &str,
    ) {
        if let Some(MarkdownToken::Paragraph {
            position,
            extracted_whitespace,
            indented_continuation,
        }) = state.document.get(token_index).cloned()
        {
            state.document[token_index] = MarkdownToken::SetextHeading {
                position,
                marker,
                extracted_whitespace,
                indented_continuation,
                underline_whitespace: underline_whitespace.to_string(),
            };
        }
        state.stack.pop();
        state.document.push(MarkdownToken::End {
            kind: BlockKind::SetextHeading,
        });
    }

    fn parse_paragraph(
        state: &mut ParserState,
        line: &str,
        start_index: usize,
        extracted_whitespace: &str,
        column_offset: usize,
    ) {
        let position = state.position_at(column_at(line, start_index, column_offset));
        if !state.stack.top().is_paragraph() {
            let token_index = state.document.len();
            state.open_block(StackToken::Paragraph { token_index });
            state.document.push(MarkdownToken::Paragraph {
                position,
                extracted_whitespace: extracted_whitespace.to_string(),
                indented_continuation: false,
            });
        } else if !extracted_whitespace.is_empty() {
            if let StackToken::Paragraph { token_index } = *state.stack.top() {
                if let Some(MarkdownToken::Paragraph {
                    indented_continuation,
                    ..
                }) = state.document.get_mut(token_index)
                {
                    *indented_continuation = true;
                }
            }
        }
        state.document.push(MarkdownToken::Text {
            position,
            text: line[start_index..].to_string(),
        });
    }
}
