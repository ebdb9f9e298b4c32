//! Block parser implementation.
//!
//! Each line first passes through the container processors, which strip
//! block quote markers and list item indentation and open or close
//! containers on the way. Whatever is left goes to the leaf processor.

use log::{debug, trace};
use memchr::memchr_iter;

use super::block_quote::{BlockQuoteOutcome, BlockQuoteProcessor};
use super::helpers::{calculate_length, extract_whitespace, is_blank, remove_leading_columns};
use super::leaf::LeafBlockProcessor;
use super::list::{ListBlockProcessor, ListStartOutcome};
use super::stack::StackToken;
use super::state::{CloseBlocks, ParserState};
use super::token::MarkdownToken;

/// Where container processing stands within the current line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerContext {
    /// Block quote markers matched so far on this line.
    pub this_bq_count: usize,
    /// Column of the text being scanned, relative to the innermost matched
    /// block quote's content. Non-zero only right after a list marker.
    pub list_base: usize,
    /// Source column of the first byte of the text being scanned. Tabs
    /// count to their tab stop.
    pub column_offset: usize,
    /// The text directly follows a list marker on this line.
    pub in_new_list_item: bool,
}

/// A line once all container prefixes are gone.
#[derive(Debug)]
struct LineParse {
    line: String,
    this_bq_count: usize,
    column_offset: usize,
    /// A blank remainder inside a block quote was already handled.
    blank_handled: bool,
    /// A list item started with nothing after its marker.
    skip_leaf_if_empty: bool,
    /// The line only continues an open paragraph.
    is_lazy: bool,
}

impl LineParse {
    fn new(line: String, context: ContainerContext) -> Self {
        Self {
            line,
            this_bq_count: context.this_bq_count,
            column_offset: context.column_offset,
            blank_handled: false,
            skip_leaf_if_empty: false,
            is_lazy: false,
        }
    }
}

/// Block parser state.
pub struct BlockParser<'a> {
    input: &'a str,
    state: ParserState,
}

impl<'a> BlockParser<'a> {
    /// Create a new block parser.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            state: ParserState::new(),
        }
    }

    /// Parse every line and return the token stream.
    ///
    /// All blocks still open at the end of input are closed, and adjacent
    /// text tokens are merged.
    pub fn parse(mut self) -> Vec<MarkdownToken> {
        for line in split_lines(self.input) {
            self.state.line_number += 1;
            self.parse_line(line);
        }
        let tokens = self.state.close_open_blocks(CloseBlocks::everything());
        self.state.document.extend(tokens);
        debug!(
            "parsed {} line(s) into {} token(s)",
            self.state.line_number,
            self.state.document.len()
        );
        coalesce_text_tokens(self.state.document)
    }

    /// Parse a single line.
    fn parse_line(&mut self, line: &str) {
        if is_blank(line) {
            let position = self.state.position_at(0);
            let outcome = self.state.handle_blank_line(line, true, position);
            self.state.document.extend(outcome.tokens);
            return;
        }

        let parsed = self.parse_line_for_container_blocks(line, ContainerContext::default());
        trace!(
            "line {}: containers left {:?} (bq={}, lazy={})",
            self.state.line_number,
            parsed.line,
            parsed.this_bq_count,
            parsed.is_lazy
        );

        let stack_bq_count = self.state.stack.block_quote_count();
        let (start_index, extracted_whitespace) = extract_whitespace(&parsed.line, 0);
        BlockQuoteProcessor::check_for_lazy_handling(
            &mut self.state,
            parsed.this_bq_count,
            stack_bq_count,
            &parsed.line,
            start_index,
            extracted_whitespace,
        );
        let lazy_quote = self.close_unmatched_block_quotes(&parsed, start_index, extracted_whitespace);

        if parsed.blank_handled || (parsed.skip_leaf_if_empty && is_blank(&parsed.line)) {
            return;
        }
        LeafBlockProcessor::parse_line_for_leaf_blocks(
            &mut self.state,
            &parsed.line,
            parsed.column_offset,
            parsed.is_lazy || lazy_quote,
        );
    }

    /// Strip container prefixes from `line`, opening and closing containers.
    ///
    /// A block quote or list start that leaves content behind recurses on
    /// that content, so several containers can open on one line.
    fn parse_line_for_container_blocks(&mut self, line: &str, context: ContainerContext) -> LineParse {
        let (start_index, extracted_whitespace) = extract_whitespace(line, 0);
        let leading_space_length = calculate_length(extracted_whitespace, 0);

        let list_indent = self.innermost_list_indent(context.this_bq_count);
        let adj_ws = match list_indent {
            Some(indent) if !context.in_new_list_item && leading_space_length >= indent => {
                remove_leading_columns(extracted_whitespace, indent)
            }
            _ => extracted_whitespace.to_string(),
        };

        if !context.in_new_list_item
            && BlockQuoteProcessor::is_block_quote_start(line, start_index, &adj_ws)
        {
            ListBlockProcessor::check_for_list_closures(
                &mut self.state,
                leading_space_length,
                context.this_bq_count,
            );
        }

        match BlockQuoteProcessor::handle_block_quote_block(
            &mut self.state,
            line,
            start_index,
            extracted_whitespace,
            &adj_ws,
            context.this_bq_count,
            context.column_offset,
        ) {
            BlockQuoteOutcome::Started {
                this_bq_count,
                content_column,
                remaining_line,
                was_blank: true,
            } => {
                let mut parsed = LineParse::new(
                    remaining_line,
                    ContainerContext {
                        this_bq_count,
                        column_offset: content_column,
                        ..context
                    },
                );
                parsed.blank_handled = true;
                return parsed;
            }
            BlockQuoteOutcome::Started {
                this_bq_count,
                content_column,
                remaining_line,
                was_blank: false,
            } => {
                return self.parse_line_for_container_blocks(
                    &remaining_line,
                    ContainerContext {
                        this_bq_count,
                        list_base: 0,
                        column_offset: content_column,
                        in_new_list_item: false,
                    },
                );
            }
            BlockQuoteOutcome::NotStarted => {}
        }

        if !self.fence_owns_line(context, leading_space_length) {
            let mut outcome = ListBlockProcessor::handle_ulist_block(
                &mut self.state,
                line,
                start_index,
                extracted_whitespace,
                &adj_ws,
                context,
            );
            if matches!(outcome, ListStartOutcome::NotStarted) {
                outcome = ListBlockProcessor::handle_olist_block(
                    &mut self.state,
                    line,
                    start_index,
                    extracted_whitespace,
                    &adj_ws,
                    context,
                );
            }
            if let ListStartOutcome::Started {
                remaining_line,
                indent_level,
                content_column,
            } = outcome
            {
                let item_context = ContainerContext {
                    this_bq_count: context.this_bq_count,
                    list_base: indent_level,
                    column_offset: content_column,
                    in_new_list_item: true,
                };
                if is_blank(&remaining_line) {
                    let mut parsed = LineParse::new(remaining_line, item_context);
                    parsed.skip_leaf_if_empty = true;
                    return parsed;
                }
                return self.parse_line_for_container_blocks(&remaining_line, item_context);
            }
        }

        if context.in_new_list_item {
            return LineParse::new(line.to_string(), context);
        }
        let continuation = ListBlockProcessor::list_in_process(
            &mut self.state,
            line,
            start_index,
            extracted_whitespace,
            context.this_bq_count,
        );
        let mut parsed = LineParse::new(
            continuation.line,
            ContainerContext {
                column_offset: context.column_offset + continuation.removed,
                ..context
            },
        );
        parsed.is_lazy = continuation.is_lazy;
        parsed
    }

    fn innermost_list_indent(&self, bq_level: usize) -> Option<usize> {
        LeafBlockProcessor::check_for_list_in_process(&self.state, bq_level)
            .and_then(|index| self.state.stack.get(index))
            .and_then(StackToken::list)
            .map(|data| data.indent_level)
    }

    /// An open fence in this block quote context keeps list markers as
    /// content unless the line is dedented out of the fence's list item.
    fn fence_owns_line(&self, context: ContainerContext, leading_space_length: usize) -> bool {
        self.state.stack.top().is_fenced_code_block()
            && context.this_bq_count == self.state.stack.block_quote_count()
            && self
                .innermost_list_indent(context.this_bq_count)
                .is_none_or(|indent| leading_space_length + context.list_base >= indent)
    }

    /// Fewer `>` than open quotes: the extra quotes survive only as lazy
    /// paragraph continuation. Returns whether the line is lazy.
    fn close_unmatched_block_quotes(
        &mut self,
        parsed: &LineParse,
        start_index: usize,
        extracted_whitespace: &str,
    ) -> bool {
        if parsed.this_bq_count >= self.state.stack.block_quote_count() {
            return false;
        }
        if !parsed.blank_handled
            && self.state.stack.top().is_paragraph()
            && !LeafBlockProcessor::is_paragraph_interrupt(&parsed.line, start_index, extracted_whitespace)
        {
            debug!("line {}: lazy continuation", self.state.line_number);
            return true;
        }
        if let Some(index) = self.state.stack.block_quote_index(parsed.this_bq_count) {
            let tokens = self.state.close_open_blocks(CloseBlocks::down_to(index));
            self.state.document.extend(tokens);
        }
        false
    }
}

/// Split on `\n`, dropping a trailing `\r`. A final line ending does not
/// produce an empty last line.
fn split_lines(input: &str) -> Vec<&str> {
    let mut lines = Vec::with_capacity(input.len() / 32 + 1);
    let mut start = 0;
    for end in memchr_iter(b'\n', input.as_bytes()) {
        lines.push(trim_carriage_return(&input[start..end]));
        start = end + 1;
    }
    if start < input.len() {
        lines.push(trim_carriage_return(&input[start..]));
    }
    lines
}

#[inline]
fn trim_carriage_return(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Merge runs of text tokens into one token per block, joined with `\n`.
fn coalesce_text_tokens(tokens: Vec<MarkdownToken>) -> Vec<MarkdownToken> {
    let mut merged: Vec<MarkdownToken> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let MarkdownToken::Text { text, .. } = &token {
            if let Some(MarkdownToken::Text { text: previous, .. }) = merged.last_mut() {
                previous.push('\n');
                previous.push_str(text);
                continue;
            }
        }
        merged.push(token);
    }
    merged
}
