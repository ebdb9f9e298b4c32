//! Block-level parser for Markdown.
//!
//! The block parser is line-oriented. Container blocks are handled first:
//! - Block quotes
//! - Lists (bullet and ordered)
//!
//! and the rest of each line is handed to the leaf blocks:
//! - Thematic breaks
//! - ATX and setext headings
//! - Indented and fenced code blocks
//! - Paragraphs

mod block_quote;
pub mod helpers;
mod leaf;
mod list;
mod parser;
mod stack;
mod state;
mod token;

pub use block_quote::{BlockQuoteCount, BlockQuoteOutcome, BlockQuoteProcessor};
pub use leaf::{AtxHeading, FenceStart, LeafBlockProcessor};
pub use list::{
    ListBlockProcessor, ListContinuation, ListIndent, ListMatchDecision, ListStartOutcome,
    OrderedListStart,
};
pub use parser::{BlockParser, ContainerContext};
pub use stack::{ContainerStack, ListData, StackKind, StackToken};
pub use state::{BlankLineOutcome, CloseBlocks, ParserState};
pub use token::{BlockKind, MarkdownToken, Position};
