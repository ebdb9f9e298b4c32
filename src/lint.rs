//! Style rules checked over the block token stream.
//!
//! Each [`Rule`] looks at the tokens of one document (and the raw input,
//! for rules about the file itself) and reports [`Diagnostic`]s. The
//! [`LintRunner`] runs every registered rule and orders the results by
//! position.

use std::fmt;

use log::debug;

use crate::block::MarkdownToken;

/// One rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// Rule id such as `MD023`.
    pub code: &'static str,
    /// Rule aliases, comma separated.
    pub name: &'static str,
    pub message: &'static str,
}

impl Diagnostic {
    fn new(rule: &dyn Rule, line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            code: rule.code(),
            name: rule.name(),
            message: rule.description(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {} ({})",
            self.line, self.column, self.code, self.message, self.name
        )
    }
}

pub trait Rule {
    fn code(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn check(&self, tokens: &[MarkdownToken], input: &str) -> Vec<Diagnostic>;
}

pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry holding every built-in rule.
pub fn default_registry() -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    registry.register(Box::new(HeadingStartLeft));
    registry.register(Box::new(SingleTrailingNewline));
    registry
}

pub struct LintRunner {
    registry: RuleRegistry,
}

impl LintRunner {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    /// Run every rule over `tokens`, the token stream of `input`.
    pub fn run(&self, tokens: &[MarkdownToken], input: &str) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for rule in self.registry.rules() {
            let found = rule.check(tokens, input);
            debug!("rule {} found {} diagnostic(s)", rule.code(), found.len());
            diagnostics.extend(found);
        }
        diagnostics.sort_by_key(|d| (d.line, d.column));
        diagnostics
    }
}

/// Tokenize `input` and check it against the built-in rules.
///
/// # Example
/// ```
/// let found = blockmark::lint::lint("  # Title\n");
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].code, "MD023");
/// assert_eq!((found[0].line, found[0].column), (1, 3));
/// ```
pub fn lint(input: &str) -> Vec<Diagnostic> {
    let tokens = crate::tokenize(input);
    LintRunner::new(default_registry()).run(&tokens, input)
}

/// MD023: a heading's lines must not start with whitespace.
///
/// For setext headings every text line and the underline count.
pub struct HeadingStartLeft;

impl Rule for HeadingStartLeft {
    fn code(&self) -> &'static str {
        "MD023"
    }

    fn name(&self) -> &'static str {
        "heading-start-left, header-start-left"
    }

    fn description(&self) -> &'static str {
        "Headings must start at the beginning of the line"
    }

    fn check(&self, tokens: &[MarkdownToken], _input: &str) -> Vec<Diagnostic> {
        tokens
            .iter()
            .filter_map(|token| match token {
                MarkdownToken::AtxHeading {
                    position,
                    extracted_whitespace,
                    ..
                } if !extracted_whitespace.is_empty() => Some(*position),
                MarkdownToken::SetextHeading {
                    position,
                    extracted_whitespace,
                    indented_continuation,
                    underline_whitespace,
                    ..
                } if !extracted_whitespace.is_empty()
                    || *indented_continuation
                    || !underline_whitespace.is_empty() =>
                {
                    Some(*position)
                }
                _ => None,
            })
            .map(|position| Diagnostic::new(self, position.line_number, position.column_number))
            .collect()
    }
}

/// MD047: a non-empty file ends with a newline.
///
/// Reported after the last character of the last line.
pub struct SingleTrailingNewline;

impl Rule for SingleTrailingNewline {
    fn code(&self) -> &'static str {
        "MD047"
    }

    fn name(&self) -> &'static str {
        "single-trailing-newline"
    }

    fn description(&self) -> &'static str {
        "Files should end with a single newline character"
    }

    fn check(&self, _tokens: &[MarkdownToken], input: &str) -> Vec<Diagnostic> {
        if input.is_empty() || input.ends_with('\n') {
            return Vec::new();
        }
        let line = input.split('\n').count();
        let last_line = input.rsplit('\n').next().unwrap_or(input);
        vec![Diagnostic::new(self, line, last_line.chars().count() + 1)]
    }
}
