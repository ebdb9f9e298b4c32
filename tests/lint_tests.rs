use blockmark::lint::{LintRunner, RuleRegistry, SingleTrailingNewline, default_registry, lint};
use blockmark::tokenize;

fn report(input: &str) -> Vec<String> {
    lint(input).iter().map(ToString::to_string).collect()
}

#[test]
fn proper_headings_pass() {
    let input = "# Heading 1\n\n## Heading 2\n\nHeading 3\n=========\n\nHeading 4\n---------\n";
    assert!(lint(input).is_empty());
}

#[test]
fn indented_atx_heading() {
    let input = "Some text\n\n  # Heading 1\n\nSome more text\n";
    assert_eq!(
        report(input),
        vec!["3:3: MD023: Headings must start at the beginning of the line (heading-start-left, header-start-left)"]
    );
}

#[test]
fn every_indented_setext_form() {
    let input = " Heading 1\n=========\n\nHeading 2\n  ---------\n\nHeading 3\n continued\n=========\n\n  Heading 4\n  ---------\n";
    let lines: Vec<usize> = lint(input).iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![1, 4, 7, 11]);
}

#[test]
fn headings_in_containers_count_from_the_container() {
    assert!(lint("> # quoted\n- # listed\n").is_empty());
    let lines: Vec<usize> = lint("- item\n\n   # inside\n").iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![3]);
}

#[test]
fn missing_final_newline() {
    let input = "# Heading\n\nThis is a line without a newline at the end.";
    assert_eq!(
        report(input),
        vec!["3:45: MD047: Files should end with a single newline character (single-trailing-newline)"]
    );
}

#[test]
fn single_rule_registry() {
    let mut registry = RuleRegistry::new();
    registry.register(Box::new(SingleTrailingNewline));
    let input = "  # a";
    let found = LintRunner::new(registry).run(&tokenize(input), input);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, "MD047");
    assert_eq!(default_registry().rules().len(), 2);
}
