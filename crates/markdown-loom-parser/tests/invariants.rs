//! Properties every parse must satisfy, whatever the input.

use std::time::{Duration, Instant};

use markdown_loom_parser::{Node, NodeKind, Parser, ParserOptions, Position, parse};
use pretty_assertions::assert_eq;
use rstest::rstest;

const TRICKY: &[&str] = &[
    "",
    "\n\n\n",
    "\r\n\r",
    "\0",
    "\t\t- x\n",
    "***",
    "* * *\n- - -\n___",
    "[",
    "]",
    "[]()",
    "![",
    "`",
    "``a`",
    "<",
    "<a",
    "|",
    "| a |\n|",
    "| a |\n| - |\n| b | c | d |\n",
    "> - [ ] *a",
    ">>>>>>>>>> deep",
    "1.\n2.\n",
    "- \n-\n",
    "```",
    "~~~\n\n",
    "$$\nx",
    "[^1]:",
    "[^1]\n\n[^1]: note",
    "[x]:\n",
    "[x]: <",
    "*a **b* c**",
    "_a __b_ c__",
    "**__~~x~~__**",
    "a  \nb\\\nc",
    "&#0; &#xFFFFFF; &nbsp",
    "<!-- x",
    "<div>\n*a*",
    "www.\nhttp://\na@b",
    "Setext\n===\n---",
    "    indented\n\tcode",
    "- a\n > b\n   c",
];

fn walk_positions(node: &Node, visit: &mut impl FnMut(&Position, &Position)) {
    for child in &node.children {
        if let (Some(outer), Some(inner)) = (&node.position, &child.position) {
            visit(outer, inner);
        }
        walk_positions(child, visit);
    }
}

/// Pieces of inline syntax combined into one-line paragraphs. The `x `
/// prefix keeps every line a paragraph.
const ATOMS: &[&str] = &["a", "*", "_", "~", "**", "~~", "[", "]", "`", " ", "b1", "\\*"];

fn generated(length: usize) -> Vec<String> {
    let mut inputs = vec!["x ".to_string()];
    for _ in 0..length {
        inputs = inputs
            .iter()
            .flat_map(|prefix| ATOMS.iter().map(move |atom| format!("{prefix}{atom}")))
            .collect();
    }
    inputs
}

fn alphanumerics(text: &str) -> String {
    text.chars().filter(|c| c.is_alphanumeric()).collect()
}

fn walk_siblings(node: &Node, visit: &mut impl FnMut(&Position, &Position)) {
    let positions: Vec<&Position> = node.children.iter().filter_map(|c| c.position.as_ref()).collect();
    for pair in positions.windows(2) {
        visit(pair[0], pair[1]);
    }
    for child in &node.children {
        walk_siblings(child, visit);
    }
}

#[test]
fn every_input_parses() {
    for input in TRICKY {
        let root = parse(input).unwrap_or_else(|e| panic!("{input:?} failed: {e}"));
        assert_eq!(root.kind, NodeKind::Root, "{input:?}");
    }
}

#[test]
fn stripping_positions_is_idempotent() {
    let without = Parser::gfm_with(ParserOptions {
        should_reserve_position: false,
        ..ParserOptions::default()
    });
    for input in TRICKY {
        let mut stripped = parse(input).unwrap();
        stripped.remove_positions();
        assert_eq!(without.parse(input).unwrap(), stripped, "{input:?}");

        let mut twice = stripped.clone();
        twice.remove_positions();
        assert_eq!(twice, stripped);
    }
}

#[test]
fn children_lie_within_parents() {
    for input in TRICKY {
        let root = parse(input).unwrap();
        walk_positions(&root, &mut |outer, inner| {
            assert!(
                outer.start.offset <= inner.start.offset && inner.end.offset <= outer.end.offset,
                "{input:?}: child {inner:?} escapes parent {outer:?}"
            );
            assert!(inner.start.offset <= inner.end.offset, "{input:?}: {inner:?}");
        });
    }
}

#[test]
fn siblings_are_ordered_and_disjoint() {
    let inputs = TRICKY.iter().map(|s| s.to_string()).chain(generated(3));
    for input in inputs {
        let root = parse(&input).unwrap();
        walk_siblings(&root, &mut |previous, next| {
            assert!(
                previous.end.offset <= next.start.offset,
                "{input:?}: {previous:?} overlaps {next:?}"
            );
        });
    }
}

#[test]
fn inline_markup_keeps_every_word() {
    for input in generated(4) {
        let root = parse(&input).unwrap();
        assert_eq!(
            alphanumerics(&root.plain_text()),
            alphanumerics(&input),
            "{input:?}"
        );
    }
}

#[test]
fn label_after_spent_bracket_links() {
    let root = parse("[foo [bar](/uri)][ref]\n\n[ref]: /uri\n").unwrap();
    assert_eq!(
        root.outline(),
        concat!(
            "root\n",
            "  paragraph\n",
            "    text \"[foo \"\n",
            "    link url=\"/uri\"\n",
            "      text \"bar\"\n",
            "    text \"]\"\n",
            "    link url=\"/uri\"\n",
            "      text \"ref\"\n",
        )
    );
}

#[rstest]
#[case("*a ", "a_ ")]
#[case("~~a ", "a~ ")]
#[case("_a ", "](")]
#[case("[a ", "](")]
fn unmatched_delimiters_parse_in_linear_time(#[case] opening: &str, #[case] closing: &str) {
    let input = format!("{}{}", opening.repeat(50_000), closing.repeat(50_000));
    let started = Instant::now();
    let root = parse(&input).unwrap();
    let elapsed = started.elapsed();
    assert_eq!(root.children.len(), 1);
    assert!(elapsed < Duration::from_secs(10), "{opening:?}/{closing:?} took {elapsed:?}");
}

#[test]
fn root_spans_whole_document() {
    let input = "# a\n\nb é\n";
    let root = parse(input).unwrap();
    let position = root.position.unwrap();
    assert_eq!(position.start.offset, 0);
    assert_eq!(position.end.offset, input.len());
    assert_eq!((position.start.line, position.start.column), (1, 1));
}

#[rstest]
#[case("- a\n- b\n", false)]
#[case("- a\n\n- b\n", true)]
fn list_spread(#[case] input: &str, #[case] expected: bool) {
    let root = parse(input).unwrap();
    let NodeKind::List { spread, .. } = root.children[0].kind else {
        panic!("expected a list, got {:?}", root.children[0].kind);
    };
    assert_eq!(spread, expected);
}

#[test]
fn rule_of_three() {
    let root = parse("*foo**bar***\n").unwrap();
    assert_eq!(
        root.outline(),
        "root\n  paragraph\n    emphasis\n      text \"foo\"\n      strong\n        text \"bar\"\n"
    );
}

#[test]
fn links_never_nest() {
    let root = parse("[a [b](u1) c](u2)\n").unwrap();
    let mut links = Vec::new();
    root.walk(&mut |node| {
        if matches!(node.kind, NodeKind::Link { .. }) {
            links.push(node);
        }
    });
    assert_eq!(links.len(), 1);
    let mut nested = 0;
    links[0].walk(&mut |node| {
        if matches!(node.kind, NodeKind::Link { .. }) {
            nested += 1;
        }
    });
    assert_eq!(nested, 1);
}

#[test]
fn heading_and_emphasis() {
    let root = parse("# Title\n\nSome *em* and **strong**.\n").unwrap();
    assert_eq!(
        root.outline(),
        concat!(
            "root\n",
            "  heading depth=1\n",
            "    text \"Title\"\n",
            "  paragraph\n",
            "    text \"Some \"\n",
            "    emphasis\n",
            "      text \"em\"\n",
            "    text \" and \"\n",
            "    strong\n",
            "      text \"strong\"\n",
            "    text \".\"\n",
        )
    );
}

#[test]
fn reference_resolves_to_definition() {
    let root = parse("[a][x]\n\n[x]: /u \"t\"\n").unwrap();
    let link = &root.children[0].children[0];
    assert_eq!(
        link.kind,
        NodeKind::Link {
            url: "/u".to_string(),
            title: Some("t".to_string()),
        }
    );
    assert_eq!(link.plain_text(), "a");
}
