//! Whole-document snapshots of the fixtures under `tests/fixtures`.

use std::fs;
use std::path::PathBuf;

use insta::assert_snapshot;
use markdown_loom_parser::parse;

fn outline(fixture: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(fixture);
    let source = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {e}", path.display()));
    parse(&source).unwrap().outline()
}

#[test]
fn blocks() {
    assert_snapshot!(outline("blocks.md"), @r#"
    root
      blockquote
        heading depth=1
          text "Quote"
        paragraph
          text "text\nlazy"
      code lang=rust "fn main() {}"
      heading depth=2
        text "Setext"
      code "indented"
    "#);
}

#[test]
fn lists() {
    assert_snapshot!(outline("lists.md"), @r#"
    root
      list ordered=true start=1 spread=false
        listItem
          paragraph
            text "one"
        listItem
          paragraph
            text "two"
      list ordered=false spread=false
        listItem checked=true
          paragraph
            text "done"
        listItem checked=false
          paragraph
            text "todo"
    "#);
}

#[test]
fn table() {
    assert_snapshot!(outline("table.md"), @r#"
    root
      table
        tableRow
          tableCell
            text "a"
          tableCell
            text "b"
        tableRow
          tableCell
            text "1"
          tableCell
            delete
              text "2"
    "#);
}

#[test]
fn inline() {
    assert_snapshot!(outline("inline.md"), @r#"
    root
      paragraph
        text "Use "
        inlineCode "code"
        text ", "
        link url="https://a.b"
          text "https://a.b"
        text " and "
        link url="http://www.c.org"
          text "www.c.org"
        text ".\nLine one"
        break
        text "line two "
        image url="/i.png" title="T" alt="alt x"
    "#);
}

#[test]
fn footnotes() {
    assert_snapshot!(outline("footnotes.md"), @r#"
    root
      paragraph
        text "Text"
        footnoteReference identifier="n"
        text "."
      footnoteDefinition identifier="n"
        paragraph
          text "Note."
    "#);
}
