use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use markdown_loom_parser::{Parser, ParserOptions};

fn generate_document(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with *some* **content** and a [link](/u \"t\").\n\n> quoted\nlazy line\n\n- Bullet point\n  - Nested item\n- [x] Task item\n\n| a | b |\n|---|:-:|\n| `c` | ~~d~~ |\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\nSee www.example.com and [ref][x].\n\n[x]: /ref\n\n";
    base.repeat(size)
}

fn generate_delimiter_soup(size: usize) -> String {
    "*a **b _c [d](e) `f` g_ h** i* ".repeat(size)
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.sample_size(10);

    let parser = Parser::gfm();
    for size in [10, 100] {
        let content = generate_document(size);
        group.bench_with_input(BenchmarkId::new("document", size), &content, |b, content| {
            b.iter(|| parser.parse(std::hint::black_box(content)));
        });
    }

    let soup = generate_delimiter_soup(200);
    group.bench_function("delimiters", |b| {
        b.iter(|| parser.parse(std::hint::black_box(&soup)));
    });

    let without_positions = Parser::gfm_with(ParserOptions {
        should_reserve_position: false,
        ..ParserOptions::default()
    });
    let content = generate_document(100);
    group.bench_function("document_without_positions", |b| {
        b.iter(|| without_positions.parse(std::hint::black_box(&content)));
    });

    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
