use compat_uri::{escape_data_string, Uri, UriKind};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

criterion_group!(
    benches,
    bench_parse,
    bench_parse_relative,
    bench_parse_dos,
    bench_parse_iri,
    bench_absolute_uri,
    bench_combine,
    bench_equality,
    bench_escape,
);
criterion_main!(benches);

const PARSE_CASE: &str = "https://user@example.com/search?q=%E6%B5%8B%E8%AF%95#fragment";
const CANONICAL_CASE: &str = "HTTP://Example.COM:80/a/./b/../b/%63/%7bfoo%7d";
const DOS_CASE: &str = r"c:\Program Files\dir\..\file.txt";
const IRI_CASE: &str = "http://bücher.de/测试?q=ü";
const RESOLVE_CASE_BASE: &str = "http://example.com/foo/bar";
const RESOLVE_CASE_REF: &str = "../baz";
const ESCAPE_CASE: &str = "te😃a 测1`~!@试#$%st^&+=";

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse", |b| b.iter(|| Uri::parse(black_box(PARSE_CASE))));
}

fn bench_parse_relative(c: &mut Criterion) {
    c.bench_function("parse_relative", |b| {
        b.iter(|| Uri::parse_with_kind(black_box(RESOLVE_CASE_REF), UriKind::RelativeOrAbsolute))
    });
}

fn bench_parse_dos(c: &mut Criterion) {
    c.bench_function("parse_dos", |b| b.iter(|| Uri::parse(black_box(DOS_CASE))));
}

fn bench_parse_iri(c: &mut Criterion) {
    c.bench_function("parse_iri", |b| b.iter(|| Uri::parse(black_box(IRI_CASE))));
}

fn bench_absolute_uri(c: &mut Criterion) {
    c.bench_function("absolute_uri", |b| {
        b.iter(|| {
            let uri = Uri::parse(black_box(CANONICAL_CASE)).unwrap();
            uri.absolute_uri().map(str::len)
        })
    });
}

fn bench_combine(c: &mut Criterion) {
    let base = Uri::parse(RESOLVE_CASE_BASE).unwrap();
    c.bench_function("combine", |b| {
        b.iter(|| Uri::combine(black_box(&base), black_box(RESOLVE_CASE_REF)))
    });
}

fn bench_equality(c: &mut Criterion) {
    c.bench_function("equality", |b| {
        b.iter(|| {
            let x = Uri::parse(black_box(CANONICAL_CASE)).unwrap();
            let y = Uri::parse(black_box("http://example.com/a/b/%63/%7bfoo%7d")).unwrap();
            x == y
        })
    });
}

fn bench_escape(c: &mut Criterion) {
    c.bench_function("escape", |b| {
        b.iter(|| escape_data_string(black_box(ESCAPE_CASE)))
    });
}
