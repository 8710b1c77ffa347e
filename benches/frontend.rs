mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use cinterp::{lexer, parser, semantic};

fn bench_frontend(c: &mut Criterion) {
    for (label, path) in common::workloads() {
        let source = common::load_source(&path);
        let tokens = lexer::tokenize(&source).expect("tokenize");
        let program = parser::parse_tokens(tokens.clone()).expect("parse");

        c.bench_function(&format!("frontend_tokenize_{label}"), |b| {
            b.iter(|| {
                let out = lexer::tokenize(black_box(&source)).expect("tokenize");
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_parse_only_{label}"), |b| {
            b.iter(|| {
                let out = parser::parse_tokens(black_box(tokens.clone())).expect("parse");
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_analyze_only_{label}"), |b| {
            b.iter(|| {
                let mut program = black_box(program.clone());
                semantic::analyze(&mut program).expect("analyze");
                black_box(program);
            })
        });

        c.bench_function(&format!("frontend_check_{label}"), |b| {
            b.iter(|| {
                let out = cinterp::check(black_box(&source)).expect("check");
                black_box(out);
            })
        });
    }
}

criterion_group!(benches, bench_frontend);
criterion_main!(benches);
