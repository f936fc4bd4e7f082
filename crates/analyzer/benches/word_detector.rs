//! Word detector and fuzzy scoring benchmarks
//!
//! Measures the hot, synchronous parts of a completion run: scanning the
//! cursor's lexical neighborhood and scoring keyword matches.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sql_completion_analyzer::{TextDocument, WordDetector};
use sql_completion_dialect::text::fuzzy_score;
use sql_completion_dialect::{GenericDialect, SyntaxManager};
use std::sync::Arc;

const QUERY: &str = "SELECT u.id, u.name, o.total, o.status \
                     FROM public.users u \
                     JOIN public.orders o ON u.id = o.user_id \
                     WHERE o.status = 'active' AND u.created_at > '2024-01-01' \
                     ORDER BY o.total DESC";

fn bench_word_detector(c: &mut Criterion) {
    let document = TextDocument::new(QUERY);
    let syntax = SyntaxManager::new(Arc::new(GenericDialect::new()));

    c.bench_function("word_detector/mid_statement", |b| {
        // Cursor inside "o.status" in the WHERE clause.
        let offset = QUERY.find("o.status =").unwrap() + 5;
        b.iter(|| {
            let detector = WordDetector::new(&document, &syntax, black_box(offset));
            black_box(detector.prev_key_word().len());
        });
    });

    c.bench_function("word_detector/statement_end", |b| {
        b.iter(|| {
            let detector = WordDetector::new(&document, &syntax, black_box(QUERY.len()));
            black_box(detector.word_part().len());
        });
    });
}

fn bench_fuzzy_score(c: &mut Criterion) {
    let candidates = [
        "users",
        "user_sessions",
        "orders",
        "order_items",
        "products",
        "product_categories",
        "created_at",
        "updated_at",
    ];

    c.bench_function("fuzzy_score/short_prefix", |b| {
        b.iter(|| {
            let mut total = 0;
            for candidate in &candidates {
                total += fuzzy_score(black_box(candidate), black_box("us"));
            }
            black_box(total)
        });
    });

    c.bench_function("fuzzy_score/scattered_pattern", |b| {
        b.iter(|| {
            let mut total = 0;
            for candidate in &candidates {
                total += fuzzy_score(black_box(candidate), black_box("uat"));
            }
            black_box(total)
        });
    });
}

criterion_group!(benches, bench_word_detector, bench_fuzzy_score);
criterion_main!(benches);
