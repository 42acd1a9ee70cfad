use criterion::{black_box, criterion_group, criterion_main, Criterion};
use evalexpr::*;
use formulix_rs::ast::{Evaluator, Parser};
use formulix_rs::catalog::{Catalog, Suggestion};
use formulix_rs::sheet::FormulaSheet;

/// Benchmark simple arithmetic formulas
fn benchmark_simple_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Simple arithmetic Formula Evaluation");

    let tokens = ["2", "+", "3", "*", "4"];
    let expr = tokens.join(" ");
    let catalog = Catalog::empty();
    let cached = Evaluator::new(100);
    let uncached = Evaluator::new(0);
    let parsed = Parser::parse_formula(&tokens).unwrap();
    let precompiled_evalexpr = build_operator_tree::<DefaultNumericTypes>(&expr).unwrap();

    group.bench_function("cached_arithmetic", |b| {
        b.iter(|| cached.evaluate(black_box(&tokens), black_box(&catalog)))
    });

    group.bench_function("uncached_arithmetic", |b| {
        b.iter(|| uncached.evaluate(black_box(&tokens), black_box(&catalog)))
    });

    group.bench_function("preparsed_arithmetic", |b| {
        b.iter(|| uncached.evaluate_ast(black_box(&parsed), black_box(&catalog)))
    });

    group.bench_function("native_rust_arithmetic", |b| {
        b.iter(|| black_box(2.0 + 3.0 * 4.0))
    });

    group.bench_function("meval_arithmetic", |b| {
        b.iter(|| meval::eval_str(black_box(&expr)).unwrap())
    });

    group.bench_function("precompiled_evalexpr_arithmetic", |b| {
        b.iter(|| precompiled_evalexpr.eval().unwrap())
    });
}

/// Benchmark formulas that resolve catalog names
fn benchmark_catalog_formula(c: &mut Criterion) {
    let mut group = c.benchmark_group("Catalog Formula Evaluation");

    let tokens = [
        "(", "price", "+", "fee", ")", "*", "qty", "/", "(", "4", "-", "1", ")", "+", "5",
    ];
    let catalog = Catalog::new(vec![
        Suggestion::new("1", "price", 10.0),
        Suggestion::new("2", "fee", 20.0),
        Suggestion::new("3", "qty", 3.0),
    ]);
    let cached = Evaluator::new(100);
    let uncached = Evaluator::new(0);

    group.bench_function("cached_catalog_formula", |b| {
        b.iter(|| cached.evaluate(black_box(&tokens), black_box(&catalog)))
    });

    group.bench_function("uncached_catalog_formula", |b| {
        b.iter(|| uncached.evaluate(black_box(&tokens), black_box(&catalog)))
    });

    let context = context_map! {
        "price" => float 10.0,
        "fee" => float 20.0,
        "qty" => float 3.0,
    }
    .unwrap();
    let precompiled_evalexpr =
        build_operator_tree::<DefaultNumericTypes>("(price + fee) * qty / (4 - 1) + 5").unwrap();

    group.bench_function("precompiled_evalexpr_catalog_formula", |b| {
        b.iter(|| precompiled_evalexpr.eval_with_context(black_box(&context)).unwrap())
    });
}

/// Benchmark evaluating a whole sheet in parallel
fn benchmark_sheet(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sheet Evaluation");

    let catalog = Catalog::new(
        (0..50)
            .map(|i| Suggestion::new(i.to_string(), format!("v{}", i), i as f64))
            .collect(),
    );
    let mut sheet = FormulaSheet::new();
    for i in 0..500 {
        if i > 0 {
            sheet.add_row();
        }
        let formula = vec![
            format!("v{}", i % 50),
            "*".to_string(),
            "(".to_string(),
            format!("v{}", (i + 7) % 50),
            "+".to_string(),
            "1".to_string(),
            ")".to_string(),
        ];
        sheet.set_formula(i, formula).unwrap();
    }
    let evaluator = Evaluator::new(1000);

    group.bench_function("evaluate_all_500_rows", |b| {
        b.iter(|| sheet.evaluate_all(black_box(&evaluator), black_box(&catalog)))
    });
}

criterion_group!(
    benches,
    benchmark_simple_arithmetic,
    benchmark_catalog_formula,
    benchmark_sheet
);
criterion_main!(benches);
