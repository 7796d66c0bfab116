use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use staffing_terminal::model::Member;
use staffing_terminal::predict::{build_request_body, parse_prediction_json};
use staffing_terminal::seed::seed_members;
use staffing_terminal::state::AppState;

fn large_roster(size: usize) -> Vec<Member> {
    let seeds = seed_members();
    (0..size)
        .map(|i| {
            let mut member = seeds[i % seeds.len()].clone();
            member.id = format!("m{i}");
            member.name = format!("{} {i}", member.name);
            member.email = format!("user{i}@example.com");
            member
        })
        .collect()
}

fn bench_filter_members(c: &mut Criterion) {
    let mut state = AppState::with_members(large_roster(5_000));
    state.set_search("design");
    c.bench_function("filter_members", |b| {
        b.iter(|| {
            let rows = state.filtered_members();
            black_box(rows.len());
        })
    });
}

fn bench_performance_data(c: &mut Criterion) {
    let state = AppState::with_members(large_roster(5_000));
    c.bench_function("performance_data", |b| {
        b.iter(|| {
            let data = state.performance_data();
            black_box(data.len());
        })
    });
}

fn bench_request_body(c: &mut Criterion) {
    let member = seed_members().remove(0);
    c.bench_function("request_body", |b| {
        b.iter(|| {
            let body = build_request_body(black_box(&member), "English");
            black_box(body);
        })
    });
}

fn bench_prediction_parse(c: &mut Criterion) {
    c.bench_function("prediction_parse", |b| {
        b.iter(|| {
            let p = parse_prediction_json(black_box(PREDICTION_JSON)).unwrap();
            black_box(p.confidence);
        })
    });
}

criterion_group!(
    perf,
    bench_filter_members,
    bench_performance_data,
    bench_request_body,
    bench_prediction_parse
);
criterion_main!(perf);

static PREDICTION_JSON: &str = r#"{
  "recommendedRole": "Coordinator",
  "confidence": 0.81,
  "reasoning": "Consistent five-star ratings when leading teams.",
  "alternativeRole": "Technical Support",
  "suggestedImprovement": "Build a deputy bench for large events."
}"#;
