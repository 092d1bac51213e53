// Benchmark for conflict evaluation and grid projection
// Measures the cost of checking a course against a fully selected week

use course_planner::models::course::{CourseDraft, CourseGroup, GroupId};
use course_planner::models::slot::Day;
use course_planner::services::conflict;
use course_planner::services::pool::CoursePool;
use course_planner::services::projector;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// A pool where every slot holds a selected single-period course, plus one
/// unselected course spanning all of Monday.
fn full_week(periods_per_day: u8) -> (CoursePool, GroupId) {
    let mut pool = CoursePool::new(periods_per_day);
    for day in Day::ALL {
        for period in 1..=periods_per_day {
            let id = pool
                .add_group(&CourseDraft::single(format!("{} {}", day.short_name(), period), day, period))
                .unwrap()
                .id
                .clone();
            pool.toggle_selection(&id, true).unwrap();
        }
    }
    let candidate = pool
        .add_group(&CourseDraft::new("All Monday", Day::Monday, 1, periods_per_day))
        .unwrap()
        .id
        .clone();
    (pool, candidate)
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_full_week");

    for periods in [4u8, 8, 9].iter() {
        let (pool, candidate) = full_week(*periods);
        let candidate: CourseGroup = pool.get(&candidate).unwrap().clone();
        group.bench_with_input(BenchmarkId::from_parameter(periods), &candidate, |b, candidate| {
            b.iter(|| conflict::evaluate(black_box(pool.groups()), black_box(candidate)));
        });
    }

    group.finish();
}

fn bench_toggle_and_confirm(c: &mut Criterion) {
    let (pool, candidate) = full_week(8);

    c.bench_function("toggle_confirm_full_week", |b| {
        b.iter(|| {
            let mut pool = pool.clone();
            pool.toggle_selection(black_box(&candidate), true).unwrap();
            pool.confirm_override(&candidate).unwrap()
        });
    });
}

fn bench_projection(c: &mut Criterion) {
    let (pool, _) = full_week(8);

    c.bench_function("project_full_week", |b| {
        b.iter(|| projector::view(black_box(&pool)));
    });
}

criterion_group!(benches, bench_evaluate, bench_toggle_and_confirm, bench_projection);
criterion_main!(benches);
