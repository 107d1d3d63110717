//! Roll engine benchmarks

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ec_roll::presets;
use ec_roll::stage::{Direction, GridIndex, HenColor, PipeKind};
use ec_roll::{RollConfig, RollEngine, RollScenario};

/// Zig-zag path of `rows` pipes, revisiting every other crossing
fn long_scenario(rows: u32) -> RollScenario {
    let mut scenario = RollScenario::new("long", HenColor::Red, vec![Some(HenColor::Red)]);
    for i in 0..rows {
        let id = i as u64 + 1;
        scenario.add_segment(id, PipeKind::Cross, 10, GridIndex::new(0, rows - 1 - i));
        if i % 2 == 0 {
            scenario.add_step(id, Direction::Up, Direction::Left);
            scenario.add_step(id, Direction::Left, Direction::Down);
        } else {
            scenario.add_step(id, Direction::Up, Direction::Down);
        }
    }
    scenario.supply.seed = Some(7);
    scenario
}

fn run_once(scenario: &RollScenario, config: &RollConfig, tick: Option<f64>) -> u64 {
    let Ok(run) = scenario.build() else {
        return 0;
    };
    let mut engine = RollEngine::new(config.clone(), run.services);
    if engine.start_roll(run.path, run.color).is_err() {
        return 0;
    }
    let report = match tick {
        Some(tick) => engine.run_with_tick(tick),
        None => engine.run_to_idle(),
    };
    report.map_or(0, |r| r.awarded)
}

fn bench_loop_revisit_instant(c: &mut Criterion) {
    let scenario = presets::loop_revisit();
    let config = RollConfig::instant();

    c.bench_function("roll_loop_revisit_instant", |b| {
        b.iter(|| black_box(run_once(black_box(&scenario), &config, None)))
    });
}

fn bench_long_path_instant(c: &mut Criterion) {
    let scenario = long_scenario(64);
    let config = RollConfig::instant();

    c.bench_function("roll_long_path_96_steps", |b| {
        b.iter(|| black_box(run_once(black_box(&scenario), &config, None)))
    });
}

fn bench_frame_ticks(c: &mut Criterion) {
    let scenario = presets::straight_drop();
    let config = RollConfig::default();

    c.bench_function("roll_straight_drop_60fps", |b| {
        b.iter(|| black_box(run_once(black_box(&scenario), &config, Some(1.0 / 60.0))))
    });
}

criterion_group!(
    benches,
    bench_loop_revisit_instant,
    bench_long_path_instant,
    bench_frame_ticks
);
criterion_main!(benches);
