use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hole_match::core::{
    CarData, ColumnData, HoleData, Layout, Level, LevelData, LevelSnapshot, OpenRoad,
    TweenTimings,
};
use hole_match::types::{HoleColor, Vec3, TICK_MS};

const COLORS: [HoleColor; 4] = [
    HoleColor::Red,
    HoleColor::Blue,
    HoleColor::Green,
    HoleColor::Yellow,
];

/// Four columns of four holes, one car per hole in side-by-side lanes.
fn board_data() -> LevelData {
    let columns = COLORS
        .iter()
        .map(|&color| ColumnData {
            holes: (0..4).map(|_| HoleData::plain(color)).collect(),
        })
        .collect();
    let cars = (0..16)
        .map(|i| {
            let lane = (i % 8) as f32 * 3.0 - 12.0;
            let row = 10.0 + (i / 8) as f32 * 3.0;
            CarData::new(COLORS[i % 4], Vec3::new(lane, 0.0, row))
        })
        .collect();
    LevelData {
        columns,
        container_count: 4,
        timed: false,
        cars,
        ..LevelData::default()
    }
}

fn open_level(data: &LevelData) -> Level {
    Level::with_collaborators(
        data,
        Layout::default(),
        Box::new(OpenRoad),
        Box::new(TweenTimings::default()),
    )
    .unwrap()
}

fn bench_tap_front_row(c: &mut Criterion) {
    let data = board_data();
    c.bench_function("tap_front_row", |b| {
        b.iter(|| {
            let mut level = open_level(&data);
            for column in 0..4 {
                let _ = black_box(level.tap_column(column));
            }
            level
        })
    });
}

fn bench_tick_busy_level(c: &mut Criterion) {
    let data = board_data();
    let mut level = open_level(&data);
    for column in 0..4 {
        let _ = level.tap_column(column);
    }

    c.bench_function("tick_busy_level", |b| {
        b.iter(|| {
            level.tick(black_box(TICK_MS));
            level.drain_events().count()
        })
    });
}

fn bench_play_to_completion(c: &mut Criterion) {
    let data = board_data();
    c.bench_function("play_to_completion", |b| {
        b.iter(|| {
            let mut level = open_level(&data);
            for _ in 0..2000 {
                if level.status().is_terminal() {
                    break;
                }
                for column in 0..4 {
                    let _ = level.tap_column(column);
                }
                level.tick(TICK_MS);
                level.drain_events().for_each(drop);
            }
            level.status()
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let level = open_level(&board_data());
    let mut snap = LevelSnapshot::default();

    c.bench_function("snapshot_into", |b| {
        b.iter(|| {
            level.snapshot_into(black_box(&mut snap));
        })
    });
}

criterion_group!(
    benches,
    bench_tap_front_row,
    bench_tick_busy_level,
    bench_play_to_completion,
    bench_snapshot
);
criterion_main!(benches);
