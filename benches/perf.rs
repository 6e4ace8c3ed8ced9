use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use pitchscout::filters::{BaseState, Handedness, SituationFilters, apply_filters};
use pitchscout::metrics::{compute_pa_rates, compute_pitch_metrics};
use pitchscout::pitch_mix::compute_mix;
use pitchscout::state::{PitchEvent, PitchTable};
use pitchscout::statcast_fetch::parse_statcast_csv;

/// A season's worth of synthetic pitches (~3000, roughly a starter's load).
fn synthetic_table() -> PitchTable {
    let types = [
        ("FF", "4-Seam Fastball"),
        ("SL", "Slider"),
        ("CH", "Changeup"),
        ("CU", "Curveball"),
    ];
    let descriptions = [
        "called_strike",
        "ball",
        "foul",
        "swinging_strike",
        "hit_into_play",
        "blocked_ball",
    ];
    let rows = (0..3000)
        .map(|i| {
            let (pitch_type, pitch_name) = types[i % types.len()];
            let terminal = i % 5 == 0;
            PitchEvent {
                pitch_type: Some(pitch_type.to_string()),
                pitch_name: Some(pitch_name.to_string()),
                description: Some(descriptions[i % descriptions.len()].to_string()),
                events: terminal.then(|| {
                    if i % 10 == 0 { "strikeout" } else { "field_out" }.to_string()
                }),
                batter_side: Some(if i % 3 == 0 { "L" } else { "R" }.to_string()),
                balls: Some((i % 4) as u8),
                strikes: Some((i % 3) as u8),
                outs_when_up: Some((i % 3) as u8),
                on_1b: (i % 4 == 1).then_some(500000 + i as u64),
                on_2b: (i % 7 == 2).then_some(600000 + i as u64),
                on_3b: (i % 11 == 3).then_some(700000 + i as u64),
                launch_speed: (i % 6 == 4).then(|| 85.0 + (i % 20) as f64),
                launch_angle: (i % 6 == 4).then(|| (i % 40) as f64 - 10.0),
            }
        })
        .collect();
    PitchTable {
        rows,
        has_batter_side: true,
        has_pitch_name: true,
    }
}

fn synthetic_csv(table: &PitchTable) -> String {
    let mut out = String::from(
        "pitch_type,pitch_name,events,description,stand,balls,strikes,outs_when_up,on_1b,on_2b,on_3b,launch_speed,launch_angle\n",
    );
    for row in &table.rows {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        let num = |v: Option<u8>| v.map(|n| n.to_string()).unwrap_or_default();
        let id = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_default();
        let f = |v: Option<f64>| v.map(|n| n.to_string()).unwrap_or_default();
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            opt(&row.pitch_type),
            opt(&row.pitch_name),
            opt(&row.events),
            opt(&row.description),
            opt(&row.batter_side),
            num(row.balls),
            num(row.strikes),
            num(row.outs_when_up),
            id(row.on_1b),
            id(row.on_2b),
            id(row.on_3b),
            f(row.launch_speed),
            f(row.launch_angle),
        ));
    }
    out
}

fn bench_statcast_parse(c: &mut Criterion) {
    let csv = synthetic_csv(&synthetic_table());
    c.bench_function("statcast_parse_3000", |b| {
        b.iter(|| {
            let table = parse_statcast_csv(black_box(&csv)).unwrap();
            black_box(table.rows.len());
        })
    });
}

fn bench_metrics(c: &mut Criterion) {
    let table = synthetic_table();
    c.bench_function("metrics_3000", |b| {
        b.iter(|| {
            let pa = compute_pa_rates(black_box(&table.rows));
            let pitch = compute_pitch_metrics(black_box(&table.rows));
            black_box((pa.pa_count, pitch.total_pitches));
        })
    });
}

fn bench_filter_and_mix(c: &mut Criterion) {
    let table = synthetic_table();
    let mut filters = SituationFilters::all();
    filters.handedness = Handedness::Left;
    filters.count = "0-2".to_string();
    filters.base = BaseState::RunnersOn;
    c.bench_function("filter_and_mix_3000", |b| {
        b.iter(|| {
            let subset = apply_filters(black_box(&table), black_box(&filters));
            let mix = compute_mix(&subset, table.has_pitch_name);
            black_box(mix.len());
        })
    });
}

criterion_group!(
    benches,
    bench_statcast_parse,
    bench_metrics,
    bench_filter_and_mix
);
criterion_main!(benches);
