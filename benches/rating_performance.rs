//! Performance benchmarks for rating calculations

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use paddle_ladder::ladder::{LadderManager, Leaderboard};
use paddle_ladder::rating::EloCalculator;
use paddle_ladder::storage::{InMemoryMatchHistory, InMemoryPlayerStore};
use paddle_ladder::types::{MatchType, Outcome, PlayerRecord};
use std::sync::Arc;

fn create_bench_system(match_type: MatchType, players: usize) -> LadderManager {
    let records = (0..players)
        .map(|i| PlayerRecord::new(format!("player_{}", i), 1000 + (i as i64 * 7) % 300))
        .collect();

    LadderManager::new(
        match_type,
        Arc::new(InMemoryPlayerStore::with_players(records)),
        Arc::new(InMemoryMatchHistory::new()),
        EloCalculator::default(),
    )
}

fn bench_rating_calculations(c: &mut Criterion) {
    let calculator = EloCalculator::default();

    c.bench_function("settle_singles", |b| {
        b.iter(|| {
            let settlement = calculator.settle(black_box((1120.0, 980.0)), Outcome::TeamOneWon);
            black_box(calculator.apply(MatchType::Singles, &[1120, 980], &settlement))
        })
    });

    c.bench_function("settle_doubles", |b| {
        b.iter(|| {
            let settlement = calculator.settle(black_box((1100.0, 1000.0)), Outcome::TeamOneLost);
            black_box(calculator.apply(
                MatchType::Doubles,
                &[1000, 1200, 1000, 1000],
                &settlement,
            ))
        })
    });
}

fn bench_record_match(c: &mut Criterion) {
    let ladder = create_bench_system(MatchType::Doubles, 50);
    let lineup: Vec<String> = (0..4).map(|i| format!("player_{}", i * 3)).collect();

    c.bench_function("record_doubles_match_50_players", |b| {
        b.iter(|| black_box(ladder.record_match(&lineup, Outcome::TeamOneWon)))
    });
}

fn bench_leaderboard(c: &mut Criterion) {
    let records: Vec<PlayerRecord> = (0..500)
        .map(|i| PlayerRecord {
            player_id: format!("player_{}", i),
            rating: 700 + (i * 37) % 900,
            games_played: (i % 5) as u32,
        })
        .collect();

    c.bench_function("leaderboard_500_players", |b| {
        b.iter(|| black_box(Leaderboard::from_records(records.clone())))
    });
}

criterion_group!(
    benches,
    bench_rating_calculations,
    bench_record_match,
    bench_leaderboard
);
criterion_main!(benches);
