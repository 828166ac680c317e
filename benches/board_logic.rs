use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tui_gems::core::{
    compute_match_mask, fill, fill_board, find_hint, pop_matches, GameConfig, Grid, ScoringRules,
    SimpleRng,
};

fn settled_board(seed: u32) -> Grid {
    let config = GameConfig {
        seed,
        ..GameConfig::default()
    };
    let mut grid = Grid::new(&config).unwrap();
    fill_board(&mut grid, &mut SimpleRng::new(seed)).unwrap();
    grid
}

fn bench_match_mask(c: &mut Criterion) {
    let grid = settled_board(12345);

    c.bench_function("match_mask_11x8", |b| {
        b.iter(|| compute_match_mask(black_box(&grid)))
    });
}

fn bench_fill_board(c: &mut Criterion) {
    let empty = Grid::new(&GameConfig::default()).unwrap();
    let mut rng = SimpleRng::new(7);

    c.bench_function("fill_board_11x8", |b| {
        b.iter(|| {
            let mut grid = empty.clone();
            fill_board(&mut grid, &mut rng).unwrap();
            grid
        })
    });
}

fn bench_find_hint(c: &mut Criterion) {
    let grid = settled_board(99);

    c.bench_function("find_hint_11x8", |b| b.iter(|| find_hint(black_box(&grid))));
}

fn bench_cascade_step(c: &mut Criterion) {
    let mut base = Grid::new(&GameConfig::default()).unwrap();
    fill(&mut base, &mut SimpleRng::new(3), true, true).unwrap();
    let rules = ScoringRules::default();
    let mut rng = SimpleRng::new(4);

    c.bench_function("pop_and_refill", |b| {
        b.iter(|| {
            let mut grid = base.clone();
            let outcome = pop_matches(&mut grid, &rules);
            fill(&mut grid, &mut rng, true, false).unwrap();
            outcome.score
        })
    });
}

criterion_group!(
    benches,
    bench_match_mask,
    bench_fill_board,
    bench_find_hint,
    bench_cascade_step
);
criterion_main!(benches);
