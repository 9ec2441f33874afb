use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridfall::core::{GameState, Grid, Piece, SimpleRng};

fn bench_can_place(c: &mut Criterion) {
    let mut grid = Grid::new(5, 5);
    grid.set(2, 2, 1);
    let plus = Piece::new(2).unwrap();

    c.bench_function("can_place_plus", |b| {
        b.iter(|| {
            for y in 0..5 {
                for x in 0..5 {
                    black_box(grid.can_place(&plus, black_box(x), black_box(y)));
                }
            }
        })
    });
}

fn bench_clear_lines(c: &mut Criterion) {
    c.bench_function("clear_row_and_column", |b| {
        b.iter(|| {
            let mut grid = Grid::new(5, 5);
            for i in 0..5 {
                grid.set(i, 2, 1);
                grid.set(2, i, 1);
            }
            black_box(grid.clear_lines());
        })
    });
}

fn bench_place_turn(c: &mut Criterion) {
    let mut rng = SimpleRng::new(12345);
    let mut state = GameState::new(9, 9, 3);
    state.start();

    c.bench_function("place_turn", |b| {
        b.iter(|| {
            while state.spawns_needed() > 0 {
                state.note_spawn_requested();
                let _ = state.supply_piece(rng.next_piece_index());
            }
            state.grid_mut().clear();
            black_box(state.place(4, 4));
            state.take_events();
        })
    });
}

fn bench_checksum(c: &mut Criterion) {
    let mut grid = Grid::new(5, 5);
    for i in 0..5 {
        grid.set(i, i, i as u8 + 1);
    }

    c.bench_function("grid_checksum", |b| b.iter(|| black_box(grid.checksum())));
}

criterion_group!(
    benches,
    bench_can_place,
    bench_clear_lines,
    bench_place_turn,
    bench_checksum
);
criterion_main!(benches);
