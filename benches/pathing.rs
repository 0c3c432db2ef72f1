use criterion::{
    Criterion,
    criterion_group,
    criterion_main
};
use hypermaze::config::Configuration;
use hypermaze::generators;
use hypermaze::grid::Grid;
use hypermaze::pathing::{self, Distances, SolverKind};

fn large_maze() -> Grid {
    generators::generate(&Configuration::maze_2d(200, 200).with_seed(7)).unwrap()
}

fn bench_distances(c: &mut Criterion) {
    c.bench_function("distances", |b| {
        let g = large_maze();
        let start = generators::start(&g);
        b.iter(|| Distances::new(&g, start))
    });
}

fn bench_shortest_path(c: &mut Criterion) {
    c.bench_function("shortest_path", |b| {
        let g = large_maze();
        let distances = Distances::new(&g, generators::start(&g)).unwrap();
        let end = generators::goal(&g);
        b.iter(|| pathing::shortest_path(&g, &distances, end))
    });
}

fn bench_solvers(c: &mut Criterion) {
    let g = generators::generate(&Configuration::maze_2d(64, 64).with_seed(7)).unwrap();
    let (start, goal) = (generators::start(&g), generators::goal(&g));
    for kind in SolverKind::ALL.iter() {
        let mut solver = pathing::create_solver(*kind);
        c.bench_function(&format!("solve_{}", kind), |b| {
            b.iter(|| solver.solve(&g, start, goal))
        });
    }
}

criterion_group!(benches,
    bench_distances,
    bench_shortest_path,
    bench_solvers
);
criterion_main!(benches);
