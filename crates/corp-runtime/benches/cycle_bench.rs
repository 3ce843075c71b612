use corp_runtime::{Corporation, EngineConfig, FlatDivision};
use criterion::{criterion_group, criterion_main, Criterion};

fn corp() -> Corporation<FlatDivision> {
    let mut corp = Corporation::new("Bench", false, EngineConfig::default(), 42)
        .expect("default config is valid");
    for (i, name) in ["Agri", "Tobacco", "Software", "Healthcare"].iter().enumerate() {
        let division = FlatDivision::new(1e6 * (i + 1) as f64, 4e5).with_growth(0.001);
        corp.add_division(*name, division).expect("unique names");
    }
    corp
}

fn bench_market_cycle(c: &mut Criterion) {
    let mut corp = corp();
    c.bench_function("market_cycle", |b| {
        b.iter(|| {
            corp.store_cycles(50);
            for _ in 0..5 {
                corp.process();
            }
        })
    });
}

fn bench_share_sale(c: &mut Criterion) {
    let mut corp = corp();
    corp.store_cycles(10);
    corp.process();
    corp.go_public(0).expect("private corporation can list");
    c.bench_function("share_sale_500m", |b| {
        b.iter(|| corp.calculate_share_sale(500_000_000))
    });
}

criterion_group!(benches, bench_market_cycle, bench_share_sale);
criterion_main!(benches);
