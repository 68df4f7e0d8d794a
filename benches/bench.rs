// Criterion benchmarks for LifeGroup Finder

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use lifegroup_finder::core::{GroupFinder, contact::normalize_contact, distance::distance_km};
use lifegroup_finder::models::{FilterSelection, GroupRecord, ResolvedLocation};

fn create_group(id: usize, lat: f64, lon: f64) -> GroupRecord {
    GroupRecord {
        row: id,
        name: format!("Life {}", id),
        address: Some(format!("Rua {}, {}", id, id * 10)),
        neighborhood: "Centro".to_string(),
        category: if id % 2 == 0 { "Jovens" } else { "Casais" }.to_string(),
        day: ["Segunda", "Quarta", "Sexta"][id % 3].to_string(),
        mode: if id % 5 == 0 { "Online" } else { "Presencial" }.to_string(),
        start_time: "20:00".to_string(),
        leader_name: format!("Líder {}", id),
        leader_contact: Some(format!("(11) 9{:04}-{:04}", id % 10_000, (id * 7) % 10_000)),
        latitude: Some(lat),
        longitude: Some(lon),
    }
}

fn create_roster(size: usize) -> Vec<GroupRecord> {
    (0..size)
        .map(|i| {
            let lat = -23.55 + ((i % 100) as f64 - 50.0) * 0.002;
            let lon = -46.63 + ((i / 100) as f64 - 5.0) * 0.002;
            create_group(i, lat, lon)
        })
        .collect()
}

fn origin() -> ResolvedLocation {
    ResolvedLocation {
        latitude: -23.5505,
        longitude: -46.6333,
        label: "Praça da Sé - São Paulo".to_string(),
    }
}

fn bench_distance(c: &mut Criterion) {
    c.bench_function("geodesic_distance", |b| {
        b.iter(|| {
            distance_km(
                black_box(-23.5505),
                black_box(-46.6333),
                black_box(-23.5613),
                black_box(-46.6565),
            )
        });
    });
}

fn bench_normalize_contact(c: &mut Criterion) {
    c.bench_function("normalize_contact", |b| {
        b.iter(|| normalize_contact(black_box(Some("Ana - (11) 98765-4321 / fixo 3456-7890"))));
    });
}

fn bench_search(c: &mut Criterion) {
    let finder = GroupFinder::default();
    let origin = origin();
    let mut group = c.benchmark_group("search");

    for size in [50, 500, 5000] {
        let roster = create_roster(size);
        let selection = FilterSelection::all(&roster);

        group.bench_with_input(BenchmarkId::from_parameter(size), &roster, |b, roster| {
            b.iter(|| finder.search(black_box(roster), &selection, &origin));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_distance, bench_normalize_contact, bench_search);
criterion_main!(benches);
