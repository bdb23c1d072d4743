use criterion::{black_box, criterion_group, criterion_main, Criterion};

use fleetview::cargo::layout::{generate_layout, CargoLayoutConfig};
use fleetview::cargo::vehicle::VehicleType;
use fleetview::geo::interpolate_route;
use fleetview::shipment::{DEMO_DROP, DEMO_PICKUP};

fn layout_benchmark(c: &mut Criterion) {
    let config = CargoLayoutConfig::default();
    let container = VehicleType::Container.container_dims();

    c.bench_function("layout container full", |b| {
        b.iter(|| generate_layout(black_box(100.0), black_box(container), &config))
    });
    c.bench_function("layout truck half", |b| {
        let truck = VehicleType::Truck.container_dims();
        b.iter(|| generate_layout(black_box(50.0), black_box(truck), &config))
    });
}

fn route_benchmark(c: &mut Criterion) {
    c.bench_function("interpolate 50 segments", |b| {
        b.iter(|| interpolate_route(black_box(DEMO_PICKUP), black_box(DEMO_DROP), 50))
    });
}

criterion_group!(benches, layout_benchmark, route_benchmark);
criterion_main!(benches);
