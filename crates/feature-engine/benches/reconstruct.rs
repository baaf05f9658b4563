//! Benchmarks for query reconstruction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{
    CategoricalDimension, FeatureReconstructor, FeatureSchema, ReconstructorConfig, VehicleQuery,
    NUMERIC_COLUMNS,
};
use std::sync::Arc;

fn wide_schema() -> Arc<FeatureSchema> {
    let mut columns: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();
    for i in 0..40 {
        columns.push(CategoricalDimension::Brand.column_for_level(&format!("Brand{}", i)));
    }
    for i in 0..600 {
        columns.push(CategoricalDimension::ModelDetail.column_for_level(&format!("model_{}", i)));
    }
    for i in 0..60 {
        columns.push(CategoricalDimension::Location.column_for_level(&format!("City{}", i)));
    }
    Arc::new(FeatureSchema::new(columns).expect("valid schema"))
}

fn bench_reconstruct(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruct");

    let reconstructor = FeatureReconstructor::new(wide_schema(), ReconstructorConfig::for_year(2025));
    let query = VehicleQuery {
        year: 2018,
        mileage: Some(50_000),
        brand: Some("Brand7".to_string()),
        model_detail: Some("Model 321".to_string()),
        location: Some("City12".to_string()),
        owner: None,
    };

    group.bench_function("single_query", |b| {
        b.iter(|| {
            black_box(reconstructor.reconstruct(black_box(&query)).ok());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_reconstruct);
criterion_main!(benches);
