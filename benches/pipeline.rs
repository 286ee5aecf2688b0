use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use house_price_pipeline::pipeline::{PipelineTemplate, SplitDataType, TreeSimilarPipeline};
use house_price_pipeline::training::{Estimator, ForestEstimator, ForestParams};
use house_price_pipeline::utils::{column_to_array, frame_to_matrix_all};
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const QUALITY: [&str; 5] = ["Ex", "Gd", "TA", "Fa", "Po"];
const EXTERIOR: [&str; 6] = ["VinylSd", "HdBoard", "MetalSd", "Wd Sdng", "Plywood", "Stone"];

fn create_housing_data(n_rows: usize) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let area: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(600.0..3000.0)).collect();
    let lot: Vec<Option<f64>> = (0..n_rows)
        .map(|_| if rng.gen_bool(0.1) { None } else { Some(rng.gen_range(40.0..120.0)) })
        .collect();
    let heating: Vec<&str> = (0..n_rows).map(|_| *QUALITY.choose(&mut rng).unwrap()).collect();
    let exterior: Vec<&str> = (0..n_rows).map(|_| *EXTERIOR.choose(&mut rng).unwrap()).collect();
    let functional: Vec<&str> = (0..n_rows)
        .map(|_| if rng.gen_bool(0.9) { "Typ" } else { "Min1" })
        .collect();
    let price: Vec<f64> = area
        .iter()
        .map(|a| 30_000.0 + 85.0 * a + rng.gen_range(-5_000.0..5_000.0))
        .collect();

    df!(
        "Id" => (1..=n_rows as i64).collect::<Vec<_>>(),
        "GrLivArea" => area,
        "LotFrontage" => lot,
        "HeatingQC" => heating,
        "Exterior1st" => exterior,
        "Functional" => functional,
        "SalePrice" => price,
    )
    .unwrap()
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_pipeline");

    for n_rows in [1000, 10000].iter() {
        let df = create_housing_data(*n_rows);

        group.bench_with_input(BenchmarkId::new("build", n_rows), &df, |b, df| {
            b.iter(|| {
                let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Train).with_target("SalePrice");
                pipeline.build(black_box(df)).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_forest(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest");
    group.sample_size(10);

    for n_rows in [1000, 5000].iter() {
        let mut pipeline = TreeSimilarPipeline::new(SplitDataType::Train).with_target("SalePrice");
        let processed = pipeline.build(&create_housing_data(*n_rows)).unwrap();
        let y = column_to_array(&processed, "SalePrice").unwrap().mapv(f64::ln_1p);
        let x = frame_to_matrix_all(&processed.drop("SalePrice").unwrap()).unwrap();

        group.bench_with_input(BenchmarkId::new("fit", n_rows), &(x, y), |b, (x, y)| {
            b.iter(|| {
                let params = ForestParams::default().with_n_estimators(50).with_random_state(0);
                let mut estimator = ForestEstimator::regressor(params);
                estimator.fit(black_box(x), black_box(y)).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_forest);
criterion_main!(benches);
