//! Synthetic housing data shared by the integration tests

#![allow(dead_code)]

use housing_ml::config::PipelineConfig;
use housing_ml::training::HyperParams;
use polars::prelude::*;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::path::{Path, PathBuf};

pub const CATEGORIES: [&str; 4] = ["<1H OCEAN", "INLAND", "NEAR BAY", "NEAR OCEAN"];

/// Raw housing rows with the target; about 5% of `total_bedrooms` is null
pub fn housing_frame(n: usize, seed: u64) -> DataFrame {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    let mut longitude = Vec::with_capacity(n);
    let mut latitude = Vec::with_capacity(n);
    let mut age = Vec::with_capacity(n);
    let mut rooms = Vec::with_capacity(n);
    let mut bedrooms = Vec::with_capacity(n);
    let mut population = Vec::with_capacity(n);
    let mut households = Vec::with_capacity(n);
    let mut income = Vec::with_capacity(n);
    let mut proximity = Vec::with_capacity(n);
    let mut value = Vec::with_capacity(n);

    for _ in 0..n {
        let lon: f64 = rng.gen_range(-124.0..-114.0);
        let lat: f64 = rng.gen_range(32.0..42.0);
        let a: f64 = rng.gen_range(1..53) as f64;
        let r: f64 = rng.gen_range(500..6000) as f64;
        let h: f64 = (r / rng.gen_range(4.0..7.0)).round().max(1.0);
        let b: f64 = (r * rng.gen_range(0.15..0.25)).round();
        let p: f64 = (h * rng.gen_range(2.0..4.0)).round();
        let inc: f64 = rng.gen_range(0.5..15.0);
        let cat = rng.gen_range(0..CATEGORIES.len());

        let offset = [60_000.0, -40_000.0, 80_000.0, 70_000.0][cat];
        let target = (40_000.0 * inc + offset + 800.0 * a + rng.gen_range(-10_000.0..10_000.0)).max(15_000.0);

        longitude.push(lon);
        latitude.push(lat);
        age.push(a);
        rooms.push(r);
        bedrooms.push(if rng.gen_bool(0.05) { None } else { Some(b) });
        population.push(p);
        households.push(h);
        income.push(inc);
        proximity.push(CATEGORIES[cat]);
        value.push(target);
    }

    df!(
        "longitude" => longitude,
        "latitude" => latitude,
        "housing_median_age" => age,
        "total_rooms" => rooms,
        "total_bedrooms" => bedrooms,
        "population" => population,
        "households" => households,
        "median_income" => income,
        "median_house_value" => value,
        "ocean_proximity" => proximity
    )
    .unwrap()
}

/// Small, fast hyperparameters
pub fn test_params() -> HyperParams {
    HyperParams::default()
        .with_max_iter(60)
        .with_max_depth(4)
        .with_min_samples_leaf(5)
}

/// Write a synthetic raw CSV under `dir` and return a config pointing at it
pub fn config_in(dir: &Path, n: usize) -> PipelineConfig {
    let data_path = dir.join("data").join("raw").join("housing.csv");
    let mut df = housing_frame(n, 7);
    housing_ml::utils::save_csv(&mut df, &data_path).unwrap();

    PipelineConfig::default()
        .with_data_path(data_path)
        .with_artifact_dir(dir.join("artifacts").join("production"))
        .with_hyperparams(test_params())
}

pub fn artifact_dir(config: &PipelineConfig) -> PathBuf {
    config.artifact_dir.clone()
}

/// The canonical request record
pub fn sample_record() -> serde_json::Value {
    serde_json::json!({
        "longitude": -122.23,
        "latitude": 37.88,
        "housing_median_age": 41,
        "total_rooms": 880,
        "total_bedrooms": 129,
        "population": 322,
        "households": 126,
        "median_income": 8.3252,
        "ocean_proximity": "NEAR BAY"
    })
}
