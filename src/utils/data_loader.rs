//! Data loading utilities

use polars::prelude::*;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

use crate::error::{HousingError, Result};

/// Load a CSV file with a header row
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| {
        HousingError::DataError(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .into_reader_with_file_handle(file)
        .finish()?;

    info!(path = %path.display(), rows = df.height(), columns = df.width(), "Loaded CSV");
    Ok(df)
}

/// Write a frame to CSV, creating parent directories as needed
pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Separate the target column from the features
pub fn split_features(df: &DataFrame, target: &str) -> Result<(DataFrame, Vec<f64>)> {
    let column = df
        .column(target)
        .map_err(|_| HousingError::ColumnNotFound(target.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;

    let y = series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                HousingError::DataError(format!("target {} is missing at row {}", target, row))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok((df.drop(target)?, y))
}

/// Seeded shuffle split; returns `(train, test)` with `ceil(n * test_size)` test rows
pub fn train_test_split(
    df: &DataFrame,
    test_size: f64,
    seed: u64,
) -> Result<(DataFrame, DataFrame)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(HousingError::invalid_parameter(
            "test_size",
            test_size,
            "must be between 0 and 1 (exclusive)",
        ));
    }

    let n = df.height();
    let n_test = (n as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(HousingError::DataError(format!(
            "cannot split {} rows with test_size {}",
            n, test_size
        )));
    }

    let indices = shuffled_indices(n, seed);
    let test_idx = IdxCa::from_vec("idx".into(), indices[..n_test].to_vec());
    let train_idx = IdxCa::from_vec("idx".into(), indices[n_test..].to_vec());

    Ok((df.take(&train_idx)?, df.take(&test_idx)?))
}

/// Seeded random sample of up to `n` rows, without replacement
pub fn sample_rows(df: &DataFrame, n: usize, seed: u64) -> Result<DataFrame> {
    let mut indices = shuffled_indices(df.height(), seed);
    indices.truncate(n);
    let idx = IdxCa::from_vec("idx".into(), indices);
    Ok(df.take(&idx)?)
}

fn shuffled_indices(n: usize, seed: u64) -> Vec<IdxSize> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
    indices.shuffle(&mut rng);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: usize) -> DataFrame {
        let ids: Vec<i64> = (0..n as i64).collect();
        let target: Vec<f64> = ids.iter().map(|&i| i as f64 * 10.0).collect();
        df!("id" => &ids, "median_house_value" => &target).unwrap()
    }

    fn ids(df: &DataFrame) -> Vec<i64> {
        df.column("id").unwrap().i64().unwrap().into_no_null_iter().collect()
    }

    #[test]
    fn test_split_sizes_and_disjointness() {
        let df = frame(101);
        let (train, test) = train_test_split(&df, 0.2, 42).unwrap();

        assert_eq!(test.height(), 21);
        assert_eq!(train.height(), 80);

        let mut all = ids(&train);
        all.extend(ids(&test));
        all.sort_unstable();
        assert_eq!(all, (0..101).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_reproducible() {
        let df = frame(50);
        let (a_train, a_test) = train_test_split(&df, 0.2, 42).unwrap();
        let (b_train, b_test) = train_test_split(&df, 0.2, 42).unwrap();
        assert!(a_train.equals(&b_train));
        assert!(a_test.equals(&b_test));

        let (_, c_test) = train_test_split(&df, 0.2, 7).unwrap();
        assert_ne!(ids(&a_test), ids(&c_test));
    }

    #[test]
    fn test_invalid_split() {
        let df = frame(10);
        assert!(train_test_split(&df, 0.0, 1).is_err());
        assert!(train_test_split(&df, 1.0, 1).is_err());
        assert!(train_test_split(&frame(1), 0.5, 1).is_err());
    }

    #[test]
    fn test_split_features() {
        let (x, y) = split_features(&frame(3), "median_house_value").unwrap();
        assert_eq!(x.width(), 1);
        assert!(x.column("id").is_ok());
        assert_eq!(y, vec![0.0, 10.0, 20.0]);

        assert!(matches!(
            split_features(&frame(3), "price").unwrap_err(),
            HousingError::ColumnNotFound(_)
        ));
    }

    #[test]
    fn test_sample_rows() {
        let df = frame(30);
        let sample = sample_rows(&df, 10, 42).unwrap();
        assert_eq!(sample.height(), 10);
        assert!(sample.equals(&sample_rows(&df, 10, 42).unwrap()));
        assert_eq!(sample_rows(&df, 100, 42).unwrap().height(), 30);
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("frame.csv");
        let mut df = frame(5);

        save_csv(&mut df, &path).unwrap();
        let loaded = load_csv(&path).unwrap();
        assert_eq!(loaded.shape(), (5, 2));
        assert_eq!(ids(&loaded), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_csv(Path::new("definitely/not/here.csv")).is_err());
    }
}
