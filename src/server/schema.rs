//! Request and response bodies

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One raw housing record, as sent to `/predict`
///
/// Every field is required. `total_bedrooms` may be `null` and is filled by
/// the fitted imputer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingRecord {
    pub longitude: f64,
    pub latitude: f64,
    pub housing_median_age: f64,
    pub total_rooms: f64,
    #[serde(deserialize_with = "Option::deserialize")]
    pub total_bedrooms: Option<f64>,
    pub population: f64,
    pub households: f64,
    pub median_income: f64,
    pub ocean_proximity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub data: Vec<HousingRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predictions: Vec<f64>,
}

/// Build a raw feature frame with one row per record, in request order
pub fn records_to_frame(records: &[HousingRecord]) -> PolarsResult<DataFrame> {
    let f = |get: fn(&HousingRecord) -> f64| records.iter().map(get).collect::<Vec<f64>>();

    df!(
        "longitude" => f(|r| r.longitude),
        "latitude" => f(|r| r.latitude),
        "housing_median_age" => f(|r| r.housing_median_age),
        "total_rooms" => f(|r| r.total_rooms),
        "total_bedrooms" => records.iter().map(|r| r.total_bedrooms).collect::<Vec<Option<f64>>>(),
        "population" => f(|r| r.population),
        "households" => f(|r| r.households),
        "median_income" => f(|r| r.median_income),
        "ocean_proximity" => records.iter().map(|r| r.ocean_proximity.as_str()).collect::<Vec<&str>>()
    )
}
