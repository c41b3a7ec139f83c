// 📊 Chart Series Builder - merge independently dated series onto one axis
//
// Every series is a step function: 0 before its first point, then the value of
// its last point at or before each axis date.

use crate::entities::appraisal::{list_all_appraisals, Appraisal};
use crate::entities::asset::{list_assets, Asset};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One named input series; points need not be sorted
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl Series {
    pub fn new(label: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Self {
        Series {
            label: label.into(),
            points,
        }
    }
}

/// One aligned output series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// Sorted, de-duplicated union of every point date
    pub labels: Vec<NaiveDate>,
    pub datasets: Vec<Dataset>,
    /// Per-date sum of all datasets
    pub total: Option<Dataset>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Build the common axis and forward-fill each series onto it
pub fn build_chart(series: &[Series], include_total: bool) -> ChartData {
    let mut labels: Vec<NaiveDate> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(d, _)| *d))
        .collect();
    labels.sort();
    labels.dedup();

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|s| Dataset {
            label: s.label.clone(),
            values: forward_fill(&labels, &s.points),
        })
        .collect();

    let total = include_total.then(|| Dataset {
        label: "Net Worth".to_string(),
        values: (0..labels.len())
            .map(|i| datasets.iter().map(|d| d.values[i]).sum())
            .collect(),
    });

    ChartData {
        labels,
        datasets,
        total,
    }
}

/// Step-function sampling of `points` at each axis date.
/// Same-date points resolve to the last one in input order.
pub fn forward_fill(axis: &[NaiveDate], points: &[(NaiveDate, f64)]) -> Vec<f64> {
    let mut sorted = points.to_vec();
    // stable: keeps input order within a date
    sorted.sort_by_key(|(d, _)| *d);

    let mut values = Vec::with_capacity(axis.len());
    let mut current = 0.0;
    let mut next = 0;

    for date in axis {
        while next < sorted.len() && sorted[next].0 <= *date {
            current = sorted[next].1;
            next += 1;
        }
        values.push(current);
    }

    values
}

/// One series per asset from its appraisal history, ordered by (date, id) so
/// same-day ties resolve like the asset's reconciled value
pub fn asset_series(assets: &[Asset], appraisals: &[Appraisal]) -> Vec<Series> {
    let mut by_asset: HashMap<i64, Vec<&Appraisal>> = HashMap::new();
    for appraisal in appraisals {
        by_asset.entry(appraisal.asset_id).or_default().push(appraisal);
    }

    assets
        .iter()
        .filter_map(|asset| {
            let mut history = by_asset.remove(&asset.id)?;
            history.sort_by_key(|a| (a.date, a.id));
            Some(Series::new(
                asset.name.clone(),
                history.iter().map(|a| (a.date, a.value)).collect(),
            ))
        })
        .collect()
}

/// Net worth over time: every asset's history plus the total line
pub fn net_worth_chart(conn: &Connection) -> Result<ChartData> {
    let assets = list_assets(conn)?;
    let appraisals = list_all_appraisals(conn)?;
    Ok(build_chart(&asset_series(&assets, &appraisals), true))
}

/// Valuation history of a single asset
pub fn single_asset_chart(asset: &Asset, appraisals: &[Appraisal]) -> ChartData {
    build_chart(&asset_series(std::slice::from_ref(asset), appraisals), false)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::asset::AssetType;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_merge_two_series() {
        let house = Series::new("House", vec![(day(2010, 1, 1), 400000.0), (day(2020, 1, 1), 550000.0)]);
        let car = Series::new("Car", vec![(day(2015, 6, 1), 45000.0)]);

        let chart = build_chart(&[house, car], true);

        assert_eq!(chart.labels, vec![day(2010, 1, 1), day(2015, 6, 1), day(2020, 1, 1)]);
        assert_eq!(chart.datasets[0].values, vec![400000.0, 400000.0, 550000.0]);
        assert_eq!(chart.datasets[1].values, vec![0.0, 45000.0, 45000.0]);
        assert_eq!(
            chart.total.unwrap().values,
            vec![400000.0, 445000.0, 595000.0]
        );
        println!("✅ Two series merged onto a shared axis");
    }

    #[test]
    fn test_same_date_last_input_wins() {
        let axis = vec![day(2022, 5, 15)];
        let points = vec![(day(2022, 5, 15), 38500.0), (day(2022, 5, 15), 38000.0)];
        assert_eq!(forward_fill(&axis, &points), vec![38000.0]);
    }

    #[test]
    fn test_unsorted_points_and_empty_input() {
        let axis = vec![day(2020, 1, 1), day(2021, 1, 1), day(2022, 1, 1)];
        let points = vec![(day(2022, 1, 1), 3.0), (day(2020, 1, 1), 1.0)];
        assert_eq!(forward_fill(&axis, &points), vec![1.0, 1.0, 3.0]);

        let chart = build_chart(&[], true);
        assert!(chart.is_empty());
        assert_eq!(chart.total.unwrap().values, Vec::<f64>::new());
    }

    #[test]
    fn test_asset_series_skips_assets_without_history() {
        let mut car = Asset::new("Truck", AssetType::Vehicle, 35000.0);
        car.id = 1;
        let mut water = Asset::new("Water", AssetType::Utility, 45.0);
        water.id = 2;

        let appraisals = vec![
            Appraisal { id: 7, ..Appraisal::new(1, day(2022, 5, 15), 38000.0, "CarMax") },
            Appraisal { id: 5, ..Appraisal::new(1, day(2022, 5, 15), 38500.0, "KBB") },
            Appraisal { id: 2, ..Appraisal::new(1, day(2020, 5, 15), 45000.0, "Purchase") },
        ];

        let series = asset_series(&[car.clone(), water], &appraisals);
        assert_eq!(series.len(), 1);
        assert_eq!(
            series[0].points,
            vec![
                (day(2020, 5, 15), 45000.0),
                (day(2022, 5, 15), 38500.0),
                (day(2022, 5, 15), 38000.0)
            ]
        );

        let chart = single_asset_chart(&car, &appraisals);
        assert_eq!(chart.datasets[0].values, vec![45000.0, 38000.0]);
        assert!(chart.total.is_none());
    }

    #[test]
    fn test_chart_serializes_dates_as_strings() {
        let chart = build_chart(&[Series::new("A", vec![(day(2024, 1, 2), 1.0)])], false);
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["labels"][0], "2024-01-02");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::entities::asset::AssetType;
    use crate::reconciliation::latest_appraisal;
    use proptest::prelude::*;

    fn arb_appraisals() -> impl Strategy<Value = Vec<(i64, i64, f64)>> {
        // (asset 1..=3, day offset, value)
        prop::collection::vec((1i64..=3, 0i64..60, -500_000.0f64..500_000.0), 0..30)
    }

    proptest! {
        #[test]
        fn prop_asset_series_is_forward_filled_history(raw in arb_appraisals()) {
            let base = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
            let assets: Vec<Asset> = (1..=3)
                .map(|id| Asset { id, ..Asset::new(format!("Asset {}", id), AssetType::Other, 0.0) })
                .collect();
            let appraisals: Vec<Appraisal> = raw
                .iter()
                .enumerate()
                .map(|(i, (asset_id, offset, value))| Appraisal {
                    id: i as i64 + 1,
                    ..Appraisal::new(*asset_id, base + chrono::Duration::days(*offset), *value, "Test")
                })
                .collect();

            let series = asset_series(&assets, &appraisals);
            let chart = build_chart(&series, true);

            // Axis strictly increasing
            prop_assert!(chart.labels.windows(2).all(|w| w[0] < w[1]));

            for dataset in &chart.datasets {
                prop_assert_eq!(dataset.values.len(), chart.labels.len());
                let asset = assets.iter().find(|a| a.name == dataset.label).unwrap();
                let own: Vec<Appraisal> = appraisals
                    .iter()
                    .filter(|a| a.asset_id == asset.id)
                    .cloned()
                    .collect();

                for (date, value) in chart.labels.iter().zip(&dataset.values) {
                    let known: Vec<Appraisal> = own.iter().filter(|a| a.date <= *date).cloned().collect();
                    let expected = latest_appraisal(&known).map(|a| a.value).unwrap_or(0.0);
                    prop_assert_eq!(*value, expected);
                }
            }
        }
    }
}
