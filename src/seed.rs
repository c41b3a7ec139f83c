// 🌱 Sample Estate - wipe the database and load a demo family
//
// John & Jane Doe with a house, a truck, cash, investments, jewelry, art,
// two debts and a water bill, each with a multi-year valuation history.
// Histories go through the ValuationEngine so values and purchase
// attributes end up exactly as a user would have produced them.

use crate::db::{clear_all, Attributes};
use crate::entities::appraisal::Appraisal;
use crate::entities::asset::{insert_asset, Asset, AssetType};
use crate::entities::person::{insert_person, Person};
use crate::reconciliation::ValuationEngine;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::{json, Value};
use tracing::info;

/// One history entry; `None` date means "today"
type HistoryEntry = (Option<(i32, u32, u32)>, f64, &'static str, Option<&'static str>);

struct SampleAsset {
    name: &'static str,
    asset_type: AssetType,
    in_trust: bool,
    /// Index into the sample people
    owner: Option<usize>,
    value: f64,
    attributes: Vec<(&'static str, Value)>,
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedStats {
    pub people: usize,
    pub assets: usize,
    pub appraisals: usize,
}

impl SeedStats {
    pub fn summary(&self) -> String {
        format!(
            "Seeded {} people, {} assets, {} valuations",
            self.people, self.assets, self.appraisals
        )
    }
}

fn sample_people() -> Vec<Person> {
    let mut john = Person::new("John Doe", Some("Trustor"));
    john.email = Some("john@example.com".to_string());
    let mut jane = Person::new("Jane Doe", Some("Trustor"));
    jane.email = Some("jane@example.com".to_string());
    let junior = Person::new("Junior Doe", Some("Beneficiary"));
    vec![john, jane, junior]
}

fn sample_assets() -> Vec<SampleAsset> {
    vec![
        SampleAsset {
            name: "Sample Family Home",
            asset_type: AssetType::RealEstate,
            in_trust: true,
            owner: None,
            value: 600000.0,
            attributes: vec![("address", json!("123 Demo Lane, Metropolis"))],
            history: vec![
                (Some((2010, 1, 1)), 400000.0, "Purchase", Some("Original Purchase Price")),
                (Some((2015, 6, 15)), 475000.0, "Refi Appraisal", Some("Renovations complete")),
                (Some((2018, 1, 1)), 525000.0, "Tax Assessment", None),
                (Some((2020, 1, 1)), 550000.0, "Refi Appraisal", None),
                (Some((2023, 1, 1)), 580000.0, "Zillow", None),
                (None, 600000.0, "Zillow", Some("Current Estimate")),
            ],
        },
        SampleAsset {
            name: "2020 Ford F-150",
            asset_type: AssetType::Vehicle,
            in_trust: false,
            owner: Some(0),
            value: 35000.0,
            attributes: vec![
                ("vin", json!("1FTEW1E45LKD12345")),
                ("license_plate", json!("TRK-999")),
            ],
            history: vec![
                (Some((2020, 5, 15)), 45000.0, "Purchase", Some("Dealer Invoice")),
                (Some((2021, 5, 15)), 41000.0, "KBB", Some("1 Year depreciation")),
                (Some((2022, 5, 15)), 38500.0, "KBB", None),
                (Some((2023, 5, 15)), 36000.0, "CarMax Offer", None),
                (None, 35000.0, "KBB", Some("Current Trade-in Value")),
            ],
        },
        SampleAsset {
            name: "Chase Checking",
            asset_type: AssetType::Bank,
            in_trust: true,
            owner: None,
            value: 15000.0,
            attributes: vec![
                ("institution", json!("Chase")),
                ("account_type", json!("Checking")),
                ("account_number", json!("XXXX-1111")),
            ],
            history: vec![
                (Some((2020, 1, 1)), 5000.0, "Statement", Some("Account Opened")),
                (Some((2021, 6, 1)), 8500.0, "Statement", None),
                (Some((2022, 12, 31)), 12000.0, "Statement", Some("Year End Bonus")),
                (Some((2023, 6, 30)), 10500.0, "Statement", Some("Paid Taxes")),
                (None, 15000.0, "Online Banking", Some("Current Balance")),
            ],
        },
        SampleAsset {
            name: "Vanguard Index Fund",
            asset_type: AssetType::Investment,
            in_trust: true,
            owner: None,
            value: 125000.0,
            attributes: vec![
                ("institution", json!("Vanguard")),
                ("advisor_name", json!("Self-Directed")),
            ],
            history: vec![
                (Some((2016, 1, 1)), 50000.0, "Statement", Some("Initial Roll-over")),
                (Some((2019, 1, 1)), 85000.0, "Statement", None),
                (Some((2020, 3, 15)), 65000.0, "Statement", Some("COVID Dip")),
                (Some((2021, 12, 31)), 110000.0, "Statement", Some("High Water Mark")),
                (Some((2022, 10, 1)), 95000.0, "Statement", Some("Bear Market")),
                (None, 125000.0, "Online Portal", None),
            ],
        },
        SampleAsset {
            name: "Engagement Ring",
            asset_type: AssetType::Jewelry,
            in_trust: false,
            owner: Some(1),
            value: 8800.0,
            attributes: vec![
                ("location", json!("Master Safe")),
                ("appraisal_date", json!("2018-05-20")),
                ("appraiser_info", json!("Local Jeweler")),
            ],
            history: vec![
                (Some((2018, 5, 20)), 8000.0, "Local Jeweler", Some("Insurance Appraisal")),
                (Some((2020, 5, 20)), 8200.0, "Insurance Adjustment", None),
                (Some((2022, 5, 20)), 8500.0, "Insurance Adjustment", None),
                (None, 8800.0, "Est. Market Value", None),
            ],
        },
        SampleAsset {
            name: "Rolex Submariner",
            asset_type: AssetType::Jewelry,
            in_trust: true,
            owner: None,
            value: 9500.0,
            attributes: vec![
                ("location", json!("Safe Deposit Box")),
                ("appraiser_info", json!("Timeless Appraisals, Inc.")),
                ("appraisal_date", json!("2022-06-15")),
            ],
            history: vec![
                (Some((2015, 6, 15)), 7500.0, "Purchase", Some("Bought New")),
                (Some((2019, 6, 15)), 8200.0, "Market Check", None),
                (Some((2022, 6, 15)), 12000.0, "Timeless Appraisals, Inc.", Some("Peak Market")),
                (Some((2023, 6, 15)), 10500.0, "Chrono24", None),
                (None, 9500.0, "Market Correction", Some("Stabilized Value")),
            ],
        },
        SampleAsset {
            name: "Oil Painting (Landscape)",
            asset_type: AssetType::Art,
            in_trust: true,
            owner: None,
            value: 4500.0,
            attributes: vec![
                ("description", json!("Signed by Local Artist")),
                ("location", json!("Living Room")),
            ],
            history: vec![
                (Some((2010, 3, 10)), 1200.0, "Purchase", Some("Art Fair")),
                (Some((2015, 3, 10)), 2500.0, "Gallery Estimate", None),
                (Some((2020, 3, 10)), 3500.0, "Insurance Update", None),
                (None, 4500.0, "Initial Entry", None),
            ],
        },
        SampleAsset {
            name: "Picasso Sketch",
            asset_type: AssetType::Art,
            in_trust: true,
            owner: None,
            value: 2500.0,
            attributes: vec![
                ("description", json!("Small napkin sketch, authenticated.")),
                ("location", json!("Climate Controlled Storage")),
                ("appraiser_info", json!("Gallery 54")),
            ],
            history: vec![
                (Some((2005, 11, 10)), 800.0, "Purchase", Some("Estate Sale Find")),
                (Some((2015, 11, 10)), 1500.0, "Antiques Roadshow Est.", None),
                (Some((2023, 11, 10)), 2500.0, "Gallery 54", Some("Formal Authentication")),
            ],
        },
        SampleAsset {
            name: "Home Mortgage",
            asset_type: AssetType::Liability,
            in_trust: true,
            owner: None,
            value: -250000.0,
            attributes: vec![
                ("lender", json!("Wells Fargo")),
                ("interest_rate", json!("3.5%")),
                ("outstanding_balance", json!("250000")),
            ],
            history: vec![
                (Some((2010, 1, 1)), -380000.0, "Loan Origination", Some("Original Principal")),
                (Some((2015, 1, 1)), -340000.0, "Statement", None),
                (Some((2020, 1, 1)), -295000.0, "Refi Statement", None),
                (Some((2023, 1, 1)), -270000.0, "Statement", None),
                (None, -250000.0, "Statement", Some("Current Payoff")),
            ],
        },
        SampleAsset {
            name: "Personal Consolidation Loan",
            asset_type: AssetType::Liability,
            in_trust: false,
            owner: Some(0),
            value: -13000.0,
            attributes: vec![
                ("lender", json!("QuickCash Corp")),
                ("interest_rate", json!("8.5%")),
                ("outstanding_balance", json!("13000")),
            ],
            history: vec![
                (Some((2023, 1, 15)), -25000.0, "Origination", Some("Debt Consolidation")),
                (Some((2023, 6, 15)), -20000.0, "Statement", None),
                (Some((2024, 1, 15)), -15000.0, "Statement", None),
                (None, -13000.0, "Online Portal", Some("Current Payoff")),
            ],
        },
        SampleAsset {
            name: "City Water Bill",
            asset_type: AssetType::Utility,
            in_trust: false,
            owner: None,
            value: 0.0,
            attributes: vec![
                ("provider", json!("City Utilities")),
                ("autopay_status", json!("Yes")),
                ("current_value", json!("45.00")),
            ],
            history: vec![(None, 0.0, "System", Some("Recurring Liability Placeholder"))],
        },
    ]
}

/// Replace everything in the database with the sample estate
pub fn seed_example(conn: &Connection, today: NaiveDate) -> Result<SeedStats> {
    info!("wiping database for sample data");
    clear_all(conn)?;

    let engine = ValuationEngine::new();
    let mut stats = SeedStats::default();

    let mut people_ids = Vec::new();
    for person in sample_people() {
        people_ids.push(insert_person(conn, &person)?);
        stats.people += 1;
    }

    for sample in sample_assets() {
        let mut asset = Asset::new(sample.name, sample.asset_type, sample.value);
        asset.is_in_trust = sample.in_trust;
        asset.owner_id = sample.owner.and_then(|i| people_ids.get(i).copied());
        asset.attributes = sample
            .attributes
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<Attributes>();

        let asset_id = insert_asset(conn, &asset)
            .with_context(|| format!("Failed to seed asset {}", sample.name))?;
        stats.assets += 1;

        for (date, value, source, notes) in sample.history {
            let date = match date {
                Some((y, m, d)) => NaiveDate::from_ymd_opt(y, m, d)
                    .with_context(|| format!("Invalid sample date {}-{}-{}", y, m, d))?,
                None => today,
            };
            let mut appraisal = Appraisal::new(asset_id, date, value, source);
            if let Some(notes) = notes {
                appraisal = appraisal.with_notes(notes);
            }
            engine.record(conn, &appraisal)?;
            stats.appraisals += 1;
        }
    }

    info!("{}", stats.summary());
    Ok(stats)
}
