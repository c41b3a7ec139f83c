// 💰 Net Worth Summary - totals for the dashboard, CLI and backup README

use crate::entities::asset::{list_assets, Asset, AssetType};
use crate::format::format_currency;
use anyhow::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    pub asset_type: String,
    pub label: String,
    pub icon: String,
    pub count: usize,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetWorthSummary {
    /// Sum of positive values
    pub total_assets: f64,
    /// Sum of negative values (itself negative)
    pub total_liabilities: f64,
    pub net_worth: f64,
    /// Items flagged as held in trust
    pub trust_count: usize,
    /// Items with value >= 0
    pub asset_count: usize,
    /// Items with value < 0
    pub liability_count: usize,
    /// Per asset type, catalog order first, then unknown tags alphabetically
    pub by_type: Vec<TypeBreakdown>,
}

impl NetWorthSummary {
    pub fn from_assets(assets: &[Asset]) -> Self {
        let total_assets: f64 = assets
            .iter()
            .map(|a| a.value_estimated)
            .filter(|v| *v > 0.0)
            .sum();
        let total_liabilities: f64 = assets
            .iter()
            .map(|a| a.value_estimated)
            .filter(|v| *v < 0.0)
            .sum();

        let mut by_type: Vec<TypeBreakdown> = Vec::new();
        for asset in assets {
            match by_type.iter_mut().find(|b| b.asset_type == asset.asset_type) {
                Some(entry) => {
                    entry.count += 1;
                    entry.total += asset.value_estimated;
                }
                None => by_type.push(TypeBreakdown {
                    asset_type: asset.asset_type.clone(),
                    label: asset
                        .kind()
                        .map(|k| k.label().to_string())
                        .unwrap_or_else(|| asset.asset_type.clone()),
                    icon: asset.icon().to_string(),
                    count: 1,
                    total: asset.value_estimated,
                }),
            }
        }
        by_type.sort_by_key(|b| {
            let rank = AssetType::from_code(&b.asset_type)
                .and_then(|k| AssetType::ALL.iter().position(|t| *t == k))
                .unwrap_or(AssetType::ALL.len());
            (rank, b.asset_type.clone())
        });

        NetWorthSummary {
            total_assets,
            total_liabilities,
            net_worth: total_assets + total_liabilities,
            trust_count: assets.iter().filter(|a| a.is_in_trust).count(),
            asset_count: assets.iter().filter(|a| !a.is_liability()).count(),
            liability_count: assets.iter().filter(|a| a.is_liability()).count(),
            by_type,
        }
    }

    pub fn load(conn: &Connection) -> Result<Self> {
        Ok(Self::from_assets(&list_assets(conn)?))
    }

    pub fn summary(&self) -> String {
        format!(
            "Net worth {} ({} in assets, {} in liabilities); {} assets, {} liabilities, {} held in trust",
            format_currency(self.net_worth),
            format_currency(self.total_assets),
            format_currency(self.total_liabilities),
            self.asset_count,
            self.liability_count,
            self.trust_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::entities::asset::insert_asset;

    fn sample() -> Vec<Asset> {
        let mut ring = Asset::new("Ring", AssetType::Jewelry, 5000.0);
        ring.is_in_trust = false;
        let mut legacy = Asset::new("Old House", AssetType::Other, 100.0);
        legacy.asset_type = "Property".to_string();
        vec![
            Asset::new("House", AssetType::RealEstate, 600000.0),
            Asset::new("Mortgage", AssetType::Liability, -250000.0),
            Asset::new("Car Loan", AssetType::Liability, -13000.0),
            ring,
            Asset::new("Water", AssetType::Utility, 0.0),
            legacy,
        ]
    }

    #[test]
    fn test_totals_by_sign() {
        let summary = NetWorthSummary::from_assets(&sample());

        assert_eq!(summary.total_assets, 605100.0);
        assert_eq!(summary.total_liabilities, -263000.0);
        assert_eq!(summary.net_worth, 342100.0);
        assert_eq!(summary.trust_count, 5);
        assert_eq!(summary.asset_count, 4);
        assert_eq!(summary.liability_count, 2);
    }

    #[test]
    fn test_breakdown_order() {
        let summary = NetWorthSummary::from_assets(&sample());
        let order: Vec<&str> = summary.by_type.iter().map(|b| b.asset_type.as_str()).collect();
        assert_eq!(order, vec!["RealEstate", "Jewelry", "Liability", "Utility", "Property"]);

        let debts = &summary.by_type[2];
        assert_eq!(debts.count, 2);
        assert_eq!(debts.total, -263000.0);
        assert_eq!(summary.by_type[4].icon, "📦");
        assert_eq!(summary.by_type[4].label, "Property");
    }

    #[test]
    fn test_empty_estate() {
        let conn = open_in_memory().unwrap();
        let summary = NetWorthSummary::load(&conn).unwrap();
        assert_eq!(summary.net_worth, 0.0);
        assert!(summary.by_type.is_empty());

        insert_asset(&conn, &Asset::new("House", AssetType::RealEstate, 1.0)).unwrap();
        assert_eq!(NetWorthSummary::load(&conn).unwrap().asset_count, 1);
    }

    #[test]
    fn test_summary_line() {
        let summary = NetWorthSummary::from_assets(&sample());
        assert_eq!(
            summary.summary(),
            "Net worth $342,100 ($605,100 in assets, -$263,000 in liabilities); 4 assets, 2 liabilities, 5 held in trust"
        );
    }
}
