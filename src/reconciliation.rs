// ⚖️ Valuation Reconciliation Engine - keep asset values in sync with their history
//
// Invariant after every appraisal mutation:
//   asset.value_estimated == value of the latest appraisal (by date, then id)
// or, when the asset has no appraisals left, the value it had before.
//
// The earliest "Purchase" appraisal is mirrored into the asset's
// purchase_date / purchase_price attributes whenever a mutation touches one.

use crate::entities::appraisal::{
    delete_appraisal, get_appraisal, insert_appraisal, list_appraisals_for_asset, update_appraisal,
    Appraisal, INITIAL_ENTRY_SOURCE, MANUAL_UPDATE_SOURCE, PURCHASE_SOURCE,
};
use crate::entities::asset::{
    get_asset, insert_asset, list_assets, set_asset_attributes, set_asset_value, update_asset, Asset,
    ATTR_PURCHASE_DATE, ATTR_PURCHASE_PRICE,
};
use crate::format::{format_currency, format_date};
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ============================================================================
// PURE SELECTION RULES
// ============================================================================

/// Latest appraisal by (date, id); same-day ties go to the later insert
pub fn latest_appraisal(appraisals: &[Appraisal]) -> Option<&Appraisal> {
    appraisals.iter().max_by_key(|a| (a.date, a.id))
}

/// Earliest Purchase-tagged appraisal by (date, id)
pub fn purchase_record(appraisals: &[Appraisal]) -> Option<&Appraisal> {
    appraisals
        .iter()
        .filter(|a| a.is_purchase())
        .min_by_key(|a| (a.date, a.id))
}

/// Value the asset should carry given its history
pub fn reconciled_value(prior_value: f64, appraisals: &[Appraisal]) -> f64 {
    latest_appraisal(appraisals)
        .map(|a| a.value)
        .unwrap_or(prior_value)
}

// ============================================================================
// VALUATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValuationResult {
    /// Latest appraisal already matched the stored value
    Unchanged { value: f64 },

    /// Stored value moved to the latest appraisal's value
    Updated { previous_value: f64, current_value: f64 },

    /// No appraisals remain; the prior value is kept
    Retained { value: f64 },
}

impl ValuationResult {
    pub fn previous_value(&self) -> f64 {
        match self {
            ValuationResult::Unchanged { value } | ValuationResult::Retained { value } => *value,
            ValuationResult::Updated { previous_value, .. } => *previous_value,
        }
    }

    pub fn current_value(&self) -> f64 {
        match self {
            ValuationResult::Unchanged { value } | ValuationResult::Retained { value } => *value,
            ValuationResult::Updated { current_value, .. } => *current_value,
        }
    }

    pub fn value_changed(&self) -> bool {
        matches!(self, ValuationResult::Updated { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PurchaseSync {
    /// The mutation did not touch a Purchase record
    Unchanged,

    /// Attributes now mirror this purchase record
    Updated { date: NaiveDate, price: f64 },

    /// The last purchase record is gone; attributes removed
    Cleared,
}

// ============================================================================
// VALUATION REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationReport {
    pub asset_id: i64,
    /// Appraisal that was recorded, revised or removed (None for a plain reconcile)
    pub appraisal_id: Option<i64>,
    pub result: ValuationResult,
    pub purchase: PurchaseSync,
    /// Appraisals remaining after the mutation
    pub appraisal_count: usize,
    pub reconciled_at: chrono::DateTime<chrono::Utc>,
}

impl ValuationReport {
    pub fn previous_value(&self) -> f64 {
        self.result.previous_value()
    }

    pub fn current_value(&self) -> f64 {
        self.result.current_value()
    }

    pub fn value_changed(&self) -> bool {
        self.result.value_changed()
    }

    pub fn summary(&self) -> String {
        let value = match &self.result {
            ValuationResult::Unchanged { value } => format!("value unchanged at {}", format_currency(*value)),
            ValuationResult::Updated { previous_value, current_value } => format!(
                "value {} → {}",
                format_currency(*previous_value),
                format_currency(*current_value)
            ),
            ValuationResult::Retained { value } => {
                format!("no valuations left, keeping {}", format_currency(*value))
            }
        };

        let purchase = match &self.purchase {
            PurchaseSync::Unchanged => String::new(),
            PurchaseSync::Updated { date, price } => format!(
                "; purchase {} on {}",
                format_currency(*price),
                format_date(*date)
            ),
            PurchaseSync::Cleared => "; purchase details cleared".to_string(),
        };

        format!(
            "Asset {}: {} ({} valuations){}",
            self.asset_id, value, self.appraisal_count, purchase
        )
    }
}

// ============================================================================
// VALUATION ENGINE
// ============================================================================

/// Stateless; every operation runs in its own transaction.
/// Values are compared exactly: whatever is written is what gets reported.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValuationEngine;

impl ValuationEngine {
    pub fn new() -> Self {
        ValuationEngine
    }

    /// Add an appraisal and reconcile its asset
    pub fn record(&self, conn: &Connection, appraisal: &Appraisal) -> Result<ValuationReport> {
        let tx = conn.unchecked_transaction()?;

        if get_asset(&tx, appraisal.asset_id)?.is_none() {
            return Err(anyhow!("Asset {} not found", appraisal.asset_id));
        }

        let id = insert_appraisal(&tx, appraisal)?;
        let report = self.apply(&tx, appraisal.asset_id, Some(id), appraisal.is_purchase())?;

        tx.commit()?;
        info!(appraisal_id = id, "{}", report.summary());
        Ok(report)
    }

    /// Edit an existing appraisal (date, value, source, notes) and reconcile.
    /// The stored record decides which asset it belongs to.
    pub fn revise(&self, conn: &Connection, appraisal: &Appraisal) -> Result<ValuationReport> {
        let tx = conn.unchecked_transaction()?;

        let existing = get_appraisal(&tx, appraisal.id)?
            .ok_or_else(|| anyhow!("Appraisal {} not found", appraisal.id))?;

        let revised = Appraisal {
            id: existing.id,
            asset_id: existing.asset_id,
            ..appraisal.clone()
        };
        update_appraisal(&tx, &revised)?;

        let touches_purchase = existing.is_purchase() || revised.is_purchase();
        let report = self.apply(&tx, existing.asset_id, Some(existing.id), touches_purchase)?;

        tx.commit()?;
        info!(appraisal_id = existing.id, "{}", report.summary());
        Ok(report)
    }

    /// Delete an appraisal; the value falls back to the new latest record
    pub fn remove(&self, conn: &Connection, appraisal_id: i64) -> Result<ValuationReport> {
        let tx = conn.unchecked_transaction()?;

        let existing = get_appraisal(&tx, appraisal_id)?
            .ok_or_else(|| anyhow!("Appraisal {} not found", appraisal_id))?;

        delete_appraisal(&tx, appraisal_id)?;
        let report = self.apply(&tx, existing.asset_id, Some(appraisal_id), existing.is_purchase())?;

        tx.commit()?;
        info!(appraisal_id, "{}", report.summary());
        Ok(report)
    }

    /// Re-derive the value of one asset from its history (no purchase sync)
    pub fn reconcile(&self, conn: &Connection, asset_id: i64) -> Result<ValuationReport> {
        let tx = conn.unchecked_transaction()?;
        let report = self.apply(&tx, asset_id, None, false)?;
        tx.commit()?;
        Ok(report)
    }

    /// Reconcile every asset; returns only the reports that moved a value
    pub fn reconcile_all(&self, conn: &Connection) -> Result<Vec<ValuationReport>> {
        let mut changed = Vec::new();
        for asset in list_assets(conn)? {
            let report = self.reconcile(conn, asset.id)?;
            if report.value_changed() {
                info!(asset_id = asset.id, "{}", report.summary());
                changed.push(report);
            }
        }
        Ok(changed)
    }

    /// Core step: value reconciliation, then purchase attribute sync if asked.
    /// Runs inside the caller's transaction.
    fn apply(
        &self,
        conn: &Connection,
        asset_id: i64,
        appraisal_id: Option<i64>,
        sync_purchase: bool,
    ) -> Result<ValuationReport> {
        let asset = get_asset(conn, asset_id)?.ok_or_else(|| anyhow!("Asset {} not found", asset_id))?;
        let appraisals = list_appraisals_for_asset(conn, asset_id)?;

        let prior = asset.value_estimated;
        let result = match latest_appraisal(&appraisals) {
            None => ValuationResult::Retained { value: prior },
            Some(latest) if latest.value == prior => ValuationResult::Unchanged { value: prior },
            Some(latest) => {
                set_asset_value(conn, asset_id, latest.value)?;
                ValuationResult::Updated {
                    previous_value: prior,
                    current_value: latest.value,
                }
            }
        };

        let purchase = if sync_purchase {
            self.sync_purchase(conn, &asset, &appraisals)?
        } else {
            PurchaseSync::Unchanged
        };

        debug!(asset_id, ?result, ?purchase, "reconciled");

        Ok(ValuationReport {
            asset_id,
            appraisal_id,
            result,
            purchase,
            appraisal_count: appraisals.len(),
            reconciled_at: chrono::Utc::now(),
        })
    }

    fn sync_purchase(&self, conn: &Connection, asset: &Asset, appraisals: &[Appraisal]) -> Result<PurchaseSync> {
        let mut attributes = asset.attributes.clone();

        let sync = match purchase_record(appraisals) {
            Some(record) => {
                attributes.insert(
                    ATTR_PURCHASE_DATE.to_string(),
                    serde_json::Value::String(format_date(record.date)),
                );
                attributes.insert(ATTR_PURCHASE_PRICE.to_string(), serde_json::json!(record.value));
                PurchaseSync::Updated {
                    date: record.date,
                    price: record.value,
                }
            }
            None => {
                attributes.remove(ATTR_PURCHASE_DATE);
                attributes.remove(ATTR_PURCHASE_PRICE);
                PurchaseSync::Cleared
            }
        };

        set_asset_attributes(conn, asset.id, &attributes)?;
        Ok(sync)
    }

    // ========================================================================
    // ASSET FORM HOOKS
    // ========================================================================

    /// Insert a new asset and seed its valuation history:
    /// - a Purchase record when a purchase date was given (price defaults to 0)
    /// - an Initial Entry dated `today` for a non-zero value, unless the
    ///   purchase already records that same value today
    pub fn create_asset(
        &self,
        conn: &Connection,
        asset: &Asset,
        purchase: Option<(NaiveDate, f64)>,
        today: NaiveDate,
    ) -> Result<(i64, ValuationReport)> {
        let tx = conn.unchecked_transaction()?;
        let asset_id = insert_asset(&tx, asset)?;

        if let Some((date, price)) = purchase {
            insert_appraisal(
                &tx,
                &Appraisal::new(asset_id, date, price, PURCHASE_SOURCE).with_notes("Original Purchase Price"),
            )?;
        }

        let duplicate_of_purchase = purchase
            .map(|(date, price)| date == today && price == asset.value_estimated)
            .unwrap_or(false);

        if asset.value_estimated != 0.0 && !duplicate_of_purchase {
            insert_appraisal(
                &tx,
                &Appraisal::new(asset_id, today, asset.value_estimated, INITIAL_ENTRY_SOURCE)
                    .with_notes("Current value at time of recording"),
            )?;
        }

        let report = self.apply(&tx, asset_id, None, purchase.is_some())?;
        tx.commit()?;

        info!(asset_id, name = %asset.name, "asset created: {}", report.summary());
        Ok((asset_id, report))
    }

    /// Save an edited asset; a changed value is recorded as a Manual Update
    /// appraisal dated `today` so the history keeps explaining the value
    pub fn edit_asset(&self, conn: &Connection, asset: &Asset, today: NaiveDate) -> Result<Option<ValuationReport>> {
        let tx = conn.unchecked_transaction()?;

        let stored = get_asset(&tx, asset.id)?.ok_or_else(|| anyhow!("Asset {} not found", asset.id))?;

        // Keep the old value until the new appraisal is in; reconcile moves it
        let mut edited = asset.clone();
        edited.value_estimated = stored.value_estimated;
        update_asset(&tx, &edited)?;

        let report = if asset.value_estimated == stored.value_estimated {
            None
        } else {
            let id = insert_appraisal(
                &tx,
                &Appraisal::new(asset.id, today, asset.value_estimated, MANUAL_UPDATE_SOURCE),
            )?;
            Some(self.apply(&tx, asset.id, Some(id), false)?)
        };

        tx.commit()?;
        match &report {
            Some(r) => info!(asset_id = asset.id, "asset edited: {}", r.summary()),
            None => info!(asset_id = asset.id, "asset edited"),
        }
        Ok(report)
    }
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::entities::asset::AssetType;
    use proptest::prelude::*;

    fn arb_history() -> impl Strategy<Value = Vec<(i64, f64)>> {
        // (days after 2000-01-01, value); small day range forces same-date ties
        prop::collection::vec((0i64..40, -1_000_000.0f64..1_000_000.0), 1..12)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_deleting_latest_falls_back(history in arb_history(), initial in -1000.0f64..1000.0) {
            let conn = open_in_memory().unwrap();
            let engine = ValuationEngine::new();
            let base = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
            let asset_id = insert_asset(&conn, &Asset::new("Prop", AssetType::Other, initial)).unwrap();

            for (offset, value) in &history {
                let date = base + chrono::Duration::days(*offset);
                engine.record(&conn, &Appraisal::new(asset_id, date, *value, "Test")).unwrap();
            }

            // Peel off the latest record until none remain
            let mut expected_prior = get_asset(&conn, asset_id).unwrap().unwrap().value_estimated;
            loop {
                let remaining = list_appraisals_for_asset(&conn, asset_id).unwrap();
                let latest = match latest_appraisal(&remaining) {
                    Some(a) => a.clone(),
                    None => break,
                };
                prop_assert_eq!(expected_prior, latest.value);

                engine.remove(&conn, latest.id).unwrap();
                let after = list_appraisals_for_asset(&conn, asset_id).unwrap();
                let value = get_asset(&conn, asset_id).unwrap().unwrap().value_estimated;

                match latest_appraisal(&after) {
                    Some(new_latest) => prop_assert_eq!(value, new_latest.value),
                    None => prop_assert_eq!(value, latest.value),
                }
                expected_prior = value;
            }
        }
    }
}
