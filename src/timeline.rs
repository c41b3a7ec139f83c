// 🗓️ Timeline Aggregation - every dated thing in the estate on one list

use crate::entities::appraisal::{list_all_appraisals, Appraisal};
use crate::entities::asset::{list_assets, Asset};
use crate::entities::planning::{list_milestones, list_tasks, Milestone, Task};
use crate::entities::property::{list_all_bills, list_all_structures, PropertyStructure, RecurringBill};
use crate::format::format_currency;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// EVENT KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Milestone,
    Financial,
    Task,
    Asset,
    History,
    Maintenance,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::Milestone,
        EventKind::Financial,
        EventKind::Task,
        EventKind::Asset,
        EventKind::History,
        EventKind::Maintenance,
    ];

    /// Filter / query-string code
    pub fn code(&self) -> &'static str {
        match self {
            EventKind::Milestone => "milestone",
            EventKind::Financial => "financial",
            EventKind::Task => "task",
            EventKind::Asset => "asset",
            EventKind::History => "history",
            EventKind::Maintenance => "maintenance",
        }
    }

    /// Badge text
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Milestone => "Milestone",
            EventKind::Financial => "Bill Due",
            EventKind::Task => "Task",
            EventKind::Asset => "Purchased",
            EventKind::History => "Appraisal",
            EventKind::Maintenance => "Maintenance",
        }
    }

    pub fn from_code(code: &str) -> Option<EventKind> {
        EventKind::ALL
            .iter()
            .copied()
            .find(|k| k.code().eq_ignore_ascii_case(code.trim()))
    }
}

/// Parse `?types=milestone,financial` (also accepts repeated values joined by
/// the caller); unknown codes are ignored
pub fn parse_kinds(raw: &str) -> Vec<EventKind> {
    let mut kinds: Vec<EventKind> = raw.split(',').filter_map(EventKind::from_code).collect();
    kinds.dedup();
    kinds
}

// ============================================================================
// TIMELINE EVENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub kind: EventKind,
    pub type_label: String,
    pub icon: String,
    /// Page to open for details, if any
    pub link: Option<String>,
    pub is_past: bool,
}

/// Everything the timeline can draw from
#[derive(Debug, Default, Clone, Copy)]
pub struct TimelineSources<'a> {
    pub milestones: &'a [Milestone],
    pub bills: &'a [RecurringBill],
    pub tasks: &'a [Task],
    pub assets: &'a [Asset],
    pub appraisals: &'a [Appraisal],
    pub structures: &'a [PropertyStructure],
}

/// Merge the sources into one date-sorted list.
///
/// `filter` restricts the kinds (empty = all). Purchases are part of an
/// asset's history, so a `history` filter also keeps `asset` events.
pub fn build_timeline(sources: TimelineSources, filter: &[EventKind], today: NaiveDate) -> Vec<TimelineEvent> {
    let wants = |kind: EventKind| {
        filter.is_empty()
            || filter.contains(&kind)
            || (kind == EventKind::Asset && filter.contains(&EventKind::History))
    };

    let event = |date: NaiveDate, title: &str, description: String, kind: EventKind, icon: &str, link: Option<String>| {
        TimelineEvent {
            date,
            title: title.to_string(),
            description,
            kind,
            type_label: kind.label().to_string(),
            icon: icon.to_string(),
            link,
            is_past: date < today,
        }
    };

    let mut events = Vec::new();

    if wants(EventKind::Milestone) {
        for m in sources.milestones {
            if let Some(date) = m.date_event {
                events.push(event(
                    date,
                    &m.title,
                    m.description.clone().unwrap_or_default(),
                    EventKind::Milestone,
                    "🚩",
                    Some("/planning".to_string()),
                ));
            }
        }
    }

    if wants(EventKind::Financial) {
        for b in sources.bills {
            if let Some(date) = b.next_due_date {
                let payee = b.payee.as_deref().unwrap_or("Unknown");
                let description = match b.amount_estimated {
                    Some(amount) => format!("Payee: {} (~{})", payee, format_currency(amount)),
                    None => format!("Payee: {}", payee),
                };
                events.push(event(
                    date,
                    &b.name,
                    description,
                    EventKind::Financial,
                    "💳",
                    Some(format!("/asset/{}#tab-bills", b.asset_id)),
                ));
            }
        }
    }

    if wants(EventKind::Task) {
        for t in sources.tasks {
            if let Some(date) = t.due_date {
                events.push(event(
                    date,
                    &t.title,
                    format!("Status: {}", t.status),
                    EventKind::Task,
                    "✅",
                    t.asset_id.map(|id| format!("/asset/{}", id)),
                ));
            }
        }
    }

    let names: HashMap<i64, &Asset> = sources.assets.iter().map(|a| (a.id, a)).collect();

    if wants(EventKind::Asset) {
        for a in sources.assets {
            if let Some(date) = a.purchase_date() {
                events.push(event(
                    date,
                    &a.name,
                    "Acquired for estate.".to_string(),
                    EventKind::Asset,
                    a.icon(),
                    Some(format!("/asset/{}", a.id)),
                ));
            }
        }
    }

    if wants(EventKind::History) {
        for ap in sources.appraisals {
            let Some(asset) = names.get(&ap.asset_id) else {
                continue;
            };
            events.push(event(
                ap.date,
                &asset.name,
                format!("Valued at {} ({})", format_currency(ap.value), ap.source),
                EventKind::History,
                asset.icon(),
                Some(format!("/asset/{}", asset.id)),
            ));
        }
    }

    if wants(EventKind::Maintenance) {
        for s in sources.structures {
            if let Some(date) = s.date_last_maintained {
                events.push(event(
                    date,
                    &s.name,
                    s.notes
                        .clone()
                        .filter(|n| !n.trim().is_empty())
                        .unwrap_or_else(|| "Routine maintenance logged.".to_string()),
                    EventKind::Maintenance,
                    "🛠️",
                    Some(format!("/asset/{}#tab-structures", s.asset_id)),
                ));
            }
        }
    }

    // stable: same-day events keep source order
    events.sort_by_key(|e| e.date);
    events
}

/// Load every source from the database and build the timeline
pub fn load_timeline(conn: &Connection, filter: &[EventKind], today: NaiveDate) -> Result<Vec<TimelineEvent>> {
    let milestones = list_milestones(conn)?;
    let bills = list_all_bills(conn)?;
    let tasks = list_tasks(conn)?;
    let assets = list_assets(conn)?;
    let appraisals = list_all_appraisals(conn)?;
    let structures = list_all_structures(conn)?;

    Ok(build_timeline(
        TimelineSources {
            milestones: &milestones,
            bills: &bills,
            tasks: &tasks,
            assets: &assets,
            appraisals: &appraisals,
            structures: &structures,
        },
        filter,
        today,
    ))
}

/// Next `limit` events on or after `today` (dashboard)
pub fn upcoming(events: &[TimelineEvent], limit: usize) -> Vec<TimelineEvent> {
    events.iter().filter(|e| !e.is_past).take(limit).cloned().collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::asset::{AssetType, ATTR_PURCHASE_DATE};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        milestones: Vec<Milestone>,
        bills: Vec<RecurringBill>,
        tasks: Vec<Task>,
        assets: Vec<Asset>,
        appraisals: Vec<Appraisal>,
        structures: Vec<PropertyStructure>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut house = Asset::new("House", AssetType::RealEstate, 600000.0);
            house.id = 1;
            house
                .attributes
                .insert(ATTR_PURCHASE_DATE.to_string(), serde_json::json!("2010-01-01"));

            let mut bill = RecurringBill::new(1, "Property Tax");
            bill.payee = Some("County".to_string());
            bill.amount_estimated = Some(8200.0);
            bill.next_due_date = Some(day(2025, 1, 31));

            let mut task = Task::new("Clean gutters", Some(day(2024, 11, 1)));
            task.asset_id = Some(1);

            let mut well = PropertyStructure::new(1, "Well");
            well.date_last_maintained = Some(day(2023, 8, 1));

            Fixture {
                milestones: vec![
                    Milestone::new("Retirement", Some(day(2030, 6, 1))),
                    Milestone::new("Someday", None),
                ],
                bills: vec![bill, RecurringBill::new(1, "Undated")],
                tasks: vec![task],
                assets: vec![house],
                appraisals: vec![
                    Appraisal::new(1, day(2010, 1, 1), 400000.0, "Purchase"),
                    Appraisal::new(1, day(2024, 1, 1), 600000.0, "Zillow"),
                ],
                structures: vec![well],
            }
        }

        fn sources(&self) -> TimelineSources<'_> {
            TimelineSources {
                milestones: &self.milestones,
                bills: &self.bills,
                tasks: &self.tasks,
                assets: &self.assets,
                appraisals: &self.appraisals,
                structures: &self.structures,
            }
        }
    }

    #[test]
    fn test_full_timeline_sorted() {
        let fixture = Fixture::new();
        let events = build_timeline(fixture.sources(), &[], day(2024, 10, 1));

        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Asset,
                EventKind::History,
                EventKind::Maintenance,
                EventKind::History,
                EventKind::Task,
                EventKind::Financial,
                EventKind::Milestone,
            ]
        );
        assert!(events.windows(2).all(|w| w[0].date <= w[1].date));
        println!("✅ Timeline merged {} events", events.len());
    }

    #[test]
    fn test_event_texts() {
        let fixture = Fixture::new();
        let events = build_timeline(fixture.sources(), &[], day(2024, 10, 1));

        let bill = events.iter().find(|e| e.kind == EventKind::Financial).unwrap();
        assert_eq!(bill.description, "Payee: County (~$8,200)");
        assert_eq!(bill.type_label, "Bill Due");
        assert_eq!(bill.link.as_deref(), Some("/asset/1#tab-bills"));
        assert!(!bill.is_past);

        let appraisal = events.iter().find(|e| e.kind == EventKind::History).unwrap();
        assert_eq!(appraisal.description, "Valued at $400,000 (Purchase)");
        assert_eq!(appraisal.icon, "🏠");
        assert!(appraisal.is_past);

        let upkeep = events.iter().find(|e| e.kind == EventKind::Maintenance).unwrap();
        assert_eq!(upkeep.description, "Routine maintenance logged.");

        let task = events.iter().find(|e| e.kind == EventKind::Task).unwrap();
        assert_eq!(task.description, "Status: Pending");
    }

    #[test]
    fn test_filter_restricts_kinds() {
        let fixture = Fixture::new();
        let today = day(2024, 10, 1);

        let only_bills = build_timeline(fixture.sources(), &[EventKind::Financial], today);
        assert_eq!(only_bills.len(), 1);

        let history = build_timeline(fixture.sources(), &[EventKind::History], today);
        assert!(history.iter().all(|e| matches!(e.kind, EventKind::History | EventKind::Asset)));
        assert_eq!(history.len(), 3);

        let purchases = build_timeline(fixture.sources(), &[EventKind::Asset], today);
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].kind, EventKind::Asset);
    }

    #[test]
    fn test_is_past_uses_today() {
        let fixture = Fixture::new();
        let events = build_timeline(fixture.sources(), &[EventKind::Task], day(2024, 11, 1));
        assert!(!events[0].is_past, "due today is not past");

        let events = build_timeline(fixture.sources(), &[EventKind::Task], day(2024, 11, 2));
        assert!(events[0].is_past);
    }

    #[test]
    fn test_parse_kinds_and_upcoming() {
        assert_eq!(
            parse_kinds("milestone, Financial,bogus"),
            vec![EventKind::Milestone, EventKind::Financial]
        );
        assert!(parse_kinds("").is_empty());

        let fixture = Fixture::new();
        let events = build_timeline(fixture.sources(), &[], day(2024, 10, 1));
        let next = upcoming(&events, 2);
        assert_eq!(next.len(), 2);
        assert_eq!(next[0].title, "Clean gutters");
    }
}
