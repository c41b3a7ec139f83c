// 📄 Read-only pages: dashboard, listings, asset detail, planning, contacts, FAQ

use super::render::{self, e, money, Nav};
use super::session::{self, IncomingFlash};
use super::{today, AppState, WebError, WebResult};
use crate::chart::{net_worth_chart, single_asset_chart};
use crate::entities::appraisal::list_appraisals_for_asset;
use crate::entities::asset::{
    get_asset, list_assets_owned_by, list_beneficiaries, list_holdings, list_liabilities, Asset,
};
use crate::entities::person::{list_people, Person};
use crate::entities::planning::{list_milestones, list_tasks, list_tasks_for_asset, TASK_STATUSES};
use crate::entities::property::{
    list_bills_for_asset, list_locations_for_asset, list_structures_for_asset, list_vendors_for_asset,
    BILL_FREQUENCIES,
};
use crate::format::{format_currency, format_currency_cents, format_date};
use crate::schema::date_field;
use crate::summary::NetWorthSummary;
use crate::timeline::{load_timeline, parse_kinds, upcoming, EventKind};
use axum::extract::{Path, RawQuery, State};
use axum::response::Response;
use std::collections::HashMap;

// ============================================================================
// HELPERS
// ============================================================================

/// `?types=a,b` or `?types=a&types=b` → kinds (unknown codes dropped)
pub fn kinds_from_query(query: Option<&str>) -> Vec<EventKind> {
    let joined: Vec<String> = query
        .unwrap_or("")
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| *key == "types")
        .filter_map(|(_, value)| urlencoding::decode(&value.replace('+', " ")).ok().map(|v| v.into_owned()))
        .collect();
    parse_kinds(&joined.join(","))
}

pub fn person_names(people: &[Person]) -> HashMap<i64, String> {
    people.iter().map(|p| (p.id, p.name.clone())).collect()
}

/// Options for a person picker; `none_label` adds a "0" entry first
pub fn person_options(people: &[Person], none_label: Option<&str>) -> Vec<(String, String)> {
    let mut options: Vec<(String, String)> = none_label
        .map(|label| vec![("0".to_string(), label.to_string())])
        .unwrap_or_default();
    options.extend(
        people
            .iter()
            .map(|p| (p.id.to_string(), format!("{} ({})", p.name, p.role_label()))),
    );
    options
}

fn person_select_html(name: &str, people: &[Person], none_label: Option<&str>) -> String {
    let options: String = person_options(people, none_label)
        .iter()
        .map(|(value, label)| format!(r#"<option value="{}">{}</option>"#, e(value), e(label)))
        .collect();
    format!(r#"<select name="{}">{}</select>"#, name, options)
}

fn text_value(value: &Option<String>) -> String {
    e(value.as_deref().unwrap_or(""))
}

// ============================================================================
// DASHBOARD
// ============================================================================

/// GET /
pub async fn dashboard(State(state): State<AppState>, flash: IncomingFlash) -> WebResult<Response> {
    let (summary, chart, events) = {
        let conn = state.conn()?;
        let summary = NetWorthSummary::load(&conn)?;
        let chart = net_worth_chart(&conn)?;
        let events = load_timeline(&conn, &[], today())?;
        (summary, chart, events)
    };

    let breakdown: String = summary
        .by_type
        .iter()
        .map(|b| {
            format!(
                "<tr><td>{} {}</td><td>{}</td><td>{}</td></tr>",
                b.icon,
                e(&b.label),
                b.count,
                money(b.total)
            )
        })
        .collect();

    let content = format!(
        r#"<h1>Estate Overview</h1>
<section class="cards">{net}{assets}{debts}{trust}</section>
<section class="card"><h2>Net Worth Over Time</h2>{chart}</section>
<div class="columns">
<section class="card"><h2>Breakdown</h2><table><thead><tr><th>Type</th><th>Items</th><th>Total</th></tr></thead><tbody>{breakdown}</tbody></table></section>
<section class="card"><h2>Coming Up</h2>{upcoming}<p><a href="/planning">Full timeline →</a></p></section>
</div>"#,
        net = render::stat_card("Net Worth", &money(summary.net_worth)),
        assets = render::stat_card("Total Assets", &money(summary.total_assets)),
        debts = render::stat_card("Total Liabilities", &money(summary.total_liabilities)),
        trust = render::stat_card("Held in Trust", &summary.trust_count.to_string()),
        chart = render::chart_svg(&chart, 800, 280),
        breakdown = breakdown,
        upcoming = render::timeline_list(&upcoming(&events, 5)),
    );

    Ok(session::page(&flash, render::layout("Overview", Nav::Overview, flash.get(), &content)))
}

// ============================================================================
// LISTINGS
// ============================================================================

fn asset_table(assets: &[Asset], owners: &HashMap<i64, String>, is_liability: bool) -> String {
    if assets.is_empty() {
        let what = if is_liability { "liabilities" } else { "assets" };
        return format!(r#"<p class="empty">No {} recorded yet.</p>"#, what);
    }

    let rows: String = assets
        .iter()
        .map(|a| {
            let owner = a
                .owner_id
                .and_then(|id| owners.get(&id))
                .map(|n| e(n))
                .unwrap_or_else(|| "Trust".to_string());
            let label = a.kind().map(|k| k.label().to_string()).unwrap_or_else(|| a.asset_type.clone());
            format!(
                r#"<tr><td>{icon}</td><td><a href="/asset/{id}">{name}</a></td><td>{label}</td><td>{owner}</td><td>{trust}</td><td>{value}</td></tr>"#,
                icon = a.icon(),
                id = a.id,
                name = e(&a.name),
                label = e(&label),
                owner = owner,
                trust = if a.is_in_trust { "✔" } else { "" },
                value = money(a.value_estimated)
            )
        })
        .collect();

    let total: f64 = assets.iter().map(|a| a.value_estimated).sum();
    format!(
        r#"<table class="listing"><thead><tr><th></th><th>Name</th><th>Type</th><th>Owner</th><th>In Trust</th><th>Value</th></tr></thead>
<tbody>{rows}</tbody>
<tfoot><tr><td colspan="5">Total</td><td>{total}</td></tr></tfoot></table>"#,
        rows = rows,
        total = money(total)
    )
}

async fn listing(state: AppState, flash: IncomingFlash, is_liability: bool) -> WebResult<Response> {
    let (assets, people) = {
        let conn = state.conn()?;
        let assets = if is_liability { list_liabilities(&conn)? } else { list_holdings(&conn)? };
        (assets, list_people(&conn)?)
    };

    let (title, nav) = if is_liability {
        ("Liabilities", Nav::Liabilities)
    } else {
        ("Assets", Nav::Assets)
    };
    let content = format!(
        r#"<h1>{title}</h1>
<p><a class="button" href="/manage/asset/select-type">+ Add item</a></p>
{table}"#,
        title = title,
        table = asset_table(&assets, &person_names(&people), is_liability)
    );

    Ok(session::page(&flash, render::layout(title, nav, flash.get(), &content)))
}

/// GET /assets - value >= 0
pub async fn assets_view(State(state): State<AppState>, flash: IncomingFlash) -> WebResult<Response> {
    listing(state, flash, false).await
}

/// GET /liabilities - value < 0
pub async fn liabilities_view(State(state): State<AppState>, flash: IncomingFlash) -> WebResult<Response> {
    listing(state, flash, true).await
}

// ============================================================================
// ASSET DETAIL
// ============================================================================

/// GET /asset/:id
pub async fn asset_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    flash: IncomingFlash,
) -> WebResult<Response> {
    let conn = state.conn()?;
    let asset = get_asset(&conn, id)?.ok_or_else(|| WebError::not_found(format!("Asset {}", id)))?;
    let mut appraisals = list_appraisals_for_asset(&conn, id)?;
    let structures = list_structures_for_asset(&conn, id)?;
    let locations = list_locations_for_asset(&conn, id)?;
    let bills = list_bills_for_asset(&conn, id)?;
    let vendors = list_vendors_for_asset(&conn, id)?;
    let beneficiaries = list_beneficiaries(&conn, id)?;
    let tasks = list_tasks_for_asset(&conn, id)?;
    let people = list_people(&conn)?;
    drop(conn);

    let names = person_names(&people);
    let chart = single_asset_chart(&asset, &appraisals);
    appraisals.sort_by_key(|a| std::cmp::Reverse((a.date, a.id)));

    // Attributes
    let mut keys: Vec<&String> = asset.attributes.keys().collect();
    keys.sort();
    let attributes: String = keys
        .iter()
        .filter_map(|k| asset.attribute_text(k).map(|v| (k, v)))
        .map(|(k, v)| format!("<tr><th>{}</th><td>{}</td></tr>", e(&k.replace('_', " ")), e(&v)))
        .collect();

    // Valuations
    let valuation_rows: String = appraisals
        .iter()
        .map(|a| {
            format!(
                r#"<tr><td>{date}</td><td>{value}</td><td>{source}</td><td>{notes}</td><td>
<details><summary>Edit</summary>
<form method="post" action="/manage/appraisal/{id}/edit" class="inline-form">
<input type="date" name="date" value="{date}"><input type="number" step="any" name="value" value="{raw}">
<input name="source" value="{source}"><input name="notes" value="{notes}"><button type="submit">Save</button></form>
</details>{delete}</td></tr>"#,
                id = a.id,
                date = format_date(a.date),
                value = format_currency_cents(a.value),
                raw = a.value,
                source = e(&a.source),
                notes = text_value(&a.notes),
                delete = render::post_button(
                    &format!("/manage/appraisal/{}/delete", a.id),
                    "Delete",
                    Some("Delete this valuation?")
                )
            )
        })
        .collect();
    let add_valuation = render::inline_form(
        &format!("/manage/asset/{}/appraise", id),
        &format!(
            r#"<input type="date" name="date" value="{}" required><input type="number" step="any" name="value" placeholder="Value" required><input name="source" placeholder="Source (Zillow, KBB, Purchase…)" required><input name="notes" placeholder="Notes">"#,
            format_date(today())
        ),
        "Add valuation",
    );

    // Structures
    let structure_rows: String = structures
        .iter()
        .map(|s| {
            format!(
                r#"<li><strong>{name}</strong> {kind} <span class="muted">built {built}, maintained {maint}</span> {desc}
<details><summary>Edit</summary><form method="post" action="/manage/structure/{id}/edit" class="inline-form">
<input name="name" value="{name}"><input name="structure_type" value="{kind}"><input name="description" value="{desc}">
<input type="date" name="date_built" value="{built}"><input type="date" name="date_last_maintained" value="{maint}">
<input name="notes" value="{notes}"><button type="submit">Save</button></form></details>{delete}</li>"#,
                id = s.id,
                name = e(&s.name),
                kind = text_value(&s.structure_type),
                desc = text_value(&s.description),
                built = date_field(s.date_built),
                maint = date_field(s.date_last_maintained),
                notes = text_value(&s.notes),
                delete = render::post_button(&format!("/manage/structure/{}/delete", s.id), "Delete", Some("Delete this structure?"))
            )
        })
        .collect();
    let add_structure = render::inline_form(
        &format!("/manage/asset/{}/structures", id),
        r#"<input name="name" placeholder="Name (Well, Barn…)" required><input name="structure_type" placeholder="Type"><input type="date" name="date_built" title="Built"><input type="date" name="date_last_maintained" title="Last maintained"><input name="notes" placeholder="Notes">"#,
        "Add structure",
    );

    // Locations
    let location_rows: String = locations
        .iter()
        .map(|l| {
            format!(
                r#"<li><strong>{label}</strong> ({lat}, {lng}) {desc} <a href="{maps}" target="_blank" rel="noopener">Open in Maps</a>
<details><summary>Edit</summary><form method="post" action="/manage/location/{id}/edit" class="inline-form">
<input name="label" value="{label}"><input type="number" step="any" name="latitude" value="{lat}"><input type="number" step="any" name="longitude" value="{lng}">
<input name="description" value="{desc}"><button type="submit">Save</button></form></details>{delete}</li>"#,
                id = l.id,
                label = e(&l.label),
                lat = l.latitude,
                lng = l.longitude,
                desc = text_value(&l.description),
                maps = e(&l.maps_url()),
                delete = render::post_button(&format!("/manage/location/{}/delete", l.id), "Delete", None)
            )
        })
        .collect();
    let add_location = render::inline_form(
        &format!("/manage/asset/{}/locations", id),
        r#"<input name="label" placeholder="Label (Gate, Well head…)" required><input type="number" step="any" name="latitude" placeholder="Latitude" required><input type="number" step="any" name="longitude" placeholder="Longitude" required><input name="description" placeholder="Description">"#,
        "Add pin",
    );

    // Bills
    let frequency_options: String = BILL_FREQUENCIES
        .iter()
        .map(|f| format!(r#"<option value="{0}">{0}</option>"#, f))
        .collect();
    let bill_rows: String = bills
        .iter()
        .map(|b| {
            format!(
                r#"<li><strong>{name}</strong> {payee} {amount} {freq} {autopay} <span class="muted">next due {due}</span>
<details><summary>Edit</summary><form method="post" action="/manage/bill/{id}/edit" class="inline-form">
<input name="name" value="{name}"><input name="payee" value="{payee}"><input type="number" step="any" name="amount_estimated" value="{raw}">
<input name="frequency" value="{freq}"><label><input type="checkbox" name="is_autopay" value="y"{checked}> Autopay</label>
<input type="date" name="next_due_date" value="{due}"><input name="notes" value="{notes}"><button type="submit">Save</button></form></details>{delete}</li>"#,
                id = b.id,
                name = e(&b.name),
                payee = text_value(&b.payee),
                amount = b.amount_estimated.map(format_currency_cents).unwrap_or_default(),
                raw = b.amount_estimated.map(|a| a.to_string()).unwrap_or_default(),
                freq = text_value(&b.frequency),
                autopay = if b.is_autopay { "(autopay)" } else { "" },
                checked = if b.is_autopay { " checked" } else { "" },
                due = date_field(b.next_due_date),
                notes = text_value(&b.notes),
                delete = render::post_button(&format!("/manage/bill/{}/delete", b.id), "Delete", None)
            )
        })
        .collect();
    let add_bill = render::inline_form(
        &format!("/manage/asset/{}/bills", id),
        &format!(
            r#"<input name="name" placeholder="Bill (Property Tax…)" required><input name="payee" placeholder="Payee"><input type="number" step="any" name="amount_estimated" placeholder="Amount"><select name="frequency">{}</select><label><input type="checkbox" name="is_autopay" value="y"> Autopay</label><input type="date" name="next_due_date" title="Next due">"#,
            frequency_options
        ),
        "Add bill",
    );

    // Vendors
    let vendor_rows: String = vendors
        .iter()
        .map(|v| {
            let who = names.get(&v.person_id).map(|n| e(n)).unwrap_or_else(|| "Unknown".to_string());
            format!(
                r#"<li><strong>{role}</strong>: {who} {notes}
<details><summary>Edit</summary><form method="post" action="/manage/vendor/{id}/edit" class="inline-form">
<input type="hidden" name="person_id" value="{person}"><input name="role" value="{role}"><input name="notes" value="{notes}">
<button type="submit">Save</button></form></details>{delete}</li>"#,
                id = v.id,
                role = e(&v.role),
                who = who,
                person = v.person_id,
                notes = text_value(&v.notes),
                delete = render::post_button(&format!("/manage/vendor/{}/delete", v.id), "Remove", None)
            )
        })
        .collect();
    let add_vendor = render::inline_form(
        &format!("/manage/asset/{}/vendors", id),
        &format!(
            r#"{}<input name="role" placeholder="Role (Plumber, Agent…)" required><input name="notes" placeholder="Notes">"#,
            person_select_html("person_id", &people, None)
        ),
        "Link contact",
    );

    // Beneficiaries
    let beneficiary_rows: String = beneficiaries
        .iter()
        .map(|b| {
            let who = names.get(&b.person_id).map(|n| e(n)).unwrap_or_else(|| "Unknown".to_string());
            format!(
                "<li>{}: {}% {}</li>",
                who,
                b.percentage,
                render::post_button(
                    &format!("/manage/asset/{}/beneficiaries/{}/delete", id, b.person_id),
                    "Remove",
                    None
                )
            )
        })
        .collect();
    let add_beneficiary = render::inline_form(
        &format!("/manage/asset/{}/beneficiaries", id),
        &format!(
            r#"{}<input type="number" step="any" name="percentage" value="50" min="0" max="100">"#,
            person_select_html("person_id", &people, None)
        ),
        "Add beneficiary",
    );

    // Tasks
    let task_rows: String = tasks
        .iter()
        .map(|t| {
            format!(
                "<li>{} <span class=\"badge\">{}</span> <span class=\"muted\">{}</span></li>",
                e(&t.title),
                e(&t.status),
                date_field(t.due_date)
            )
        })
        .collect();

    let owner = asset
        .owner_id
        .and_then(|oid| names.get(&oid))
        .map(|n| e(n))
        .unwrap_or_else(|| "Trust".to_string());

    let content = format!(
        r#"<h1>{icon} {name}</h1>
<p class="muted">{label} · Owner: {owner} · {trust}</p>
<section class="cards">{value}{purchase}</section>
<p><a class="button" href="/manage/asset/edit/{id}">Edit</a> {delete}</p>
<section class="card"><h2>Details</h2><table class="attributes">{attributes}</table></section>
<section class="card"><h2>Valuation History</h2>{chart}
<table><thead><tr><th>Date</th><th>Value</th><th>Source</th><th>Notes</th><th></th></tr></thead><tbody>{valuations}</tbody></table>
{add_valuation}</section>
<section class="card"><h2>Structures</h2><ul>{structures}</ul>{add_structure}</section>
<section class="card"><h2>Location Pins</h2><ul>{locations}</ul>{add_location}</section>
<section class="card"><h2>Recurring Bills</h2><ul>{bills}</ul>{add_bill}</section>
<section class="card"><h2>Service Contacts</h2><ul>{vendors}</ul>{add_vendor}</section>
<section class="card"><h2>Beneficiaries</h2><ul>{beneficiaries}</ul>{add_beneficiary}</section>
<section class="card"><h2>Tasks</h2><ul>{tasks}</ul></section>"#,
        icon = asset.icon(),
        name = e(&asset.name),
        label = e(&asset.kind().map(|k| k.label().to_string()).unwrap_or_else(|| asset.asset_type.clone())),
        owner = owner,
        trust = if asset.is_in_trust { "Held in trust" } else { "Outside the trust" },
        value = render::stat_card("Current Value", &money(asset.value_estimated)),
        purchase = match (asset.purchase_date(), asset.purchase_price()) {
            (Some(date), Some(price)) => render::stat_card(
                "Purchased",
                &format!("{} on {}", format_currency(price), format_date(date))
            ),
            _ => String::new(),
        },
        id = id,
        delete = render::post_button(
            &format!("/manage/asset/delete/{}", id),
            "Delete",
            Some("Delete this item and its whole history?")
        ),
        attributes = attributes,
        chart = render::chart_svg(&chart, 700, 220),
        valuations = valuation_rows,
        add_valuation = add_valuation,
        structures = structure_rows,
        add_structure = add_structure,
        locations = location_rows,
        add_location = add_location,
        bills = bill_rows,
        add_bill = add_bill,
        vendors = vendor_rows,
        add_vendor = add_vendor,
        beneficiaries = beneficiary_rows,
        add_beneficiary = add_beneficiary,
        tasks = task_rows,
    );

    let nav = if asset.is_liability() { Nav::Liabilities } else { Nav::Assets };
    Ok(session::page(&flash, render::layout(&asset.name, nav, flash.get(), &content)))
}

// ============================================================================
// PLANNING
// ============================================================================

/// GET /planning?types=milestone,financial
pub async fn planning_view(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    flash: IncomingFlash,
) -> WebResult<Response> {
    let kinds = kinds_from_query(query.as_deref());
    let (milestones, tasks, events, assets) = {
        let conn = state.conn()?;
        (
            list_milestones(&conn)?,
            list_tasks(&conn)?,
            load_timeline(&conn, &kinds, today())?,
            crate::entities::asset::list_assets(&conn)?,
        )
    };

    let milestone_rows: String = milestones
        .iter()
        .map(|m| {
            format!(
                r#"<li class="{done}"><strong>{title}</strong> <span class="muted">{date}</span> {desc}
{toggle}
<details><summary>Edit</summary><form method="post" action="/manage/milestone/{id}/edit" class="inline-form">
<input name="title" value="{title}"><input type="date" name="date_event" value="{date}"><input name="description" value="{desc}">
<label><input type="checkbox" name="is_completed" value="y"{checked}> Done</label><button type="submit">Save</button></form></details>{delete}</li>"#,
                id = m.id,
                done = if m.is_completed { "done" } else { "" },
                title = e(&m.title),
                date = date_field(m.date_event),
                desc = text_value(&m.description),
                checked = if m.is_completed { " checked" } else { "" },
                toggle = render::post_button(
                    &format!("/manage/milestone/{}/toggle", m.id),
                    if m.is_completed { "Reopen" } else { "Complete" },
                    None
                ),
                delete = render::post_button(&format!("/manage/milestone/{}/delete", m.id), "Delete", None)
            )
        })
        .collect();

    let status_options: String = TASK_STATUSES
        .iter()
        .map(|s| format!(r#"<option value="{0}">{0}</option>"#, s))
        .collect();
    let asset_options: String = std::iter::once(r#"<option value="0">No asset</option>"#.to_string())
        .chain(assets.iter().map(|a| format!(r#"<option value="{}">{}</option>"#, a.id, e(&a.name))))
        .collect();

    let task_rows: String = tasks
        .iter()
        .map(|t| {
            format!(
                r#"<li class="{done}"><strong>{title}</strong> <span class="badge">{status}</span> <span class="muted">{due}</span> {recurring}
{toggle}
<details><summary>Edit</summary><form method="post" action="/manage/task/{id}/edit" class="inline-form">
<input name="title" value="{title}"><input type="date" name="due_date" value="{due}">
<input name="status" value="{status}"><input type="hidden" name="asset_id" value="{asset}">
<label><input type="checkbox" name="is_recurring" value="y"{recurring_checked}> Recurring</label><button type="submit">Save</button></form></details>{delete}</li>"#,
                id = t.id,
                done = if t.is_done() { "done" } else { "" },
                title = e(&t.title),
                status = e(&t.status),
                due = date_field(t.due_date),
                recurring = if t.is_recurring { "🔁" } else { "" },
                recurring_checked = if t.is_recurring { " checked" } else { "" },
                asset = t.asset_id.unwrap_or(0),
                toggle = render::post_button(
                    &format!("/manage/task/{}/toggle", t.id),
                    if t.is_done() { "Reopen" } else { "Done" },
                    None
                ),
                delete = render::post_button(&format!("/manage/task/{}/delete", t.id), "Delete", None)
            )
        })
        .collect();

    let filters: String = EventKind::ALL
        .iter()
        .map(|k| {
            let checked = if kinds.contains(k) { " checked" } else { "" };
            format!(
                r#"<label><input type="checkbox" name="types" value="{}"{}> {}</label>"#,
                k.code(),
                checked,
                k.label()
            )
        })
        .collect();

    let content = format!(
        r#"<h1>Planning</h1>
<div class="columns">
<section class="card"><h2>Milestones</h2><ul>{milestones}</ul>{add_milestone}</section>
<section class="card"><h2>Tasks</h2><ul>{tasks}</ul>{add_task}</section>
</div>
<section class="card"><h2>Timeline</h2>
<form method="get" action="/planning" class="filters">{filters}<button type="submit">Filter</button></form>
{timeline}</section>"#,
        milestones = milestone_rows,
        add_milestone = render::inline_form(
            "/manage/milestone/new",
            r#"<input name="title" placeholder="Milestone" required><input type="date" name="date_event"><input name="description" placeholder="Description">"#,
            "Add milestone"
        ),
        tasks = task_rows,
        add_task = render::inline_form(
            "/manage/task/new",
            &format!(
                r#"<input name="title" placeholder="Task" required><input type="date" name="due_date"><select name="status">{}</select><select name="asset_id">{}</select><label><input type="checkbox" name="is_recurring" value="y"> Recurring</label>"#,
                status_options, asset_options
            ),
            "Add task"
        ),
        filters = filters,
        timeline = render::timeline_list(&events),
    );

    Ok(session::page(&flash, render::layout("Planning", Nav::Planning, flash.get(), &content)))
}

// ============================================================================
// CONTACTS & FAQ
// ============================================================================

/// GET /details
pub async fn details_view(State(state): State<AppState>, flash: IncomingFlash) -> WebResult<Response> {
    let people = {
        let conn = state.conn()?;
        list_people(&conn)?
            .into_iter()
            .map(|p| {
                let owned = list_assets_owned_by(&conn, p.id)?;
                Ok((p, owned))
            })
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    let rows: String = people
        .iter()
        .map(|(p, owned)| {
            let owns = if owned.is_empty() {
                "-".to_string()
            } else {
                owned
                    .iter()
                    .map(|a| format!(r#"<a href="/asset/{}">{}</a>"#, a.id, e(&a.name)))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!(
                r#"<tr><td>{name}</td><td>{role}</td><td>{email}</td><td>{phone}</td><td>{owns}</td><td><a href="/manage/person/edit/{id}">Edit</a> {delete}</td></tr>"#,
                id = p.id,
                name = e(&p.name),
                role = e(p.role_label()),
                email = text_value(&p.email),
                phone = text_value(&p.phone),
                owns = owns,
                delete = render::post_button(
                    &format!("/manage/person/delete/{}", p.id),
                    "Delete",
                    Some("Delete this contact?")
                )
            )
        })
        .collect();

    let content = format!(
        r#"<h1>Contacts</h1>
<p><a class="button" href="/manage/person/new">+ Add contact</a></p>
<table class="listing"><thead><tr><th>Name</th><th>Role</th><th>Email</th><th>Phone</th><th>Owns</th><th></th></tr></thead><tbody>{}</tbody></table>"#,
        rows
    );

    Ok(session::page(&flash, render::layout("Contacts", Nav::Details, flash.get(), &content)))
}

const FAQ: &str = r#"<h1>Frequently Asked Questions</h1>
<section class="card">
<h2>How is an item's current value decided?</h2>
<p>Every item keeps a dated valuation history. The current value is always the most recent valuation; when two share a date, the one entered last wins. Editing or deleting a valuation recalculates the value immediately.</p>
<h2>What makes something a liability?</h2>
<p>A negative value. Loans and mortgages are entered with their outstanding balance and stored as negative amounts, so they reduce net worth.</p>
<h2>What does a "Purchase" valuation do?</h2>
<p>A valuation whose source is exactly <code>Purchase</code> becomes the item's purchase record: its date and amount are shown as the purchase date and price.</p>
<h2>What does "Held in trust" mean?</h2>
<p>It marks items titled to the trust. The overview counts them so you can see what still needs to be moved in.</p>
<h2>How do I keep a backup?</h2>
<p>Settings → Download Backup gives a ZIP with all data as JSON plus a read-me page that opens in any browser. Uploading that ZIP (or the JSON inside it) restores everything.</p>
</section>"#;

/// GET /faq
pub async fn faq_view(flash: IncomingFlash) -> Response {
    session::page(&flash, render::layout("FAQ", Nav::Faq, flash.get(), FAQ))
}
