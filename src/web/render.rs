// 🖼️ HTML rendering - layout, form widgets, tables and the SVG chart
//
// Pages are assembled with format!; every piece of user data goes through
// escape_html (the `e` helper) before it lands in markup.

use super::session::{Flash, FlashLevel};
use crate::attributes::{AttributeDefinition, AttributeType};
use crate::chart::ChartData;
use crate::format::{escape_html, format_currency, format_date};
use crate::schema::{errors_for, FormData, ValidationError};
use crate::timeline::TimelineEvent;
use axum::http::StatusCode;

/// Short alias for escaping
pub fn e(text: &str) -> String {
    escape_html(text)
}

// ============================================================================
// LAYOUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Overview,
    Assets,
    Liabilities,
    Planning,
    Details,
    Faq,
    Settings,
    None,
}

const NAV_ITEMS: [(Nav, &str, &str); 7] = [
    (Nav::Overview, "/", "Overview"),
    (Nav::Assets, "/assets", "Assets"),
    (Nav::Liabilities, "/liabilities", "Liabilities"),
    (Nav::Planning, "/planning", "Planning"),
    (Nav::Details, "/details", "Contacts"),
    (Nav::Faq, "/faq", "FAQ"),
    (Nav::Settings, "/settings", "Settings"),
];

fn flash_html(flash: Option<&Flash>) -> String {
    match flash {
        Some(flash) => {
            let class = match flash.level {
                FlashLevel::Success => "flash flash-success",
                FlashLevel::Error => "flash flash-error",
                FlashLevel::Info => "flash flash-info",
            };
            format!(r#"<div class="{}">{}</div>"#, class, e(&flash.message))
        }
        None => String::new(),
    }
}

fn document(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Estate Tracker</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
{body}
</body>
</html>"#,
        title = e(title),
        body = body
    )
}

/// Full page with navigation
pub fn layout(title: &str, active: Nav, flash: Option<&Flash>, content: &str) -> String {
    let nav: String = NAV_ITEMS
        .iter()
        .map(|(item, href, label)| {
            let class = if *item == active { r#" class="active""# } else { "" };
            format!(r#"<a href="{}"{}>{}</a>"#, href, class, label)
        })
        .collect();

    document(
        title,
        &format!(
            r#"<nav class="topnav"><span class="brand">⚖️ Estate Tracker</span>{nav}<a href="/logout" class="logout">Log out</a></nav>
<main>
{flash}
{content}
</main>"#,
            nav = nav,
            flash = flash_html(flash),
            content = content
        ),
    )
}

pub fn login_page(flash: Option<&Flash>) -> String {
    document(
        "Log in",
        &format!(
            r#"<main class="login">
<h1>⚖️ Estate Tracker</h1>
{flash}
<form method="post" action="/login">
<label for="password">Password</label>
<input type="password" id="password" name="password" required autofocus>
<button type="submit">Log in</button>
</form>
</main>"#,
            flash = flash_html(flash)
        ),
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    document(
        status.canonical_reason().unwrap_or("Error"),
        &format!(
            r#"<main class="error-page">
<h1>{code}</h1>
<p>{message}</p>
<p><a href="/">Back to overview</a></p>
</main>"#,
            code = status.as_u16(),
            message = e(message)
        ),
    )
}

// ============================================================================
// FORM WIDGETS
// ============================================================================

fn errors_html(messages: &[&str]) -> String {
    messages
        .iter()
        .map(|m| format!(r#"<span class="field-error">{}</span>"#, e(m)))
        .collect()
}

/// Labelled input with its inline errors
pub fn input(name: &str, label: &str, input_type: &str, form: &FormData, errors: &[ValidationError]) -> String {
    let value = form.get(name).map(String::as_str).unwrap_or("");
    let widget = match input_type {
        "textarea" => format!(r#"<textarea id="{n}" name="{n}">{v}</textarea>"#, n = name, v = e(value)),
        "number" => format!(
            r#"<input type="number" step="any" id="{n}" name="{n}" value="{v}">"#,
            n = name,
            v = e(value)
        ),
        other => format!(
            r#"<input type="{t}" id="{n}" name="{n}" value="{v}">"#,
            t = other,
            n = name,
            v = e(value)
        ),
    };
    format!(
        r#"<div class="field"><label for="{n}">{l}</label>{w}{errs}</div>"#,
        n = name,
        l = e(label),
        w = widget,
        errs = errors_html(&errors_for(errors, name))
    )
}

pub fn checkbox(name: &str, label: &str, form: &FormData) -> String {
    let checked = if form.contains_key(name) { " checked" } else { "" };
    format!(
        r#"<div class="field checkbox"><label><input type="checkbox" name="{n}" value="y"{c}> {l}</label></div>"#,
        n = name,
        c = checked,
        l = e(label)
    )
}

/// `<select>`; options are (value, label)
pub fn select(name: &str, label: &str, options: &[(String, String)], form: &FormData, errors: &[ValidationError]) -> String {
    let current = form.get(name).map(String::as_str).unwrap_or("");
    let opts: String = options
        .iter()
        .map(|(value, text)| {
            let selected = if value == current { " selected" } else { "" };
            format!(r#"<option value="{}"{}>{}</option>"#, e(value), selected, e(text))
        })
        .collect();
    format!(
        r#"<div class="field"><label for="{n}">{l}</label><select id="{n}" name="{n}">{o}</select>{errs}</div>"#,
        n = name,
        l = e(label),
        o = opts,
        errs = errors_html(&errors_for(errors, name))
    )
}

/// Form field for a registry attribute definition
pub fn attribute_input(def: &AttributeDefinition, form: &FormData, errors: &[ValidationError]) -> String {
    let mut html = input(&def.name, &def.label, def.type_.input_type(), form, errors);
    if def.type_ == AttributeType::Money || !def.description.is_empty() {
        let help = if def.description.is_empty() {
            "Dollar amount".to_string()
        } else {
            def.description.clone()
        };
        html = html.replacen("</div>", &format!(r#"<small>{}</small></div>"#, e(&help)), 1);
    }
    html
}

/// Compact one-line form for inline sub-item creation
pub fn inline_form(action: &str, fields: &str, button: &str) -> String {
    format!(
        r#"<form method="post" action="{a}" class="inline-form">{f}<button type="submit">{b}</button></form>"#,
        a = action,
        f = fields,
        b = e(button)
    )
}

/// POST button (deletes, toggles)
pub fn post_button(action: &str, label: &str, confirm: Option<&str>) -> String {
    let onsubmit = confirm
        .map(|msg| format!(r#" onsubmit="return confirm('{}')""#, e(msg)))
        .unwrap_or_default();
    format!(
        r#"<form method="post" action="{a}" class="button-form"{o}><button type="submit">{l}</button></form>"#,
        a = action,
        o = onsubmit,
        l = e(label)
    )
}

// ============================================================================
// DATA DISPLAY
// ============================================================================

pub fn money_class(value: f64) -> &'static str {
    if value < 0.0 {
        "money negative"
    } else {
        "money"
    }
}

pub fn money(value: f64) -> String {
    format!(r#"<span class="{}">{}</span>"#, money_class(value), format_currency(value))
}

pub fn stat_card(label: &str, value: &str) -> String {
    format!(
        r#"<div class="card stat"><div class="stat-label">{}</div><div class="stat-value">{}</div></div>"#,
        e(label),
        value
    )
}

pub fn timeline_list(events: &[TimelineEvent]) -> String {
    if events.is_empty() {
        return r#"<p class="empty">Nothing scheduled.</p>"#.to_string();
    }
    let items: String = events
        .iter()
        .map(|event| {
            let title = match &event.link {
                Some(link) => format!(r#"<a href="{}">{}</a>"#, e(link), e(&event.title)),
                None => e(&event.title),
            };
            format!(
                r#"<li class="event event-{kind}{past}"><span class="event-date">{date}</span> <span class="badge">{icon} {label}</span> {title}<div class="event-desc">{desc}</div></li>"#,
                kind = event.kind.code(),
                past = if event.is_past { " past" } else { "" },
                date = format_date(event.date),
                icon = event.icon,
                label = e(&event.type_label),
                title = title,
                desc = e(&event.description)
            )
        })
        .collect();
    format!(r#"<ul class="timeline">{}</ul>"#, items)
}

// ============================================================================
// CHART
// ============================================================================

const CHART_COLORS: [&str; 8] = [
    "#4e79a7", "#f28e2b", "#59a14f", "#e15759", "#76b7b2", "#edc948", "#b07aa1", "#9c755f",
];

/// Inline SVG line chart: one polyline per dataset, the total drawn thicker.
/// X is proportional to time, Y spans min(0, lowest)..max(0, highest).
pub fn chart_svg(chart: &ChartData, width: u32, height: u32) -> String {
    if chart.is_empty() {
        return r#"<p class="empty">No valuation history yet.</p>"#.to_string();
    }

    let pad = 40.0;
    let (w, h) = (width as f64, height as f64);
    let first = chart.labels[0];
    let span = (chart.labels[chart.labels.len() - 1] - first).num_days().max(1) as f64;

    let all_values = chart
        .datasets
        .iter()
        .chain(chart.total.iter())
        .flat_map(|d| d.values.iter().copied());
    let (lo, hi) = all_values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let range = if hi - lo > 0.0 { hi - lo } else { 1.0 };

    let x = |i: usize| {
        if chart.labels.len() == 1 {
            w / 2.0
        } else {
            pad + (chart.labels[i] - first).num_days() as f64 / span * (w - 2.0 * pad)
        }
    };
    let y = |v: f64| h - pad - (v - lo) / range * (h - 2.0 * pad);

    let line = |values: &[f64], color: &str, stroke: f64, label: &str| {
        let points: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:.1},{:.1}", x(i), y(*v)))
            .collect();
        format!(
            r#"<polyline fill="none" stroke="{}" stroke-width="{}" points="{}"><title>{}</title></polyline>"#,
            color,
            stroke,
            points.join(" "),
            e(label)
        )
    };

    let mut lines: String = chart
        .datasets
        .iter()
        .enumerate()
        .map(|(i, d)| line(&d.values, CHART_COLORS[i % CHART_COLORS.len()], 1.5, &d.label))
        .collect();
    if let Some(total) = &chart.total {
        lines.push_str(&line(&total.values, "#222", 3.0, &total.label));
    }

    let legend: String = chart
        .datasets
        .iter()
        .enumerate()
        .map(|(i, d)| {
            format!(
                r#"<span class="legend-item"><span class="swatch" style="background:{}"></span>{}</span>"#,
                CHART_COLORS[i % CHART_COLORS.len()],
                e(&d.label)
            )
        })
        .collect();

    format!(
        r##"<figure class="chart">
<svg viewBox="0 0 {w} {h}" width="100%" role="img">
<line x1="{pad}" y1="{zero:.1}" x2="{xend}" y2="{zero:.1}" stroke="#ccc"/>
{lines}
<text x="{pad}" y="{bottom}" font-size="11">{start}</text>
<text x="{xend}" y="{bottom}" font-size="11" text-anchor="end">{end}</text>
<text x="4" y="{top}" font-size="11">{hi}</text>
<text x="4" y="{low}" font-size="11">{lo}</text>
</svg>
<figcaption>{legend}</figcaption>
</figure>"##,
        w = width,
        h = height,
        pad = pad,
        zero = y(0.0),
        xend = w - pad,
        lines = lines,
        bottom = h - pad + 16.0,
        start = format_date(first),
        end = format_date(chart.labels[chart.labels.len() - 1]),
        top = pad - 6.0,
        hi = format_currency(hi),
        low = h - pad - 4.0,
        lo = format_currency(lo),
        legend = legend
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{build_chart, Series};
    use chrono::NaiveDate;

    #[test]
    fn test_layout_escapes_flash_and_marks_nav() {
        let html = layout("Assets", Nav::Assets, Some(&Flash::success("Created <House>")), "<p>x</p>");
        assert!(html.contains("Created &lt;House&gt;"));
        assert!(html.contains(r#"<a href="/assets" class="active">Assets</a>"#));
        assert!(html.contains("<p>x</p>"));
    }

    #[test]
    fn test_input_shows_value_and_errors() {
        let mut form = FormData::new();
        form.insert("name".to_string(), "A \"quoted\" name".to_string());
        let errors = vec![ValidationError {
            field: "name".to_string(),
            message: "Too short".to_string(),
            context: "Asset".to_string(),
        }];
        let html = input("name", "Name", "text", &form, &errors);
        assert!(html.contains("A &quot;quoted&quot; name"));
        assert!(html.contains("Too short"));
    }

    #[test]
    fn test_select_marks_current_option() {
        let mut form = FormData::new();
        form.insert("owner_id".to_string(), "2".to_string());
        let options = vec![("0".to_string(), "Trust".to_string()), ("2".to_string(), "Jane".to_string())];
        let html = select("owner_id", "Owner", &options, &form, &[]);
        assert!(html.contains(r#"<option value="2" selected>Jane</option>"#));
        assert!(html.contains(r#"<option value="0">Trust</option>"#));
    }

    #[test]
    fn test_chart_svg() {
        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let chart = build_chart(
            &[
                Series::new("House", vec![(day(2010, 1, 1), 400000.0), (day(2020, 1, 1), 550000.0)]),
                Series::new("Mortgage", vec![(day(2010, 1, 1), -380000.0)]),
            ],
            true,
        );
        let svg = chart_svg(&chart, 600, 240);
        assert_eq!(svg.matches("<polyline").count(), 3);
        assert!(svg.contains("2010-01-01"));
        assert!(svg.contains("-$380,000"));

        let empty = chart_svg(&build_chart(&[], true), 600, 240);
        assert!(empty.contains("No valuation history"));
    }
}
