// Estate Tracker - command line
//
//   estate init                 create the database and schema
//   estate seed                 replace everything with the sample estate
//   estate backup <out.zip>     write a backup archive
//   estate restore <file>       restore from a .zip or .json backup
//   estate summary              print net worth totals
//   estate reconcile            re-derive every asset value from its history

use anyhow::{bail, Context, Result};
use estate_tracker::backup::{export_zip, restore_file};
use estate_tracker::config::{database_path_from_env, ensure_parent_dir};
use estate_tracker::db::{count_rows, open_database, TABLES};
use estate_tracker::logging::init_logging;
use estate_tracker::reconciliation::ValuationEngine;
use estate_tracker::seed::seed_example;
use estate_tracker::summary::NetWorthSummary;
use estate_tracker::format::format_currency;
use rusqlite::Connection;
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    args.retain(|a| a != "-v" && a != "--verbose");
    init_logging(verbose);

    match args.first().map(String::as_str) {
        Some("init") => run_init(),
        Some("seed") => run_seed(),
        Some("backup") => run_backup(args.get(1)),
        Some("restore") => run_restore(args.get(1)),
        Some("summary") => run_summary(),
        Some("reconcile") => run_reconcile(),
        Some("help") | Some("--help") | Some("-h") | None => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            print_usage();
            bail!("Unknown command: {}", other)
        }
    }
}

fn print_usage() {
    println!("⚖️  Estate Tracker {}", estate_tracker::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Usage: estate [-v] <command>");
    println!();
    println!("  init               Create the database and schema");
    println!("  seed               Replace all data with the sample estate");
    println!("  backup <out.zip>   Write a backup archive");
    println!("  restore <file>     Restore from a .zip or .json backup");
    println!("  summary            Print net worth totals");
    println!("  reconcile          Re-derive every asset value from its history");
    println!();
    println!("DATABASE_URL (env or .env) selects the database file.");
}

fn open() -> Result<Connection> {
    let path = database_path_from_env();
    ensure_parent_dir(&path)?;
    open_database(&path)
}

fn run_init() -> Result<()> {
    println!("🔧 Setting up database...");
    let path = database_path_from_env();
    let conn = open()?;

    println!("✓ Database ready at {}", path.display());
    for table in TABLES.iter().rev() {
        println!("   {:<20} {} rows", table, count_rows(&conn, table)?);
    }
    Ok(())
}

fn run_seed() -> Result<()> {
    println!("🌱 Loading sample estate...");
    let conn = open()?;
    let today = chrono::Local::now().date_naive();
    let stats = seed_example(&conn, today)?;

    println!("✓ {}", stats.summary());
    println!("✓ {}", NetWorthSummary::load(&conn)?.summary());
    Ok(())
}

fn run_backup(out: Option<&String>) -> Result<()> {
    let out = match out {
        Some(out) => out,
        None => bail!("Usage: estate backup <out.zip>"),
    };

    println!("💾 Writing backup...");
    let conn = open()?;
    let bytes = export_zip(&conn, chrono::Local::now().naive_local())?;
    ensure_parent_dir(Path::new(out))?;
    std::fs::write(out, &bytes).with_context(|| format!("Failed to write {}", out))?;

    println!("✓ Backup written to {} ({} bytes)", out, bytes.len());
    Ok(())
}

fn run_restore(file: Option<&String>) -> Result<()> {
    let file = match file {
        Some(file) => file,
        None => bail!("Usage: estate restore <file.zip|file.json>"),
    };

    println!("📂 Restoring from {}...", file);
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file))?;
    let file_name = Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.clone());

    let conn = open()?;
    let stats = restore_file(&conn, &file_name, &bytes)?;
    println!("✅ {}", stats.summary());
    Ok(())
}

fn run_summary() -> Result<()> {
    let conn = open()?;
    let summary = NetWorthSummary::load(&conn)?;

    println!("📊 Estate Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Total assets:      {:>16}", format_currency(summary.total_assets));
    println!("Total liabilities: {:>16}", format_currency(summary.total_liabilities));
    println!("Net worth:         {:>16}", format_currency(summary.net_worth));
    println!("Held in trust:     {:>16}", summary.trust_count);
    println!();
    for breakdown in &summary.by_type {
        println!(
            "{} {:<24} {:>3}  {:>16}",
            breakdown.icon,
            breakdown.label,
            breakdown.count,
            format_currency(breakdown.total)
        );
    }
    Ok(())
}

fn run_reconcile() -> Result<()> {
    println!("⚖️  Reconciling asset values...");
    let conn = open()?;
    let changed = ValuationEngine::new().reconcile_all(&conn)?;

    for report in &changed {
        println!("   {}", report.summary());
    }
    println!("✓ {} asset value(s) corrected", changed.len());
    Ok(())
}
