// Estate Tracker - Core Library
// Exposes all modules for use in the CLI, the web server, and tests

pub mod db;
pub mod format;
pub mod entities;       // Entity Models - people, assets, valuations, planning, property
pub mod attributes;     // Semantic Layer - per-type attribute registry
pub mod schema;         // Shape Layer - form validation
pub mod reconciliation; // Valuation Engine - history → current value
pub mod chart;          // Net-worth chart data
pub mod timeline;       // Unified estate timeline
pub mod summary;        // Net-worth totals
pub mod backup;         // ZIP/JSON export & restore
pub mod seed;           // Sample estate
pub mod auth;
pub mod config;
pub mod logging;

#[cfg(feature = "server")]
pub mod web;

// Re-export commonly used types
pub use db::{clear_all, open_database, open_in_memory, setup_database, Attributes};
pub use entities::{
    Appraisal, Asset, AssetType, AssetVendor, Beneficiary, LocationPoint, Milestone, Person,
    PropertyStructure, RecurringBill, Task,
};
pub use attributes::{AttributeDefinition, AttributeRegistry, AttributeType, ValidationRule};
pub use schema::{FormData, SchemaValidator, ValidationError, ValidationResult};
pub use reconciliation::{PurchaseSync, ValuationEngine, ValuationReport, ValuationResult};
pub use chart::{ChartData, Dataset, Series};
pub use timeline::{EventKind, TimelineEvent};
pub use summary::NetWorthSummary;
pub use backup::{BackupData, RestoreError, RestoreStats};
pub use config::AppConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
