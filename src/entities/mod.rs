// Entity Models
//
// One module per stored record kind. Every entity:
// - has a SQLite row id (0 until inserted; a non-zero id is kept on insert so
//   restores reproduce the backup exactly)
// - serializes to the backup JSON row format
// - exposes plain insert/get/list/update/delete functions over a &Connection

pub mod appraisal;
pub mod asset;
pub mod person;
pub mod planning;
pub mod property;

pub use appraisal::{Appraisal, INITIAL_ENTRY_SOURCE, MANUAL_UPDATE_SOURCE, PURCHASE_SOURCE};
pub use asset::{Asset, AssetType, Beneficiary, ATTR_PURCHASE_DATE, ATTR_PURCHASE_PRICE};
pub use person::{Person, KNOWN_ROLES};
pub use planning::{Milestone, Task, TASK_STATUSES};
pub use property::{AssetVendor, LocationPoint, PropertyStructure, RecurringBill, BILL_FREQUENCIES};
