// 📐 Shape Layer - Form Validation
// Turns submitted form fields into validated drafts, or a list of inline errors

use crate::attributes::{AttributeDefinition, AttributeRegistry, AttributeType, ValidationRule};
use crate::db::Attributes;
use crate::entities::asset::{Asset, AssetType, ATTR_PURCHASE_DATE, ATTR_PURCHASE_PRICE};
use crate::entities::person::Person;
use crate::entities::planning::{Milestone, Task, TASK_STATUSES};
use crate::entities::property::{AssetVendor, LocationPoint, PropertyStructure, RecurringBill};
use crate::entities::{Appraisal, Beneficiary};
use crate::format::{format_date, DATE_FORMAT};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;

/// Raw submitted form (field name → text)
pub type FormData = HashMap<String, String>;

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 150;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    /// Which form produced the error ("Asset", "Appraisal", ...)
    pub context: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T = ()> = Result<T, Vec<ValidationError>>;

/// Errors for one field (inline rendering)
pub fn errors_for<'a>(errors: &'a [ValidationError], field: &str) -> Vec<&'a str> {
    errors
        .iter()
        .filter(|e| e.field == field)
        .map(|e| e.message.as_str())
        .collect()
}

// ============================================================================
// FIELD READER
// ============================================================================

/// Reads typed fields out of a form, collecting every error instead of
/// stopping at the first one
struct FormReader<'a> {
    form: &'a FormData,
    context: &'static str,
    errors: Vec<ValidationError>,
}

impl<'a> FormReader<'a> {
    fn new(form: &'a FormData, context: &'static str) -> Self {
        FormReader {
            form,
            context,
            errors: Vec::new(),
        }
    }

    fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.into(),
            context: self.context.to_string(),
        });
    }

    /// Trimmed text; blank counts as absent
    fn text(&self, field: &str) -> Option<String> {
        self.form
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn required(&mut self, field: &str) -> String {
        match self.text(field) {
            Some(v) => v,
            None => {
                self.error(field, "This field is required.");
                String::new()
            }
        }
    }

    fn date(&mut self, field: &str) -> Option<NaiveDate> {
        let raw = self.text(field)?;
        match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
            Ok(d) => Some(d),
            Err(_) => {
                self.error(field, "Not a valid date (YYYY-MM-DD).");
                None
            }
        }
    }

    fn required_date(&mut self, field: &str) -> Option<NaiveDate> {
        if self.text(field).is_none() {
            self.error(field, "This field is required.");
            return None;
        }
        self.date(field)
    }

    fn number(&mut self, field: &str, min: f64, max: f64) -> Option<f64> {
        let raw = self.text(field)?;
        match parse_number(&raw) {
            Some(n) if n < min || n > max => {
                self.error(field, format!("Number must be between {} and {}.", min, max));
                None
            }
            Some(n) => Some(n),
            None => {
                self.error(field, "Not a valid number.");
                None
            }
        }
    }

    fn required_number(&mut self, field: &str, min: f64, max: f64) -> Option<f64> {
        if self.text(field).is_none() {
            self.error(field, "This field is required.");
            return None;
        }
        self.number(field, min, max)
    }

    /// Row reference; empty or "0" means none
    fn reference(&mut self, field: &str) -> Option<i64> {
        let raw = self.text(field)?;
        match raw.parse::<i64>() {
            Ok(0) => None,
            Ok(id) if id > 0 => Some(id),
            _ => {
                self.error(field, "Not a valid choice.");
                None
            }
        }
    }

    /// HTML checkboxes are only submitted when ticked
    fn checkbox(&self, field: &str) -> bool {
        matches!(
            self.text(field).as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("on" | "true" | "y" | "yes" | "1")
        )
    }

    fn finish<T>(self, value: T) -> ValidationResult<T> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

/// Parse a number, tolerating "$" and thousands separators
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

// ============================================================================
// ASSET FORM
// ============================================================================

/// A validated asset form, ready to apply to a new or existing asset
#[derive(Debug, Clone, PartialEq)]
pub struct AssetDraft {
    pub name: String,
    pub is_in_trust: bool,
    pub owner_id: Option<i64>,
    /// Signed value (liabilities already negated)
    pub value_estimated: f64,
    /// Type attributes that were filled in
    pub set_attributes: Attributes,
    /// Type attributes that were left empty
    pub cleared_attributes: Vec<String>,
}

impl AssetDraft {
    /// Build a fresh asset of `asset_type`
    pub fn into_asset(self, asset_type: AssetType) -> Asset {
        let mut asset = Asset::new(self.name.clone(), asset_type, 0.0);
        self.apply_to(&mut asset);
        asset
    }

    /// Overwrite the core columns and merge the attribute changes;
    /// attributes the form does not know about are kept
    pub fn apply_to(&self, asset: &mut Asset) {
        asset.name = self.name.clone();
        asset.is_in_trust = self.is_in_trust;
        asset.owner_id = self.owner_id;
        asset.value_estimated = self.value_estimated;

        for key in &self.cleared_attributes {
            asset.attributes.remove(key);
        }
        for (key, value) in &self.set_attributes {
            asset.attributes.insert(key.clone(), value.clone());
        }
    }

    /// Purchase date and price supplied on the form (price defaults to 0)
    pub fn purchase(&self) -> Option<(NaiveDate, f64)> {
        let date = self
            .set_attributes
            .get(ATTR_PURCHASE_DATE)?
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())?;
        let price = self
            .set_attributes
            .get(ATTR_PURCHASE_PRICE)
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        Some((date, price))
    }
}

pub struct SchemaValidator {
    registry: AttributeRegistry,
}

impl SchemaValidator {
    pub fn for_type(asset_type: AssetType) -> Self {
        SchemaValidator {
            registry: AttributeRegistry::for_type(asset_type),
        }
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    /// Validate the core fields plus every field the type's registry declares
    pub fn validate_asset(&self, form: &FormData) -> ValidationResult<AssetDraft> {
        let mut reader = FormReader::new(form, "Asset");

        let name = reader.required("name");
        let name_len = name.chars().count();
        if !name.is_empty() && !(NAME_MIN..=NAME_MAX).contains(&name_len) {
            reader.error(
                "name",
                format!("Name must be between {} and {} characters", NAME_MIN, NAME_MAX),
            );
        }

        let is_in_trust = reader.checkbox("is_in_trust");
        let owner_id = reader.reference("owner_id");

        let value_field = self.registry.value_field();
        let raw_value = self.check_field(&mut reader, value_field).and_then(|v| v.as_f64());
        let value_estimated = raw_value.unwrap_or(0.0) * self.registry.value_sign();

        let mut set_attributes = Attributes::new();
        let mut cleared_attributes = Vec::new();
        for field in self.registry.attribute_fields() {
            match self.check_field(&mut reader, field) {
                Some(value) => {
                    set_attributes.insert(field.name.clone(), value);
                }
                None => cleared_attributes.push(field.name.clone()),
            }
        }

        reader.finish(AssetDraft {
            name,
            is_in_trust,
            owner_id,
            // -0.0 would render as "-$0"
            value_estimated: if value_estimated == 0.0 { 0.0 } else { value_estimated },
            set_attributes,
            cleared_attributes,
        })
    }

    /// Apply a definition's rules; returns the typed JSON value when present and valid
    fn check_field(&self, reader: &mut FormReader, def: &AttributeDefinition) -> Option<Value> {
        let raw = match reader.text(&def.name) {
            Some(raw) => raw,
            None => {
                if def.is_required() {
                    reader.error(&def.name, "This field is required.");
                }
                return None;
            }
        };

        let mut value = match def.type_ {
            AttributeType::Money => match parse_number(&raw) {
                Some(n) => serde_json::json!(n),
                None => {
                    reader.error(&def.name, "Not a valid number.");
                    return None;
                }
            },
            _ => Value::String(raw.clone()),
        };

        for rule in &def.validation_rules {
            match rule {
                ValidationRule::Required => {}
                ValidationRule::Length { min, max } => {
                    let len = raw.chars().count();
                    if len < *min || len > *max {
                        reader.error(
                            &def.name,
                            format!("Field must be between {} and {} characters long.", min, max),
                        );
                        value = Value::Null;
                    }
                }
                ValidationRule::Range { min, max } => {
                    if let Some(n) = value.as_f64() {
                        if n < *min || n > *max {
                            reader.error(&def.name, format!("Number must be between {} and {}.", min, max));
                            value = Value::Null;
                        }
                    }
                }
                ValidationRule::DateFormat(_) => {
                    if NaiveDate::parse_from_str(&raw, DATE_FORMAT).is_err() {
                        reader.error(&def.name, "Not a valid date (YYYY-MM-DD).");
                        value = Value::Null;
                    }
                }
            }
        }

        if value.is_null() {
            None
        } else {
            Some(value)
        }
    }

    /// Current values of an asset as form text (edit page)
    pub fn prefill(&self, asset: &Asset) -> FormData {
        let mut form = FormData::new();
        form.insert("name".to_string(), asset.name.clone());
        if asset.is_in_trust {
            form.insert("is_in_trust".to_string(), "on".to_string());
        }
        form.insert(
            "owner_id".to_string(),
            asset.owner_id.unwrap_or(0).to_string(),
        );
        form.insert(
            self.registry.value_field().name.clone(),
            asset.value_estimated.abs().to_string(),
        );
        for field in self.registry.attribute_fields() {
            if let Some(text) = asset.attribute_text(&field.name) {
                form.insert(field.name.clone(), text);
            }
        }
        form
    }
}

// ============================================================================
// CONTACT FORM
// ============================================================================

/// Validated contact form; notes live in the person's attribute map
#[derive(Debug, Clone, PartialEq)]
pub struct PersonDraft {
    pub name: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl PersonDraft {
    pub fn apply_to(&self, person: &mut Person) {
        person.name = self.name.clone();
        person.role = self.role.clone();
        person.email = self.email.clone();
        person.phone = self.phone.clone();
        match &self.notes {
            Some(notes) => {
                person.attributes.insert("notes".to_string(), Value::String(notes.clone()));
            }
            None => {
                person.attributes.remove("notes");
            }
        }
    }

    pub fn into_person(self) -> Person {
        let mut person = Person::new(self.name.clone(), None);
        self.apply_to(&mut person);
        person
    }
}

pub fn validate_person_form(form: &FormData) -> ValidationResult<PersonDraft> {
    let mut reader = FormReader::new(form, "Contact");

    let name = reader.required("name");
    if !name.is_empty() && !(NAME_MIN..=NAME_MAX).contains(&name.chars().count()) {
        reader.error(
            "name",
            format!("Name must be between {} and {} characters", NAME_MIN, NAME_MAX),
        );
    }

    let email = reader.text("email");
    if let Some(email) = &email {
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            reader.error("email", "Invalid email address.");
        }
    }

    let draft = PersonDraft {
        name,
        role: reader.text("role"),
        email,
        phone: reader.text("phone"),
        notes: reader.text("notes"),
    };
    reader.finish(draft)
}

/// Prefill for the contact edit page
pub fn prefill_person(person: &Person) -> FormData {
    let mut form = FormData::new();
    form.insert("name".to_string(), person.name.clone());
    for (key, value) in [("role", &person.role), ("email", &person.email), ("phone", &person.phone)] {
        if let Some(v) = value {
            form.insert(key.to_string(), v.clone());
        }
    }
    if let Some(Value::String(notes)) = person.attributes.get("notes") {
        form.insert("notes".to_string(), notes.clone());
    }
    form
}

// ============================================================================
// SUB-RECORD FORMS
// ============================================================================

pub fn validate_appraisal_form(asset_id: i64, form: &FormData) -> ValidationResult<Appraisal> {
    let mut reader = FormReader::new(form, "Appraisal");
    let date = reader.required_date("date");
    let value = reader.required_number("value", -crate::attributes::MAX_ABS_VALUE, crate::attributes::MAX_ABS_VALUE);
    let source = reader.required("source");
    let notes = reader.text("notes");

    match (date, value) {
        (Some(date), Some(value)) => {
            let mut appraisal = Appraisal::new(asset_id, date, value, source);
            appraisal.notes = notes;
            reader.finish(appraisal)
        }
        _ => Err(reader.errors),
    }
}

pub fn validate_structure_form(asset_id: i64, form: &FormData) -> ValidationResult<PropertyStructure> {
    let mut reader = FormReader::new(form, "Structure");
    let mut structure = PropertyStructure::new(asset_id, reader.required("name"));
    structure.structure_type = reader.text("structure_type");
    structure.description = reader.text("description");
    structure.date_built = reader.date("date_built");
    structure.date_last_maintained = reader.date("date_last_maintained");
    structure.notes = reader.text("notes");
    reader.finish(structure)
}

pub fn validate_location_form(asset_id: i64, form: &FormData) -> ValidationResult<LocationPoint> {
    let mut reader = FormReader::new(form, "Location");
    let label = reader.required("label");
    let latitude = reader.required_number("latitude", -90.0, 90.0);
    let longitude = reader.required_number("longitude", -180.0, 180.0);
    let description = reader.text("description");

    match (latitude, longitude) {
        (Some(lat), Some(lng)) => {
            let mut point = LocationPoint::new(asset_id, label, lat, lng);
            point.description = description;
            reader.finish(point)
        }
        _ => Err(reader.errors),
    }
}

pub fn validate_bill_form(asset_id: i64, form: &FormData) -> ValidationResult<RecurringBill> {
    let mut reader = FormReader::new(form, "Bill");
    let mut bill = RecurringBill::new(asset_id, reader.required("name"));
    bill.payee = reader.text("payee");
    bill.amount_estimated = reader.number("amount_estimated", 0.0, crate::attributes::MAX_ABS_VALUE);
    bill.frequency = reader.text("frequency");
    bill.is_autopay = reader.checkbox("is_autopay");
    bill.next_due_date = reader.date("next_due_date");
    bill.notes = reader.text("notes");
    reader.finish(bill)
}

pub fn validate_vendor_form(asset_id: i64, form: &FormData) -> ValidationResult<AssetVendor> {
    let mut reader = FormReader::new(form, "Vendor");
    let person_id = reader.reference("person_id");
    if person_id.is_none() && reader.errors.iter().all(|e| e.field != "person_id") {
        reader.error("person_id", "This field is required.");
    }
    let role = reader.required("role");
    let notes = reader.text("notes");

    let mut vendor = AssetVendor::new(asset_id, person_id.unwrap_or(0), role);
    vendor.notes = notes;
    reader.finish(vendor)
}

pub fn validate_beneficiary_form(asset_id: i64, form: &FormData) -> ValidationResult<Beneficiary> {
    let mut reader = FormReader::new(form, "Beneficiary");
    let person_id = reader.reference("person_id");
    if person_id.is_none() && reader.errors.iter().all(|e| e.field != "person_id") {
        reader.error("person_id", "This field is required.");
    }
    let percentage = reader.number("percentage", 0.0, 100.0).unwrap_or(50.0);

    reader.finish(Beneficiary {
        asset_id,
        person_id: person_id.unwrap_or(0),
        percentage,
    })
}

pub fn validate_milestone_form(form: &FormData) -> ValidationResult<Milestone> {
    let mut reader = FormReader::new(form, "Milestone");
    let mut milestone = Milestone::new(reader.required("title"), None);
    milestone.date_event = reader.date("date_event");
    milestone.description = reader.text("description");
    milestone.is_completed = reader.checkbox("is_completed");
    reader.finish(milestone)
}

pub fn validate_task_form(form: &FormData) -> ValidationResult<Task> {
    let mut reader = FormReader::new(form, "Task");
    let mut task = Task::new(reader.required("title"), None);
    task.due_date = reader.date("due_date");
    task.is_recurring = reader.checkbox("is_recurring");
    task.asset_id = reader.reference("asset_id");

    if let Some(status) = reader.text("status") {
        if TASK_STATUSES.contains(&status.as_str()) {
            task.status = status;
        } else {
            reader.error("status", "Not a valid choice.");
        }
    }
    reader.finish(task)
}

/// Summarize errors for a flash message
pub fn flash_summary(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Optional date for a form field
pub fn date_field(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_default()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_vehicle_form_valid() {
        let validator = SchemaValidator::for_type(AssetType::Vehicle);
        let draft = validator
            .validate_asset(&form(&[
                ("name", "2020 Ford F-150"),
                ("is_in_trust", "y"),
                ("owner_id", "0"),
                ("current_value", "35,000"),
                ("vin", "1FTEW1E45LKD12345"),
                ("purchase_date", "2020-05-15"),
                ("purchase_price", "45000"),
                ("license_plate", ""),
            ]))
            .unwrap();

        assert_eq!(draft.value_estimated, 35000.0);
        assert!(draft.is_in_trust);
        assert_eq!(draft.owner_id, None);
        assert_eq!(draft.set_attributes["vin"], "1FTEW1E45LKD12345");
        assert!(draft.cleared_attributes.contains(&"license_plate".to_string()));
        assert_eq!(
            draft.purchase(),
            Some((NaiveDate::from_ymd_opt(2020, 5, 15).unwrap(), 45000.0))
        );
    }

    #[test]
    fn test_liability_value_is_negated() {
        let validator = SchemaValidator::for_type(AssetType::Liability);
        let draft = validator
            .validate_asset(&form(&[
                ("name", "Mortgage"),
                ("outstanding_balance", "250000"),
                ("lender", "Wells Fargo"),
            ]))
            .unwrap();

        assert_eq!(draft.value_estimated, -250000.0);
        assert!(!draft.is_in_trust);
        assert!(draft.purchase().is_none());
    }

    #[test]
    fn test_asset_form_collects_all_errors() {
        let validator = SchemaValidator::for_type(AssetType::RealEstate);
        let errors = validator
            .validate_asset(&form(&[
                ("name", "X"),
                ("current_value", "200000000"),
                ("purchase_date", "05/15/2020"),
            ]))
            .unwrap_err();

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"current_value"));
        assert!(fields.contains(&"purchase_date"));
        assert!(fields.contains(&"address"), "address is required for real estate");
        assert_eq!(
            errors_for(&errors, "name"),
            vec!["Name must be between 2 and 150 characters"]
        );
    }

    #[test]
    fn test_empty_value_defaults_to_zero() {
        let validator = SchemaValidator::for_type(AssetType::Liability);
        let draft = validator
            .validate_asset(&form(&[("name", "Old Loan"), ("lender", "Bank")]))
            .unwrap();
        assert_eq!(draft.value_estimated, 0.0);
        assert!(draft.value_estimated.is_sign_positive());
    }

    #[test]
    fn test_apply_keeps_unknown_attributes() {
        let mut asset = Asset::new("Water", AssetType::Utility, 45.0);
        asset.attributes.insert("meter_id".to_string(), serde_json::json!("M-77"));
        asset.attributes.insert("autopay_status".to_string(), serde_json::json!("Yes"));

        let validator = SchemaValidator::for_type(AssetType::Utility);
        let draft = validator
            .validate_asset(&form(&[
                ("name", "Water Utility"),
                ("current_value", "50"),
                ("provider", "City Utilities"),
            ]))
            .unwrap();
        draft.apply_to(&mut asset);

        assert_eq!(asset.name, "Water Utility");
        assert_eq!(asset.attributes["meter_id"], "M-77");
        assert!(!asset.attributes.contains_key("autopay_status"));
        assert_eq!(asset.attributes["provider"], "City Utilities");
    }

    #[test]
    fn test_prefill_roundtrips_through_validation() {
        let validator = SchemaValidator::for_type(AssetType::Liability);
        let mut loan = Asset::new("Car Loan", AssetType::Liability, -13000.0);
        loan.attributes.insert("lender".to_string(), serde_json::json!("QuickCash Corp"));

        let prefilled = validator.prefill(&loan);
        assert_eq!(prefilled["outstanding_balance"], "13000");

        let draft = validator.validate_asset(&prefilled).unwrap();
        assert_eq!(draft.value_estimated, -13000.0);
        assert!(draft.is_in_trust);
    }

    #[test]
    fn test_person_form() {
        let draft = validate_person_form(&form(&[
            ("name", "Jane Doe"),
            ("role", "Trustor"),
            ("email", "jane@example.com"),
            ("notes", "The Grantor"),
        ]))
        .unwrap();
        let person = draft.into_person();
        assert_eq!(person.role.as_deref(), Some("Trustor"));
        assert_eq!(person.attributes["notes"], "The Grantor");

        let errors = validate_person_form(&form(&[("name", ""), ("email", "nope")])).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_appraisal_form() {
        let appraisal = validate_appraisal_form(
            7,
            &form(&[("date", "2022-05-15"), ("value", "38000"), ("source", "KBB")]),
        )
        .unwrap();
        assert_eq!(appraisal.asset_id, 7);
        assert_eq!(appraisal.value, 38000.0);
        assert_eq!(appraisal.notes, None);

        let errors = validate_appraisal_form(7, &form(&[("value", "abc")])).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["date", "value", "source"]);
    }

    #[test]
    fn test_location_bounds() {
        assert!(validate_location_form(
            1,
            &form(&[("label", "Gate"), ("latitude", "30.2"), ("longitude", "-97.7")])
        )
        .is_ok());

        let errors = validate_location_form(
            1,
            &form(&[("label", "Gate"), ("latitude", "91"), ("longitude", "-181")]),
        )
        .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_bill_and_structure_forms() {
        let bill = validate_bill_form(
            3,
            &form(&[
                ("name", "Water"),
                ("amount_estimated", "$45.00"),
                ("is_autopay", "on"),
                ("next_due_date", "2025-02-01"),
            ]),
        )
        .unwrap();
        assert_eq!(bill.amount_estimated, Some(45.0));
        assert!(bill.is_autopay);

        let errors = validate_structure_form(3, &form(&[("name", "Barn"), ("date_built", "1990")])).unwrap_err();
        assert_eq!(errors[0].field, "date_built");
    }

    #[test]
    fn test_vendor_and_beneficiary_forms() {
        let vendor = validate_vendor_form(2, &form(&[("person_id", "5"), ("role", "Plumber")])).unwrap();
        assert_eq!(vendor.person_id, 5);

        let errors = validate_vendor_form(2, &form(&[("person_id", "0"), ("role", "")])).unwrap_err();
        assert_eq!(errors.len(), 2);

        let share = validate_beneficiary_form(2, &form(&[("person_id", "5")])).unwrap();
        assert_eq!(share.percentage, 50.0);
        assert!(validate_beneficiary_form(2, &form(&[("person_id", "5"), ("percentage", "150")])).is_err());
    }

    #[test]
    fn test_planning_forms() {
        let milestone = validate_milestone_form(&form(&[("title", "Retirement"), ("date_event", "2035-01-01")])).unwrap();
        assert_eq!(milestone.date_event, NaiveDate::from_ymd_opt(2035, 1, 1));

        let task = validate_task_form(&form(&[("title", "Renew insurance"), ("asset_id", "0")])).unwrap();
        assert_eq!(task.status, "Pending");
        assert_eq!(task.asset_id, None);

        assert!(validate_task_form(&form(&[("title", "X"), ("status", "Someday")])).is_err());
    }
}
