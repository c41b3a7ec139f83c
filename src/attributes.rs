// 🏛️ Semantic Layer - Asset Attribute Registry
// Each asset type declares which attributes its form collects and how they are validated

use crate::entities::asset::{AssetType, ATTR_PURCHASE_DATE, ATTR_PURCHASE_PRICE};
use serde::{Deserialize, Serialize};

/// Form field holding the value of every non-liability asset
pub const CURRENT_VALUE_FIELD: &str = "current_value";

/// Form field holding the (positive) balance of a liability; stored negated
pub const OUTSTANDING_BALANCE_FIELD: &str = "outstanding_balance";

/// Values outside ±100M are rejected as typos
pub const MAX_ABS_VALUE: f64 = 100_000_000.0;

// ============================================================================
// ATTRIBUTE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    /// Single-line text
    Text,
    /// Multi-line text (textarea)
    LongText,
    /// Dollar amount, stored as a JSON number
    Money,
    /// `YYYY-MM-DD`, stored as a string
    Date,
    /// Free-form rate like "3.5%"
    PercentText,
}

impl AttributeType {
    /// HTML input type for the form renderer
    pub fn input_type(&self) -> &'static str {
        match self {
            AttributeType::Text | AttributeType::PercentText => "text",
            AttributeType::LongText => "textarea",
            AttributeType::Money => "number",
            AttributeType::Date => "date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationRule {
    Required,
    Length { min: usize, max: usize },
    Range { min: f64, max: f64 },
    DateFormat(String),
}

// ============================================================================
// ATTRIBUTE DEFINITION
// ============================================================================

/// One form field / attribute key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Unique ID (e.g., "attr:vin")
    pub id: String,

    /// Attribute key and form field name (e.g., "vin")
    pub name: String,

    /// Form label (e.g., "VIN")
    pub label: String,

    pub type_: AttributeType,

    /// Help text under the field
    pub description: String,

    pub validation_rules: Vec<ValidationRule>,

    /// Placeholder values
    pub examples: Vec<String>,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, label: impl Into<String>, type_: AttributeType) -> Self {
        let name = name.into();
        let mut validation_rules = Vec::new();
        match type_ {
            AttributeType::Money => validation_rules.push(ValidationRule::Range {
                min: -MAX_ABS_VALUE,
                max: MAX_ABS_VALUE,
            }),
            AttributeType::Date => {
                validation_rules.push(ValidationRule::DateFormat("YYYY-MM-DD".to_string()))
            }
            _ => {}
        }

        AttributeDefinition {
            id: format!("attr:{}", name),
            name,
            label: label.into(),
            type_,
            description: String::new(),
            validation_rules,
            examples: Vec::new(),
        }
    }

    /// Builder: add description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: add validation rule
    pub fn with_validation(mut self, rule: ValidationRule) -> Self {
        self.validation_rules.push(rule);
        self
    }

    /// Builder: add example
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.validation_rules.contains(&ValidationRule::Required)
    }
}

// ============================================================================
// ATTRIBUTE REGISTRY
// ============================================================================

/// Field catalog for one asset type, in form order
///
/// The first field is always the value field (`current_value`, or
/// `outstanding_balance` for liabilities); the rest are stored in the asset's
/// attribute map under their `name`.
pub struct AttributeRegistry {
    asset_type: AssetType,
    attributes: Vec<AttributeDefinition>,
}

impl AttributeRegistry {
    /// Registry with the standard fields of `asset_type`
    pub fn for_type(asset_type: AssetType) -> Self {
        let mut registry = AttributeRegistry {
            asset_type,
            attributes: Vec::new(),
        };

        registry.register_value_field();
        registry.register_type_attributes();
        registry
    }

    fn register_value_field(&mut self) {
        let field = if self.asset_type == AssetType::Liability {
            AttributeDefinition::new(OUTSTANDING_BALANCE_FIELD, "Outstanding Balance ($)", AttributeType::Money)
                .with_description("Amount still owed; recorded as a negative value")
                .with_example("250000")
        } else {
            AttributeDefinition::new(CURRENT_VALUE_FIELD, "Current Value ($)", AttributeType::Money)
                .with_description("Today's estimated market value")
        };
        self.register(field);
    }

    fn register_type_attributes(&mut self) {
        match self.asset_type {
            // ================================================================
            // REAL ESTATE
            // ================================================================
            AssetType::RealEstate => {
                self.register(
                    AttributeDefinition::new("address", "Address", AttributeType::Text)
                        .with_validation(ValidationRule::Required)
                        .with_validation(ValidationRule::Length { min: 1, max: 250 })
                        .with_example("123 Demo Lane, Metropolis"),
                );
                self.register_purchase_fields();
                self.register(
                    AttributeDefinition::new("parcel_number", "Parcel / APN", AttributeType::Text)
                        .with_description("County assessor parcel number"),
                );
                self.register(AttributeDefinition::new("notes", "Notes", AttributeType::LongText));
            }

            // ================================================================
            // FINANCIAL ACCOUNTS
            // ================================================================
            AssetType::Bank => {
                self.register(
                    AttributeDefinition::new("institution", "Institution", AttributeType::Text)
                        .with_validation(ValidationRule::Required)
                        .with_example("Chase"),
                );
                self.register(
                    AttributeDefinition::new("account_type", "Account Type", AttributeType::Text)
                        .with_example("Checking")
                        .with_example("Savings"),
                );
                self.register(
                    AttributeDefinition::new("account_number", "Account Number", AttributeType::Text)
                        .with_description("Last four digits are enough")
                        .with_example("XXXX-1111"),
                );
            }
            AssetType::Investment => {
                self.register(
                    AttributeDefinition::new("institution", "Institution", AttributeType::Text)
                        .with_validation(ValidationRule::Required)
                        .with_example("Vanguard"),
                );
                self.register(AttributeDefinition::new("account_number", "Account Number", AttributeType::Text));
                self.register(
                    AttributeDefinition::new("advisor_name", "Advisor", AttributeType::Text)
                        .with_example("Self-Directed"),
                );
            }

            // ================================================================
            // VEHICLES
            // ================================================================
            AssetType::Vehicle => {
                self.register(
                    AttributeDefinition::new("vin", "VIN", AttributeType::Text)
                        .with_validation(ValidationRule::Length { min: 0, max: 17 })
                        .with_example("1FTEW1E45LKD12345"),
                );
                self.register(
                    AttributeDefinition::new("license_plate", "License Plate", AttributeType::Text)
                        .with_example("TRK-999"),
                );
                self.register_purchase_fields();
            }

            // ================================================================
            // PERSONAL PROPERTY
            // ================================================================
            AssetType::Jewelry => {
                self.register(AttributeDefinition::new("description", "Description", AttributeType::LongText));
                self.register(
                    AttributeDefinition::new("location", "Stored At", AttributeType::Text)
                        .with_example("Master Safe"),
                );
                self.register(AttributeDefinition::new("appraisal_date", "Last Appraised", AttributeType::Date));
                self.register(
                    AttributeDefinition::new("appraiser_info", "Appraiser", AttributeType::Text)
                        .with_example("Local Jeweler"),
                );
            }
            AssetType::Art => {
                self.register(AttributeDefinition::new("description", "Description", AttributeType::LongText));
                self.register(
                    AttributeDefinition::new("location", "Location", AttributeType::Text)
                        .with_example("Living Room"),
                );
                self.register(AttributeDefinition::new("appraiser_info", "Appraiser", AttributeType::Text));
                self.register_purchase_fields();
            }

            // ================================================================
            // DEBTS & ACCOUNTS
            // ================================================================
            AssetType::Liability => {
                self.register(
                    AttributeDefinition::new("lender", "Lender", AttributeType::Text)
                        .with_validation(ValidationRule::Required)
                        .with_example("Wells Fargo"),
                );
                self.register(
                    AttributeDefinition::new("interest_rate", "Interest Rate", AttributeType::PercentText)
                        .with_validation(ValidationRule::Length { min: 0, max: 20 })
                        .with_example("3.5%"),
                );
                self.register(AttributeDefinition::new("account_number", "Loan Number", AttributeType::Text));
                self.register(AttributeDefinition::new("maturity_date", "Maturity Date", AttributeType::Date));
            }
            AssetType::Utility => {
                self.register(
                    AttributeDefinition::new("provider", "Provider", AttributeType::Text)
                        .with_validation(ValidationRule::Required)
                        .with_example("City Utilities"),
                );
                self.register(AttributeDefinition::new("account_number", "Account Number", AttributeType::Text));
                self.register(
                    AttributeDefinition::new("autopay_status", "Autopay", AttributeType::Text)
                        .with_example("Yes"),
                );
            }
            AssetType::Other => {
                self.register(AttributeDefinition::new("description", "Description", AttributeType::LongText));
                self.register(AttributeDefinition::new("location", "Location", AttributeType::Text));
                self.register_purchase_fields();
            }
        }
    }

    /// Fields mirrored from the "Purchase" appraisal
    fn register_purchase_fields(&mut self) {
        self.register(
            AttributeDefinition::new(ATTR_PURCHASE_DATE, "Purchase Date", AttributeType::Date)
                .with_description("Creates a Purchase valuation record"),
        );
        self.register(
            AttributeDefinition::new(ATTR_PURCHASE_PRICE, "Purchase Price ($)", AttributeType::Money)
                .with_validation(ValidationRule::Range { min: 0.0, max: MAX_ABS_VALUE }),
        );
    }

    /// Register a field (replaces one with the same name)
    pub fn register(&mut self, attr: AttributeDefinition) {
        match self.attributes.iter_mut().find(|a| a.name == attr.name) {
            Some(existing) => *existing = attr,
            None => self.attributes.push(attr),
        }
    }

    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    /// Get attribute definition by name
    pub fn get_by_name(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// The value field (always first)
    pub fn value_field(&self) -> &AttributeDefinition {
        &self.attributes[0]
    }

    /// Liability forms store their value negated
    pub fn value_sign(&self) -> f64 {
        if self.asset_type == AssetType::Liability {
            -1.0
        } else {
            1.0
        }
    }

    /// Fields stored in the attribute map (everything but the value field)
    pub fn attribute_fields(&self) -> &[AttributeDefinition] {
        &self.attributes[1..]
    }

    /// All fields, in form order
    pub fn list_all(&self) -> &[AttributeDefinition] {
        &self.attributes
    }

    pub fn count(&self) -> usize {
        self.attributes.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================
