use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Title used when rendering a change order whose title is blank
pub const DEFAULT_TITLE: &str = "Change Order";

/// Rejection raised while building a [`ChangeOrderInput`] from untyped JSON
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("change order must be a JSON object")]
    NotAnObject,

    #[error("`title` is required and must be a string")]
    InvalidTitle,

    #[error("`{section}` must be an array of line items")]
    NotAList { section: &'static str },

    #[error("`{section}[{index}]` must be an object")]
    InvalidItem { section: &'static str, index: usize },

    #[error("`{section}[{index}].{field}` must be a number, got {found}")]
    NotANumber {
        section: &'static str,
        index: usize,
        field: &'static str,
        found: String,
    },

    #[error("`{section}[{index}].{field}` must be a whole number, got {found}")]
    NotAnInteger {
        section: &'static str,
        index: usize,
        field: &'static str,
        found: String,
    },

    #[error("`{section}[{index}].{field}` must be a string")]
    NotAString {
        section: &'static str,
        index: usize,
        field: &'static str,
    },
}

/// Material line: billed as `qty × unit_price`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaterialItem {
    pub description: String,
    #[serde(rename = "qty")]
    pub quantity: f64,
    pub unit: String,
    pub unit_price: f64,
}

impl MaterialItem {
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Equipment line. `duration` and `duration_unit` are descriptive only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EquipmentItem {
    pub description: String,
    #[serde(rename = "qty")]
    pub quantity: f64,
    pub unit: String,
    pub duration: f64,
    pub duration_unit: String,
    pub unit_price: f64,
}

impl EquipmentItem {
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Labor line: a crew of `workers` for `days` at `hours_per_day`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaborItem {
    pub description: String,
    pub trade: String,
    pub workers: i64,
    pub hours_per_day: f64,
    pub days: f64,
    pub hourly_rate: f64,
}

impl LaborItem {
    pub fn total_hours(&self) -> f64 {
        self.workers as f64 * self.hours_per_day * self.days
    }

    pub fn line_total(&self) -> f64 {
        self.total_hours() * self.hourly_rate
    }
}

/// Work priced by a subcontractor, billed as `qty × price`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubcontractorItem {
    pub description: String,
    #[serde(rename = "qty")]
    pub quantity: f64,
    pub unit: String,
    pub price: f64,
}

impl SubcontractorItem {
    pub fn line_total(&self) -> f64 {
        self.quantity * self.price
    }
}

/// General requirements share the material line shape
pub type GeneralRequirementItem = MaterialItem;

/// Structured change order as produced by the estimator
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeOrderInput {
    pub title: String,
    pub materials: Vec<MaterialItem>,
    pub equipment: Vec<EquipmentItem>,
    pub labor: Vec<LaborItem>,
    pub general_requirements: Vec<GeneralRequirementItem>,
    pub subcontractors: Vec<SubcontractorItem>,
}

impl ChangeOrderInput {
    /// Build a change order from untyped JSON.
    ///
    /// This is the only place missing values are filled in: absent or `null`
    /// numbers become `0`, absent text becomes `""`, absent lists become empty.
    /// Anything present with the wrong type is rejected with the section,
    /// item index and field that failed.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

        let title = match object.get("title") {
            Some(Value::String(title)) => title.clone(),
            _ => return Err(ValidationError::InvalidTitle),
        };

        Ok(Self {
            title,
            materials: parse_section(object, "materials", material_from_fields)?,
            equipment: parse_section(object, "equipment", equipment_from_fields)?,
            labor: parse_section(object, "labor", labor_from_fields)?,
            general_requirements: parse_section(
                object,
                "general_requirements",
                material_from_fields,
            )?,
            subcontractors: parse_section(object, "subcontractors", subcontractor_from_fields)?,
        })
    }

    /// Title to print, falling back to [`DEFAULT_TITLE`] when blank
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_TITLE
        } else {
            &self.title
        }
    }

    pub fn has_subcontractors(&self) -> bool {
        !self.subcontractors.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.materials.len()
            + self.equipment.len()
            + self.labor.len()
            + self.general_requirements.len()
            + self.subcontractors.len()
    }

    /// Whether any quantity, rate or price is negative.
    ///
    /// Negative values are accepted and flow through the totals unchanged;
    /// callers use this to log them.
    pub fn has_negative_values(&self) -> bool {
        let materials = self
            .materials
            .iter()
            .chain(&self.general_requirements)
            .any(|i| i.quantity < 0.0 || i.unit_price < 0.0);
        let equipment = self
            .equipment
            .iter()
            .any(|i| i.quantity < 0.0 || i.unit_price < 0.0 || i.duration < 0.0);
        let labor = self.labor.iter().any(|i| {
            i.workers < 0 || i.hours_per_day < 0.0 || i.days < 0.0 || i.hourly_rate < 0.0
        });
        let subcontractors = self
            .subcontractors
            .iter()
            .any(|i| i.quantity < 0.0 || i.price < 0.0);

        materials || equipment || labor || subcontractors
    }
}

/// Field accessor for a single line item, carrying its position for errors
struct ItemFields<'a> {
    section: &'static str,
    index: usize,
    fields: &'a Map<String, Value>,
}

impl ItemFields<'_> {
    fn number(&self, field: &'static str) -> Result<f64, ValidationError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(0.0),
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| self.not_a_number(field, n)),
            Some(other) => Err(self.not_a_number(field, other)),
        }
    }

    fn integer(&self, field: &'static str) -> Result<i64, ValidationError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(0),
            Some(Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    return Ok(i);
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                    _ => Err(ValidationError::NotAnInteger {
                        section: self.section,
                        index: self.index,
                        field,
                        found: n.to_string(),
                    }),
                }
            }
            Some(other) => Err(self.not_a_number(field, other)),
        }
    }

    fn text(&self, field: &'static str) -> Result<String, ValidationError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(ValidationError::NotAString {
                section: self.section,
                index: self.index,
                field,
            }),
        }
    }

    fn not_a_number(&self, field: &'static str, found: impl ToString) -> ValidationError {
        ValidationError::NotANumber {
            section: self.section,
            index: self.index,
            field,
            found: found.to_string(),
        }
    }
}

fn parse_section<T>(
    object: &Map<String, Value>,
    section: &'static str,
    build: fn(&ItemFields<'_>) -> Result<T, ValidationError>,
) -> Result<Vec<T>, ValidationError> {
    let items = match object.get(section) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ValidationError::NotAList { section }),
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let fields = item
                .as_object()
                .ok_or(ValidationError::InvalidItem { section, index })?;
            build(&ItemFields {
                section,
                index,
                fields,
            })
        })
        .collect()
}

fn material_from_fields(item: &ItemFields<'_>) -> Result<MaterialItem, ValidationError> {
    Ok(MaterialItem {
        description: item.text("description")?,
        quantity: item.number("qty")?,
        unit: item.text("unit")?,
        unit_price: item.number("unit_price")?,
    })
}

fn equipment_from_fields(item: &ItemFields<'_>) -> Result<EquipmentItem, ValidationError> {
    Ok(EquipmentItem {
        description: item.text("description")?,
        quantity: item.number("qty")?,
        unit: item.text("unit")?,
        duration: item.number("duration")?,
        duration_unit: item.text("duration_unit")?,
        unit_price: item.number("unit_price")?,
    })
}

fn labor_from_fields(item: &ItemFields<'_>) -> Result<LaborItem, ValidationError> {
    Ok(LaborItem {
        description: item.text("description")?,
        trade: item.text("trade")?,
        workers: item.integer("workers")?,
        hours_per_day: item.number("hours_per_day")?,
        days: item.number("days")?,
        hourly_rate: item.number("hourly_rate")?,
    })
}

fn subcontractor_from_fields(item: &ItemFields<'_>) -> Result<SubcontractorItem, ValidationError> {
    Ok(SubcontractorItem {
        description: item.text("description")?,
        quantity: item.number("qty")?,
        unit: item.text("unit")?,
        price: item.number("price")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_full_document() {
        let value = json!({
            "title": "Replace lobby lighting",
            "materials": [{"description": "LED fixture", "qty": 12, "unit": "ea", "unit_price": 85.5}],
            "equipment": [{"description": "Scissor lift", "qty": 1, "unit": "ea", "duration": 3, "duration_unit": "days", "unit_price": 250}],
            "labor": [{"description": "Install", "trade": "Electrician", "workers": 2, "hours_per_day": 8, "days": 3, "hourly_rate": 95}],
            "general_requirements": [{"description": "Cleanup", "qty": 1, "unit": "ls", "unit_price": 300}],
            "subcontractors": [{"description": "Fire alarm tie-in", "qty": 1, "unit": "ls", "price": 4200}]
        });

        let input = ChangeOrderInput::from_value(&value).unwrap();
        assert_eq!(input.title, "Replace lobby lighting");
        assert_eq!(input.materials[0].quantity, 12.0);
        assert_eq!(input.equipment[0].duration_unit, "days");
        assert_eq!(input.labor[0].workers, 2);
        assert_eq!(input.general_requirements[0].unit_price, 300.0);
        assert_eq!(input.subcontractors[0].price, 4200.0);
        assert_eq!(input.item_count(), 5);
        assert!(input.has_subcontractors());
    }

    #[test]
    fn test_missing_numbers_default_to_zero() {
        let value = json!({
            "title": "Patch drywall",
            "materials": [{"description": "Gypsum board"}],
            "labor": [{"description": "Finish", "workers": null}]
        });

        let input = ChangeOrderInput::from_value(&value).unwrap();
        assert_eq!(input.materials[0].quantity, 0.0);
        assert_eq!(input.materials[0].unit_price, 0.0);
        assert_eq!(input.materials[0].unit, "");
        assert_eq!(input.labor[0].workers, 0);
        assert!(input.equipment.is_empty());
        assert!(input.general_requirements.is_empty());
        assert!(!input.has_subcontractors());
    }

    #[test]
    fn test_title_is_required() {
        let value = json!({"materials": []});
        assert_eq!(
            ChangeOrderInput::from_value(&value),
            Err(ValidationError::InvalidTitle)
        );

        let value = json!({"title": 42});
        assert_eq!(
            ChangeOrderInput::from_value(&value),
            Err(ValidationError::InvalidTitle)
        );
    }

    #[test]
    fn test_non_numeric_field_names_index() {
        let value = json!({
            "title": "Roof repair",
            "materials": [
                {"description": "Shingles", "qty": 10, "unit_price": 30},
                {"description": "Nails", "qty": "two boxes", "unit_price": 12}
            ]
        });

        let err = ChangeOrderInput::from_value(&value).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotANumber {
                section: "materials",
                index: 1,
                field: "qty",
                found: "\"two boxes\"".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "`materials[1].qty` must be a number, got \"two boxes\""
        );
    }

    #[test]
    fn test_fractional_workers_rejected() {
        let value = json!({
            "title": "Framing",
            "labor": [{"workers": 2.5, "hours_per_day": 8, "days": 1, "hourly_rate": 60}]
        });

        let err = ChangeOrderInput::from_value(&value).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NotAnInteger { section: "labor", index: 0, field: "workers", .. }
        ));

        let value = json!({"title": "Framing", "labor": [{"workers": 3.0}]});
        let input = ChangeOrderInput::from_value(&value).unwrap();
        assert_eq!(input.labor[0].workers, 3);
    }

    #[test]
    fn test_section_must_be_array_of_objects() {
        let value = json!({"title": "x", "equipment": {"description": "crane"}});
        assert_eq!(
            ChangeOrderInput::from_value(&value),
            Err(ValidationError::NotAList { section: "equipment" })
        );

        let value = json!({"title": "x", "subcontractors": ["electrical"]});
        assert_eq!(
            ChangeOrderInput::from_value(&value),
            Err(ValidationError::InvalidItem { section: "subcontractors", index: 0 })
        );
    }

    #[test]
    fn test_negative_values_pass_through() {
        let value = json!({
            "title": "Credit",
            "materials": [{"description": "Returned stock", "qty": -4, "unit_price": 25}]
        });

        let input = ChangeOrderInput::from_value(&value).unwrap();
        assert_eq!(input.materials[0].line_total(), -100.0);
        assert!(input.has_negative_values());
    }

    #[test]
    fn test_labor_totals() {
        let item = LaborItem {
            workers: 2,
            hours_per_day: 8.0,
            days: 5.0,
            hourly_rate: 50.0,
            ..Default::default()
        };
        assert_eq!(item.total_hours(), 80.0);
        assert_eq!(item.line_total(), 4000.0);
    }

    #[test]
    fn test_display_title_fallback() {
        let input = ChangeOrderInput {
            title: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(input.display_title(), DEFAULT_TITLE);
    }

    #[test]
    fn test_serializes_with_contract_field_names() {
        let input = ChangeOrderInput {
            title: "t".to_string(),
            materials: vec![MaterialItem {
                quantity: 2.0,
                unit_price: 100.0,
                ..Default::default()
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["materials"][0]["qty"], 2.0);
        assert_eq!(json["materials"][0]["unit_price"], 100.0);
    }
}
