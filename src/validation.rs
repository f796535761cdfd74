//! Request validation with a read-only table of named field rules.
//!
//! Rules are pure predicates over a field's text form, registered once in
//! [`RULES`]. Request types run their fields through a [`Validator`], which
//! accumulates human-readable messages per field:
//!
//! ```ignore
//! let mut v = Validator::new();
//! v.field("name", Some(&req.name), &["required"]);
//! v.field("image_url", req.image_url.as_deref(), &["url"]);
//! v.finish()?;
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::AppError;
use crate::models::{Concentration, NoteCategory};

/// A field rule: `Ok` when the value passes, otherwise the message tail
/// appended to "The <field> field ".
pub type Rule = fn(&str) -> Result<(), String>;

/// Name of the rule that makes a field mandatory.
pub const REQUIRED: &str = "required";

/// Registered rules, keyed by name.
pub static RULES: Lazy<HashMap<&'static str, Rule>> = Lazy::new(|| {
    let mut rules: HashMap<&'static str, Rule> = HashMap::new();
    rules.insert(REQUIRED, required);
    rules.insert("url", url);
    rules.insert("ymd_date", ymd_date);
    rules.insert("year", year);
    rules.insert("concentration", concentration);
    rules.insert("note_category", note_category);
    rules
});

fn required(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err("is required.".into())
    } else {
        Ok(())
    }
}

fn url(value: &str) -> Result<(), String> {
    match url::Url::parse(value) {
        Ok(parsed) if parsed.has_host() => Ok(()),
        _ => Err("must be a valid URL.".into()),
    }
}

fn ymd_date(value: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| "must be a valid date format 'YYYY-MM-DD'.".into())
}

fn year(value: &str) -> Result<(), String> {
    match value.parse::<i32>() {
        Ok(y) if y < 1000 => Err("should be greater than 1000.".into()),
        Ok(y) if y > 9999 => Err("should be less than 9999.".into()),
        Ok(_) => Ok(()),
        Err(_) => Err("must be a valid year.".into()),
    }
}

fn concentration(value: &str) -> Result<(), String> {
    value
        .parse::<Concentration>()
        .map(|_| ())
        .map_err(|_| "must be a valid concentration.".into())
}

fn note_category(value: &str) -> Result<(), String> {
    value
        .parse::<NoteCategory>()
        .map(|_| ())
        .map_err(|_| format!("contains an invalid note category '{}'.", value))
}

/// Client-facing validation failure: `{"message": ..., "errors": {field: [..]}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationErrors {
    pub message: String,
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self {
            message: "The given data was invalid.".to_string(),
            errors: BTreeMap::new(),
        }
    }

    /// Single-field failure.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.errors.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Accumulates rule failures for one request.
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `rules` against a field.
    ///
    /// A missing or blank value fails `required` when listed and otherwise
    /// skips the remaining rules. Only the first failing rule is reported.
    pub fn field(&mut self, field: &str, value: Option<&str>, rules: &[&str]) -> &mut Self {
        let value = value.filter(|v| !v.trim().is_empty());

        let Some(value) = value else {
            if rules.contains(&REQUIRED) {
                self.fail(field, "is required.");
            }
            return self;
        };

        for name in rules.iter().filter(|r| **r != REQUIRED) {
            let Some(rule) = RULES.get(*name) else {
                tracing::warn!(rule = *name, field, "Unknown validation rule");
                continue;
            };
            if let Err(tail) = rule(value) {
                self.fail(field, &tail);
                break;
            }
        }
        self
    }

    /// Partial-update variant of [`field`](Self::field): an absent field is
    /// skipped, a present one must be non-blank and pass `rules`.
    pub fn present(&mut self, field: &str, value: Option<&str>, rules: &[&str]) -> &mut Self {
        let Some(value) = value else {
            return self;
        };
        let mut with_required = vec![REQUIRED];
        with_required.extend(rules.iter().copied().filter(|r| *r != REQUIRED));
        self.field(field, Some(value), &with_required)
    }

    /// Records a failure as "The <field> field <tail>".
    pub fn fail(&mut self, field: &str, tail: &str) -> &mut Self {
        let message = format!("The {} field {}", human_readable(field), tail);
        self.errors.add(field, message);
        self
    }

    /// Records a message verbatim.
    pub fn add(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.add(field, message);
        self
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// `year_founded` → `year founded`.
fn human_readable(field: &str) -> String {
    field.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(v: Validator) -> BTreeMap<String, Vec<String>> {
        match v.finish() {
            Err(AppError::Validation(e)) => e.errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_rule_table_is_complete() {
        for name in ["required", "url", "ymd_date", "year", "concentration", "note_category"] {
            assert!(RULES.contains_key(name), "missing rule {name}");
        }
    }

    #[test]
    fn test_required_missing_and_blank() {
        let mut v = Validator::new();
        v.field("name", None, &["required"]);
        v.field("country", Some("   "), &["required"]);
        let errs = errors(v);
        assert_eq!(errs["name"], vec!["The name field is required."]);
        assert_eq!(errs["country"], vec!["The country field is required."]);
    }

    #[test]
    fn test_optional_field_skips_rules_when_empty() {
        let mut v = Validator::new();
        v.field("image_url", Some(""), &["url"]);
        v.field("image_url", None, &["url"]);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_present_fields_in_partial_update() {
        let mut v = Validator::new();
        v.present("name", None, &[]);
        v.present("country", Some(""), &[]);
        v.present("birth_date", Some("yesterday"), &["ymd_date"]);
        let errs = errors(v);
        assert!(!errs.contains_key("name"));
        assert_eq!(errs["country"], vec!["The country field is required."]);
        assert_eq!(
            errs["birth_date"],
            vec!["The birth date field must be a valid date format 'YYYY-MM-DD'."]
        );
    }

    #[test]
    fn test_url_rule() {
        let mut v = Validator::new();
        v.field("image_url", Some("not a url"), &["required", "url"]);
        let errs = errors(v);
        assert_eq!(errs["image_url"], vec!["The image url field must be a valid URL."]);

        let mut v = Validator::new();
        v.field("image_url", Some("https://cdn.example.com/a.png"), &["url"]);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_date_and_year_rules() {
        let mut v = Validator::new();
        v.field("birth_date", Some("02/01/1962"), &["required", "ymd_date"]);
        v.field("year_founded", Some("999"), &["required", "year"]);
        v.field("year_released", Some("10000"), &["year"]);
        let errs = errors(v);
        assert_eq!(
            errs["birth_date"],
            vec!["The birth date field must be a valid date format 'YYYY-MM-DD'."]
        );
        assert_eq!(
            errs["year_founded"],
            vec!["The year founded field should be greater than 1000."]
        );
        assert_eq!(
            errs["year_released"],
            vec!["The year released field should be less than 9999."]
        );
    }

    #[test]
    fn test_enumeration_rules() {
        let mut v = Validator::new();
        v.field("concentration", Some("Body Mist"), &["concentration"]);
        v.field("notes", Some("heart"), &["note_category"]);
        v.field("notes", Some("TOP"), &["note_category"]);
        let errs = errors(v);
        assert_eq!(
            errs["concentration"],
            vec!["The concentration field must be a valid concentration."]
        );
        assert_eq!(
            errs["notes"],
            vec!["The notes field contains an invalid note category 'heart'."]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let body = serde_json::to_value(ValidationErrors::single("house_id", "House not found.")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "message": "The given data was invalid.",
                "errors": {"house_id": ["House not found."]}
            })
        );
    }
}
