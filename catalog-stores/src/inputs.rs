//! Form payloads, validated before anything touches the network.

use std::collections::BTreeMap;

use catalog_core::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewAdmin {
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[validate(email(message = "must be a valid email"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdminChanges {
    /// Current key, i.e. the email before this change.
    #[validate(custom(function = "not_blank"))]
    pub id: String,

    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[validate(email(message = "must be a valid email"))]
    pub email: String,
}

/// Editable fields shared by brands and categories.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SlugFields {
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[validate(custom(function = "not_blank"))]
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(custom(function = "not_blank"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductChanges {
    #[validate(custom(function = "not_blank"))]
    pub id: String,

    #[validate(custom(function = "not_blank"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("is required".into()));
    }
    Ok(())
}

/// Run `validator` rules and turn failures into a Validation error whose
/// `errors` payload maps each field to its messages.
pub(crate) fn check<T: Validate>(input: &T, label: &str) -> CatalogResult<()> {
    input.validate().map_err(|errs| invalid(label, &errs))
}

/// Reject a blank document key.
pub(crate) fn require_id(id: &str, label: &str) -> CatalogResult<()> {
    if id.trim().is_empty() {
        return Err(CatalogError::validation(format!("{label} id is required"))
            .with_errors(json!({ "id": ["is required"] })));
    }
    Ok(())
}

fn invalid(label: &str, errs: &ValidationErrors) -> CatalogError {
    let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (field, errors) in errs.field_errors() {
        let messages = fields.entry(field.to_string()).or_default();
        for e in errors {
            let msg = e
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string());
            messages.push(msg);
        }
    }

    let summary = fields
        .iter()
        .map(|(field, messages)| format!("{field} {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ");

    CatalogError::validation(format!("{label} is invalid: {summary}")).with_errors(json!(fields))
}
