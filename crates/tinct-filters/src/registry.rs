//! Reading filter menus from JSON.
//!
//! A menu file is a JSON array. Each entry is one of:
//!
//! - `["Name", {"kind": ...}]`: one filter serving as full and preview;
//! - `["Name", {"kind": ...}, {"kind": ...}]`: full, then preview;
//! - `{"name": "Name", "full": {"kind": ...}, "preview": {"kind": ...}}`
//!   with `preview` optional.
//!
//! ```json
//! [
//!   ["Blur", {"kind": "gaussian", "ksize": 9}, {"kind": "mean", "ksize": 3}],
//!   {"name": "Edges", "full": {"kind": "sobel"}}
//! ]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tinct_session::FilterDescriptor;

use crate::category::describe;
use crate::error::RegistryError;
use crate::kind::FilterKind;

const SHAPES: &str = "expected [name, filter], [name, full, preview] or {name, full, preview}";

/// One parsed menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Menu label.
    pub name: String,
    /// Filter replayed at full resolution.
    pub full: FilterKind,
    /// Cheaper filter for the preview, if different from `full`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<FilterKind>,
}

impl MenuEntry {
    /// Convert into a session descriptor.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`](crate::FilterError) if a filter has
    /// invalid parameters.
    pub fn to_descriptor(&self) -> Result<FilterDescriptor, crate::FilterError> {
        describe(self.name.clone(), self.full, self.preview)
    }
}

/// Parse a JSON menu into entries, preserving order.
///
/// # Errors
///
/// Returns [`RegistryError::Json`] if `json` is not a JSON array and
/// [`RegistryError::Shape`] for the first entry that is not one of the
/// accepted shapes, has a blank name, or names an unknown filter.
pub fn parse_menu(json: &str) -> Result<Vec<MenuEntry>, RegistryError> {
    let values: Vec<Value> = serde_json::from_str(json)?;
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            parse_entry(value).map_err(|reason| RegistryError::Shape { index, reason })
        })
        .collect()
}

/// Parse a JSON menu straight into session descriptors.
///
/// # Errors
///
/// Returns the errors of [`parse_menu`], plus [`RegistryError::Filter`]
/// for an entry whose filter parameters are invalid.
pub fn load_descriptors(json: &str) -> Result<Vec<FilterDescriptor>, RegistryError> {
    parse_menu(json)?
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            entry
                .to_descriptor()
                .map_err(|source| RegistryError::Filter {
                    index,
                    name: entry.name.clone(),
                    source,
                })
        })
        .collect()
}

fn parse_entry(value: Value) -> Result<MenuEntry, String> {
    let (name, full, preview) = match value {
        Value::Array(items) => {
            let mut items = items.into_iter();
            match (items.next(), items.next(), items.next(), items.next()) {
                (Some(name), Some(full), preview, None) => (Some(name), Some(full), preview),
                _ => return Err(SHAPES.to_string()),
            }
        }
        Value::Object(mut fields) => {
            let name = fields.remove("name");
            let full = fields.remove("full");
            let preview = fields.remove("preview").filter(|v| !v.is_null());
            if let Some(key) = fields.keys().next() {
                return Err(format!("unexpected field '{key}'"));
            }
            (name, full, preview)
        }
        _ => return Err(SHAPES.to_string()),
    };

    let name = match name {
        Some(Value::String(name)) if !name.trim().is_empty() => name,
        Some(Value::String(_)) => return Err("name must not be blank".to_string()),
        Some(_) => return Err("name must be a string".to_string()),
        None => return Err("missing 'name'".to_string()),
    };
    let Some(full) = full else {
        return Err(format!("'{name}' is missing 'full'"));
    };
    let full = filter_kind(&name, "full", full)?;
    let preview = preview
        .map(|v| filter_kind(&name, "preview", v))
        .transpose()?;

    Ok(MenuEntry {
        name,
        full,
        preview,
    })
}

fn filter_kind(name: &str, role: &str, value: Value) -> Result<FilterKind, String> {
    serde_json::from_value(value).map_err(|e| format!("'{name}' has an invalid {role} filter: {e}"))
}
