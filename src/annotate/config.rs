//! Dropdown configuration schema for annotation pages.
//!
//! A page carries an ordered list of dropdown categories, each either a
//! flat option list or a *dependent* mapping where picking a group name
//! reveals a second dropdown with that group's options (plus a free-text
//! "Other" escape hatch).
//!
//! The two shapes are distinguished once, at load time — a JSON array is a
//! [`DropdownOptions::Simple`] list, a JSON object a
//! [`DropdownOptions::Dependent`] mapping — so the renderer never inspects
//! value types. Group order follows the configuration file.
//!
//! ```json
//! [
//!   {"name": "intention", "label": "Intention",
//!    "options": {"Personal": ["Sharing info"], "Work": ["Status update"]}},
//!   {"name": "tone", "label": "Tone", "options": ["Happy", "Sad"]}
//! ]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{ChatcodeError, Result};

/// Option set of one dropdown category.
#[derive(Debug, Clone, PartialEq)]
pub enum DropdownOptions {
    /// A flat option list.
    Simple(Vec<String>),
    /// Ordered groups of (group name, group options); selecting a group
    /// populates a dependent dropdown.
    Dependent(Vec<(String, Vec<String>)>),
}

impl DropdownOptions {
    /// Returns `true` for the dependent-mapping shape.
    pub fn is_dependent(&self) -> bool {
        matches!(self, DropdownOptions::Dependent(_))
    }

    /// The dependent mapping as a JSON object (group order preserved),
    /// or `None` for simple lists. Feeds the page's `dependentMappings`
    /// script object.
    pub fn dependent_mapping_json(&self) -> Option<Value> {
        match self {
            DropdownOptions::Dependent(groups) => {
                let mut map = serde_json::Map::new();
                for (group, options) in groups {
                    map.insert(
                        group.clone(),
                        Value::Array(options.iter().cloned().map(Value::String).collect()),
                    );
                }
                Some(Value::Object(map))
            }
            DropdownOptions::Simple(_) => None,
        }
    }

    fn from_value(value: Value) -> std::result::Result<Self, String> {
        match value {
            Value::Array(items) => string_list(items).map(DropdownOptions::Simple),
            Value::Object(map) => {
                let mut groups = Vec::with_capacity(map.len());
                for (group, options) in map {
                    let Value::Array(items) = options else {
                        return Err(format!("group '{group}' must map to a list of options"));
                    };
                    groups.push((group, string_list(items)?));
                }
                Ok(DropdownOptions::Dependent(groups))
            }
            _ => Err("options must be a list or a mapping of group -> options".to_string()),
        }
    }
}

fn string_list(items: Vec<Value>) -> std::result::Result<Vec<String>, String> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(format!("expected a string option, got {other}")),
        })
        .collect()
}

impl<'de> Deserialize<'de> for DropdownOptions {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        DropdownOptions::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// One dropdown category of an annotation page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DropdownConfig {
    /// Category name (internal identifier, shows up in page comments).
    pub name: String,
    /// Label rendered next to the dropdown.
    pub label: String,
    /// The option set.
    pub options: DropdownOptions,
    /// Text of the clone button; defaults to "Add {label}".
    #[serde(default)]
    pub button_text: Option<String>,
    /// CSV column name; defaults to the label.
    #[serde(default)]
    pub csv_column: Option<String>,
}

impl DropdownConfig {
    /// The clone-button caption, falling back to "Add {label}".
    pub fn button_label(&self) -> String {
        self.button_text
            .clone()
            .unwrap_or_else(|| format!("Add {}", self.label))
    }

    /// The CSV column name, falling back to the label.
    pub fn column(&self) -> &str {
        self.csv_column.as_deref().unwrap_or(&self.label)
    }

    /// Options of the primary dropdown: the list itself, or the group
    /// names plus a trailing "Other" for dependent mappings.
    pub fn primary_options(&self) -> Vec<String> {
        match &self.options {
            DropdownOptions::Simple(options) => options.clone(),
            DropdownOptions::Dependent(groups) => {
                let mut options: Vec<String> =
                    groups.iter().map(|(group, _)| group.clone()).collect();
                options.push("Other".to_string());
                options
            }
        }
    }

    /// Checks the invariants the renderer relies on.
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(ChatcodeError::invalid_dropdown(&self.name, "label is empty"));
        }
        match &self.options {
            DropdownOptions::Simple(options) if options.is_empty() => Err(
                ChatcodeError::invalid_dropdown(&self.name, "options list is empty"),
            ),
            DropdownOptions::Dependent(groups) if groups.is_empty() => Err(
                ChatcodeError::invalid_dropdown(&self.name, "dependent mapping is empty"),
            ),
            _ => Ok(()),
        }
    }
}

/// Loads and validates a dropdown configuration file (a JSON array of
/// [`DropdownConfig`] values).
pub fn load_dropdown_configs(path: &Path) -> Result<Vec<DropdownConfig>> {
    let content = fs::read_to_string(path)?;
    let configs: Vec<DropdownConfig> = serde_json::from_str(&content)
        .map_err(|e| ChatcodeError::parse_json(e, Some(path.to_path_buf())))?;
    for config in &configs {
        config.validate()?;
    }
    Ok(configs)
}

/// The built-in sample configuration: a dependent "Intention" category and
/// a flat "Tone" category.
pub fn sample_configs() -> Vec<DropdownConfig> {
    vec![
        DropdownConfig {
            name: "intention".to_string(),
            label: "Intention".to_string(),
            options: DropdownOptions::Dependent(vec![
                (
                    "Personal".to_string(),
                    vec![
                        "Sharing info".to_string(),
                        "Asking question".to_string(),
                        "Social invitation".to_string(),
                    ],
                ),
                (
                    "Work".to_string(),
                    vec![
                        "Task assignment".to_string(),
                        "Status update".to_string(),
                        "Meeting coordination".to_string(),
                    ],
                ),
            ]),
            button_text: None,
            csv_column: None,
        },
        DropdownConfig {
            name: "tone".to_string(),
            label: "Tone".to_string(),
            options: DropdownOptions::Simple(
                ["Happy", "Sad", "Urgent", "Casual", "Formal"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
            button_text: None,
            csv_column: None,
        },
    ]
}
